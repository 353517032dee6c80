use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use media_io::MediaFile;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use timeline::{EditorSession, SessionConfig, TimelineCommand, TrackId};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "gausian-cli")]
#[command(about = "Gausian timeline CLI - Headless clip placement and timeline editing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    /// Session config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check media files against the supported format list
    Validate {
        /// Media files to check
        files: Vec<PathBuf>,
    },

    /// Place media files on a fresh timeline and print it
    Place {
        /// Target track id (defaults to the first track)
        #[arg(short, long)]
        track: Option<String>,

        /// Read durations with ffprobe
        #[arg(long)]
        probe: bool,

        /// Duration in seconds applied to every file
        #[arg(long)]
        duration: Option<f64>,

        /// Media files to place
        files: Vec<PathBuf>,
    },

    /// Apply newline-delimited JSON events from stdin, one response per line
    Session,
}

/// One line of the `session` protocol.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum SessionEvent {
    Import {
        #[serde(flatten)]
        file: MediaFile,
    },
    Ingest {
        #[serde(flatten)]
        file: MediaFile,
        #[serde(default)]
        track_id: Option<TrackId>,
    },
    Command {
        #[serde(flatten)]
        command: TimelineCommand,
    },
    Snapshot,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout carries JSON only.
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading session config {}", path.display()))?,
        None => SessionConfig::default(),
    };

    match cli.command {
        Commands::Validate { files } => validate_command(files),
        Commands::Place {
            track,
            probe,
            duration,
            files,
        } => place_command(config, track, probe, duration, files),
        Commands::Session => session_command(config).await,
    }
}

fn validate_command(files: Vec<PathBuf>) -> Result<()> {
    info!("Validating {} files", files.len());

    let results: Vec<Value> = files
        .iter()
        .map(|file| match media_io::validate(&MediaFile::new(file)) {
            Ok(asset) => json!({
                "file": file,
                "supported": true,
                "kind": asset.kind,
            }),
            Err(e) => {
                warn!("{}", e);
                json!({
                    "file": file,
                    "supported": false,
                    "error": e.to_string(),
                })
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn place_command(
    config: SessionConfig,
    track: Option<String>,
    probe: bool,
    duration: Option<f64>,
    files: Vec<PathBuf>,
) -> Result<()> {
    let mut session = EditorSession::new(config)?;
    let target = track.map(TrackId::new);
    if let Some(id) = &target {
        // Fail once up front instead of once per file.
        session.timeline().resolve_target(Some(id))?;
    }

    info!("Placing {} files", files.len());

    let mut rejected = Vec::new();
    for path in &files {
        let mut file = MediaFile::new(path);
        if let Some(d) = duration {
            file = file.with_duration(d);
        } else if probe && media_io::is_supported(path) {
            match media_io::probe_duration(path) {
                Ok(Some(d)) => {
                    debug!("Probed {:?}: {:.3}s", path, d);
                    file = file.with_duration(d);
                }
                Ok(None) => debug!("No duration for {:?}", path),
                Err(e) => warn!("Failed to probe {}: {}", path.display(), e),
            }
        }

        match session.ingest(&file, target.as_ref()) {
            Ok(clip) => info!(
                "Placed {} at {:.3}-{:.3}s ({})",
                clip.name(),
                clip.start(),
                clip.end(),
                clip.color()
            ),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                rejected.push(json!({ "file": path, "error": e.to_string() }));
            }
        }
    }

    let output = json!({
        "timeline": session.snapshot(),
        "duration": session.timeline().duration(),
        "rejected": rejected,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn session_command(config: SessionConfig) -> Result<()> {
    let mut session = EditorSession::new(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    info!("Session started with {} tracks", session.tracks().len());

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<SessionEvent>(line) {
            Ok(event) => match handle_event(&mut session, event) {
                Ok(value) => json!({ "ok": value }),
                Err(e) => {
                    warn!("Event failed: {:#}", e);
                    json!({ "error": e.to_string() })
                }
            },
            Err(e) => json!({ "error": format!("malformed event: {}", e) }),
        };
        stdout.write_all(format!("{}\n", response).as_bytes()).await?;
        stdout.flush().await?;
    }

    info!(
        "Session closed with {} clips on {} tracks",
        session.timeline().clip_count(),
        session.tracks().len()
    );
    Ok(())
}

fn handle_event(session: &mut EditorSession, event: SessionEvent) -> Result<Value> {
    let value = match event {
        SessionEvent::Import { file } => serde_json::to_value(session.import(&file)?)?,
        SessionEvent::Ingest { file, track_id } => {
            serde_json::to_value(session.ingest(&file, track_id.as_ref())?)?
        }
        SessionEvent::Command { command } => serde_json::to_value(session.apply(command)?)?,
        SessionEvent::Snapshot => serde_json::to_value(session.snapshot())?,
    };
    Ok(value)
}
