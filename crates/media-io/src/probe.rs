use serde::Deserialize;
use std::path::Path;
use std::process::Command;

use crate::{ProbeError, Seconds};

#[derive(Debug, Clone, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct FfprobeJson {
    format: Option<FfprobeFormat>,
}

/// Reads the container duration from `ffprobe -show_format` JSON output.
pub fn parse_ffprobe_duration(stdout: &[u8]) -> Result<Option<Seconds>, ProbeError> {
    let parsed: FfprobeJson =
        serde_json::from_slice(stdout).map_err(|e| ProbeError::Parse(e.to_string()))?;
    Ok(parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0))
}

pub fn probe_duration(path: &Path) -> Result<Option<Seconds>, ProbeError> {
    let ffprobe = which::which("ffprobe").map_err(|_| ProbeError::FfprobeMissing)?;
    let out = Command::new(ffprobe)
        .arg("-v")
        .arg("error")
        .arg("-show_format")
        .arg("-print_format")
        .arg("json")
        .arg(path)
        .output()
        .map_err(|e| ProbeError::FfprobeFailed(e.to_string()))?;
    if !out.status.success() {
        return Err(ProbeError::FfprobeFailed(
            String::from_utf8_lossy(&out.stderr).into(),
        ));
    }
    parse_ffprobe_duration(&out.stdout)
}
