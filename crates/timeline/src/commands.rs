use serde::{Deserialize, Serialize};

use crate::{Asset, AssetId, Clip, ClipId, EditorSession, EffectId, Seconds, TimelineError, TrackId};

/// Places one asset on a track. `target_track: None` means the first track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceClipCommand {
    pub asset: Asset,
    #[serde(default)]
    pub target_track: Option<TrackId>,
}

impl PlaceClipCommand {
    pub fn new(asset: Asset) -> Self {
        Self {
            asset,
            target_track: None,
        }
    }

    pub fn on_track(mut self, track_id: impl Into<TrackId>) -> Self {
        self.target_track = Some(track_id.into());
        self
    }
}

/// What a drag carries from the media bin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragPayload {
    Media { asset_id: AssetId },
}

/// Where a drag was released.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DropTarget {
    /// A specific track lane.
    Track { track_id: TrackId },
    /// The timeline panel outside any lane; lands on the first track.
    Timeline,
    Outside,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TimelineCommand {
    PlaceClip {
        asset_id: AssetId,
        #[serde(default)]
        track_id: Option<TrackId>,
    },
    DropMedia {
        payload: DragPayload,
        target: DropTarget,
    },
    MoveClip {
        clip_id: ClipId,
        start: Seconds,
    },
    ResizeClip {
        clip_id: ClipId,
        end: Seconds,
    },
    RemoveClip {
        clip_id: ClipId,
    },
    ReorderTrack {
        track_id: TrackId,
        index: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Placed {
        track_id: TrackId,
        clip: Clip,
    },
    /// The drop landed outside any track.
    Ignored,
    Updated {
        clip: Clip,
    },
    Removed {
        clip_id: ClipId,
        effect_id: EffectId,
    },
    Reordered {
        track_id: TrackId,
        from: usize,
        to: usize,
    },
}

pub fn apply_command(
    session: &mut EditorSession,
    command: TimelineCommand,
) -> Result<CommandOutcome, TimelineError> {
    match command {
        TimelineCommand::PlaceClip { asset_id, track_id } => {
            let asset = session
                .catalog()
                .get(asset_id)
                .cloned()
                .ok_or(TimelineError::AssetNotFound(asset_id))?;
            let command = PlaceClipCommand {
                asset,
                target_track: track_id,
            };
            let clip = session.place(command)?.clone();
            placed(session, clip)
        }
        TimelineCommand::DropMedia { payload, target } => {
            match session.handle_drop(payload, target)?.cloned() {
                Some(clip) => placed(session, clip),
                None => Ok(CommandOutcome::Ignored),
            }
        }
        TimelineCommand::MoveClip { clip_id, start } => {
            let clip = session.move_clip(clip_id, start)?.clone();
            Ok(CommandOutcome::Updated { clip })
        }
        TimelineCommand::ResizeClip { clip_id, end } => {
            let clip = session.resize_clip(clip_id, end)?.clone();
            Ok(CommandOutcome::Updated { clip })
        }
        TimelineCommand::RemoveClip { clip_id } => {
            let clip = session.remove_clip(clip_id)?;
            Ok(CommandOutcome::Removed {
                clip_id,
                effect_id: clip.effect_id().clone(),
            })
        }
        TimelineCommand::ReorderTrack { track_id, index } => {
            let (from, to) = session.reorder_track(&track_id, index)?;
            Ok(CommandOutcome::Reordered { track_id, from, to })
        }
    }
}

fn placed(session: &EditorSession, clip: Clip) -> Result<CommandOutcome, TimelineError> {
    let (track_index, _) = session
        .timeline()
        .clip_location(clip.id())
        .ok_or(TimelineError::ClipNotFound(clip.id()))?;
    Ok(CommandOutcome::Placed {
        track_id: session.timeline().tracks()[track_index].id().clone(),
        clip,
    })
}
