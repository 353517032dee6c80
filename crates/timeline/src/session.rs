use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use media_io::MediaCatalog;

use crate::{
    apply_command, Asset, Clip, ClipColor, ClipId, ColorAllocator, CommandOutcome, DragPayload,
    DropTarget, EffectDescriptor, EffectId, EffectRegistry, MediaFile, NewEffect,
    PlaceClipCommand, Seconds, SessionConfig, Timeline, TimelineCommand, TimelineError, Track,
    TrackId,
};

/// Plain records handed to a renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineSnapshot {
    pub tracks: Vec<Track>,
    pub effects: BTreeMap<EffectId, EffectDescriptor>,
}

/// All mutable state of one editing session.
///
/// Created when the workspace opens and dropped when it closes. Every event
/// is applied to completion before the next one is looked at.
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: SessionConfig,
    catalog: MediaCatalog,
    timeline: Timeline,
    effects: EffectRegistry,
    colors: ColorAllocator,
}

impl EditorSession {
    pub fn new(config: SessionConfig) -> Result<Self, TimelineError> {
        config.validate()?;
        let colors = ColorAllocator::new(config.palette.clone())?;
        Ok(Self {
            timeline: Timeline::from_specs(&config.tracks),
            catalog: MediaCatalog::new(),
            effects: EffectRegistry::new(),
            colors,
            config,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn catalog(&self) -> &MediaCatalog {
        &self.catalog
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    pub fn colors(&self) -> &ColorAllocator {
        &self.colors
    }

    pub fn tracks(&self) -> &[Track] {
        self.timeline.tracks()
    }

    pub fn import(&mut self, file: &MediaFile) -> Result<&Asset, TimelineError> {
        Ok(self.catalog.import(file)?)
    }

    /// Validates `file` and places it. Nothing is recorded unless both the
    /// file and the target track are acceptable.
    pub fn ingest(
        &mut self,
        file: &MediaFile,
        target_track: Option<&TrackId>,
    ) -> Result<&Clip, TimelineError> {
        self.timeline.resolve_target(target_track)?;
        let asset = self.catalog.import(file)?.clone();
        self.place(PlaceClipCommand {
            asset,
            target_track: target_track.cloned(),
        })
    }

    pub fn place(&mut self, command: PlaceClipCommand) -> Result<&Clip, TimelineError> {
        let PlaceClipCommand {
            asset,
            target_track,
        } = command;
        // Resolve before touching the registry or allocator.
        let track_index = self.timeline.resolve_target(target_track.as_ref())?;

        let duration = asset
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(self.config.fallback_duration);
        let effect_id = self.effects.register(NewEffect::from(&asset));
        let color = self.colors.allocate();
        let clip = Clip::new(
            asset.name.clone(),
            0.0,
            duration,
            asset.kind,
            color,
            effect_id,
        );
        debug!(
            clip = %clip.id(),
            effect = %clip.effect_id(),
            color = %clip.color(),
            "placed {} on track {}",
            asset.name,
            self.timeline.tracks()[track_index].id()
        );
        Ok(self.timeline.push_clip(track_index, clip))
    }

    /// Handles a drag released over the workspace. Drops that miss every
    /// track are ignored.
    pub fn handle_drop(
        &mut self,
        payload: DragPayload,
        target: DropTarget,
    ) -> Result<Option<&Clip>, TimelineError> {
        let target_track = match target {
            DropTarget::Outside => return Ok(None),
            DropTarget::Timeline => None,
            DropTarget::Track { track_id } => {
                if self.timeline.track(&track_id).is_none() {
                    debug!("drop on unknown track {} ignored", track_id);
                    return Ok(None);
                }
                Some(track_id)
            }
        };
        let DragPayload::Media { asset_id } = payload;
        let asset = self
            .catalog
            .get(asset_id)
            .cloned()
            .ok_or(TimelineError::AssetNotFound(asset_id))?;
        self.place(PlaceClipCommand {
            asset,
            target_track,
        })
        .map(Some)
    }

    pub fn move_clip(&mut self, id: ClipId, new_start: Seconds) -> Result<&Clip, TimelineError> {
        self.timeline.move_clip(id, new_start)
    }

    pub fn resize_clip(&mut self, id: ClipId, new_end: Seconds) -> Result<&Clip, TimelineError> {
        self.timeline.resize_clip(id, new_end)
    }

    /// Removes a clip and its effect. The clip's color stays marked as used.
    pub fn remove_clip(&mut self, id: ClipId) -> Result<Clip, TimelineError> {
        let clip = self.timeline.take_clip(id)?;
        if self.effects.remove(clip.effect_id()).is_none() {
            debug!("clip {} had no registered effect {}", id, clip.effect_id());
        }
        Ok(clip)
    }

    pub fn reorder_track(
        &mut self,
        id: &TrackId,
        index: usize,
    ) -> Result<(usize, usize), TimelineError> {
        self.timeline.reorder_track(id, index)
    }

    pub fn apply(&mut self, command: TimelineCommand) -> Result<CommandOutcome, TimelineError> {
        apply_command(self, command)
    }

    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            tracks: self.timeline.tracks().to_vec(),
            effects: self.effects.to_map(),
        }
    }

    pub fn used_colors(&self) -> Vec<&ClipColor> {
        self.colors.used()
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        let config = SessionConfig::default();
        Self {
            timeline: Timeline::from_specs(&config.tracks),
            catalog: MediaCatalog::new(),
            effects: EffectRegistry::new(),
            colors: ColorAllocator::default(),
            config,
        }
    }
}
