use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{ClipColor, EffectId, MediaKind, Seconds, TimelineError, TrackSpec};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ClipId(pub Uuid);

impl ClipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    #[default]
    Video,
    Audio,
    Other,
}

/// A placed, time-bounded reference to one effect.
///
/// Only the time bounds change after creation; id, color and effect binding
/// are fixed when the placement protocol builds the clip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    id: ClipId,
    name: String,
    start: Seconds,
    end: Seconds,
    kind: MediaKind,
    color: ClipColor,
    effect_id: EffectId,
}

impl Clip {
    pub(crate) fn new(
        name: impl Into<String>,
        start: Seconds,
        end: Seconds,
        kind: MediaKind,
        color: ClipColor,
        effect_id: EffectId,
    ) -> Self {
        Self {
            id: ClipId::new(),
            name: name.into(),
            start,
            end,
            kind,
            color,
            effect_id,
        }
    }

    pub fn id(&self) -> ClipId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> Seconds {
        self.start
    }

    pub fn end(&self) -> Seconds {
        self.end
    }

    pub fn duration(&self) -> Seconds {
        self.end - self.start
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn color(&self) -> &ClipColor {
        &self.color
    }

    pub fn effect_id(&self) -> &EffectId {
        &self.effect_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    id: TrackId,
    name: String,
    kind: TrackKind,
    // Insertion order, not time order.
    clips: Vec<Clip>,
}

impl Track {
    pub fn new(id: impl Into<TrackId>, name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            clips: Vec::new(),
        }
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }
}

impl From<&TrackSpec> for Track {
    fn from(spec: &TrackSpec) -> Self {
        Track::new(spec.id.clone(), spec.name.clone(), spec.kind)
    }
}

/// Ordered tracks of one editing session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    tracks: Vec<Track>,
}

impl Timeline {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn from_specs(specs: &[TrackSpec]) -> Self {
        Self::new(specs.iter().map(Track::from).collect())
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .find(|c| c.id == id)
    }

    /// Returns `(track index, clip index)` of a placed clip.
    pub fn clip_location(&self, id: ClipId) -> Option<(usize, usize)> {
        self.tracks.iter().enumerate().find_map(|(ti, track)| {
            track
                .clips
                .iter()
                .position(|c| c.id == id)
                .map(|ci| (ti, ci))
        })
    }

    /// End of the last clip on any track; 0 for an empty timeline.
    pub fn duration(&self) -> Seconds {
        self.tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .map(|c| c.end)
            .fold(0.0, f64::max)
    }

    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(|t| t.clips.len()).sum()
    }

    /// Resolves a placement target; `None` means the first track.
    pub fn resolve_target(&self, target: Option<&TrackId>) -> Result<usize, TimelineError> {
        match target {
            Some(id) => self
                .tracks
                .iter()
                .position(|t| &t.id == id)
                .ok_or_else(|| TimelineError::TrackNotFound(id.clone())),
            None if self.tracks.is_empty() => Err(TimelineError::NoTracks),
            None => Ok(0),
        }
    }

    pub(crate) fn push_clip(&mut self, track_index: usize, clip: Clip) -> &Clip {
        let clips = &mut self.tracks[track_index].clips;
        clips.push(clip);
        &clips[clips.len() - 1]
    }

    fn clip_mut(&mut self, id: ClipId) -> Result<&mut Clip, TimelineError> {
        self.tracks
            .iter_mut()
            .flat_map(|t| t.clips.iter_mut())
            .find(|c| c.id == id)
            .ok_or(TimelineError::ClipNotFound(id))
    }

    /// Shifts a clip to `new_start`, keeping its duration. Overlaps are allowed.
    pub fn move_clip(&mut self, id: ClipId, new_start: Seconds) -> Result<&Clip, TimelineError> {
        let clip = self.clip_mut(id)?;
        let new_end = new_start + clip.duration();
        if !new_start.is_finite() || new_start < 0.0 || !(new_end > new_start) {
            return Err(TimelineError::InvalidRange {
                start: new_start,
                end: new_end,
            });
        }
        clip.start = new_start;
        clip.end = new_end;
        Ok(&*clip)
    }

    pub fn resize_clip(&mut self, id: ClipId, new_end: Seconds) -> Result<&Clip, TimelineError> {
        let clip = self.clip_mut(id)?;
        if !new_end.is_finite() || new_end <= clip.start {
            return Err(TimelineError::InvalidRange {
                start: clip.start,
                end: new_end,
            });
        }
        clip.end = new_end;
        Ok(&*clip)
    }

    pub(crate) fn take_clip(&mut self, id: ClipId) -> Result<Clip, TimelineError> {
        let (ti, ci) = self
            .clip_location(id)
            .ok_or(TimelineError::ClipNotFound(id))?;
        Ok(self.tracks[ti].clips.remove(ci))
    }

    /// Moves a track to `index` (clamped to the end). Returns the previous
    /// and the new position.
    pub fn reorder_track(
        &mut self,
        id: &TrackId,
        index: usize,
    ) -> Result<(usize, usize), TimelineError> {
        let current = self
            .tracks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| TimelineError::TrackNotFound(id.clone()))?;
        let track = self.tracks.remove(current);
        let target = std::cmp::min(index, self.tracks.len());
        self.tracks.insert(target, track);
        Ok((current, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(name: &str, start: Seconds, end: Seconds) -> Clip {
        Clip::new(
            name,
            start,
            end,
            MediaKind::Video,
            ClipColor::from("#FF5733"),
            EffectId::generate(),
        )
    }

    fn create_test_timeline() -> (Timeline, ClipId, ClipId) {
        let mut timeline = Timeline::new(vec![
            Track::new("video1", "Video Track 1", TrackKind::Video),
            Track::new("video2", "Video Track 2", TrackKind::Video),
        ]);
        let a = timeline.push_clip(0, clip("a", 0.0, 4.0)).id();
        let b = timeline.push_clip(1, clip("b", 2.0, 10.0)).id();
        (timeline, a, b)
    }

    #[test]
    fn test_move_preserves_duration() {
        let (mut timeline, a, _) = create_test_timeline();
        let moved = timeline.move_clip(a, 6.5).unwrap();
        assert_eq!(moved.start(), 6.5);
        assert_eq!(moved.end(), 10.5);
        assert_eq!(moved.duration(), 4.0);
    }

    #[test]
    fn test_move_accepts_overlap() {
        let (mut timeline, a, _) = create_test_timeline();
        let c = timeline.push_clip(0, clip("c", 10.0, 13.0)).id();
        timeline.move_clip(c, 1.0).unwrap();
        assert_eq!(timeline.clip(a).unwrap().start(), 0.0);
        assert_eq!(timeline.clip(c).unwrap().start(), 1.0);
    }

    #[test]
    fn test_move_rejects_negative_and_non_finite() {
        let (mut timeline, a, _) = create_test_timeline();
        for start in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                timeline.move_clip(a, start),
                Err(TimelineError::InvalidRange { .. })
            ));
        }
        assert_eq!(timeline.clip(a).unwrap().start(), 0.0);
    }

    #[test]
    fn test_resize_requires_end_after_start() {
        let (mut timeline, _, b) = create_test_timeline();
        for end in [2.0, 1.0, f64::NAN] {
            let err = timeline.resize_clip(b, end).unwrap_err();
            assert!(matches!(err, TimelineError::InvalidRange { start, .. } if start == 2.0));
        }
        let unchanged = timeline.clip(b).unwrap();
        assert_eq!((unchanged.start(), unchanged.end()), (2.0, 10.0));

        let resized = timeline.resize_clip(b, 2.5).unwrap();
        assert_eq!(resized.end(), 2.5);
    }

    #[test]
    fn test_unknown_clip_not_found() {
        let (mut timeline, _, _) = create_test_timeline();
        let missing = ClipId::new();
        assert_eq!(
            timeline.move_clip(missing, 1.0).unwrap_err(),
            TimelineError::ClipNotFound(missing)
        );
        assert_eq!(
            timeline.take_clip(missing).unwrap_err(),
            TimelineError::ClipNotFound(missing)
        );
    }

    #[test]
    fn test_clips_keep_insertion_order() {
        let (mut timeline, a, _) = create_test_timeline();
        let later = timeline.push_clip(0, clip("early", 0.0, 1.0)).id();
        timeline.move_clip(a, 20.0).unwrap();
        let ids: Vec<_> = timeline.tracks()[0].clips().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![a, later]);
        assert_eq!(timeline.clip_location(later), Some((0, 1)));
    }

    #[test]
    fn test_reorder_track_clamps_index() {
        let (mut timeline, _, _) = create_test_timeline();
        let moved = timeline.reorder_track(&TrackId::from("video1"), 99).unwrap();
        assert_eq!(moved, (0, 1));
        assert_eq!(timeline.tracks()[0].id().as_str(), "video2");
        assert!(matches!(
            timeline.reorder_track(&TrackId::from("audio9"), 0),
            Err(TimelineError::TrackNotFound(_))
        ));
    }

    #[test]
    fn test_resolve_target() {
        let (timeline, _, _) = create_test_timeline();
        assert_eq!(timeline.resolve_target(None).unwrap(), 0);
        assert_eq!(
            timeline.resolve_target(Some(&TrackId::from("video2"))).unwrap(),
            1
        );
        assert_eq!(
            Timeline::default().resolve_target(None).unwrap_err(),
            TimelineError::NoTracks
        );
    }

    #[test]
    fn test_duration() {
        let (timeline, _, _) = create_test_timeline();
        assert_eq!(timeline.duration(), 10.0);
        assert_eq!(timeline.clip_count(), 2);
        assert_eq!(Timeline::default().duration(), 0.0);
    }
}
