use thiserror::Error;

mod model;
pub use model::*;
mod effects;
pub use effects::*;
mod palette;
pub use palette::*;
mod config;
pub use config::*;
mod commands;
pub use commands::*;
mod session;
pub use session::*;

pub use media_io::{Asset, AssetId, MediaFile, MediaKind, Seconds, ValidationError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("clip not found: {0}")]
    ClipNotFound(ClipId),
    #[error("effect not found: {0}")]
    EffectNotFound(EffectId),
    #[error("track not found: {0}")]
    TrackNotFound(TrackId),
    #[error("asset not found: {0}")]
    AssetNotFound(AssetId),
    #[error("timeline has no tracks")]
    NoTracks,
    #[error("invalid range: start {start} must be before end {end}")]
    InvalidRange { start: Seconds, end: Seconds },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
