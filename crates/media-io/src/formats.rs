use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::MediaKind;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FormatCategory {
    VideoContainer,
    AudioContainer,
    RasterImage,
    CameraRaw,
    Project,
}

pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "qt", "avi", "mkv", "webm", "mpg", "mpeg", "m2v", "mxf", "wmv", "flv",
    "3gp", "ts", "mts", "m2ts", "ogv",
];

pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "aac", "m4a", "flac", "ogg", "oga", "opus", "aif", "aiff", "wma", "alac",
];

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff", "webp", "heic", "heif", "exr", "dpx", "tga",
];

pub const RAW_EXTENSIONS: &[&str] = &[
    "dng", "cr2", "cr3", "nef", "arw", "raf", "orf", "rw2", "srw", "braw", "r3d", "ari",
];

/// Camera raw formats that carry motion rather than a single still.
const RAW_MOTION_EXTENSIONS: &[&str] = &["braw", "r3d", "ari"];

pub const PROJECT_EXTENSIONS: &[&str] = &[
    "xml", "fcpxml", "edl", "aaf", "omf", "otio", "prproj", "drp",
];

/// Looks up a lower-cased extension in the allow-list.
pub fn format_category(ext: &str) -> Option<FormatCategory> {
    let table: [(&[&str], FormatCategory); 5] = [
        (VIDEO_EXTENSIONS, FormatCategory::VideoContainer),
        (AUDIO_EXTENSIONS, FormatCategory::AudioContainer),
        (IMAGE_EXTENSIONS, FormatCategory::RasterImage),
        (RAW_EXTENSIONS, FormatCategory::CameraRaw),
        (PROJECT_EXTENSIONS, FormatCategory::Project),
    ];
    table
        .iter()
        .find(|(exts, _)| exts.contains(&ext))
        .map(|(_, category)| *category)
}

pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
}

pub fn is_supported(path: &Path) -> bool {
    extension_of(path)
        .and_then(|ext| format_category(&ext))
        .is_some()
}

/// Resolves the media kind for an allow-listed extension.
///
/// The MIME hint only disambiguates containers that can hold either audio or
/// video; it never overrides an unambiguous extension.
pub fn classify(ext: &str, mime: Option<&str>) -> Option<MediaKind> {
    let category = format_category(ext)?;
    let hint = mime.map(|m| m.trim().to_ascii_lowercase());
    let hinted_audio = hint.as_deref().map_or(false, |m| m.starts_with("audio/"));
    let hinted_video = hint.as_deref().map_or(false, |m| m.starts_with("video/"));

    let kind = match category {
        FormatCategory::VideoContainer => {
            if hinted_audio && matches!(ext, "webm" | "mp4") {
                MediaKind::Audio
            } else {
                MediaKind::Video
            }
        }
        FormatCategory::AudioContainer => {
            if hinted_video && ext == "ogg" {
                MediaKind::Video
            } else {
                MediaKind::Audio
            }
        }
        FormatCategory::RasterImage => MediaKind::Image,
        FormatCategory::CameraRaw => {
            if RAW_MOTION_EXTENSIONS.contains(&ext) {
                MediaKind::Video
            } else {
                MediaKind::Image
            }
        }
        FormatCategory::Project => MediaKind::Other,
    };
    Some(kind)
}

pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    VIDEO_EXTENSIONS
        .iter()
        .chain(AUDIO_EXTENSIONS)
        .chain(IMAGE_EXTENSIONS)
        .chain(RAW_EXTENSIONS)
        .chain(PROJECT_EXTENSIONS)
        .copied()
}
