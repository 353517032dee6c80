use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{classify, extension_of, Asset, AssetId, MediaFile, ValidationError};

/// Characters escaped when turning a path into a locator.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Builds the opaque locator stored on an asset. Absolute paths become
/// `file://` URLs; relative paths stay relative references.
pub fn locator_for(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let encoded = utf8_percent_encode(&raw, PATH_ENCODE_SET).to_string();
    if raw.starts_with('/') {
        format!("file://{}", encoded)
    } else {
        encoded
    }
}

/// Checks a file against the allow-list and turns it into an [`Asset`].
pub fn validate(file: &MediaFile) -> Result<Asset, ValidationError> {
    let ext = extension_of(&file.path)
        .ok_or_else(|| ValidationError::MissingExtension(file.path.clone()))?;
    let kind = classify(&ext, file.mime.as_deref()).ok_or_else(|| {
        ValidationError::UnsupportedExtension {
            path: file.path.clone(),
            extension: ext.clone(),
        }
    })?;

    // Zero, negative and NaN hints carry no usable length.
    let duration = file.duration.filter(|d| d.is_finite() && *d > 0.0);

    Ok(Asset {
        id: AssetId::new(),
        name: file.name(),
        kind,
        locator: locator_for(&file.path),
        duration,
    })
}

/// Validated assets in import order.
#[derive(Debug, Default, Clone)]
pub struct MediaCatalog {
    assets: Vec<Asset>,
}

impl MediaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn import(&mut self, file: &MediaFile) -> Result<&Asset, ValidationError> {
        let asset = validate(file)?;
        debug!(id = %asset.id, kind = %asset.kind, "registered asset {}", asset.name);
        self.assets.push(asset);
        Ok(&self.assets[self.assets.len() - 1])
    }

    /// Imports each file independently; one rejection does not stop the rest.
    pub fn import_all<'a>(
        &mut self,
        files: impl IntoIterator<Item = &'a MediaFile>,
    ) -> (Vec<AssetId>, Vec<(PathBuf, ValidationError)>) {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for file in files {
            match self.import(file) {
                Ok(asset) => accepted.push(asset.id),
                Err(e) => {
                    warn!("rejected {}: {}", file.path.display(), e);
                    rejected.push((file.path.clone(), e));
                }
            }
        }
        (accepted, rejected)
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == id)
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
