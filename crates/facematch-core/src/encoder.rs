//! Encoder seam — turns an image into detected faces with encodings.
//!
//! Face detection and embedding run outside this crate. [`ManifestEncoder`]
//! reads their output from a JSON sidecar written next to each image.

use crate::types::DetectedFace;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sidecar suffix: `group.jpg` → `group.faces.json`.
pub const MANIFEST_SUFFIX: &str = "faces.json";

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("face manifest not found: {0} — run the embedding tool on the image first")]
    ManifestNotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed face manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Produces the faces found in an image, in the encoder's own order.
pub trait Encoder {
    fn encode(&mut self, image: &Path) -> Result<Vec<DetectedFace>, EncoderError>;
}

/// On-disk manifest layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaceManifest {
    pub faces: Vec<DetectedFace>,
}

/// Encoder backed by precomputed `<stem>.faces.json` manifests.
#[derive(Debug, Clone, Default)]
pub struct ManifestEncoder {
    /// Look for manifests here instead of next to the image.
    manifest_dir: Option<PathBuf>,
}

impl ManifestEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_dir: Some(dir.into()),
        }
    }

    /// Where the manifest for `image` is expected to live.
    pub fn manifest_path(&self, image: &Path) -> PathBuf {
        let stem = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = format!("{stem}.{MANIFEST_SUFFIX}");
        match &self.manifest_dir {
            Some(dir) => dir.join(file_name),
            None => image.with_file_name(file_name),
        }
    }
}

impl Encoder for ManifestEncoder {
    fn encode(&mut self, image: &Path) -> Result<Vec<DetectedFace>, EncoderError> {
        let path = self.manifest_path(image);
        if !path.exists() {
            return Err(EncoderError::ManifestNotFound(path));
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| EncoderError::Io {
            path: path.clone(),
            source,
        })?;
        let manifest: FaceManifest = serde_json::from_str(&raw).map_err(|source| EncoderError::Parse {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(
            image = %image.display(),
            manifest = %path.display(),
            faces = manifest.faces.len(),
            "loaded face manifest"
        );

        Ok(manifest.faces)
    }
}
