use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("encoding has no components")]
    Empty,
    #[error("encoding component {index} is not finite")]
    NonFinite { index: usize },
}

/// Face encoding vector (128-dimensional for dlib-style models, 512 for ArcFace).
///
/// Always non-empty with finite components, so distances between two
/// encodings of equal length are finite and totally ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Encoding {
    values: Vec<f32>,
}

impl Encoding {
    pub fn new(values: Vec<f32>) -> Result<Self, EncodingError> {
        if values.is_empty() {
            return Err(EncodingError::Empty);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(EncodingError::NonFinite { index });
        }
        Ok(Self { values })
    }

    /// Number of components.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Compute Euclidean distance between two encodings.
    ///
    /// Only meaningful for encodings of the same dimension; the matcher
    /// checks this before calling.
    pub fn distance(&self, other: &Encoding) -> f32 {
        debug_assert_eq!(self.dimension(), other.dimension());
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

impl TryFrom<Vec<f32>> for Encoding {
    type Error = EncodingError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Encoding> for Vec<f32> {
    fn from(encoding: Encoding) -> Self {
        encoding.values
    }
}

/// Face location in pixel coordinates, top/right/bottom/left convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(top={}, right={}, bottom={}, left={})",
            self.top, self.right, self.bottom, self.left
        )
    }
}

/// A known identity: display name plus its single reference encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceIdentity {
    pub name: String,
    pub encoding: Encoding,
}

/// One face found by the encoder in a target image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedFace {
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
    pub encoding: Encoding,
}

/// Decision for a single detected face.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Position of the face in the detected-face list.
    pub face_index: usize,
    pub matched: bool,
    /// Nearest reference, whether or not it passed the threshold.
    pub best_reference_index: usize,
    /// Euclidean distance to the nearest reference.
    pub distance: f32,
    /// Name of the matched identity; `None` when not matched.
    pub label: Option<String>,
}

/// Aggregate over every decision for one target image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MatchSummary {
    pub total_matches: usize,
    pub any_match: bool,
}

impl MatchSummary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let total_matches = results.iter().filter(|r| r.matched).count();
        Self {
            total_matches,
            any_match: total_matches > 0,
        }
    }
}
