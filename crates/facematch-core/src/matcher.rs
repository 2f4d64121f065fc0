//! Matching engine — nearest reference identity with threshold acceptance.

use crate::registry::Registry;
use crate::types::{DetectedFace, Encoding, MatchResult, MatchSummary};
use serde::Serialize;
use thiserror::Error;

/// Maximum Euclidean distance at which two encodings count as the same person.
pub const DEFAULT_THRESHOLD: f32 = 0.6;

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum MatchError {
    #[error("no reference identities registered")]
    EmptyRegistry,
    #[error("face encoding has {actual} components but reference {reference_index} has {expected}")]
    DimensionMismatch {
        reference_index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f32),
}

/// A face left out of the results because it could not be compared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFace {
    pub face_index: usize,
    pub error: MatchError,
}

/// Everything `match_all` produces for one target image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    /// One entry per comparable face, in input order.
    pub results: Vec<MatchResult>,
    pub summary: MatchSummary,
    pub skipped: Vec<SkippedFace>,
}

/// Strategy for deciding which reference identity, if any, a face belongs to.
pub trait Matcher {
    fn match_face(
        &self,
        registry: &Registry,
        face_index: usize,
        encoding: &Encoding,
    ) -> Result<MatchResult, MatchError>;

    /// Match every detected face in order.
    ///
    /// An empty registry fails up front. A face whose encoding cannot be
    /// compared is skipped with a warning; the rest of the batch still runs.
    fn match_all(
        &self,
        registry: &Registry,
        faces: &[DetectedFace],
    ) -> Result<MatchOutcome, MatchError> {
        if registry.is_empty() {
            return Err(MatchError::EmptyRegistry);
        }

        let mut results = Vec::with_capacity(faces.len());
        let mut skipped = Vec::new();

        for (face_index, face) in faces.iter().enumerate() {
            match self.match_face(registry, face_index, &face.encoding) {
                Ok(result) => results.push(result),
                Err(error @ MatchError::DimensionMismatch { .. }) => {
                    tracing::warn!(face_index, error = %error, "skipping face");
                    skipped.push(SkippedFace { face_index, error });
                }
                Err(error) => return Err(error),
            }
        }

        let summary = MatchSummary::from_results(&results);
        tracing::info!(
            faces = faces.len(),
            matches = summary.total_matches,
            skipped = skipped.len(),
            "matching complete"
        );

        Ok(MatchOutcome {
            results,
            summary,
            skipped,
        })
    }
}

/// Euclidean nearest-neighbour matcher.
///
/// Distances are computed once per face; the nearest reference and its
/// acceptance flag both come from that single vector, so ranking and
/// acceptance can never disagree on the metric.
#[derive(Debug, Clone, Copy)]
pub struct EuclideanMatcher {
    threshold: f32,
}

impl Default for EuclideanMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl EuclideanMatcher {
    pub fn with_threshold(threshold: f32) -> Result<Self, MatchError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(MatchError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn accepts(&self, distance: f32) -> bool {
        distance <= self.threshold
    }

    /// Distance from `encoding` to every reference, in registry order.
    pub fn distances(&self, registry: &Registry, encoding: &Encoding) -> Result<Vec<f32>, MatchError> {
        if registry.is_empty() {
            return Err(MatchError::EmptyRegistry);
        }
        // Check every reference before computing anything.
        for (reference_index, reference) in registry.iter().enumerate() {
            if reference.encoding.dimension() != encoding.dimension() {
                return Err(MatchError::DimensionMismatch {
                    reference_index,
                    expected: reference.encoding.dimension(),
                    actual: encoding.dimension(),
                });
            }
        }
        Ok(registry
            .iter()
            .map(|reference| reference.encoding.distance(encoding))
            .collect())
    }

    /// Per-reference acceptance flags, derived from [`distances`](Self::distances).
    pub fn compare(&self, registry: &Registry, encoding: &Encoding) -> Result<Vec<bool>, MatchError> {
        Ok(self
            .distances(registry, encoding)?
            .into_iter()
            .map(|d| self.accepts(d))
            .collect())
    }
}

impl Matcher for EuclideanMatcher {
    fn match_face(
        &self,
        registry: &Registry,
        face_index: usize,
        encoding: &Encoding,
    ) -> Result<MatchResult, MatchError> {
        let distances = self.distances(registry, encoding)?;
        let (best, distance) = argmin(&distances).ok_or(MatchError::EmptyRegistry)?;

        // Acceptance is decided for the nearest reference only. Another
        // reference under the threshold but further away never wins.
        let matched = self.accepts(distance);
        let label = if matched {
            registry.get(best).map(|r| r.name.clone())
        } else {
            None
        };

        tracing::debug!(face_index, best, distance, matched, "face compared");

        Ok(MatchResult {
            face_index,
            matched,
            best_reference_index: best,
            distance,
            label,
        })
    }
}

/// Index and value of the smallest element; ties go to the lowest index.
fn argmin(values: &[f32]) -> Option<(usize, f32)> {
    let (&first, rest) = values.split_first()?;
    let mut best = (0, first);
    for (i, &v) in rest.iter().enumerate() {
        if v < best.1 {
            best = (i + 1, v);
        }
    }
    Some(best)
}
