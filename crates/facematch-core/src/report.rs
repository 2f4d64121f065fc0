//! Projection of match results into what the user sees.

use crate::matcher::MatchOutcome;
use crate::types::{BoundingBox, DetectedFace, MatchSummary};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// A box and the name to draw next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub face_index: usize,
    pub bounding_box: BoundingBox,
    pub label: String,
}

/// Draws annotations onto an image and writes the result.
pub trait Renderer {
    type Error: std::error::Error + Send + Sync + 'static;

    fn render(&self, image: &Path, annotations: &[Annotation], output: &Path) -> Result<(), Self::Error>;
}

/// Final outcome for one target image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: MatchSummary,
    /// Matched faces only, in detection order.
    pub matches: Vec<Annotation>,
    pub skipped_faces: Vec<usize>,
}

impl Report {
    /// `faces` must be the list the outcome was computed from.
    pub fn new(outcome: &MatchOutcome, faces: &[DetectedFace]) -> Self {
        let matches = outcome
            .results
            .iter()
            .filter_map(|r| {
                let label = r.label.clone()?;
                let face = faces.get(r.face_index)?;
                Some(Annotation {
                    face_index: r.face_index,
                    bounding_box: face.bounding_box,
                    label,
                })
            })
            .collect();

        Self {
            summary: outcome.summary,
            matches,
            skipped_faces: outcome.skipped.iter().map(|s| s.face_index).collect(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.summary.any_match {
            return write!(f, "no match found");
        }
        let noun = if self.summary.total_matches == 1 { "match" } else { "matches" };
        write!(f, "found {} {noun}", self.summary.total_matches)?;
        for m in &self.matches {
            write!(f, "\n  face {}: {} at {}", m.face_index, m.label, m.bounding_box)?;
        }
        Ok(())
    }
}
