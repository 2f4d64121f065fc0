//! facematch-core — Find known identities among the faces in a photo.
//!
//! Holds a registry of reference encodings, matches detected faces to
//! their nearest reference under a distance threshold, and projects the
//! decisions into a report for rendering.

pub mod encoder;
pub mod matcher;
pub mod registry;
pub mod report;
pub mod types;

pub use encoder::{Encoder, EncoderError, ManifestEncoder};
pub use matcher::{EuclideanMatcher, MatchError, MatchOutcome, Matcher, SkippedFace, DEFAULT_THRESHOLD};
pub use registry::{Registry, RegistryError};
pub use report::{Annotation, Renderer, Report};
pub use types::{BoundingBox, DetectedFace, Encoding, EncodingError, MatchResult, MatchSummary, ReferenceIdentity};
