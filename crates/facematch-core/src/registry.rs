//! Reference registry — the ordered set of known identities for one run.

use crate::types::{DetectedFace, Encoding, ReferenceIdentity};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("reference identity name must not be empty")]
    EmptyName,
    #[error("no face detected in reference image for {name:?}")]
    NoFaceDetected { name: String },
    #[error("reference {name:?} has a {actual}-dim encoding but the registry holds {expected}-dim encodings")]
    DimensionMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Ordered list of reference identities, indexable by position.
///
/// Duplicate names are allowed and occupy separate indices. Every
/// encoding has the dimension of the first one registered.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    identities: Vec<ReferenceIdentity>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an identity and return its index.
    pub fn add(&mut self, name: impl Into<String>, encoding: Encoding) -> Result<usize, RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if let Some(first) = self.identities.first() {
            let expected = first.encoding.dimension();
            if encoding.dimension() != expected {
                return Err(RegistryError::DimensionMismatch {
                    name,
                    expected,
                    actual: encoding.dimension(),
                });
            }
        }
        let index = self.identities.len();
        tracing::debug!(index, name = %name, dimension = encoding.dimension(), "reference registered");
        self.identities.push(ReferenceIdentity { name, encoding });
        Ok(index)
    }

    /// Register the faces an encoder reported for a reference image.
    ///
    /// Only the first face is used; a reference photo with several people
    /// registers whoever the encoder listed first.
    pub fn add_from_faces(
        &mut self,
        name: impl Into<String>,
        faces: Vec<DetectedFace>,
    ) -> Result<usize, RegistryError> {
        let name = name.into();
        let face_count = faces.len();
        let Some(first) = faces.into_iter().next() else {
            return Err(RegistryError::NoFaceDetected { name });
        };
        if face_count > 1 {
            tracing::debug!(
                name = %name,
                ignored = face_count - 1,
                "reference image has several faces; using the first"
            );
        }
        self.add(name, first.encoding)
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn get(&self, index: usize) -> Option<&ReferenceIdentity> {
        self.identities.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceIdentity> {
        self.identities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn enc(values: &[f32]) -> Encoding {
        Encoding::new(values.to_vec()).unwrap()
    }

    fn face(values: &[f32]) -> DetectedFace {
        DetectedFace {
            bounding_box: BoundingBox { top: 0, right: 10, bottom: 10, left: 0 },
            encoding: enc(values),
        }
    }

    #[test]
    fn test_add_returns_sequential_indices() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.add("alice", enc(&[1.0])).unwrap(), 0);
        assert_eq!(registry.add("bob", enc(&[2.0])).unwrap(), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1).unwrap().name, "bob");
        assert!(registry.get(2).is_none());
    }

    #[test]
    fn test_duplicate_names_allowed() {
        let mut registry = Registry::new();
        registry.add("alice", enc(&[1.0])).unwrap();
        registry.add("alice", enc(&[1.0])).unwrap();
        assert_eq!(registry.iter().filter(|r| r.name == "alice").count(), 2);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = Registry::new();
        assert_eq!(registry.add("", enc(&[1.0])), Err(RegistryError::EmptyName));
        assert_eq!(registry.add("   ", enc(&[1.0])), Err(RegistryError::EmptyName));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_from_faces_uses_first_face_only() {
        let mut registry = Registry::new();
        registry
            .add_from_faces("alice", vec![face(&[0.1, 0.2]), face(&[0.9, 0.9])])
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(0).unwrap().encoding.values(), &[0.1, 0.2]);
    }

    #[test]
    fn test_add_from_faces_without_faces_fails() {
        let mut registry = Registry::new();
        let err = registry.add_from_faces("alice", vec![]).unwrap_err();
        assert_eq!(err, RegistryError::NoFaceDetected { name: "alice".into() });
        assert!(registry.is_empty());
    }

    #[test]
    fn test_mixed_dimensions_rejected() {
        let mut registry = Registry::new();
        registry.add("alice", enc(&[0.0, 0.0])).unwrap();
        let err = registry.add("bob", enc(&[0.0, 0.0, 0.0])).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DimensionMismatch { name: "bob".into(), expected: 2, actual: 3 }
        );
        assert_eq!(registry.len(), 1);

        // The first face of a reference image goes through the same check.
        let err = registry.add_from_faces("carol", vec![face(&[1.0])]).unwrap_err();
        assert!(matches!(err, RegistryError::DimensionMismatch { actual: 1, .. }));
        assert_eq!(registry.add("dave", enc(&[0.5, 0.5])).unwrap(), 1);
    }
}
