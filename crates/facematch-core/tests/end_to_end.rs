use facematch_core::{
    BoundingBox, DetectedFace, Encoder, Encoding, EuclideanMatcher, ManifestEncoder, MatchError,
    Matcher, Registry, RegistryError, Report,
};

fn enc(values: &[f32]) -> Encoding {
    Encoding::new(values.to_vec()).unwrap()
}

fn bbox(left: u32) -> BoundingBox {
    BoundingBox { top: 20, right: left + 40, bottom: 60, left }
}

#[test]
fn alice_found_once_in_group() {
    let e1 = enc(&[0.0, 0.0, 0.0, 0.0]);
    let e_far = enc(&[2.0, 0.0, 0.0, 0.0]);

    let mut registry = Registry::new();
    registry.add("alice", e1.clone()).unwrap();

    let faces = vec![
        DetectedFace { bounding_box: bbox(0), encoding: e1 },
        DetectedFace { bounding_box: bbox(100), encoding: e_far },
    ];

    let outcome = EuclideanMatcher::default().match_all(&registry, &faces).unwrap();

    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.results[0].matched);
    assert_eq!(outcome.results[0].label.as_deref(), Some("alice"));
    assert_eq!(outcome.results[0].distance, 0.0);
    assert!(!outcome.results[1].matched);
    assert_eq!(outcome.results[1].label, None);
    assert!((outcome.results[1].distance - 2.0).abs() < 1e-6);
    assert_eq!(outcome.summary.total_matches, 1);
    assert!(outcome.summary.any_match);

    let report = Report::new(&outcome, &faces);
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].bounding_box, bbox(0));
}

#[test]
fn manifests_drive_full_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("teddy.faces.json"),
        r#"{"faces":[
            {"box":{"top":0,"right":10,"bottom":10,"left":0},"encoding":[0.2,0.4,0.1]},
            {"box":{"top":0,"right":30,"bottom":10,"left":20},"encoding":[0.9,0.9,0.9]}
        ]}"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("party.faces.json"),
        r#"{"faces":[
            {"box":{"top":5,"right":50,"bottom":45,"left":10},"encoding":[0.9,0.9,0.9]},
            {"box":{"top":5,"right":150,"bottom":45,"left":110},"encoding":[0.25,0.4,0.1]},
            {"box":{"top":5,"right":250,"bottom":45,"left":210},"encoding":[0.2,0.4,0.12]}
        ]}"#,
    )
    .unwrap();

    let mut encoder = ManifestEncoder::new();
    let mut registry = Registry::new();
    let reference_faces = encoder.encode(&dir.path().join("teddy.jpg")).unwrap();
    registry.add_from_faces("teddy", reference_faces).unwrap();
    assert_eq!(registry.len(), 1);

    let faces = encoder.encode(&dir.path().join("party.jpg")).unwrap();
    let outcome = EuclideanMatcher::default().match_all(&registry, &faces).unwrap();
    let report = Report::new(&outcome, &faces);

    // The second person in the reference photo is ignored, so face 0 is no match.
    assert!(!outcome.results[0].matched);
    assert_eq!(report.summary.total_matches, 2);
    assert!(report.to_string().starts_with("found 2 matches"));
}

#[test]
fn empty_registry_is_an_error() {
    let faces = vec![DetectedFace { bounding_box: bbox(0), encoding: enc(&[1.0]) }];
    let err = EuclideanMatcher::default()
        .match_all(&Registry::new(), &faces)
        .unwrap_err();
    assert_eq!(err, MatchError::EmptyRegistry);
}

#[test]
fn reference_without_face_is_an_error() {
    let mut registry = Registry::new();
    let err = registry.add_from_faces("ghost", Vec::new()).unwrap_err();
    assert!(matches!(err, RegistryError::NoFaceDetected { .. }));
}
