use super::*;
use crate::scene::model::Shape;
use crate::session::OutlineSession;

const MINIMAL: &str = r#"{ "canvas": { "width": 32, "height": 24 } }"#;

#[test]
fn minimal_project_uses_defaults() {
    let p = OutlineProject::from_json_str(MINIMAL).unwrap();
    p.validate().unwrap();
    assert_eq!(p.camera, CameraDef::default());
    assert_eq!(p.outline.opacity, 1.0);
    assert_eq!(p.noise, NoiseSource::Procedural { size: 64, seed: 1 });
    assert!(p.scene.primitives.is_empty());
}

#[test]
fn full_project_parses() {
    let json = r#"{
        "canvas": { "width": 64, "height": 48 },
        "camera": {
            "position": [0.0, 2.0, 6.0],
            "target": [0.0, 0.5, 0.0],
            "fov_y_deg": 45.0,
            "far": 40.0,
            "orbit_degrees_per_frame": 3.0
        },
        "outline": {
            "color": [0, 0, 0, 255],
            "thickness_px": 2.0,
            "noise_strength": 0.5,
            "opacity": 0.8
        },
        "noise": { "kind": "procedural", "size": 32, "seed": 9 },
        "scene": {
            "primitives": [
                { "shape": { "kind": "sphere", "center": [0.0, 1.0, 0.0], "radius": 1.0 }, "color": [220, 80, 60] },
                { "shape": { "kind": "plane", "point": [0.0, 0.0, 0.0], "normal": [0.0, 1.0, 0.0] }, "color": [200, 200, 200] }
            ]
        }
    }"#;
    let p = OutlineProject::from_json_str(json).unwrap();
    p.validate().unwrap();
    assert_eq!(p.camera.fov_y_deg, 45.0);
    assert_eq!(p.camera.near, CameraDef::default().near);
    assert_eq!(p.outline.edges.thickness_px, 2.0);
    assert_eq!(p.outline.edges.depth_sensitivity, 1.0);
    assert_eq!(p.outline.opacity, 0.8);
    assert_eq!(p.scene.primitives.len(), 2);
    assert!(matches!(p.scene.primitives[0].shape, Shape::Sphere { .. }));
    assert_eq!(p.scene.primitives[0].opacity, 1.0);

    let again = OutlineProject::from_json_str(&p.to_json_string().unwrap()).unwrap();
    assert_eq!(again, p);
}

#[test]
fn oversized_canvas_fails_validation() {
    let json = r#"{ "canvas": { "width": 200000, "height": 200000 } }"#;
    let p = OutlineProject::from_json_str(json).unwrap();
    let err = p.validate().unwrap_err();
    assert!(matches!(err, OutlineError::Validation(_)));
    assert!(OutlineSession::new(&p, Path::new(".")).is_err());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = OutlineProject::from_json_str("{ \"canvas\": ").unwrap_err();
    assert!(matches!(err, OutlineError::Serde(_)));
}

#[test]
fn validate_rejects_bad_values() {
    let base = OutlineProject::from_json_str(MINIMAL).unwrap();

    let mut p = base.clone();
    p.canvas.width = 0;
    assert!(p.validate().is_err());

    let mut p = base.clone();
    p.camera.target = p.camera.position;
    assert!(p.validate().is_err());

    let mut p = base.clone();
    p.outline.opacity = 2.0;
    assert!(p.validate().is_err());

    let mut p = base.clone();
    p.noise = NoiseSource::Procedural { size: 0, seed: 1 };
    assert!(p.validate().is_err());

    let mut p = base;
    p.camera.near = 0.0;
    assert!(p.validate().is_err());
}

#[test]
fn missing_file_is_reported() {
    let err = OutlineProject::from_path("/nonexistent/project.json").unwrap_err();
    assert!(err.to_string().contains("open project JSON"));
}

#[test]
fn procedural_noise_source_loads() {
    let tex = NoiseSource::Procedural { size: 8, seed: 2 }
        .load(Path::new("."))
        .unwrap();
    assert_eq!((tex.width(), tex.height()), (8, 8));
}
