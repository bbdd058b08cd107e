use super::*;
use crate::foundation::core::Canvas;
use crate::scene::camera::Projection;

fn camera(name: &str) -> Camera {
    Camera::new(
        name,
        Canvas {
            width: 4,
            height: 4,
        },
        Projection::default(),
    )
    .unwrap()
}

#[test]
fn first_camera_becomes_main() {
    let mut w = World::default();
    assert!(w.active_camera().is_none());

    let a = w.add_camera(camera("a"));
    let b = w.add_camera(camera("b"));
    assert_eq!(w.main_camera(), Some(a));
    assert_eq!(w.camera(b).map(|c| c.name.as_str()), Some("b"));
}

#[test]
fn main_camera_can_be_switched_or_cleared() {
    let mut w = World::default();
    w.add_camera(camera("a"));
    let b = w.add_camera(camera("b"));

    w.set_main_camera(Some(b)).unwrap();
    assert_eq!(w.active_camera().map(|c| c.name.as_str()), Some("b"));

    w.set_main_camera(None).unwrap();
    assert!(w.active_camera().is_none());

    assert!(w.set_main_camera(Some(CameraId(9))).is_err());
    assert!(w.main_camera().is_none());
}
