use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use super::*;
use crate::command::event::CameraEvent;
use crate::assets::texture::Texture2D;
use crate::foundation::core::{Canvas, Vec3};
use crate::outline::camera::OutlineCamera;
use crate::outline::globals::GlobalsPublisher;
use crate::render::surface::SurfaceDesc;
use crate::scene::camera::{DepthNormalsPolicy, Projection};
use crate::shader::globals::{NOISE_TEXTURE, PropertyId};

struct Recorder {
    log: Rc<RefCell<Vec<String>>>,
    fail_start: bool,
}

impl Behaviour for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn start(&mut self, world: &mut World) -> OutlineResult<()> {
        if self.fail_start {
            return Err(OutlineError::configuration("recorder refused to start"));
        }
        world.globals.set_global_float("_Started", 1.0);
        self.log.borrow_mut().push("start".to_owned());
        Ok(())
    }

    fn update(&mut self, _world: &mut World, frame: FrameIndex) -> OutlineResult<()> {
        self.log.borrow_mut().push(format!("update {}", frame.0));
        Ok(())
    }
}

fn canvas() -> Canvas {
    Canvas {
        width: 8,
        height: 6,
    }
}

fn world_with_camera() -> World {
    let mut world = World::default();
    let mut cam = Camera::new("main", canvas(), Projection::default()).unwrap();
    cam.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
        .unwrap();
    world.add_camera(cam);
    world
}

#[test]
fn start_runs_once_then_update_every_frame() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut host = Host::new(world_with_camera());
    host.add_behaviour(Recorder {
        log: Rc::clone(&log),
        fail_start: false,
    });

    let first = host.run_frame().unwrap();
    let second = host.run_frame().unwrap();
    host.run_frame().unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["start", "update 0", "update 1", "update 2"]
    );
    assert_eq!(first.frame, FrameIndex(0));
    assert_eq!(first.globals_writes, 1);
    assert_eq!(second.globals_writes, 0);
    assert_eq!(host.next_frame(), FrameIndex(3));
}

#[test]
fn start_errors_propagate() {
    let mut host = Host::new(world_with_camera());
    host.add_behaviour(Recorder {
        log: Rc::new(RefCell::new(Vec::new())),
        fail_start: true,
    });
    let err = host.run_frame().unwrap_err();
    assert!(matches!(err, OutlineError::Configuration(_)));
}

#[test]
fn failed_start_does_not_restart_earlier_behaviours() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let noise = Arc::new(Texture2D::procedural_noise(8, 1).unwrap());
    let mut host = Host::new(world_with_camera());
    host.add_behaviour(GlobalsPublisher::new(noise))
        .add_behaviour(Recorder {
            log: Rc::clone(&log),
            fail_start: false,
        })
        .add_behaviour(OutlineCamera::new());

    for _ in 0..2 {
        let err = host.run_frame().unwrap_err();
        assert!(matches!(err, OutlineError::Configuration(_)));
    }
    assert_eq!(host.world().globals.writes(NOISE_TEXTURE), 1);
    assert_eq!(*log.borrow(), vec!["start"]);
    assert_eq!(host.next_frame(), FrameIndex(0));
}

#[test]
fn behaviours_added_after_the_first_frame_still_start() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut host = Host::new(world_with_camera());
    host.run_frame().unwrap();
    host.add_behaviour(Recorder {
        log: Rc::clone(&log),
        fail_start: false,
    });
    host.run_frame().unwrap();
    assert_eq!(*log.borrow(), vec!["start", "update 1"]);
}

#[test]
fn no_active_camera_renders_nothing() {
    let mut host = Host::new(World::default());
    let report = host.run_frame().unwrap();
    assert!(report.output.is_none());
    assert_eq!(report.commands, CpuBackendStats::default());
}

#[test]
fn empty_scene_renders_opaque_sky() {
    let mut host = Host::new(world_with_camera());
    let frame = host.run_frame().unwrap().output.unwrap();
    assert_eq!((frame.width, frame.height), (8, 6));
    assert!(frame.data.chunks_exact(4).all(|p| p[3] == 255));
}

#[test]
fn attached_buffers_run_at_their_insertion_point_and_balance_the_pool() {
    let mut world = world_with_camera();
    let id = world.main_camera().unwrap();
    let tmp = PropertyId::of("_Tmp");
    let mut buffer = CommandBuffer::new("copy");
    buffer
        .get_temporary(tmp, SurfaceDesc::viewport(canvas()))
        .blit(BuiltinTarget::DepthNormals, tmp)
        .release_temporary(tmp);
    world
        .camera_mut(id)
        .unwrap()
        .add_command_buffer(
            CameraEvent::BeforeForwardAlpha,
            buffer,
            DepthNormalsPolicy::AutoEnable,
        )
        .unwrap();

    let mut host = Host::new(world);
    for _ in 0..3 {
        let report = host.run_frame().unwrap();
        assert_eq!(report.commands.blits, 1);
        assert_eq!(report.commands.leaked, 0);
        assert_eq!(report.pool.outstanding(), 0);
    }
    let pool = host.world().pool.stats();
    assert_eq!(pool.acquired, 3);
    assert_eq!(pool.alloc_surfaces, 1);
}
