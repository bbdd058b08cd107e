use super::*;
use crate::command::buffer::{Command, RenderTargetId};
use crate::scene::camera::{Camera, Projection};
use crate::shader::blend::OutlineBlendProgram;
use crate::shader::edge_detect::{EdgeDetectParams, EdgeDetectProgram};

fn canvas() -> Canvas {
    Canvas {
        width: 12,
        height: 8,
    }
}

fn programs() -> (Arc<dyn ShaderProgram>, Arc<dyn ShaderProgram>) {
    (
        Arc::new(EdgeDetectProgram::new(EdgeDetectParams::default()).unwrap()),
        Arc::new(OutlineBlendProgram::default()),
    )
}

fn world() -> (World, CameraId) {
    let mut world = World::default();
    let id = world.add_camera(Camera::new("main", canvas(), Projection::default()).unwrap());
    (world, id)
}

#[test]
fn buffer_captures_composites_and_releases_in_order() {
    let (edge, blend) = programs();
    let buffer = OutlineCamera::build_command_buffer(canvas(), edge, blend);
    assert_eq!(buffer.name(), "Blit to Temp RenderTexture");
    buffer.validate().unwrap();

    let tex = PropertyId::of(SCREEN_COPY_TEXTURE);
    let cmds = buffer.commands();
    assert_eq!(cmds.len(), 4);
    match &cmds[0] {
        Command::GetTemporary { id, desc } => {
            assert_eq!(*id, tex);
            assert_eq!(*desc, SurfaceDesc::viewport(canvas()));
        }
        other => panic!("unexpected {other:?}"),
    }
    match &cmds[1] {
        Command::Blit(b) => {
            assert_eq!(b.src, RenderTargetId::Builtin(BuiltinTarget::DepthNormals));
            assert_eq!(b.dst, RenderTargetId::Temporary(tex));
            assert_eq!(b.pass, PassSelector::Index(0));
            assert_eq!(b.program.as_ref().map(|p| p.name()), Some("NagaiOutlines"));
        }
        other => panic!("unexpected {other:?}"),
    }
    match &cmds[2] {
        Command::Blit(b) => {
            assert_eq!(b.src, RenderTargetId::Temporary(tex));
            assert_eq!(b.dst, RenderTargetId::Builtin(BuiltinTarget::CameraTarget));
            assert_eq!(b.pass, PassSelector::All);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(cmds[3], Command::ReleaseTemporary { id } if id == tex));
}

#[test]
fn start_enables_depth_modes_and_attaches_before_forward_alpha() {
    let (mut world, id) = world();
    let (edge, blend) = programs();
    let mut behaviour = OutlineCamera::new()
        .with_camera(id)
        .with_outline_program(edge)
        .with_blend_program(blend);
    behaviour.start(&mut world).unwrap();

    let cam = world.camera(id).unwrap();
    assert!(cam.depth_texture_mode.contains(DepthTextureMode::DEPTH));
    assert!(cam.depth_texture_mode.contains(DepthTextureMode::DEPTH_NORMALS));
    assert_eq!(cam.command_buffers(INSERTION_POINT).len(), 1);
    for event in CameraEvent::ALL {
        if event != INSERTION_POINT {
            assert!(cam.command_buffers(event).is_empty(), "{event:?}");
        }
    }
}

#[test]
fn missing_references_are_configuration_errors() {
    let (mut world, id) = world();
    let (edge, blend) = programs();

    let cases = [
        OutlineCamera::new()
            .with_outline_program(Arc::clone(&edge))
            .with_blend_program(Arc::clone(&blend)),
        OutlineCamera::new()
            .with_camera(id)
            .with_blend_program(Arc::clone(&blend)),
        OutlineCamera::new()
            .with_camera(id)
            .with_outline_program(Arc::clone(&edge)),
        OutlineCamera::new()
            .with_camera(CameraId(5))
            .with_outline_program(edge)
            .with_blend_program(blend),
    ];
    for mut behaviour in cases {
        let err = behaviour.start(&mut world).unwrap_err();
        assert!(matches!(err, OutlineError::Configuration(_)), "{err}");
    }
    assert!(world.camera(id).unwrap().depth_texture_mode.is_empty());
}
