use super::*;
use crate::command::buffer::BuiltinTarget;
use crate::foundation::core::Canvas;
use crate::foundation::error::OutlineError;

#[derive(Default)]
struct MockBackend {
    calls: Vec<&'static str>,
    fail_blit: bool,
}

impl CommandBackend for MockBackend {
    fn get_temporary(&mut self, _id: PropertyId, _desc: &SurfaceDesc) -> OutlineResult<()> {
        self.calls.push("get_temporary");
        Ok(())
    }

    fn blit(&mut self, _blit: &Blit) -> OutlineResult<()> {
        self.calls.push("blit");
        if self.fail_blit {
            return Err(OutlineError::evaluation("blit failed"));
        }
        Ok(())
    }

    fn release_temporary(&mut self, _id: PropertyId) -> OutlineResult<()> {
        self.calls.push("release_temporary");
        Ok(())
    }
}

fn capture_and_composite() -> CommandBuffer {
    let tmp = PropertyId::of("_Tmp");
    let desc = SurfaceDesc::viewport(Canvas {
        width: 4,
        height: 3,
    });
    let mut buffer = CommandBuffer::new("test");
    buffer
        .get_temporary(tmp, desc)
        .blit(BuiltinTarget::DepthNormals, tmp)
        .blit(tmp, BuiltinTarget::CameraTarget)
        .release_temporary(tmp);
    buffer
}

#[test]
fn execute_command_buffer_calls_in_recorded_order() {
    let mut backend = MockBackend::default();
    execute_command_buffer(&mut backend, &capture_and_composite()).unwrap();
    assert_eq!(
        backend.calls,
        vec!["get_temporary", "blit", "blit", "release_temporary"]
    );
}

#[test]
fn execute_command_buffer_stops_at_first_error() {
    let mut backend = MockBackend {
        fail_blit: true,
        ..MockBackend::default()
    };
    let err = execute_command_buffer(&mut backend, &capture_and_composite()).unwrap_err();
    assert!(err.to_string().contains("blit failed"));
    assert_eq!(backend.calls, vec!["get_temporary", "blit"]);
}

#[test]
fn empty_buffer_makes_no_calls() {
    let mut backend = MockBackend::default();
    execute_command_buffer(&mut backend, &CommandBuffer::new("empty")).unwrap();
    assert!(backend.calls.is_empty());
}
