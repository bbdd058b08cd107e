use std::sync::Arc;

use crate::command::buffer::{BuiltinTarget, CommandBuffer, PassSelector};
use crate::command::event::CameraEvent;
use crate::foundation::core::Canvas;
use crate::foundation::error::{OutlineError, OutlineResult};
use crate::host::world::{Behaviour, World};
use crate::render::surface::SurfaceDesc;
use crate::scene::camera::{CameraId, DepthNormalsPolicy, DepthTextureMode};
use crate::shader::globals::PropertyId;
use crate::shader::program::ShaderProgram;

/// Scratch surface holding the detected edges between capture and composite.
pub const SCREEN_COPY_TEXTURE: &str = "_ScreenCopyTexture";
/// Name of the command buffer attached to the outlined camera.
pub const COMMAND_BUFFER_NAME: &str = "Blit to Temp RenderTexture";
/// Where the outline buffer runs: after opaque geometry and the skybox, before transparents.
pub const INSERTION_POINT: CameraEvent = CameraEvent::BeforeForwardAlpha;

/// Attaches the outline capture and composite command buffer to a camera on start.
///
/// The edge program runs its first sub-pass over the depth+normals target into a viewport-sized
/// scratch surface; the blend program then composites that surface over the camera target with
/// all of its passes, and the scratch surface is released.
#[derive(Clone, Debug, Default)]
pub struct OutlineCamera {
    camera: Option<CameraId>,
    outline_program: Option<Arc<dyn ShaderProgram>>,
    blend_program: Option<Arc<dyn ShaderProgram>>,
}

impl OutlineCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera to outline.
    pub fn with_camera(mut self, camera: CameraId) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Edge-detection program. Sub-pass 0 is used.
    pub fn with_outline_program(mut self, program: Arc<dyn ShaderProgram>) -> Self {
        self.outline_program = Some(program);
        self
    }

    /// Composite program. Every pass is used.
    pub fn with_blend_program(mut self, program: Arc<dyn ShaderProgram>) -> Self {
        self.blend_program = Some(program);
        self
    }

    /// Record capture, composite and release for a camera of size `canvas`.
    pub fn build_command_buffer(
        canvas: Canvas,
        outline_program: Arc<dyn ShaderProgram>,
        blend_program: Arc<dyn ShaderProgram>,
    ) -> CommandBuffer {
        let tex = PropertyId::of(SCREEN_COPY_TEXTURE);
        let mut buffer = CommandBuffer::new(COMMAND_BUFFER_NAME);
        buffer
            .get_temporary(tex, SurfaceDesc::viewport(canvas))
            .blit_with(
                BuiltinTarget::DepthNormals,
                tex,
                outline_program,
                PassSelector::Index(0),
            )
            .blit_with(
                tex,
                BuiltinTarget::CameraTarget,
                blend_program,
                PassSelector::All,
            )
            .release_temporary(tex);
        buffer
    }
}

impl Behaviour for OutlineCamera {
    fn name(&self) -> &str {
        "OutlineCamera"
    }

    fn start(&mut self, world: &mut World) -> OutlineResult<()> {
        let id = self
            .camera
            .ok_or_else(|| OutlineError::configuration("OutlineCamera has no camera assigned"))?;
        let outline = self.outline_program.clone().ok_or_else(|| {
            OutlineError::configuration("OutlineCamera has no outline program assigned")
        })?;
        let blend = self.blend_program.clone().ok_or_else(|| {
            OutlineError::configuration("OutlineCamera has no blend program assigned")
        })?;
        let camera = world.camera_mut(id).ok_or_else(|| {
            OutlineError::configuration(format!("OutlineCamera camera {id:?} does not exist"))
        })?;

        camera.depth_texture_mode = DepthTextureMode::DEPTH_NORMALS | DepthTextureMode::DEPTH;
        let buffer = Self::build_command_buffer(camera.canvas(), outline, blend);
        camera.add_command_buffer(INSERTION_POINT, buffer, DepthNormalsPolicy::Fail)?;
        tracing::info!(camera = %camera.name, "outline command buffer attached");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/outline/camera.rs"]
mod tests;
