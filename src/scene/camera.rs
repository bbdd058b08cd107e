use std::collections::BTreeMap;

use crate::command::buffer::{BuiltinTarget, CommandBuffer};
use crate::command::event::CameraEvent;
use crate::foundation::core::{Canvas, Mat4, Rgba8Premul, Vec2, Vec3};
use crate::foundation::error::{OutlineError, OutlineResult};

bitflags::bitflags! {
    /// Auxiliary textures a camera generates each frame.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DepthTextureMode: u8 {
        /// Packed linear depth.
        const DEPTH = 1 << 0;
        /// Packed view-space normals and linear depth.
        const DEPTH_NORMALS = 1 << 1;
    }
}

/// What to do when a command buffer reads a depth target the camera does not generate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DepthNormalsPolicy {
    /// Turn the missing mode on and log a warning.
    #[default]
    AutoEnable,
    /// Reject the buffer with [`OutlineError::Precondition`].
    Fail,
}

/// Perspective projection parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance. Linear depth is view depth divided by this.
    pub far: f32,
    /// Width over height of the target.
    pub aspect: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_deg: 60.0,
            near: 0.1,
            far: 100.0,
            aspect: 1.0,
        }
    }
}

impl Projection {
    /// Check ranges.
    pub fn validate(&self) -> OutlineResult<()> {
        if !(self.fov_y_deg > 0.0 && self.fov_y_deg < 180.0) {
            return Err(OutlineError::validation("fov_y_deg must be in (0, 180)"));
        }
        if !(self.near > 0.0 && self.far > self.near && self.far.is_finite()) {
            return Err(OutlineError::validation(
                "projection requires 0 < near < far < inf",
            ));
        }
        if !(self.aspect > 0.0 && self.aspect.is_finite()) {
            return Err(OutlineError::validation("aspect must be > 0"));
        }
        Ok(())
    }

    /// Normalized device coordinates of the center of pixel `(x, y)`; `+y` is up.
    pub fn pixel_ndc(canvas: Canvas, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) / canvas.width as f32 * 2.0 - 1.0,
            1.0 - (y as f32 + 0.5) / canvas.height as f32 * 2.0,
        )
    }

    /// View-space direction through `ndc`, scaled so that `z == -1`.
    pub fn view_ray(&self, ndc: Vec2) -> Vec3 {
        let tan = (self.fov_y_deg.to_radians() * 0.5).tan();
        Vec3::new(ndc.x * tan * self.aspect, ndc.y * tan, -1.0)
    }
}

/// Index of a camera in the host world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub usize);

/// A viewpoint rendering the scene. View space looks down `-Z`.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Debug name.
    pub name: String,
    camera_to_world: Mat4,
    /// Projection parameters. `aspect` is kept in sync with `canvas`.
    pub projection: Projection,
    canvas: Canvas,
    /// Generated auxiliary textures.
    pub depth_texture_mode: DepthTextureMode,
    /// Color the target is cleared to before the frame.
    pub clear_color: Rgba8Premul,
    command_buffers: BTreeMap<CameraEvent, Vec<CommandBuffer>>,
}

impl Camera {
    /// Create a camera at the origin looking down `-Z`.
    pub fn new(
        name: impl Into<String>,
        canvas: Canvas,
        projection: Projection,
    ) -> OutlineResult<Self> {
        canvas.validate()?;
        let projection = Projection {
            aspect: canvas.aspect(),
            ..projection
        };
        projection.validate()?;
        Ok(Self {
            name: name.into(),
            camera_to_world: Mat4::IDENTITY,
            projection,
            canvas,
            depth_texture_mode: DepthTextureMode::empty(),
            clear_color: Rgba8Premul::from_straight_rgba(0, 0, 0, 255),
            command_buffers: BTreeMap::new(),
        })
    }

    /// Output size in pixels.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Camera-to-world transform.
    pub fn camera_to_world(&self) -> Mat4 {
        self.camera_to_world
    }

    /// World-to-camera transform.
    pub fn world_to_camera(&self) -> Mat4 {
        self.camera_to_world.inverse()
    }

    /// World-space position.
    pub fn position(&self) -> Vec3 {
        self.camera_to_world.transform_point3(Vec3::ZERO)
    }

    /// Replace the pose. The matrix must be invertible.
    pub fn set_camera_to_world(&mut self, m: Mat4) -> OutlineResult<()> {
        let det = m.determinant();
        if !det.is_finite() || det.abs() < 1e-8 {
            return Err(OutlineError::validation(
                "camera_to_world must be an invertible matrix",
            ));
        }
        self.camera_to_world = m;
        Ok(())
    }

    /// Place the camera at `eye` looking at `target`.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) -> OutlineResult<()> {
        let forward = target - eye;
        if forward.length_squared() < 1e-12 || forward.cross(up).length_squared() < 1e-12 {
            return Err(OutlineError::validation(
                "look_at requires distinct eye/target and an up vector not parallel to the view",
            ));
        }
        self.set_camera_to_world(Mat4::look_at_rh(eye, target, up).inverse())
    }

    /// Attach `buffer` at `event` after validating it.
    ///
    /// Reading a depth target the camera does not generate is handled per `policy`. Reading a
    /// depth target before the frame has produced it is always rejected.
    pub fn add_command_buffer(
        &mut self,
        event: CameraEvent,
        buffer: CommandBuffer,
        policy: DepthNormalsPolicy,
    ) -> OutlineResult<()> {
        buffer.validate()?;

        for (target, mode) in [
            (BuiltinTarget::Depth, DepthTextureMode::DEPTH),
            (BuiltinTarget::DepthNormals, DepthTextureMode::DEPTH_NORMALS),
        ] {
            if !buffer.reads(target) {
                continue;
            }
            let first = CameraEvent::first_readable(target);
            if event < first {
                return Err(OutlineError::validation(format!(
                    "command buffer '{}' reads {target:?} at {event:?}, but it is produced at {first:?}",
                    buffer.name()
                )));
            }
            if !self.depth_texture_mode.contains(mode) {
                match policy {
                    DepthNormalsPolicy::AutoEnable => {
                        tracing::warn!(
                            camera = %self.name,
                            buffer = buffer.name(),
                            ?mode,
                            "enabling depth texture mode required by command buffer"
                        );
                        self.depth_texture_mode |= mode;
                    }
                    DepthNormalsPolicy::Fail => {
                        return Err(OutlineError::precondition(format!(
                            "camera '{}' does not generate {target:?} read by command buffer '{}'",
                            self.name,
                            buffer.name()
                        )));
                    }
                }
            }
        }

        tracing::debug!(
            camera = %self.name,
            buffer = buffer.name(),
            ?event,
            "attached command buffer"
        );
        self.command_buffers.entry(event).or_default().push(buffer);
        Ok(())
    }

    /// Buffers attached at `event`, in attach order.
    pub fn command_buffers(&self, event: CameraEvent) -> &[CommandBuffer] {
        self.command_buffers
            .get(&event)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Detach every buffer at `event`.
    pub fn remove_command_buffers(&mut self, event: CameraEvent) {
        self.command_buffers.remove(&event);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/camera.rs"]
mod tests;
