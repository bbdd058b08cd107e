use glam::Quat;

use crate::foundation::core::{FrameIndex, Vec3};
use crate::foundation::error::{OutlineError, OutlineResult};
use crate::host::world::{Behaviour, World};
use crate::scene::camera::CameraId;

/// Moves a camera on a circle around `target`, a fixed angle per frame.
///
/// The pose for frame `n` is the start pose rotated by `n * degrees_per_frame` about `up`, so a
/// given frame always sees the same pose regardless of what ran before it.
#[derive(Clone, Debug)]
pub struct CameraOrbit {
    camera: CameraId,
    eye: Vec3,
    target: Vec3,
    up: Vec3,
    degrees_per_frame: f32,
}

impl CameraOrbit {
    pub fn new(
        camera: CameraId,
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        degrees_per_frame: f32,
    ) -> Self {
        Self {
            camera,
            eye,
            target,
            up,
            degrees_per_frame,
        }
    }

    /// Eye position at `frame`.
    pub fn eye_at(&self, frame: FrameIndex) -> Vec3 {
        let angle = (self.degrees_per_frame * frame.0 as f32).to_radians();
        let rot = Quat::from_axis_angle(self.up.normalize_or_zero(), angle);
        self.target + rot * (self.eye - self.target)
    }

    fn place(&self, world: &mut World, frame: FrameIndex) -> OutlineResult<()> {
        let eye = self.eye_at(frame);
        let camera = world.camera_mut(self.camera).ok_or_else(|| {
            OutlineError::configuration(format!("orbit camera {:?} does not exist", self.camera))
        })?;
        camera.look_at(eye, self.target, self.up)
    }
}

impl Behaviour for CameraOrbit {
    fn name(&self) -> &str {
        "CameraOrbit"
    }

    fn start(&mut self, world: &mut World) -> OutlineResult<()> {
        self.place(world, FrameIndex(0))
    }

    fn update(&mut self, world: &mut World, frame: FrameIndex) -> OutlineResult<()> {
        self.place(world, frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/orbit.rs"]
mod tests;
