use crate::foundation::core::FrameIndex;
use crate::foundation::error::{OutlineError, OutlineResult};
use crate::render::pool::TemporarySurfacePool;
use crate::scene::camera::{Camera, CameraId};
use crate::scene::model::Scene;
use crate::shader::globals::ShaderGlobals;

/// Everything a frame reads and behaviours mutate.
#[derive(Debug, Default)]
pub struct World {
    cameras: Vec<Camera>,
    main_camera: Option<CameraId>,
    /// Geometry drawn by the host stages.
    pub scene: Scene,
    /// Shared shader parameter table.
    pub globals: ShaderGlobals,
    /// Temporary surfaces shared by every command buffer.
    pub pool: TemporarySurfacePool,
}

impl World {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            ..Self::default()
        }
    }

    /// Register a camera. The first camera added becomes the main camera.
    pub fn add_camera(&mut self, camera: Camera) -> CameraId {
        let id = CameraId(self.cameras.len());
        self.cameras.push(camera);
        if self.main_camera.is_none() {
            self.main_camera = Some(id);
        }
        id
    }

    pub fn camera(&self, id: CameraId) -> Option<&Camera> {
        self.cameras.get(id.0)
    }

    pub fn camera_mut(&mut self, id: CameraId) -> Option<&mut Camera> {
        self.cameras.get_mut(id.0)
    }

    /// Id of the active camera, if any.
    pub fn main_camera(&self) -> Option<CameraId> {
        self.main_camera
    }

    /// Select the active camera. `None` leaves the world without one.
    pub fn set_main_camera(&mut self, id: Option<CameraId>) -> OutlineResult<()> {
        if let Some(id) = id
            && self.camera(id).is_none()
        {
            return Err(OutlineError::validation(format!("unknown camera {id:?}")));
        }
        self.main_camera = id;
        Ok(())
    }

    /// The active camera, if one is set.
    pub fn active_camera(&self) -> Option<&Camera> {
        self.main_camera.and_then(|id| self.camera(id))
    }

    pub(crate) fn split_for_render(
        &mut self,
        id: CameraId,
    ) -> Option<(&Camera, &Scene, &ShaderGlobals, &mut TemporarySurfacePool)> {
        let camera = self.cameras.get(id.0)?;
        Some((camera, &self.scene, &self.globals, &mut self.pool))
    }
}

/// Per-frame script attached to the host.
///
/// `start` runs once before the first `update`; `update` runs at the beginning of every frame,
/// before any camera renders.
pub trait Behaviour {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn start(&mut self, _world: &mut World) -> OutlineResult<()> {
        Ok(())
    }

    fn update(&mut self, _world: &mut World, _frame: FrameIndex) -> OutlineResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/world.rs"]
mod tests;
