use std::path::Path;
use std::sync::Arc;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{OutlineError, OutlineResult};
use crate::host::orbit::CameraOrbit;
use crate::host::runner::{FrameReport, Host};
use crate::host::world::World;
use crate::outline::camera::OutlineCamera;
use crate::outline::globals::GlobalsPublisher;
use crate::project::OutlineProject;
use crate::render::backend::FrameRGBA;
use crate::scene::camera::Camera;
use crate::shader::blend::OutlineBlendProgram;
use crate::shader::edge_detect::EdgeDetectProgram;

/// A host wired for one project: camera orbit, globals publisher and outline camera, in that
/// order, so each frame publishes the pose the camera renders with.
pub struct OutlineSession {
    host: Host,
}

impl OutlineSession {
    /// Validate `project` and build its world. PNG noise paths resolve against `assets_root`.
    pub fn new(project: &OutlineProject, assets_root: &Path) -> OutlineResult<Self> {
        project.validate()?;

        let noise = project.noise.load(assets_root)?;
        let mut world = World::new(project.scene.clone());
        let camera = Camera::new("main", project.canvas, project.camera.projection())?;
        let id = world.add_camera(camera);

        let edges = Arc::new(EdgeDetectProgram::new(project.outline.edges)?);
        let blend = Arc::new(OutlineBlendProgram::new(project.outline.opacity)?);

        let mut host = Host::new(world);
        host.add_behaviour(CameraOrbit::new(
            id,
            project.camera.position,
            project.camera.target,
            project.camera.up,
            project.camera.orbit_degrees_per_frame,
        ))
        .add_behaviour(GlobalsPublisher::new(noise))
        .add_behaviour(
            OutlineCamera::new()
                .with_camera(id)
                .with_outline_program(edges)
                .with_blend_program(blend),
        );

        tracing::debug!(
            width = project.canvas.width,
            height = project.canvas.height,
            primitives = project.scene.primitives.len(),
            "outline session ready"
        );
        Ok(Self { host })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    /// Run the next frame.
    pub fn render_next(&mut self) -> OutlineResult<FrameReport> {
        self.host.run_frame()
    }

    /// Run frames until `frame` has rendered and return its output.
    ///
    /// Frames already rendered cannot be revisited.
    #[tracing::instrument(skip(self))]
    pub fn render_frame(&mut self, frame: FrameIndex) -> OutlineResult<FrameRGBA> {
        if frame < self.host.next_frame() {
            return Err(OutlineError::validation(format!(
                "frame {} already rendered (next is {})",
                frame.0,
                self.host.next_frame().0
            )));
        }
        loop {
            let report = self.host.run_frame()?;
            if report.frame == frame {
                return report.output.ok_or_else(|| {
                    OutlineError::evaluation(format!("frame {} produced no output", frame.0))
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
