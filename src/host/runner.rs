use crate::command::buffer::{BuiltinTarget, CommandBuffer};
use crate::command::event::{FramePipeline, PipelineStep, RenderStage};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{OutlineError, OutlineResult};
use crate::host::world::{Behaviour, World};
use crate::render::backend::{FrameRGBA, execute_command_buffer};
use crate::render::cpu::{CameraTargets, CpuBackend, CpuBackendStats};
use crate::render::pool::{SurfacePoolStats, TemporarySurfacePool};
use crate::scene::camera::{Camera, CameraId, DepthTextureMode};
use crate::scene::model::Scene;
use crate::scene::raster;
use crate::shader::globals::ShaderGlobals;
use crate::shader::program::ShaderEnv;

/// What one call to [`Host::run_frame`] did.
#[derive(Clone, Debug)]
pub struct FrameReport {
    /// Index of the frame that ran.
    pub frame: FrameIndex,
    /// Main camera output. `None` when the world has no active camera.
    pub output: Option<FrameRGBA>,
    /// Parameter-table writes performed during this frame.
    pub globals_writes: u64,
    /// Command execution counters summed over every buffer of the frame.
    pub commands: CpuBackendStats,
    /// Temporary pool counters after the frame.
    pub pool: SurfacePoolStats,
}

/// Single-threaded frame loop: behaviours first, then the main camera.
pub struct Host {
    world: World,
    behaviours: Vec<Box<dyn Behaviour>>,
    pipeline: FramePipeline,
    next_frame: FrameIndex,
    /// Behaviours `[..started]` have completed `start`.
    started: usize,
}

impl Host {
    pub fn new(world: World) -> Self {
        Self {
            world,
            behaviours: Vec::new(),
            pipeline: FramePipeline::standard(),
            next_frame: FrameIndex(0),
            started: 0,
        }
    }

    /// Append a behaviour. Behaviours run in the order they were added.
    pub fn add_behaviour(&mut self, behaviour: impl Behaviour + 'static) -> &mut Self {
        self.behaviours.push(Box::new(behaviour));
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Index the next call to [`Host::run_frame`] will use.
    pub fn next_frame(&self) -> FrameIndex {
        self.next_frame
    }

    /// Run one frame: `start` for behaviours that have not started yet, `update`, then render the
    /// main camera.
    ///
    /// A behaviour whose `start` fails is retried on the next frame; the ones before it are not
    /// started again.
    #[tracing::instrument(skip(self), fields(frame = self.next_frame.0))]
    pub fn run_frame(&mut self) -> OutlineResult<FrameReport> {
        let frame = self.next_frame;
        let writes_before = self.world.globals.total_writes();

        while let Some(b) = self.behaviours.get_mut(self.started) {
            tracing::debug!(behaviour = b.name(), "start");
            b.start(&mut self.world)?;
            self.started += 1;
        }
        for b in &mut self.behaviours {
            b.update(&mut self.world, frame)?;
        }

        let (output, commands) = match self.world.main_camera() {
            Some(id) => {
                let (out, stats) = render_camera(&mut self.world, id, &self.pipeline)?;
                (Some(out), stats)
            }
            None => {
                tracing::debug!("no active camera; nothing rendered");
                (None, CpuBackendStats::default())
            }
        };

        self.next_frame = frame.next();
        Ok(FrameReport {
            frame,
            output,
            globals_writes: self.world.globals.total_writes() - writes_before,
            commands,
            pool: self.world.pool.stats(),
        })
    }
}

/// Render camera `id` through `pipeline` and read back its color target.
pub fn render_camera(
    world: &mut World,
    id: CameraId,
    pipeline: &FramePipeline,
) -> OutlineResult<(FrameRGBA, CpuBackendStats)> {
    let (camera, scene, globals, pool) = world
        .split_for_render(id)
        .ok_or_else(|| OutlineError::evaluation(format!("unknown camera {id:?}")))?;

    let mut targets = CameraTargets::allocate(camera.canvas(), camera.depth_texture_mode)?;
    if let Some(color) = targets.get_mut(BuiltinTarget::CameraTarget) {
        color.fill(camera.clear_color);
    }

    let mut totals = CpuBackendStats::default();
    for step in pipeline.steps() {
        match *step {
            PipelineStep::Stage(stage) => run_stage(stage, camera, scene, &mut targets),
            PipelineStep::Insertion(event) => {
                for buffer in camera.command_buffers(event) {
                    tracing::trace!(buffer = buffer.name(), ?event, "execute command buffer");
                    let stats = run_buffer(buffer, camera, globals, pool, &mut targets)?;
                    totals.blits += stats.blits;
                    totals.passes += stats.passes;
                    totals.leaked += stats.leaked;
                }
            }
        }
    }

    Ok((targets.into_frame()?, totals))
}

fn run_buffer(
    buffer: &CommandBuffer,
    camera: &Camera,
    globals: &ShaderGlobals,
    pool: &mut TemporarySurfacePool,
    targets: &mut CameraTargets,
) -> OutlineResult<CpuBackendStats> {
    let env = ShaderEnv {
        globals,
        projection: camera.projection,
    };
    let mut backend = CpuBackend::new(targets, pool, env);
    let result = execute_command_buffer(&mut backend, buffer);
    let stats = backend.finish();
    result.map(|()| stats)
}

fn run_stage(stage: RenderStage, camera: &Camera, scene: &Scene, targets: &mut CameraTargets) {
    let mode = camera.depth_texture_mode;
    match stage {
        RenderStage::DepthTexture if mode.contains(DepthTextureMode::DEPTH) => {
            if let Some(t) = targets.get_mut(BuiltinTarget::Depth) {
                raster::render_depth(camera, scene, t);
            }
        }
        RenderStage::DepthNormalsTexture if mode.contains(DepthTextureMode::DEPTH_NORMALS) => {
            if let Some(t) = targets.get_mut(BuiltinTarget::DepthNormals) {
                raster::render_depth_normals(camera, scene, t);
            }
        }
        RenderStage::ForwardOpaque => {
            if let Some(t) = targets.get_mut(BuiltinTarget::CameraTarget) {
                raster::render_opaque(camera, scene, t);
            }
        }
        RenderStage::Skybox => {
            if let Some(t) = targets.get_mut(BuiltinTarget::CameraTarget) {
                raster::render_skybox(camera, scene, t);
            }
        }
        RenderStage::ForwardAlpha => {
            if let Some(t) = targets.get_mut(BuiltinTarget::CameraTarget) {
                raster::render_transparent(camera, scene, t);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/runner.rs"]
mod tests;
