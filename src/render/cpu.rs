use std::collections::HashMap;

use crate::command::buffer::{Blit, BuiltinTarget, PassSelector, RenderTargetId};
use crate::foundation::core::Canvas;
use crate::foundation::error::{OutlineError, OutlineResult};
use crate::render::backend::{CommandBackend, FrameRGBA};
use crate::render::pool::TemporarySurfacePool;
use crate::render::surface::{FilterMode, Surface, SurfaceDesc};
use crate::scene::camera::DepthTextureMode;
use crate::shader::globals::PropertyId;
use crate::shader::program::ShaderEnv;

/// Camera-owned render targets for one frame.
///
/// The color target always exists. Depth and depth+normals targets exist only when the camera's
/// depth texture mode requests them; the depth+normals target is point-sampled.
#[derive(Clone, Debug)]
pub struct CameraTargets {
    canvas: Canvas,
    surfaces: HashMap<BuiltinTarget, Surface>,
}

impl CameraTargets {
    /// Allocate transparent targets for `canvas` according to `mode`.
    pub fn allocate(canvas: Canvas, mode: DepthTextureMode) -> OutlineResult<Self> {
        canvas.validate()?;
        let mut surfaces = HashMap::new();
        surfaces.insert(BuiltinTarget::CameraTarget, Surface::for_canvas(canvas)?);
        if mode.contains(DepthTextureMode::DEPTH) {
            let mut depth = Surface::for_canvas(canvas)?;
            depth.set_filter(FilterMode::Point);
            surfaces.insert(BuiltinTarget::Depth, depth);
        }
        if mode.contains(DepthTextureMode::DEPTH_NORMALS) {
            let mut dn = Surface::for_canvas(canvas)?;
            dn.set_filter(FilterMode::Point);
            surfaces.insert(BuiltinTarget::DepthNormals, dn);
        }
        Ok(Self { canvas, surfaces })
    }

    /// Viewport size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Target `t`, if allocated.
    pub fn get(&self, t: BuiltinTarget) -> Option<&Surface> {
        self.surfaces.get(&t)
    }

    /// Mutable target `t`, if allocated.
    pub fn get_mut(&mut self, t: BuiltinTarget) -> Option<&mut Surface> {
        self.surfaces.get_mut(&t)
    }

    fn take(&mut self, t: BuiltinTarget) -> OutlineResult<Surface> {
        self.surfaces.remove(&t).ok_or_else(|| missing_builtin(t))
    }

    fn put(&mut self, t: BuiltinTarget, surface: Surface) {
        self.surfaces.insert(t, surface);
    }

    /// Read back the color target.
    pub fn into_frame(mut self) -> OutlineResult<FrameRGBA> {
        let color = self.take(BuiltinTarget::CameraTarget)?;
        Ok(FrameRGBA {
            width: color.width(),
            height: color.height(),
            data: color.into_data(),
            premultiplied: true,
        })
    }
}

fn missing_builtin(t: BuiltinTarget) -> OutlineError {
    OutlineError::evaluation(format!(
        "camera target {t:?} is not allocated (depth texture mode not enabled?)"
    ))
}

/// Counters for one backend run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuBackendStats {
    /// Blits executed.
    pub blits: u64,
    /// Program sub-passes executed.
    pub passes: u64,
    /// Temporaries still held when the backend finished.
    pub leaked: u64,
}

/// CPU command executor over a camera's targets and the shared temporary pool.
pub struct CpuBackend<'a> {
    targets: &'a mut CameraTargets,
    pool: &'a mut TemporarySurfacePool,
    env: ShaderEnv<'a>,
    temp_descs: HashMap<PropertyId, SurfaceDesc>,
    temp_surfaces: HashMap<PropertyId, Surface>,
    stats: CpuBackendStats,
}

impl<'a> CpuBackend<'a> {
    pub fn new(
        targets: &'a mut CameraTargets,
        pool: &'a mut TemporarySurfacePool,
        env: ShaderEnv<'a>,
    ) -> Self {
        Self {
            targets,
            pool,
            env,
            temp_descs: HashMap::new(),
            temp_surfaces: HashMap::new(),
            stats: CpuBackendStats::default(),
        }
    }

    pub fn stats(&self) -> CpuBackendStats {
        self.stats
    }

    /// Release every temporary still held and return the final counters.
    pub fn finish(mut self) -> CpuBackendStats {
        let mut leftover: Vec<_> = self.temp_descs.drain().collect();
        leftover.sort_by_key(|(id, _)| *id);
        for (id, desc) in leftover {
            tracing::warn!(temporary = ?id, "temporary surface not released; reclaiming");
            if let Some(surface) = self.temp_surfaces.remove(&id) {
                self.pool.release(&desc, surface);
            }
            self.stats.leaked += 1;
        }
        self.stats
    }

    fn take(&mut self, id: RenderTargetId) -> OutlineResult<Surface> {
        match id {
            RenderTargetId::Builtin(t) => self.targets.take(t),
            RenderTargetId::Temporary(p) => self
                .temp_surfaces
                .remove(&p)
                .ok_or_else(|| missing_temporary(p)),
        }
    }

    fn put(&mut self, id: RenderTargetId, surface: Surface) {
        match id {
            RenderTargetId::Builtin(t) => self.targets.put(t, surface),
            RenderTargetId::Temporary(p) => {
                self.temp_surfaces.insert(p, surface);
            }
        }
    }

    fn get(&self, id: RenderTargetId) -> OutlineResult<&Surface> {
        match id {
            RenderTargetId::Builtin(t) => self.targets.get(t).ok_or_else(|| missing_builtin(t)),
            RenderTargetId::Temporary(p) => self
                .temp_surfaces
                .get(&p)
                .ok_or_else(|| missing_temporary(p)),
        }
    }
}

fn missing_temporary(id: PropertyId) -> OutlineError {
    OutlineError::evaluation(format!("temporary {id:?} is not acquired"))
}

/// Run the blit's program (or a plain copy) and return the number of passes executed.
fn run_blit(
    blit: &Blit,
    src: &Surface,
    dst: &mut Surface,
    env: &ShaderEnv<'_>,
) -> OutlineResult<u64> {
    let Some(program) = &blit.program else {
        dst.resample_from(src);
        return Ok(0);
    };
    let passes = match blit.pass {
        PassSelector::All => 0..program.pass_count(),
        PassSelector::Index(p) if p < program.pass_count() => p..p + 1,
        PassSelector::Index(p) => {
            return Err(OutlineError::evaluation(format!(
                "program '{}' has no pass {p}",
                program.name()
            )));
        }
    };
    let mut ran = 0;
    for pass in passes {
        program.run_pass(pass, src, dst, env)?;
        ran += 1;
    }
    Ok(ran)
}

impl CommandBackend for CpuBackend<'_> {
    fn get_temporary(&mut self, id: PropertyId, desc: &SurfaceDesc) -> OutlineResult<()> {
        if self.temp_descs.contains_key(&id) {
            return Err(OutlineError::evaluation(format!(
                "temporary {id:?} acquired twice"
            )));
        }
        let surface = self.pool.acquire(desc)?;
        self.temp_descs.insert(id, *desc);
        self.temp_surfaces.insert(id, surface);
        Ok(())
    }

    fn blit(&mut self, blit: &Blit) -> OutlineResult<()> {
        let mut dst = self.take(blit.dst)?;
        let result = if blit.src == blit.dst {
            let src = dst.clone();
            run_blit(blit, &src, &mut dst, &self.env)
        } else {
            self.get(blit.src)
                .and_then(|src| run_blit(blit, src, &mut dst, &self.env))
        };
        self.put(blit.dst, dst);

        self.stats.passes += result?;
        self.stats.blits += 1;
        Ok(())
    }

    fn release_temporary(&mut self, id: PropertyId) -> OutlineResult<()> {
        let desc = self
            .temp_descs
            .remove(&id)
            .ok_or_else(|| missing_temporary(id))?;
        let surface = self
            .temp_surfaces
            .remove(&id)
            .ok_or_else(|| missing_temporary(id))?;
        self.pool.release(&desc, surface);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
