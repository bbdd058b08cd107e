use std::fmt;

use crate::foundation::error::OutlineResult;
use crate::render::surface::Surface;
use crate::scene::camera::Projection;
use crate::shader::globals::ShaderGlobals;

/// Per-blit inputs a program may read besides its source surface.
#[derive(Clone, Copy, Debug)]
pub struct ShaderEnv<'a> {
    /// Shared parameter table.
    pub globals: &'a ShaderGlobals,
    /// Projection of the camera being rendered.
    pub projection: Projection,
}

/// A per-pixel kernel run by a blit, with one or more named sub-passes.
///
/// Programs are black boxes to the pipeline: they read `src`, may read `dst` (for blending) and
/// write `dst`. They must be deterministic for identical inputs.
pub trait ShaderProgram: fmt::Debug + Send + Sync {
    /// Program name, used in logs and errors.
    fn name(&self) -> &str;

    /// Names of the sub-passes, indexed by pass number.
    fn pass_names(&self) -> &[&'static str];

    /// Run sub-pass `pass` reading `src` and writing `dst`.
    fn run_pass(
        &self,
        pass: usize,
        src: &Surface,
        dst: &mut Surface,
        env: &ShaderEnv<'_>,
    ) -> OutlineResult<()>;

    /// Number of sub-passes.
    fn pass_count(&self) -> usize {
        self.pass_names().len()
    }

    /// Index of the sub-pass called `name`.
    fn find_pass(&self, name: &str) -> Option<usize> {
        self.pass_names().iter().position(|p| *p == name)
    }
}
