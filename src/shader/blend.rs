use rayon::prelude::*;

use crate::foundation::error::{OutlineError, OutlineResult};
use crate::render::composite::{over, over_in_place};
use crate::render::surface::Surface;
use crate::shader::program::{ShaderEnv, ShaderProgram};

/// Premultiplied source-over of the blit source onto the destination.
#[derive(Clone, Debug)]
pub struct OutlineBlendProgram {
    opacity: f32,
}

impl OutlineBlendProgram {
    /// Program name.
    pub const NAME: &'static str = "NagaiOutlineBlend";
    /// Sub-pass names.
    pub const PASSES: [&'static str; 1] = ["Blend"];

    /// `opacity` must lie in `[0, 1]`.
    pub fn new(opacity: f32) -> OutlineResult<Self> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(OutlineError::validation(
                "blend opacity must be in [0, 1]",
            ));
        }
        Ok(Self { opacity })
    }

    /// Opacity multiplier applied to every source texel.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    fn blend(&self, src: &Surface, dst: &mut Surface) -> OutlineResult<()> {
        if src.width() == dst.width() && src.height() == dst.height() {
            return over_in_place(dst.data_mut(), src.data(), self.opacity);
        }

        let (w, h) = (dst.width() as f32, dst.height() as f32);
        let row_len = dst.width() as usize * 4;
        dst.data_mut()
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                let v = (y as f32 + 0.5) / h;
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let s = src
                        .sample((x as f32 + 0.5) / w, v)
                        .map(|c| c.round().clamp(0.0, 255.0) as u8);
                    let out = over([px[0], px[1], px[2], px[3]], s, self.opacity);
                    px.copy_from_slice(&out);
                }
            });
        Ok(())
    }
}

impl Default for OutlineBlendProgram {
    fn default() -> Self {
        Self { opacity: 1.0 }
    }
}

impl ShaderProgram for OutlineBlendProgram {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn pass_names(&self) -> &[&'static str] {
        &Self::PASSES
    }

    fn run_pass(
        &self,
        pass: usize,
        src: &Surface,
        dst: &mut Surface,
        _env: &ShaderEnv<'_>,
    ) -> OutlineResult<()> {
        if pass != 0 {
            return Err(OutlineError::evaluation(format!(
                "{} has no pass {pass}",
                Self::NAME
            )));
        }
        self.blend(src, dst)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/blend.rs"]
mod tests;
