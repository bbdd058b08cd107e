use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assets::texture::Texture2D;
use crate::foundation::core::{Mat4, Rgba8Premul, Vec2, Vec3};
use crate::foundation::error::{OutlineError, OutlineResult};
use crate::foundation::math::lerp;
use crate::render::encoding::DepthNormal;
use crate::render::surface::Surface;
use crate::scene::camera::Projection;
use crate::shader::globals::{CAMERA_TO_WORLD, NOISE_TEXTURE};
use crate::shader::program::{ShaderEnv, ShaderProgram};

/// Tunables for [`EdgeDetectProgram`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeDetectParams {
    /// Straight RGBA outline color.
    pub color: [u8; 4],
    /// Distance in source texels between the center and each diagonal sample.
    pub thickness_px: f32,
    /// Scale applied to depth differences before thresholding.
    pub depth_sensitivity: f32,
    /// Scale applied to encoded-normal differences before thresholding.
    pub normal_sensitivity: f32,
    /// How strongly the global noise thins the outline, in `[0, 1]`.
    pub noise_strength: f32,
    /// World units to noise-texture repeats.
    pub noise_scale: f32,
}

impl Default for EdgeDetectParams {
    fn default() -> Self {
        Self {
            color: [16, 12, 24, 255],
            thickness_px: 1.0,
            depth_sensitivity: 1.0,
            normal_sensitivity: 1.0,
            noise_strength: 0.0,
            noise_scale: 1.0,
        }
    }
}

impl EdgeDetectParams {
    /// Check ranges.
    pub fn validate(&self) -> OutlineResult<()> {
        if !(self.thickness_px > 0.0 && self.thickness_px.is_finite()) {
            return Err(OutlineError::validation("outline thickness_px must be > 0"));
        }
        if self.depth_sensitivity < 0.0 || self.normal_sensitivity < 0.0 {
            return Err(OutlineError::validation(
                "outline sensitivities must be >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.noise_strength) {
            return Err(OutlineError::validation(
                "outline noise_strength must be in [0, 1]",
            ));
        }
        if !(self.noise_scale > 0.0 && self.noise_scale.is_finite()) {
            return Err(OutlineError::validation("outline noise_scale must be > 0"));
        }
        Ok(())
    }
}

/// Roberts-cross edge detection over a packed depth+normals surface.
///
/// Pass 0 (`"Outline"`) writes the outline color scaled by edge strength into the destination,
/// transparent elsewhere. When the parameter table holds both the global noise texture and the
/// camera-to-world matrix, edge strength is modulated by triplanar world-space noise.
#[derive(Clone, Debug)]
pub struct EdgeDetectProgram {
    params: EdgeDetectParams,
}

/// World-space reconstruction inputs for the noise modulation.
struct NoiseSampler<'a> {
    noise: &'a Texture2D,
    camera_to_world: Mat4,
    projection: Projection,
    scale: f32,
}

impl NoiseSampler<'_> {
    fn sample(&self, uv: Vec2, texel: &DepthNormal) -> f32 {
        let ndc = Vec2::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0);
        let view_pos = self.projection.view_ray(ndc) * (texel.depth01 * self.projection.far);
        let p = self.camera_to_world.transform_point3(view_pos) * self.scale;
        let n = self
            .camera_to_world
            .transform_vector3(texel.view_normal())
            .normalize_or_zero();

        let w = n.abs().powf(4.0);
        let sum = w.x + w.y + w.z;
        if sum <= f32::EPSILON {
            return 1.0;
        }
        let w = w / sum;
        let sx = self.noise.sample_repeat(p.y, p.z)[0];
        let sy = self.noise.sample_repeat(p.x, p.z)[0];
        let sz = self.noise.sample_repeat(p.x, p.y)[0];
        w.dot(Vec3::new(sx, sy, sz))
    }
}

impl EdgeDetectProgram {
    /// Program name.
    pub const NAME: &'static str = "NagaiOutlines";
    /// Sub-pass names.
    pub const PASSES: [&'static str; 1] = ["Outline"];

    /// Create with validated parameters.
    pub fn new(params: EdgeDetectParams) -> OutlineResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Current parameters.
    pub fn params(&self) -> &EdgeDetectParams {
        &self.params
    }

    fn same(&self, center: &DepthNormal, sample: &DepthNormal) -> bool {
        let dn = (center.encoded_normal - sample.encoded_normal).abs()
            * self.params.normal_sensitivity;
        let same_normal = dn.x + dn.y < 0.1;
        let dd = (center.depth01 - sample.depth01).abs() * self.params.depth_sensitivity;
        let same_depth = dd <= 0.1 * center.depth01;
        same_normal && same_depth
    }

    fn outline(&self, src: &Surface, dst: &mut Surface, env: &ShaderEnv<'_>) {
        let noise = match (
            env.globals.texture(NOISE_TEXTURE),
            env.globals.matrix(CAMERA_TO_WORLD),
        ) {
            (Some(noise), Some(camera_to_world)) if self.params.noise_strength > 0.0 => {
                Some(NoiseSampler {
                    noise: noise.as_ref(),
                    camera_to_world,
                    projection: env.projection,
                    scale: self.params.noise_scale,
                })
            }
            _ => None,
        };

        let [r, g, b, a] = self.params.color;
        let rgb = Vec3::new(f32::from(r), f32::from(g), f32::from(b)) / 255.0;
        let base_alpha = f32::from(a) / 255.0;
        let (dw, dh) = (dst.width() as f32, dst.height() as f32);
        let du = self.params.thickness_px / src.width() as f32;
        let dv = self.params.thickness_px / src.height() as f32;
        let row_len = dst.width() as usize * 4;

        dst.data_mut()
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| {
                let v = (y as f32 + 0.5) / dh;
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let u = (x as f32 + 0.5) / dw;
                    let at = |ou: f32, ov: f32| DepthNormal::from_texel(src.sample(u + ou, v + ov));
                    let center = at(0.0, 0.0);
                    let s1 = at(du, dv);
                    let s2 = at(-du, -dv);
                    let s3 = at(-du, dv);
                    let s4 = at(du, -dv);

                    let edge = if self.same(&s1, &s2) && self.same(&s3, &s4) {
                        0.0
                    } else {
                        1.0
                    };
                    let mut alpha = edge * base_alpha;
                    if alpha > 0.0
                        && let Some(n) = &noise
                    {
                        let value = n.sample(Vec2::new(u, v), &center);
                        alpha *= lerp(1.0, value, self.params.noise_strength);
                    }
                    px.copy_from_slice(&Rgba8Premul::from_unit_straight(rgb, alpha).to_array());
                }
            });
    }
}

impl ShaderProgram for EdgeDetectProgram {
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
        env: &ShaderEnv<'_>,
    ) -> OutlineResult<()> {
        match pass {
            0 => {
                self.outline(src, dst, env);
                Ok(())
            }
            _ => Err(OutlineError::evaluation(format!(
                "{} has no pass {pass}",
                Self::NAME
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/edge_detect.rs"]
mod tests;
