use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{OutlineError, OutlineResult};
use crate::foundation::math::{Fnv1a64, lerp, smoothstep01};

const MAX_TEXTURE_SIZE: u32 = 8192;

/// Straight-alpha RGBA8 texture sampled with repeat addressing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture2D {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Texture2D {
    /// Wrap RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> OutlineResult<Self> {
        if width == 0 || height == 0 || width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
            return Err(OutlineError::validation(format!(
                "texture size {width}x{height} out of range (1..={MAX_TEXTURE_SIZE})"
            )));
        }
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(OutlineError::validation(
                "texture data must match width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Decode a PNG (or any format the `image` crate detects) into RGBA8.
    pub fn from_png(path: impl AsRef<Path>) -> OutlineResult<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("decode texture '{}'", path.display()))?
            .into_rgba8();
        let (w, h) = img.dimensions();
        Self::from_rgba8(w, h, img.into_raw())
    }

    /// Tileable multi-octave value noise, grayscale in RGB with opaque alpha.
    ///
    /// Deterministic for a given `(size, seed)`.
    pub fn procedural_noise(size: u32, seed: u64) -> OutlineResult<Self> {
        if size == 0 || size > MAX_TEXTURE_SIZE {
            return Err(OutlineError::validation(format!(
                "noise size must be in 1..={MAX_TEXTURE_SIZE}, got {size}"
            )));
        }

        const OCTAVES: [(u32, f32); 3] = [(4, 0.5), (8, 0.3), (16, 0.2)];
        let mut data = Vec::with_capacity((size as usize) * (size as usize) * 4);
        for y in 0..size {
            for x in 0..size {
                let mut v = 0.0f32;
                for (octave, &(period, weight)) in OCTAVES.iter().enumerate() {
                    let u = (x as f32 + 0.5) / size as f32 * period as f32;
                    let w = (y as f32 + 0.5) / size as f32 * period as f32;
                    v += weight * lattice_value_noise(u, w, period, seed ^ octave as u64);
                }
                let b = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                data.extend_from_slice(&[b, b, b, 255]);
            }
        }
        Self::from_rgba8(size, size, data)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn texel_wrapped(&self, x: i64, y: i64) -> [u8; 4] {
        let x = x.rem_euclid(i64::from(self.width)) as usize;
        let y = y.rem_euclid(i64::from(self.height)) as usize;
        let idx = (y * self.width as usize + x) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Bilinear sample with repeat addressing. Channels are normalized to `[0, 1]`.
    pub fn sample_repeat(&self, u: f32, v: f32) -> [f32; 4] {
        let x = u * self.width as f32 - 0.5;
        let y = v * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);
        let a = self.texel_wrapped(x0, y0);
        let b = self.texel_wrapped(x0 + 1, y0);
        let c = self.texel_wrapped(x0, y0 + 1);
        let d = self.texel_wrapped(x0 + 1, y0 + 1);
        let mut out = [0.0f32; 4];
        for i in 0..4 {
            let top = lerp(f32::from(a[i]), f32::from(b[i]), fx);
            let bot = lerp(f32::from(c[i]), f32::from(d[i]), fx);
            out[i] = lerp(top, bot, fy) / 255.0;
        }
        out
    }
}

fn lattice_hash(ix: u32, iy: u32, seed: u64) -> f32 {
    let mut h = Fnv1a64::new_default();
    h.write_u64(seed);
    h.write_u32(ix);
    h.write_u32(iy);
    (h.finish() >> 40) as f32 / (1u64 << 24) as f32
}

fn lattice_value_noise(u: f32, v: f32, period: u32, seed: u64) -> f32 {
    let x0 = u.floor();
    let y0 = v.floor();
    let tx = smoothstep01(u - x0);
    let ty = smoothstep01(v - y0);
    let ix = (x0 as i64).rem_euclid(i64::from(period)) as u32;
    let iy = (y0 as i64).rem_euclid(i64::from(period)) as u32;
    let ix1 = (ix + 1) % period;
    let iy1 = (iy + 1) % period;

    let a = lattice_hash(ix, iy, seed);
    let b = lattice_hash(ix1, iy, seed);
    let c = lattice_hash(ix, iy1, seed);
    let d = lattice_hash(ix1, iy1, seed);
    lerp(lerp(a, b, tx), lerp(c, d, tx), ty)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/texture.rs"]
mod tests;
