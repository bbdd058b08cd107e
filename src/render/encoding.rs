//! Packed depth/normal texel encodings.
//!
//! The combined depth+normals target stores a view-space normal in the first two channels
//! (stereographic projection) and linear `[0, 1)` depth in the last two channels (two-byte
//! fixed point). The depth-only target packs linear depth across all four channels.

use crate::foundation::core::{Vec2, Vec3};
use crate::foundation::math::frac;

const STEREO_SCALE: f32 = 1.7777;

/// Largest depth that survives the two-byte packing without wrapping to zero.
pub const MAX_ENCODABLE_DEPTH: f32 = 1.0 - 1.0 / 65025.0;

/// Project a unit view-space normal onto the stereographic plane, mapped to `[0, 1]^2`.
pub fn encode_view_normal_stereo(n: Vec3) -> Vec2 {
    let denom = n.z + 1.0;
    // Normals facing straight away from the viewer have no finite projection.
    if denom.abs() < 1e-6 {
        return Vec2::splat(0.5);
    }
    let enc = Vec2::new(n.x, n.y) / denom / STEREO_SCALE;
    enc * 0.5 + Vec2::splat(0.5)
}

/// Inverse of [`encode_view_normal_stereo`].
pub fn decode_view_normal_stereo(enc: Vec2) -> Vec3 {
    let nn = Vec3::new(
        enc.x * 2.0 * STEREO_SCALE - STEREO_SCALE,
        enc.y * 2.0 * STEREO_SCALE - STEREO_SCALE,
        1.0,
    );
    let g = 2.0 / nn.dot(nn);
    Vec3::new(g * nn.x, g * nn.y, g - 1.0)
}

/// Pack a `[0, 1)` value into two `[0, 1)` components.
pub fn encode_float_rg(v: f32) -> Vec2 {
    let v = v.clamp(0.0, MAX_ENCODABLE_DEPTH);
    let x = frac(v);
    let y = frac(v * 255.0);
    Vec2::new(x - y / 255.0, y)
}

/// Inverse of [`encode_float_rg`].
pub fn decode_float_rg(enc: Vec2) -> f32 {
    enc.x + enc.y / 255.0
}

/// Pack a `[0, 1)` value into four `[0, 1)` components.
pub fn encode_float_rgba(v: f32) -> [f32; 4] {
    let v = v.clamp(0.0, MAX_ENCODABLE_DEPTH);
    let e = [
        frac(v),
        frac(v * 255.0),
        frac(v * 65025.0),
        frac(v * 16_581_375.0),
    ];
    [
        e[0] - e[1] / 255.0,
        e[1] - e[2] / 255.0,
        e[2] - e[3] / 255.0,
        e[3],
    ]
}

/// Inverse of [`encode_float_rgba`].
pub fn decode_float_rgba(enc: [f32; 4]) -> f32 {
    enc[0] + enc[1] / 255.0 + enc[2] / 65025.0 + enc[3] / 16_581_375.0
}

fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Encode a depth+normal texel as RGBA8.
pub fn pack_depth_normal(view_normal: Vec3, depth01: f32) -> [u8; 4] {
    let n = encode_view_normal_stereo(view_normal);
    let d = encode_float_rg(depth01);
    [quantize(n.x), quantize(n.y), quantize(d.x), quantize(d.y)]
}

/// Decoded depth+normal texel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthNormal {
    /// Stereographic normal, `[0, 1]^2`. Edge detection compares these directly.
    pub encoded_normal: Vec2,
    /// Linear `[0, 1)` depth (view depth over far plane).
    pub depth01: f32,
}

impl DepthNormal {
    /// Unpack an RGBA8 texel (channels given in `[0, 255]`).
    pub fn from_texel(t: [f32; 4]) -> Self {
        let s = 1.0 / 255.0;
        Self {
            encoded_normal: Vec2::new(t[0] * s, t[1] * s),
            depth01: decode_float_rg(Vec2::new(t[2] * s, t[3] * s)),
        }
    }

    /// Unit view-space normal.
    pub fn view_normal(&self) -> Vec3 {
        decode_view_normal_stereo(self.encoded_normal)
    }
}

/// Encode linear depth as an RGBA8 texel for the depth-only target.
pub fn pack_depth(depth01: f32) -> [u8; 4] {
    encode_float_rgba(depth01).map(quantize)
}

#[cfg(test)]
#[path = "../../tests/unit/render/encoding.rs"]
mod tests;
