use crate::foundation::core::{Canvas, MAX_CANVAS_SIZE, Rgba8Premul};
use crate::foundation::error::{OutlineError, OutlineResult};
use crate::foundation::math::Fnv1a64;

/// Texture filtering used when a surface is sampled at a different resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Nearest texel.
    Point,
    /// Bilinear interpolation between the four nearest texels.
    #[default]
    Bilinear,
}

/// Color format of a render surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SurfaceFormat {
    /// Platform default color format. On the CPU backend this is premultiplied RGBA8.
    #[default]
    Default,
    /// Premultiplied RGBA8.
    Rgba8Premul,
}

/// Descriptor for a temporary render surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceDesc {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Depth buffer precision in bits: 0, 16, 24 or 32.
    pub depth_bits: u8,
    /// Sampling filter.
    pub filter: FilterMode,
    /// Color format.
    pub format: SurfaceFormat,
    /// Multisample count. The CPU backend only resolves single-sampled surfaces.
    pub msaa_samples: u8,
}

impl SurfaceDesc {
    /// Viewport-sized surface with 32-bit depth, bilinear filtering, default format and no MSAA.
    pub fn viewport(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            depth_bits: 32,
            filter: FilterMode::Bilinear,
            format: SurfaceFormat::Default,
            msaa_samples: 1,
        }
    }

    /// Check dimensions, depth precision and sample count.
    pub fn validate(&self) -> OutlineResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(OutlineError::validation("surface width/height must be > 0"));
        }
        if self.width > MAX_CANVAS_SIZE || self.height > MAX_CANVAS_SIZE {
            return Err(OutlineError::validation(format!(
                "surface {}x{} exceeds max {MAX_CANVAS_SIZE}",
                self.width, self.height
            )));
        }
        if !matches!(self.depth_bits, 0 | 16 | 24 | 32) {
            return Err(OutlineError::validation(format!(
                "surface depth_bits must be one of 0/16/24/32, got {}",
                self.depth_bits
            )));
        }
        if self.msaa_samples != 1 {
            return Err(OutlineError::validation(format!(
                "cpu surfaces are single-sampled, got msaa_samples={}",
                self.msaa_samples
            )));
        }
        Ok(())
    }

    /// Format after resolving `Default`.
    pub fn resolved_format(&self) -> SurfaceFormat {
        match self.format {
            SurfaceFormat::Default | SurfaceFormat::Rgba8Premul => SurfaceFormat::Rgba8Premul,
        }
    }

    pub(crate) fn byte_len(&self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// CPU surface holding tightly packed, row-major RGBA8 texels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    filter: FilterMode,
    data: Vec<u8>,
}

impl Surface {
    /// Allocate a transparent surface matching `desc`.
    pub fn new(desc: &SurfaceDesc) -> OutlineResult<Self> {
        desc.validate()?;
        Ok(Self {
            width: desc.width,
            height: desc.height,
            filter: desc.filter,
            data: vec![0; desc.byte_len()],
        })
    }

    /// Allocate a transparent surface sized to `canvas` with bilinear filtering.
    pub fn for_canvas(canvas: Canvas) -> OutlineResult<Self> {
        Self::new(&SurfaceDesc::viewport(canvas))
    }

    /// Wrap existing RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> OutlineResult<Self> {
        let expected = Canvas { width, height }.rgba8_len()?;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(OutlineError::validation(
                "surface data must be non-empty and match width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            filter: FilterMode::Bilinear,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Surface size as a canvas.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Sampling filter.
    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub(crate) fn set_filter(&mut self, filter: FilterMode) {
        self.filter = filter;
    }

    /// Raw RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw RGBA8 bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume into raw bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Whether this surface can back `desc` without reallocation.
    pub(crate) fn matches(&self, desc: &SurfaceDesc) -> bool {
        self.width == desc.width && self.height == desc.height
    }

    /// Fill every texel with `color`.
    pub fn fill(&mut self, color: Rgba8Premul) {
        let px = color.to_array();
        for d in self.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }

    /// Reset to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Texel at integer coordinates, clamped to the edge.
    pub fn texel_clamped(&self, x: i64, y: i64) -> [u8; 4] {
        let x = x.clamp(0, i64::from(self.width) - 1) as usize;
        let y = y.clamp(0, i64::from(self.height) - 1) as usize;
        let idx = (y * self.width as usize + x) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Sample at normalized `(u, v)` (top-left origin) with the surface's filter and clamp
    /// addressing. Returns channel values in `[0, 255]`.
    pub fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        let x = u * self.width as f32 - 0.5;
        let y = v * self.height as f32 - 0.5;
        match self.filter {
            FilterMode::Point => {
                let t = self.texel_clamped(x.round() as i64, y.round() as i64);
                t.map(f32::from)
            }
            FilterMode::Bilinear => {
                let x0 = x.floor();
                let y0 = y.floor();
                let fx = x - x0;
                let fy = y - y0;
                let (x0, y0) = (x0 as i64, y0 as i64);
                let a = self.texel_clamped(x0, y0);
                let b = self.texel_clamped(x0 + 1, y0);
                let c = self.texel_clamped(x0, y0 + 1);
                let d = self.texel_clamped(x0 + 1, y0 + 1);
                let mut out = [0.0f32; 4];
                for i in 0..4 {
                    let top = f32::from(a[i]) * (1.0 - fx) + f32::from(b[i]) * fx;
                    let bot = f32::from(c[i]) * (1.0 - fx) + f32::from(d[i]) * fx;
                    out[i] = top * (1.0 - fy) + bot * fy;
                }
                out
            }
        }
    }

    /// Overwrite every texel with `src` sampled at the matching normalized position.
    ///
    /// Equal sizes copy bytes directly.
    pub fn resample_from(&mut self, src: &Surface) {
        if self.width == src.width && self.height == src.height {
            self.data.copy_from_slice(&src.data);
            return;
        }
        let (w, h) = (self.width as f32, self.height as f32);
        let row_len = self.width as usize * 4;
        for (y, row) in self.data.chunks_exact_mut(row_len).enumerate() {
            let v = (y as f32 + 0.5) / h;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let s = src.sample((x as f32 + 0.5) / w, v);
                for (d, c) in px.iter_mut().zip(s) {
                    *d = c.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }

    /// Stable 64-bit fingerprint of size and contents.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_u32(self.width);
        h.write_u32(self.height);
        h.write_bytes(&self.data);
        h.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
