use std::collections::HashMap;

use crate::foundation::error::OutlineResult;
use crate::render::surface::{Surface, SurfaceDesc, SurfaceFormat};

/// Pool configuration for cached temporary surfaces.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained surfaces per (w,h,format) bucket.
    pub max_surfaces_per_bucket: usize,
}

impl Default for SurfacePoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 64 * 1024 * 1024,
            max_surfaces_per_bucket: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SurfaceKey {
    w: u32,
    h: u32,
    format: SurfaceFormat,
}

impl SurfaceKey {
    fn from_desc(desc: &SurfaceDesc) -> Self {
        Self {
            w: desc.width,
            h: desc.height,
            format: desc.resolved_format(),
        }
    }

    fn byte_len(self) -> usize {
        let px = (self.w as usize).saturating_mul(self.h as usize);
        match self.format {
            SurfaceFormat::Default | SurfaceFormat::Rgba8Premul => px.saturating_mul(4),
        }
    }
}

/// Temporary surface accounting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SurfacePoolStats {
    /// Total successful acquisitions.
    pub acquired: u64,
    /// Total releases.
    pub released: u64,
    /// Surfaces currently held in buckets for reuse.
    pub retained_surfaces: usize,
    /// Bytes currently held in buckets for reuse.
    pub retained_bytes: usize,
    /// Fresh allocations (pool misses).
    pub alloc_surfaces: u64,
    /// Bytes of fresh allocations.
    pub alloc_bytes: u64,
    /// Releases that were dropped instead of retained because a cap was hit.
    pub dropped_on_release: u64,
}

impl SurfacePoolStats {
    /// Surfaces acquired but not yet released.
    pub fn outstanding(&self) -> u64 {
        self.acquired.saturating_sub(self.released)
    }
}

/// Bounded pooled allocator for temporary render surfaces.
///
/// Keyed by `(width, height, format)`. Acquired surfaces are always cleared to transparent, so
/// nothing rendered in an earlier frame is observable through a reused allocation.
#[derive(Debug)]
pub struct TemporarySurfacePool {
    opts: SurfacePoolOpts,
    stats: SurfacePoolStats,
    bucket_idx_by_key: HashMap<SurfaceKey, usize>,
    buckets: Vec<Vec<Surface>>,
}

impl Default for TemporarySurfacePool {
    fn default() -> Self {
        Self::new(SurfacePoolOpts::default())
    }
}

impl TemporarySurfacePool {
    /// Create an empty pool.
    pub fn new(opts: SurfacePoolOpts) -> Self {
        Self {
            opts,
            stats: SurfacePoolStats::default(),
            bucket_idx_by_key: HashMap::new(),
            buckets: Vec::new(),
        }
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> SurfacePoolStats {
        self.stats
    }

    /// Take a cleared surface matching `desc`, reusing a retained one when possible.
    pub fn acquire(&mut self, desc: &SurfaceDesc) -> OutlineResult<Surface> {
        desc.validate()?;
        let key = SurfaceKey::from_desc(desc);

        let reused = self
            .bucket_idx_by_key
            .get(&key)
            .and_then(|&bi| self.buckets[bi].pop());
        let surface = match reused {
            Some(mut s) => {
                self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
                self.stats.retained_bytes =
                    self.stats.retained_bytes.saturating_sub(key.byte_len());
                s.clear();
                s.set_filter(desc.filter);
                s
            }
            None => {
                self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
                self.stats.alloc_bytes =
                    self.stats.alloc_bytes.saturating_add(key.byte_len() as u64);
                Surface::new(desc)?
            }
        };

        self.stats.acquired = self.stats.acquired.saturating_add(1);
        Ok(surface)
    }

    /// Return a surface previously obtained from [`TemporarySurfacePool::acquire`].
    pub fn release(&mut self, desc: &SurfaceDesc, surface: Surface) {
        self.stats.released = self.stats.released.saturating_add(1);

        if self.opts.max_pool_bytes == 0
            || self.opts.max_surfaces_per_bucket == 0
            || !surface.matches(desc)
        {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let key = SurfaceKey::from_desc(desc);
        let bytes = key.byte_len();
        if self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bi = match self.bucket_idx_by_key.get(&key).copied() {
            Some(i) => i,
            None => {
                let i = self.buckets.len();
                self.buckets.push(Vec::new());
                self.bucket_idx_by_key.insert(key, i);
                i
            }
        };

        let bucket = &mut self.buckets[bi];
        if bucket.len() >= self.opts.max_surfaces_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.push(surface);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pool.rs"]
mod tests;
