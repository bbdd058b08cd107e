use super::*;
use crate::foundation::core::{Canvas, Rgba8Premul};

fn desc(w: u32, h: u32) -> SurfaceDesc {
    SurfaceDesc::viewport(Canvas {
        width: w,
        height: h,
    })
}

#[test]
fn pool_honors_bucket_cap() {
    let mut p = TemporarySurfacePool::new(SurfacePoolOpts {
        max_pool_bytes: 1 << 30,
        max_surfaces_per_bucket: 1,
    });
    let d = desc(8, 8);

    let a = p.acquire(&d).unwrap();
    let b = p.acquire(&d).unwrap();
    p.release(&d, a);
    p.release(&d, b);

    let st = p.stats();
    assert_eq!(st.retained_surfaces, 1);
    assert_eq!(st.outstanding(), 0);
}

#[test]
fn pool_honors_global_byte_cap() {
    let bytes_8x8 = SurfaceKey::from_desc(&desc(8, 8)).byte_len();
    let mut p = TemporarySurfacePool::new(SurfacePoolOpts {
        max_pool_bytes: bytes_8x8,
        max_surfaces_per_bucket: 8,
    });
    let d = desc(8, 8);

    let a = p.acquire(&d).unwrap();
    let b = p.acquire(&d).unwrap();
    p.release(&d, a);
    p.release(&d, b);

    let st = p.stats();
    assert_eq!(st.retained_bytes, bytes_8x8);
    assert_eq!(st.retained_surfaces, 1);
    assert!(st.dropped_on_release >= 1);
}

#[test]
fn reused_surface_is_cleared() {
    let mut p = TemporarySurfacePool::default();
    let d = desc(4, 4);

    let mut s = p.acquire(&d).unwrap();
    s.fill(Rgba8Premul::from_straight_rgba(255, 0, 0, 255));
    p.release(&d, s);

    let again = p.acquire(&d).unwrap();
    assert!(again.data().iter().all(|&b| b == 0));
    assert_eq!(p.stats().alloc_surfaces, 1);
}

#[test]
fn outstanding_counts_unreleased() {
    let mut p = TemporarySurfacePool::default();
    let d = desc(2, 2);
    let _held = p.acquire(&d).unwrap();
    assert_eq!(p.stats().outstanding(), 1);
}

#[test]
fn acquire_rejects_invalid_desc() {
    let mut p = TemporarySurfacePool::default();
    let mut d = desc(2, 2);
    d.depth_bits = 7;
    assert!(p.acquire(&d).is_err());
    assert_eq!(p.stats().acquired, 0);
}
