use super::*;

#[test]
fn procedural_noise_is_deterministic_per_seed() {
    let a = Texture2D::procedural_noise(32, 7).unwrap();
    let b = Texture2D::procedural_noise(32, 7).unwrap();
    let c = Texture2D::procedural_noise(32, 8).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn procedural_noise_is_grayscale_and_opaque() {
    let t = Texture2D::procedural_noise(16, 3).unwrap();
    for px in t.data().chunks_exact(4) {
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert_eq!(px[3], 255);
    }
    let distinct: std::collections::BTreeSet<u8> = t.data().chunks_exact(4).map(|p| p[0]).collect();
    assert!(distinct.len() > 4);
}

#[test]
fn procedural_noise_tiles_across_edges() {
    let t = Texture2D::procedural_noise(64, 11).unwrap();
    let w = t.width() as usize;
    let left = t.data()[0] as i32;
    let right = t.data()[(w - 1) * 4] as i32;
    assert!((left - right).abs() <= 24, "left={left} right={right}");
}

#[test]
fn sample_repeat_wraps() {
    let t = Texture2D::procedural_noise(8, 2).unwrap();
    let a = t.sample_repeat(0.3125, 0.6875);
    let b = t.sample_repeat(1.3125, -0.3125);
    for i in 0..4 {
        assert!((a[i] - b[i]).abs() < 1e-5);
    }
}

#[test]
fn rejects_bad_sizes() {
    assert!(Texture2D::procedural_noise(0, 1).is_err());
    assert!(Texture2D::from_rgba8(2, 2, vec![0; 3]).is_err());
}

#[test]
fn missing_png_is_an_error() {
    let err = Texture2D::from_png("does/not/exist.png").unwrap_err();
    assert!(err.to_string().contains("decode texture"));
}
