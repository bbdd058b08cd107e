use super::*;

#[test]
fn fnv_seeded_hash_is_stable() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"_CameraMV");
    let mut b = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    b.write_bytes(b"_Camera");
    b.write_bytes(b"MV");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn frac_matches_shader_semantics() {
    assert_eq!(frac(1.25), 0.25);
    assert!((frac(-0.25) - 0.75).abs() < 1e-6);
    assert_eq!(frac(3.0), 0.0);
}

#[test]
fn smoothstep_endpoints() {
    assert_eq!(smoothstep01(0.0), 0.0);
    assert_eq!(smoothstep01(1.0), 1.0);
    assert_eq!(smoothstep01(0.5), 0.5);
    assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
}
