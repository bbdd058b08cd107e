use super::*;

#[test]
fn property_ids_are_stable_per_name() {
    assert_eq!(PropertyId::of(CAMERA_TO_WORLD), PropertyId::of("_CameraMV"));
    assert_ne!(
        PropertyId::of(CAMERA_TO_WORLD),
        PropertyId::of(NOISE_TEXTURE)
    );
}

#[test]
fn matrix_entry_overwrites_and_counts() {
    let mut g = ShaderGlobals::new();
    assert!(g.matrix(CAMERA_TO_WORLD).is_none());

    g.set_global_matrix(CAMERA_TO_WORLD, Mat4::IDENTITY);
    let moved = Mat4::from_translation(crate::foundation::core::Vec3::new(1.0, 2.0, 3.0));
    g.set_global_matrix(CAMERA_TO_WORLD, moved);

    assert_eq!(g.matrix(CAMERA_TO_WORLD), Some(moved));
    assert_eq!(g.writes(CAMERA_TO_WORLD), 2);
    assert_eq!(g.total_writes(), 2);
    assert_eq!(g.len(), 1);
}

#[test]
fn typed_getters_reject_other_kinds() {
    let mut g = ShaderGlobals::new();
    g.set_global_float("_Strength", 0.5);
    assert!(g.matrix("_Strength").is_none());
    assert!(g.texture("_Strength").is_none());
    assert_eq!(g.float("_Strength"), Some(0.5));
}

#[test]
fn texture_entry_keeps_handle_identity() {
    let mut g = ShaderGlobals::new();
    let tex = Arc::new(Texture2D::procedural_noise(8, 1).unwrap());
    g.set_global_texture(NOISE_TEXTURE, Arc::clone(&tex));
    let stored = g.texture(NOISE_TEXTURE).unwrap();
    assert!(Arc::ptr_eq(stored, &tex));
    assert_eq!(g.names(), vec![NOISE_TEXTURE]);
}

#[test]
fn unknown_names_report_zero_writes() {
    let g = ShaderGlobals::new();
    assert_eq!(g.writes("_Missing"), 0);
    assert!(g.is_empty());
}
