use std::sync::Arc;

use super::*;
use crate::render::encoding::pack_depth_normal;
use crate::render::surface::FilterMode;
use crate::shader::globals::ShaderGlobals;

fn depth_normals(w: u32, h: u32, depth_at: impl Fn(u32, u32) -> f32) -> Surface {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&pack_depth_normal(Vec3::Z, depth_at(x, y)));
        }
    }
    let mut s = Surface::from_rgba8(w, h, data).unwrap();
    s.set_filter(FilterMode::Point);
    s
}

fn run(program: &EdgeDetectProgram, src: &Surface, globals: &ShaderGlobals) -> Surface {
    let mut dst =
        Surface::from_rgba8(src.width(), src.height(), vec![77; src.data().len()]).unwrap();
    let env = ShaderEnv {
        globals,
        projection: Projection::default(),
    };
    program.run_pass(0, src, &mut dst, &env).unwrap();
    dst
}

fn alpha_at(s: &Surface, x: u32, y: u32) -> u8 {
    s.texel_clamped(i64::from(x), i64::from(y))[3]
}

#[test]
fn uniform_buffer_has_no_edges_and_clears_destination() {
    let program = EdgeDetectProgram::new(EdgeDetectParams::default()).unwrap();
    let src = depth_normals(8, 6, |_, _| 0.4);
    let out = run(&program, &src, &ShaderGlobals::new());
    assert!(out.data().iter().all(|&b| b == 0));
}

#[test]
fn all_zero_buffer_has_no_edges() {
    let program = EdgeDetectProgram::new(EdgeDetectParams::default()).unwrap();
    let mut src = Surface::from_rgba8(6, 6, vec![0; 6 * 6 * 4]).unwrap();
    src.set_filter(FilterMode::Point);
    let out = run(&program, &src, &ShaderGlobals::new());
    assert!(out.data().iter().all(|&b| b == 0));
}

#[test]
fn depth_step_produces_outline_along_boundary() {
    let program = EdgeDetectProgram::new(EdgeDetectParams::default()).unwrap();
    let src = depth_normals(8, 4, |x, _| if x < 4 { 0.2 } else { 0.6 });
    let out = run(&program, &src, &ShaderGlobals::new());

    for y in 0..4 {
        assert_eq!(alpha_at(&out, 3, y), 255);
        assert_eq!(alpha_at(&out, 4, y), 255);
        assert_eq!(alpha_at(&out, 0, y), 0);
        assert_eq!(alpha_at(&out, 7, y), 0);
    }
    assert_eq!(out.texel_clamped(3, 1), [16, 12, 24, 255]);
}

#[test]
fn zero_depth_sensitivity_ignores_depth_steps() {
    let params = EdgeDetectParams {
        depth_sensitivity: 0.0,
        ..EdgeDetectParams::default()
    };
    let program = EdgeDetectProgram::new(params).unwrap();
    let src = depth_normals(8, 4, |x, _| if x < 4 { 0.2 } else { 0.6 });
    let out = run(&program, &src, &ShaderGlobals::new());
    assert!(out.data().iter().all(|&b| b == 0));
}

#[test]
fn black_noise_erases_outline_only_when_camera_matrix_is_published() {
    let params = EdgeDetectParams {
        noise_strength: 1.0,
        ..EdgeDetectParams::default()
    };
    let program = EdgeDetectProgram::new(params).unwrap();
    let src = depth_normals(8, 4, |x, _| if x < 4 { 0.2 } else { 0.6 });
    let black = Arc::new(Texture2D::from_rgba8(4, 4, [0, 0, 0, 255].repeat(16)).unwrap());

    let mut globals = ShaderGlobals::new();
    globals.set_global_texture(NOISE_TEXTURE, black);
    let out = run(&program, &src, &globals);
    assert_eq!(alpha_at(&out, 3, 0), 255);

    globals.set_global_matrix(CAMERA_TO_WORLD, Mat4::IDENTITY);
    let out = run(&program, &src, &globals);
    assert!(out.data().iter().all(|&b| b == 0));
}

#[test]
fn rejects_unknown_pass_and_bad_params() {
    let program = EdgeDetectProgram::new(EdgeDetectParams::default()).unwrap();
    assert_eq!(program.pass_count(), 1);
    assert_eq!(program.find_pass("Outline"), Some(0));

    let src = depth_normals(2, 2, |_, _| 0.5);
    let mut dst = src.clone();
    let globals = ShaderGlobals::new();
    let env = ShaderEnv {
        globals: &globals,
        projection: Projection::default(),
    };
    assert!(program.run_pass(1, &src, &mut dst, &env).is_err());

    let bad = EdgeDetectParams {
        thickness_px: 0.0,
        ..EdgeDetectParams::default()
    };
    assert!(EdgeDetectProgram::new(bad).is_err());
    let bad = EdgeDetectParams {
        noise_strength: 1.5,
        ..EdgeDetectParams::default()
    };
    assert!(EdgeDetectProgram::new(bad).is_err());
}
