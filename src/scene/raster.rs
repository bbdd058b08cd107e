//! CPU host stages: a ray caster over [`Scene`] primitives that fills the camera's depth,
//! depth+normals and color targets. Rows are shaded in parallel; every pixel depends only on
//! immutable inputs, so output is deterministic.

use rayon::prelude::*;

use crate::foundation::core::{Canvas, Mat4, Rgba8Premul, Vec3};
use crate::render::composite::over;
use crate::render::encoding::{MAX_ENCODABLE_DEPTH, pack_depth, pack_depth_normal};
use crate::render::surface::Surface;
use crate::scene::camera::{Camera, Projection};
use crate::scene::model::{Primitive, Scene};

/// Primary-ray generator for one camera frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RayGen {
    origin: Vec3,
    camera_to_world: Mat4,
    world_to_camera: Mat4,
    projection: Projection,
    canvas: Canvas,
}

#[derive(Clone, Copy, Debug)]
struct Hit {
    t: f32,
    point: Vec3,
    normal: Vec3,
}

impl RayGen {
    pub(crate) fn new(camera: &Camera) -> Self {
        Self {
            origin: camera.position(),
            camera_to_world: camera.camera_to_world(),
            world_to_camera: camera.world_to_camera(),
            projection: camera.projection,
            canvas: camera.canvas(),
        }
    }

    fn dir(&self, x: u32, y: u32) -> Vec3 {
        let ndc = Projection::pixel_ndc(self.canvas, x, y);
        self.camera_to_world
            .transform_vector3(self.projection.view_ray(ndc))
    }

    fn view_depth(&self, point: Vec3) -> f32 {
        -self.world_to_camera.transform_point3(point).z
    }

    fn in_clip(&self, point: Vec3) -> bool {
        let d = self.view_depth(point);
        d >= self.projection.near && d <= self.projection.far
    }

    fn nearest<'a>(
        &self,
        prims: impl Iterator<Item = &'a Primitive>,
        dir: Vec3,
    ) -> Option<(Hit, &'a Primitive)> {
        let mut best: Option<(Hit, &'a Primitive)> = None;
        for p in prims {
            let Some(h) = p.shape.intersect(self.origin, dir) else {
                continue;
            };
            let point = self.origin + dir * h.t;
            if !self.in_clip(point) {
                continue;
            }
            if best.as_ref().is_none_or(|(b, _)| h.t < b.t) {
                best = Some((
                    Hit {
                        t: h.t,
                        point,
                        normal: h.normal,
                    },
                    p,
                ));
            }
        }
        best
    }

    fn nearest_opaque<'a>(&self, scene: &'a Scene, dir: Vec3) -> Option<(Hit, &'a Primitive)> {
        self.nearest(scene.primitives.iter().filter(|p| p.is_opaque()), dir)
    }
}

fn for_each_pixel(target: &mut Surface, shade: impl Fn(u32, u32, [u8; 4]) -> [u8; 4] + Sync) {
    let width = target.width();
    let row_len = width as usize * 4;
    target
        .data_mut()
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let out = shade(x as u32, y as u32, [px[0], px[1], px[2], px[3]]);
                px.copy_from_slice(&out);
            }
        });
}

/// Linear depth of opaque geometry into `target`. Background is the far plane.
pub(crate) fn render_depth(camera: &Camera, scene: &Scene, target: &mut Surface) {
    let rays = RayGen::new(camera);
    let far = camera.projection.far;
    for_each_pixel(target, |x, y, _| {
        let depth01 = rays
            .nearest_opaque(scene, rays.dir(x, y))
            .map_or(MAX_ENCODABLE_DEPTH, |(h, _)| rays.view_depth(h.point) / far);
        pack_depth(depth01)
    });
}

/// View-space normals and linear depth of opaque geometry into `target`.
///
/// Background texels hold a viewer-facing normal at the far plane.
pub(crate) fn render_depth_normals(camera: &Camera, scene: &Scene, target: &mut Surface) {
    let rays = RayGen::new(camera);
    let far = camera.projection.far;
    for_each_pixel(target, |x, y, _| {
        let Some((h, _)) = rays.nearest_opaque(scene, rays.dir(x, y)) else {
            return pack_depth_normal(Vec3::Z, MAX_ENCODABLE_DEPTH);
        };
        let n = rays.world_to_camera.transform_vector3(h.normal);
        pack_depth_normal(n.normalize(), rays.view_depth(h.point) / far)
    });
}

fn lambert(scene: &Scene, normal: Vec3, color: [u8; 3]) -> Vec3 {
    let to_light = -scene.light_dir.normalize();
    let diffuse = normal.dot(to_light).max(0.0);
    let k = scene.ambient + (1.0 - scene.ambient) * diffuse;
    Vec3::from_array(color.map(f32::from)) / 255.0 * k
}

/// Shaded opaque geometry into the camera target. Misses keep the cleared color.
pub(crate) fn render_opaque(camera: &Camera, scene: &Scene, target: &mut Surface) {
    let rays = RayGen::new(camera);
    for_each_pixel(target, |x, y, dst| {
        let Some((h, p)) = rays.nearest_opaque(scene, rays.dir(x, y)) else {
            return dst;
        };
        Rgba8Premul::from_unit_straight(lambert(scene, h.normal, p.color), 1.0).to_array()
    });
}

/// Vertical sky gradient wherever no opaque geometry was hit.
pub(crate) fn render_skybox(camera: &Camera, scene: &Scene, target: &mut Surface) {
    let rays = RayGen::new(camera);
    let top = Vec3::from_array(scene.sky_top.map(f32::from)) / 255.0;
    let bottom = Vec3::from_array(scene.sky_bottom.map(f32::from)) / 255.0;
    for_each_pixel(target, |x, y, dst| {
        let dir = rays.dir(x, y);
        if rays.nearest_opaque(scene, dir).is_some() {
            return dst;
        }
        let t = dir.normalize().y.max(0.0);
        Rgba8Premul::from_unit_straight(bottom.lerp(top, t), 1.0).to_array()
    });
}

/// Transparent primitives blended back to front over the camera target, occluded by opaque
/// geometry.
pub(crate) fn render_transparent(camera: &Camera, scene: &Scene, target: &mut Surface) {
    if scene.primitives.iter().all(Primitive::is_opaque) {
        return;
    }
    let rays = RayGen::new(camera);
    for_each_pixel(target, |x, y, dst| {
        let dir = rays.dir(x, y);
        let limit = rays
            .nearest_opaque(scene, dir)
            .map_or(f32::INFINITY, |(h, _)| h.t);

        let mut layers: Vec<(f32, [u8; 4], f32)> = scene
            .primitives
            .iter()
            .filter(|p| !p.is_opaque())
            .filter_map(|p| {
                let h = p.shape.intersect(rays.origin, dir)?;
                let point = rays.origin + dir * h.t;
                (h.t < limit && rays.in_clip(point)).then(|| {
                    let c = Rgba8Premul::from_unit_straight(lambert(scene, h.normal, p.color), 1.0);
                    (h.t, c.to_array(), p.opacity)
                })
            })
            .collect();
        layers.sort_by(|a, b| b.0.total_cmp(&a.0));

        layers
            .into_iter()
            .fold(dst, |acc, (_, color, opacity)| over(acc, color, opacity))
    });
}

#[cfg(test)]
#[path = "../../tests/unit/scene/raster.rs"]
mod tests;
