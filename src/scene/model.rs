use serde::{Deserialize, Serialize};

use crate::foundation::core::Vec3;
use crate::foundation::error::{OutlineError, OutlineResult};

const HIT_EPSILON: f32 = 1e-4;

/// Analytic geometry understood by the CPU host renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Sphere.
    Sphere {
        /// World-space center.
        center: Vec3,
        /// Radius, > 0.
        radius: f32,
    },
    /// Infinite plane.
    Plane {
        /// Any point on the plane.
        point: Vec3,
        /// Plane normal; normalized on use.
        normal: Vec3,
    },
    /// Axis-aligned box.
    Cuboid {
        /// World-space center.
        center: Vec3,
        /// Half size along each axis, all > 0.
        half_extents: Vec3,
    },
}

/// A ray hit: distance along the ray and the world-space surface normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeHit {
    /// Ray parameter of the hit.
    pub t: f32,
    /// Unit world-space normal facing the ray origin side of the surface.
    pub normal: Vec3,
}

impl Shape {
    fn validate(&self) -> OutlineResult<()> {
        match self {
            Self::Sphere { radius, .. } if !(*radius > 0.0) => {
                Err(OutlineError::validation("sphere radius must be > 0"))
            }
            Self::Plane { normal, .. } if normal.length_squared() < 1e-12 => {
                Err(OutlineError::validation("plane normal must be non-zero"))
            }
            Self::Cuboid { half_extents, .. } if half_extents.min_element() <= 0.0 => {
                Err(OutlineError::validation("cuboid half_extents must be > 0"))
            }
            _ => Ok(()),
        }
    }

    /// Nearest hit with `t > epsilon` along `origin + t * dir`.
    pub fn intersect(&self, origin: Vec3, dir: Vec3) -> Option<ShapeHit> {
        match *self {
            Self::Sphere { center, radius } => {
                let oc = origin - center;
                let a = dir.dot(dir);
                let half_b = oc.dot(dir);
                let c = oc.dot(oc) - radius * radius;
                let disc = half_b * half_b - a * c;
                if disc < 0.0 {
                    return None;
                }
                let sq = disc.sqrt();
                let near = (-half_b - sq) / a;
                let t = if near > HIT_EPSILON {
                    near
                } else {
                    let far = (-half_b + sq) / a;
                    if far > HIT_EPSILON { far } else { return None }
                };
                let normal = ((origin + dir * t) - center) / radius;
                Some(ShapeHit {
                    t,
                    normal: face_toward(normal.normalize(), dir),
                })
            }
            Self::Plane { point, normal } => {
                let n = normal.normalize();
                let denom = n.dot(dir);
                if denom.abs() < 1e-8 {
                    return None;
                }
                let t = (point - origin).dot(n) / denom;
                (t > HIT_EPSILON).then(|| ShapeHit {
                    t,
                    normal: face_toward(n, dir),
                })
            }
            Self::Cuboid {
                center,
                half_extents,
            } => {
                let min = center - half_extents;
                let max = center + half_extents;
                let inv = dir.recip();
                let t0 = (min - origin) * inv;
                let t1 = (max - origin) * inv;
                let tmin = t0.min(t1);
                let tmax = t0.max(t1);
                let enter = tmin.max_element();
                let exit = tmax.min_element();
                if enter > exit || exit <= HIT_EPSILON {
                    return None;
                }
                let t = if enter > HIT_EPSILON { enter } else { exit };
                let local = (origin + dir * t - center) / half_extents;
                let a = local.abs();
                let normal = if a.x >= a.y && a.x >= a.z {
                    Vec3::new(local.x.signum(), 0.0, 0.0)
                } else if a.y >= a.z {
                    Vec3::new(0.0, local.y.signum(), 0.0)
                } else {
                    Vec3::new(0.0, 0.0, local.z.signum())
                };
                Some(ShapeHit {
                    t,
                    normal: face_toward(normal, dir),
                })
            }
        }
    }
}

fn face_toward(n: Vec3, dir: Vec3) -> Vec3 {
    if n.dot(dir) > 0.0 { -n } else { n }
}

fn default_opacity() -> f32 {
    1.0
}

/// A shape with a flat color. Opacity below 1 is drawn in the transparent stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    /// Geometry.
    pub shape: Shape,
    /// Straight RGB color.
    pub color: [u8; 3],
    /// Opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

impl Primitive {
    /// Whether the primitive is drawn in the opaque stage.
    pub fn is_opaque(&self) -> bool {
        self.opacity >= 1.0
    }
}

/// Scene content drawn by the host stages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Geometry.
    pub primitives: Vec<Primitive>,
    /// Direction the light travels in.
    pub light_dir: Vec3,
    /// Ambient term in `[0, 1]`.
    pub ambient: f32,
    /// Sky color straight up.
    pub sky_top: [u8; 3],
    /// Sky color at and below the horizon.
    pub sky_bottom: [u8; 3],
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            primitives: Vec::new(),
            light_dir: Vec3::new(-0.4, -1.0, -0.6),
            ambient: 0.25,
            sky_top: [120, 170, 235],
            sky_bottom: [225, 235, 245],
        }
    }
}

impl Scene {
    /// Check every primitive and the lighting terms.
    pub fn validate(&self) -> OutlineResult<()> {
        for (i, p) in self.primitives.iter().enumerate() {
            p.shape
                .validate()
                .map_err(|e| OutlineError::validation(format!("primitive {i}: {e}")))?;
            if !(0.0..=1.0).contains(&p.opacity) {
                return Err(OutlineError::validation(format!(
                    "primitive {i}: opacity must be in [0, 1]"
                )));
            }
        }
        if self.light_dir.length_squared() < 1e-12 {
            return Err(OutlineError::validation("light_dir must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.ambient) {
            return Err(OutlineError::validation("ambient must be in [0, 1]"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
