use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::texture::Texture2D;
use crate::foundation::core::{Canvas, Vec3};
use crate::foundation::error::{OutlineError, OutlineResult};
use crate::scene::camera::Projection;
use crate::scene::model::Scene;
use crate::shader::edge_detect::EdgeDetectParams;

/// Camera placement and projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDef {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    /// Rotation about `up` around `target`, per frame. Zero keeps the camera still.
    pub orbit_degrees_per_frame: f32,
}

impl Default for CameraDef {
    fn default() -> Self {
        let p = Projection::default();
        Self {
            position: Vec3::new(0.0, 1.5, 6.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_deg: p.fov_y_deg,
            near: p.near,
            far: p.far,
            orbit_degrees_per_frame: 0.0,
        }
    }
}

impl CameraDef {
    /// Projection with aspect left at its default; the camera syncs it to the canvas.
    pub fn projection(&self) -> Projection {
        Projection {
            fov_y_deg: self.fov_y_deg,
            near: self.near,
            far: self.far,
            ..Projection::default()
        }
    }
}

/// Edge-detection parameters plus the composite opacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineDef {
    #[serde(flatten)]
    pub edges: EdgeDetectParams,
    pub opacity: f32,
}

impl Default for OutlineDef {
    fn default() -> Self {
        Self {
            edges: EdgeDetectParams::default(),
            opacity: 1.0,
        }
    }
}

/// Where the global noise texture comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoiseSource {
    /// Tileable value noise generated at load time.
    Procedural { size: u32, seed: u64 },
    /// PNG file, relative to the project's asset root.
    Png { path: String },
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::Procedural { size: 64, seed: 1 }
    }
}

impl NoiseSource {
    /// Build the texture. Relative PNG paths are resolved against `assets_root`.
    pub fn load(&self, assets_root: &Path) -> OutlineResult<Arc<Texture2D>> {
        let tex = match self {
            Self::Procedural { size, seed } => Texture2D::procedural_noise(*size, *seed)?,
            Self::Png { path } => Texture2D::from_png(assets_root.join(path))?,
        };
        Ok(Arc::new(tex))
    }
}

/// JSON-facing description of a rendered outline scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutlineProject {
    pub canvas: Canvas,
    #[serde(default)]
    pub camera: CameraDef,
    #[serde(default)]
    pub outline: OutlineDef,
    #[serde(default)]
    pub noise: NoiseSource,
    #[serde(default)]
    pub scene: Scene,
}

impl OutlineProject {
    /// Parse a project from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> OutlineResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| OutlineError::serde(format!("parse project JSON: {e}")))
    }

    /// Parse a project from a JSON string.
    pub fn from_json_str(s: &str) -> OutlineResult<Self> {
        serde_json::from_str(s).map_err(|e| OutlineError::serde(format!("parse project JSON: {e}")))
    }

    /// Parse a project from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> OutlineResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            OutlineError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize as pretty JSON.
    pub fn to_json_string(&self) -> OutlineResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| OutlineError::serde(format!("serialize project JSON: {e}")))
    }

    /// Check every section.
    pub fn validate(&self) -> OutlineResult<()> {
        self.canvas.validate()?;
        let mut projection = self.camera.projection();
        projection.aspect = self.canvas.aspect();
        projection.validate()?;

        let forward = self.camera.target - self.camera.position;
        if forward.length_squared() < 1e-12
            || forward.cross(self.camera.up).length_squared() < 1e-12
        {
            return Err(OutlineError::validation(
                "camera position/target/up must describe a valid look-at",
            ));
        }
        if !self.camera.orbit_degrees_per_frame.is_finite() {
            return Err(OutlineError::validation(
                "camera orbit_degrees_per_frame must be finite",
            ));
        }

        self.outline.edges.validate()?;
        if !(0.0..=1.0).contains(&self.outline.opacity) {
            return Err(OutlineError::validation(
                "outline opacity must be in [0, 1]",
            ));
        }

        match &self.noise {
            NoiseSource::Procedural { size, .. } if *size == 0 => {
                return Err(OutlineError::validation("noise size must be > 0"));
            }
            NoiseSource::Png { path } if path.is_empty() => {
                return Err(OutlineError::validation("noise path must be non-empty"));
            }
            _ => {}
        }

        self.scene.validate()
    }
}

#[cfg(test)]
#[path = "../tests/unit/project.rs"]
mod tests;
