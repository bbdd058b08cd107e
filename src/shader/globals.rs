use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::assets::texture::Texture2D;
use crate::foundation::core::Mat4;
use crate::foundation::math::Fnv1a64;

/// Global noise texture sampled triplanar by outline-capable programs.
pub const NOISE_TEXTURE: &str = "_NagaiGlobalNoise";
/// Camera-to-world matrix of the active camera, republished every frame.
pub const CAMERA_TO_WORLD: &str = "_CameraMV";

/// Stable identifier for a named shader property.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(u64);

impl PropertyId {
    /// Hash `name` into an id. Equal names always produce equal ids.
    pub fn of(name: &str) -> Self {
        let mut h = Fnv1a64::new_default();
        h.write_bytes(name.as_bytes());
        Self(h.finish())
    }

    /// Raw hash value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({:#018x})", self.0)
    }
}

impl From<&str> for PropertyId {
    fn from(name: &str) -> Self {
        Self::of(name)
    }
}

/// A value stored in the shader parameter table.
#[derive(Clone, Debug)]
pub enum GlobalValue {
    /// Shared texture handle.
    Texture(Arc<Texture2D>),
    /// 4x4 matrix.
    Matrix(Mat4),
    /// Scalar.
    Float(f32),
}

#[derive(Clone, Debug)]
struct GlobalEntry {
    name: String,
    value: GlobalValue,
    writes: u64,
}

/// Shared parameter table read by every program during a blit.
///
/// There is exactly one writer per frame (the globals publisher); programs only read. The table is
/// passed explicitly into each submission instead of living in process-wide state.
#[derive(Clone, Debug, Default)]
pub struct ShaderGlobals {
    entries: HashMap<PropertyId, GlobalEntry>,
    total_writes: u64,
}

impl ShaderGlobals {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&mut self, name: &str, value: GlobalValue) {
        self.total_writes = self.total_writes.saturating_add(1);
        let entry = self
            .entries
            .entry(PropertyId::of(name))
            .or_insert_with(|| GlobalEntry {
                name: name.to_owned(),
                value: value.clone(),
                writes: 0,
            });
        entry.value = value;
        entry.writes = entry.writes.saturating_add(1);
    }

    /// Bind a texture under `name`.
    pub fn set_global_texture(&mut self, name: &str, texture: Arc<Texture2D>) {
        self.set(name, GlobalValue::Texture(texture));
    }

    /// Store a matrix under `name`.
    pub fn set_global_matrix(&mut self, name: &str, m: Mat4) {
        self.set(name, GlobalValue::Matrix(m));
    }

    /// Store a scalar under `name`.
    pub fn set_global_float(&mut self, name: &str, v: f32) {
        self.set(name, GlobalValue::Float(v));
    }

    /// Look up any value.
    pub fn get(&self, id: impl Into<PropertyId>) -> Option<&GlobalValue> {
        self.entries.get(&id.into()).map(|e| &e.value)
    }

    /// Texture stored under `name`, if the entry exists and is a texture.
    pub fn texture(&self, name: &str) -> Option<&Arc<Texture2D>> {
        match self.get(name) {
            Some(GlobalValue::Texture(t)) => Some(t),
            _ => None,
        }
    }

    /// Matrix stored under `name`, if the entry exists and is a matrix.
    pub fn matrix(&self, name: &str) -> Option<Mat4> {
        match self.get(name) {
            Some(GlobalValue::Matrix(m)) => Some(*m),
            _ => None,
        }
    }

    /// Scalar stored under `name`.
    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name) {
            Some(GlobalValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// How many times `name` has been written.
    pub fn writes(&self, name: &str) -> u64 {
        self.entries
            .get(&PropertyId::of(name))
            .map_or(0, |e| e.writes)
    }

    /// Writes across all entries since creation.
    pub fn total_writes(&self) -> u64 {
        self.total_writes
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut v: Vec<&str> = self.entries.values().map(|e| e.name.as_str()).collect();
        v.sort_unstable();
        v
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/globals.rs"]
mod tests;
