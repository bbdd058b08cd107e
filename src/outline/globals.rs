use std::sync::Arc;

use crate::assets::texture::Texture2D;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::OutlineResult;
use crate::host::world::{Behaviour, World};
use crate::shader::globals::{CAMERA_TO_WORLD, NOISE_TEXTURE};

/// Result of one per-frame publish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The active camera's camera-to-world matrix was written.
    Published,
    /// There was no active camera; nothing was written.
    SkippedNoCamera,
}

/// Publishes the global noise texture once and the active camera's camera-to-world matrix every
/// frame.
#[derive(Clone, Debug)]
pub struct GlobalsPublisher {
    noise: Arc<Texture2D>,
    published: u64,
    skipped: u64,
    last: Option<PublishOutcome>,
}

impl GlobalsPublisher {
    pub fn new(noise: Arc<Texture2D>) -> Self {
        Self {
            noise,
            published: 0,
            skipped: 0,
            last: None,
        }
    }

    pub fn noise(&self) -> &Arc<Texture2D> {
        &self.noise
    }

    /// Frames that wrote the camera matrix.
    pub fn published_frames(&self) -> u64 {
        self.published
    }

    /// Frames skipped for lack of an active camera.
    pub fn skipped_frames(&self) -> u64 {
        self.skipped
    }

    /// Write the active camera's camera-to-world matrix, if there is an active camera.
    pub fn publish(&mut self, world: &mut World) -> PublishOutcome {
        let outcome = match world.active_camera().map(|c| c.camera_to_world()) {
            Some(m) => {
                world.globals.set_global_matrix(CAMERA_TO_WORLD, m);
                self.published += 1;
                PublishOutcome::Published
            }
            None => {
                if self.last != Some(PublishOutcome::SkippedNoCamera) {
                    tracing::warn!("no active camera; {CAMERA_TO_WORLD} not updated");
                }
                self.skipped += 1;
                PublishOutcome::SkippedNoCamera
            }
        };
        self.last = Some(outcome);
        outcome
    }
}

impl Behaviour for GlobalsPublisher {
    fn name(&self) -> &str {
        "GlobalsPublisher"
    }

    fn start(&mut self, world: &mut World) -> OutlineResult<()> {
        world
            .globals
            .set_global_texture(NOISE_TEXTURE, Arc::clone(&self.noise));
        Ok(())
    }

    fn update(&mut self, world: &mut World, frame: FrameIndex) -> OutlineResult<()> {
        let outcome = self.publish(world);
        tracing::trace!(frame = frame.0, ?outcome, "globals published");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/outline/globals.rs"]
mod tests;
