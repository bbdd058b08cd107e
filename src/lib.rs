//! CPU outline post-process pipeline.
//!
//! A camera renders depth+normals, opaque geometry and sky; a command buffer attached before
//! transparent geometry detects depth/normal discontinuities into a scratch surface and
//! composites them over the camera target. A publisher keeps a global noise texture and the
//! camera-to-world matrix in the shared shader parameter table for triplanar noise modulation.
//!
//! - Load and validate an [`OutlineProject`]
//! - Create an [`OutlineSession`]
//! - Render frames, or drive a [`Host`] with your own [`Behaviour`]s
#![forbid(unsafe_code)]

mod assets;
mod command;
mod foundation;
mod host;
mod outline;
mod render;
mod scene;
mod shader;

/// JSON project files.
pub mod project;
/// Project-driven rendering.
pub mod session;

pub use crate::assets::texture::Texture2D;
pub use crate::command::buffer::{
    Blit, BuiltinTarget, Command, CommandBuffer, PassSelector, RenderTargetId,
};
pub use crate::command::event::{CameraEvent, FramePipeline, PipelineStep, RenderStage};
pub use crate::foundation::core::{
    Canvas, FrameIndex, MAX_CANVAS_SIZE, Mat4, Rgba8Premul, Vec2, Vec3, Vec4,
};
pub use crate::foundation::error::{OutlineError, OutlineResult};
pub use crate::host::orbit::CameraOrbit;
pub use crate::host::runner::{FrameReport, Host, render_camera};
pub use crate::host::world::{Behaviour, World};
pub use crate::outline::camera::{
    COMMAND_BUFFER_NAME, INSERTION_POINT, OutlineCamera, SCREEN_COPY_TEXTURE,
};
pub use crate::outline::globals::{GlobalsPublisher, PublishOutcome};
pub use crate::project::{CameraDef, NoiseSource, OutlineDef, OutlineProject};
pub use crate::render::backend::{CommandBackend, FrameRGBA, execute_command_buffer};
pub use crate::render::composite::{over, over_in_place};
pub use crate::render::cpu::{CameraTargets, CpuBackend, CpuBackendStats};
pub use crate::render::encoding::{DepthNormal, MAX_ENCODABLE_DEPTH, pack_depth, pack_depth_normal};
pub use crate::render::pool::{SurfacePoolOpts, SurfacePoolStats, TemporarySurfacePool};
pub use crate::render::surface::{FilterMode, Surface, SurfaceDesc, SurfaceFormat};
pub use crate::scene::camera::{Camera, CameraId, DepthNormalsPolicy, DepthTextureMode, Projection};
pub use crate::scene::model::{Primitive, Scene, Shape, ShapeHit};
pub use crate::session::OutlineSession;
pub use crate::shader::blend::OutlineBlendProgram;
pub use crate::shader::edge_detect::{EdgeDetectParams, EdgeDetectProgram};
pub use crate::shader::globals::{
    CAMERA_TO_WORLD, GlobalValue, NOISE_TEXTURE, PropertyId, ShaderGlobals,
};
pub use crate::shader::program::{ShaderEnv, ShaderProgram};
