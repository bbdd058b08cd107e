use crate::command::buffer::{Blit, Command, CommandBuffer};
use crate::foundation::error::OutlineResult;
use crate::render::surface::SurfaceDesc;
use crate::shader::globals::PropertyId;

/// A rendered frame read back from the camera target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Executes recorded commands against some storage.
pub trait CommandBackend {
    fn get_temporary(&mut self, id: PropertyId, desc: &SurfaceDesc) -> OutlineResult<()>;

    fn blit(&mut self, blit: &Blit) -> OutlineResult<()>;

    fn release_temporary(&mut self, id: PropertyId) -> OutlineResult<()>;
}

/// Run every command of `buffer` in recorded order, stopping at the first error.
pub fn execute_command_buffer<B: CommandBackend + ?Sized>(
    backend: &mut B,
    buffer: &CommandBuffer,
) -> OutlineResult<()> {
    for cmd in buffer.commands() {
        match cmd {
            Command::GetTemporary { id, desc } => backend.get_temporary(*id, desc)?,
            Command::Blit(b) => backend.blit(b)?,
            Command::ReleaseTemporary { id } => backend.release_temporary(*id)?,
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
