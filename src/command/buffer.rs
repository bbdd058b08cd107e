use std::collections::HashSet;
use std::sync::Arc;

use crate::foundation::error::{OutlineError, OutlineResult};
use crate::render::surface::SurfaceDesc;
use crate::shader::globals::PropertyId;
use crate::shader::program::ShaderProgram;

/// Render targets owned by the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinTarget {
    /// The camera's color output.
    CameraTarget,
    /// Linear depth, packed into RGBA8.
    Depth,
    /// View normals and linear depth, packed into RGBA8.
    DepthNormals,
}

/// Source or destination of a blit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderTargetId {
    /// Camera-owned target.
    Builtin(BuiltinTarget),
    /// Temporary surface acquired earlier in the same buffer.
    Temporary(PropertyId),
}

impl From<BuiltinTarget> for RenderTargetId {
    fn from(t: BuiltinTarget) -> Self {
        Self::Builtin(t)
    }
}

impl From<PropertyId> for RenderTargetId {
    fn from(id: PropertyId) -> Self {
        Self::Temporary(id)
    }
}

/// Which sub-passes of a program a blit runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassSelector {
    /// Every pass, in index order.
    All,
    /// A single pass.
    Index(usize),
}

/// Copy `src` into `dst`, optionally through a program.
#[derive(Clone, Debug)]
pub struct Blit {
    /// Surface read by the program.
    pub src: RenderTargetId,
    /// Surface written by the program.
    pub dst: RenderTargetId,
    /// Program to run. `None` is a plain resampling copy.
    pub program: Option<Arc<dyn ShaderProgram>>,
    /// Sub-passes to run.
    pub pass: PassSelector,
}

/// A recorded operation.
#[derive(Clone, Debug)]
pub enum Command {
    /// Acquire a temporary surface and bind it to `id`.
    GetTemporary {
        /// Binding for later commands.
        id: PropertyId,
        /// Surface descriptor.
        desc: SurfaceDesc,
    },
    /// Run a blit.
    Blit(Blit),
    /// Release the temporary surface bound to `id`.
    ReleaseTemporary {
        /// Binding to release.
        id: PropertyId,
    },
}

/// Ordered batch of commands executed at a camera insertion point.
#[derive(Clone, Debug, Default)]
pub struct CommandBuffer {
    name: String,
    commands: Vec<Command>,
}

impl CommandBuffer {
    /// Create an empty buffer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    /// Debug name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recorded commands in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Record a temporary surface acquisition.
    pub fn get_temporary(&mut self, id: PropertyId, desc: SurfaceDesc) -> &mut Self {
        self.commands.push(Command::GetTemporary { id, desc });
        self
    }

    /// Record a plain copy.
    pub fn blit(
        &mut self,
        src: impl Into<RenderTargetId>,
        dst: impl Into<RenderTargetId>,
    ) -> &mut Self {
        self.commands.push(Command::Blit(Blit {
            src: src.into(),
            dst: dst.into(),
            program: None,
            pass: PassSelector::All,
        }));
        self
    }

    /// Record a blit through `program`.
    pub fn blit_with(
        &mut self,
        src: impl Into<RenderTargetId>,
        dst: impl Into<RenderTargetId>,
        program: Arc<dyn ShaderProgram>,
        pass: PassSelector,
    ) -> &mut Self {
        self.commands.push(Command::Blit(Blit {
            src: src.into(),
            dst: dst.into(),
            program: Some(program),
            pass,
        }));
        self
    }

    /// Record a temporary surface release.
    pub fn release_temporary(&mut self, id: PropertyId) -> &mut Self {
        self.commands.push(Command::ReleaseTemporary { id });
        self
    }

    /// Whether any blit reads `target`.
    pub fn reads(&self, target: BuiltinTarget) -> bool {
        self.commands.iter().any(|c| match c {
            Command::Blit(b) => b.src == RenderTargetId::Builtin(target),
            _ => false,
        })
    }

    /// Check temporary lifetimes and pass indices.
    ///
    /// Every temporary must be acquired before use, must not be acquired again while live, must be
    /// released exactly once and must not be used after release.
    pub fn validate(&self) -> OutlineResult<()> {
        let mut live: HashSet<PropertyId> = HashSet::new();
        let err = |idx: usize, msg: String| {
            OutlineError::validation(format!(
                "command buffer '{}' command {idx}: {msg}",
                self.name
            ))
        };

        for (idx, cmd) in self.commands.iter().enumerate() {
            match cmd {
                Command::GetTemporary { id, desc } => {
                    desc.validate().map_err(|e| err(idx, e.to_string()))?;
                    if !live.insert(*id) {
                        return Err(err(idx, format!("temporary {id:?} acquired twice")));
                    }
                }
                Command::Blit(b) => {
                    for t in [b.src, b.dst] {
                        if let RenderTargetId::Temporary(id) = t
                            && !live.contains(&id)
                        {
                            return Err(err(idx, format!("temporary {id:?} is not acquired")));
                        }
                    }
                    if let Some(program) = &b.program {
                        if program.pass_count() == 0 {
                            return Err(err(
                                idx,
                                format!("program '{}' has no passes", program.name()),
                            ));
                        }
                        if let PassSelector::Index(p) = b.pass
                            && p >= program.pass_count()
                        {
                            return Err(err(
                                idx,
                                format!(
                                    "program '{}' has {} passes, pass {p} requested",
                                    program.name(),
                                    program.pass_count()
                                ),
                            ));
                        }
                    }
                }
                Command::ReleaseTemporary { id } => {
                    if !live.remove(id) {
                        return Err(err(
                            idx,
                            format!("temporary {id:?} released while not held"),
                        ));
                    }
                }
            }
        }

        if let Some(id) = live.iter().min() {
            return Err(OutlineError::validation(format!(
                "command buffer '{}' leaks temporary {id:?}",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/command/buffer.rs"]
mod tests;
