/// Convenience result type used across the outline pipeline.
pub type OutlineResult<T> = Result<T, OutlineError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum OutlineError {
    /// A required camera or program reference was not provided at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A camera or surface precondition does not hold (for example depth/normal generation is
    /// disabled on a camera whose command buffer reads the depth/normal target).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Invalid user-provided data: descriptors, command buffers, insertion points, project files.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failures while executing a pass over surfaces.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OutlineError {
    /// Build an [`OutlineError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build an [`OutlineError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build an [`OutlineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`OutlineError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build an [`OutlineError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
