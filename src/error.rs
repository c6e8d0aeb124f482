//! Central error handling for the cubeforge renderer
//!
//! Provides a unified RenderError enum with consistent categorization.
//! Every failure aborts the in-progress render; there is no local retry.

use std::fmt;

/// Which resource kind a creation failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStage {
    Shader,
    Buffer,
    Texture,
    View,
    Sampler,
    BindGroup,
    Pipeline,
}

impl fmt::Display for ResourceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceStage::Shader => "shader",
            ResourceStage::Buffer => "buffer",
            ResourceStage::Texture => "texture",
            ResourceStage::View => "view",
            ResourceStage::Sampler => "sampler",
            ResourceStage::BindGroup => "bind group",
            ResourceStage::Pipeline => "pipeline",
        };
        f.write_str(name)
    }
}

/// Centralized error type for all renderer operations
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("Unsupported device: {0}")]
    UnsupportedDevice(String),

    #[error("Resource creation failed ({stage}): {reason}")]
    ResourceCreationFailed {
        stage: ResourceStage,
        reason: String,
    },

    #[error("Draw submission failed: {0}")]
    DrawSubmissionFailed(String),

    #[error("Readback failed: {0}")]
    ReadbackFailed(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Convenience constructors for common error types
    pub fn unsupported<T: ToString>(msg: T) -> Self {
        RenderError::UnsupportedDevice(msg.to_string())
    }

    pub fn resource<T: ToString>(stage: ResourceStage, msg: T) -> Self {
        RenderError::ResourceCreationFailed {
            stage,
            reason: msg.to_string(),
        }
    }

    pub fn draw<T: ToString>(msg: T) -> Self {
        RenderError::DrawSubmissionFailed(msg.to_string())
    }

    pub fn readback<T: ToString>(msg: T) -> Self {
        RenderError::ReadbackFailed(msg.to_string())
    }

    pub fn codec<T: ToString>(msg: T) -> Self {
        RenderError::Codec(msg.to_string())
    }
}

/// Result type alias for renderer operations
pub type RenderResult<T> = Result<T, RenderError>;
