//! Error types for stencil-renderer.

use std::error::Error as _;
use std::path::PathBuf;

use thiserror::Error;

use stencil_core::ConfigError;

/// All errors that can arise from template rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera failed to parse or render a template. `detail` carries the whole
    /// error chain, which is where tera puts the interesting part.
    #[error("failed to render '{name}': {detail}")]
    Template { name: String, detail: String },

    /// JSON serialization error (building tera context).
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while loading a template.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Instruction lookup failed for a component.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RenderError {
    pub(crate) fn template(name: &str, err: &tera::Error) -> Self {
        let mut detail = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            detail.push_str(": ");
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        RenderError::Template {
            name: name.to_string(),
            detail,
        }
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
