//! Error types for stencil-export.

use std::path::PathBuf;

use thiserror::Error;

use stencil_core::ConfigError;
use stencil_renderer::RenderError;

/// All errors that can arise from planning and materializing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Description or catalogue integrity error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rendered manifest is not a sequence of entry mappings.
    #[error("failed to parse manifest rendered from {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A manifest entry is structurally valid YAML but not a valid entry.
    #[error("manifest entry {index} ({field}): {detail}")]
    InvalidEntry {
        index: usize,
        field: &'static str,
        detail: String,
    },

    /// `Update` is neither `Overwrite` nor `Modify`.
    #[error("unknown update mode '{mode}' for {target}")]
    UnknownUpdateMode { target: PathBuf, mode: String },

    /// A begin or end marker rendered to an empty string.
    #[error("{which} marker for region '{region}' rendered empty")]
    EmptyMarker { region: String, which: &'static str },

    /// Materializing one manifest entry failed; later entries were not attempted.
    #[error("export of {target} failed: {source}")]
    Entry {
        target: PathBuf,
        #[source]
        source: Box<ExportError>,
    },
}

/// Convenience constructor for [`ExportError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.into(),
        source,
    }
}
