//! Error types for stencil-core.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration-integrity and loading errors.
///
/// Every variant is fatal: construction or export stops when one is raised.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the path that was being read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No explicit override and no referenced defaults group supplies the key.
    #[error("component type '{component_type}' has no value for instruction '{key}'")]
    UnresolvedInstruction { component_type: String, key: String },

    /// A component type lists a defaults group that is not declared.
    #[error("component type '{component_type}' references unknown defaults group '{group}'")]
    UnknownDefaultGroup { component_type: String, group: String },

    /// A component in the tree has a type the catalogue knows nothing about.
    #[error("no instructions for component type '{component_type}'")]
    UnknownComponentType { component_type: String },

    /// A string that should name an instruction key does not.
    #[error("unknown instruction key '{key}'")]
    UnknownInstructionKey { key: String },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
