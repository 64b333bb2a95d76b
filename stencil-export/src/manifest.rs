//! Export planner: turns the manifest template into an ordered task list.
//!
//! The manifest is itself a template: it is rendered against the root scope
//! first (so it can use globals such as an output directory) and the result
//! is parsed as a YAML sequence of entries:
//!
//! ```yaml
//! - Export: out/Robot.java
//!   Source: Robot.java.tera
//!   Update: Modify
//!   Modifications:
//!     constructors: Robot-constructors.tera
//!   Variables:
//!     cls: Robot
//! ```
//!
//! Entry order is declaration order and is the order files are written in.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use stencil_core::LoadedDescription;
use stencil_renderer::{Render, Scope};

use crate::error::ExportError;

// ---------------------------------------------------------------------------
// UpdateMode
// ---------------------------------------------------------------------------

/// How an existing target file is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateMode {
    /// Render the whole file and replace whatever is there.
    Overwrite,
    /// Replace only the marker-delimited regions of an existing file.
    Modify,
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateMode::Overwrite => f.write_str("Overwrite"),
            UpdateMode::Modify => f.write_str("Modify"),
        }
    }
}

impl FromStr for UpdateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Overwrite" => Ok(UpdateMode::Overwrite),
            "Modify" => Ok(UpdateMode::Modify),
            other => Err(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// FileManifestEntry
// ---------------------------------------------------------------------------

/// One file-export task. Built fresh for every export run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileManifestEntry {
    /// Output path, as given (absolute or relative to the working directory).
    pub target: PathBuf,
    /// Source template, resolved against the description directory.
    pub source: PathBuf,
    pub update: UpdateMode,
    /// `(name, template)` pairs in declaration order.
    pub variables: Vec<(String, String)>,
    /// `(region id, patch template path)` pairs in declaration order; paths
    /// resolved against the description directory.
    pub modifications: Vec<(String, PathBuf)>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "Export")]
    export: PathBuf,
    #[serde(rename = "Source")]
    source: PathBuf,
    #[serde(rename = "Update")]
    update: String,
    #[serde(rename = "Modifications", default)]
    modifications: Option<Mapping>,
    #[serde(rename = "Variables", default)]
    variables: Option<Mapping>,
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Render the description's manifest template against `root` and parse it.
pub fn plan(
    description: &LoadedDescription,
    root: &Scope,
    engine: &dyn Render,
) -> Result<Vec<FileManifestEntry>, ExportError> {
    let path = description.manifest_path();
    let document = engine.render_file(&path, root)?;
    parse(&document, &description.base_dir, &path)
}

/// Parse an already-rendered manifest document.
///
/// `origin` names the manifest template in error messages. A blank document
/// yields no entries. Unknown update modes are rejected here, before any
/// file has been touched.
pub fn parse(
    document: &str,
    base_dir: &Path,
    origin: &Path,
) -> Result<Vec<FileManifestEntry>, ExportError> {
    if document.trim().is_empty() {
        return Ok(Vec::new());
    }
    let raw: Option<Vec<RawEntry>> =
        serde_yaml::from_str(document).map_err(|e| ExportError::Manifest {
            path: origin.to_path_buf(),
            source: e,
        })?;

    raw.unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, entry)| convert(index, entry, base_dir))
        .collect()
}

fn convert(index: usize, raw: RawEntry, base_dir: &Path) -> Result<FileManifestEntry, ExportError> {
    let update = raw
        .update
        .parse::<UpdateMode>()
        .map_err(|mode| ExportError::UnknownUpdateMode {
            target: raw.export.clone(),
            mode,
        })?;

    let variables = string_pairs(index, "Variables", raw.variables)?;
    let modifications = string_pairs(index, "Modifications", raw.modifications)?
        .into_iter()
        .map(|(id, patch)| (id, base_dir.join(patch)))
        .collect();

    Ok(FileManifestEntry {
        target: raw.export,
        source: base_dir.join(raw.source),
        update,
        variables,
        modifications,
    })
}

fn string_pairs(
    index: usize,
    field: &'static str,
    mapping: Option<Mapping>,
) -> Result<Vec<(String, String)>, ExportError> {
    let Some(mapping) = mapping else {
        return Ok(Vec::new());
    };
    mapping
        .into_iter()
        .map(|(k, v)| {
            let key = scalar(&k).ok_or_else(|| ExportError::InvalidEntry {
                index,
                field,
                detail: format!("key {k:?} is not a scalar"),
            })?;
            let value = scalar(&v).ok_or_else(|| ExportError::InvalidEntry {
                index,
                field,
                detail: format!("value for '{key}' is not a scalar"),
            })?;
            Ok((key, value))
        })
        .collect()
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
