//! Exporter description document.
//!
//! # Document shape
//!
//! ```yaml
//! Name: Java
//! Type: Java
//! Files: files.yaml             # manifest template
//! Begin Modification: "// BEGIN GENERATED {{ id }}"
//! End Modification: "// END GENERATED {{ id }}"
//! Macros: macros.tera           # optional
//! Toolbar: true                 # optional, default false
//! Vars:                         # optional, evaluated in order
//!   - Name: package
//!     Value: "org.team.robot"
//! Defaults:                     # optional
//!   Actuator:
//!     Export: RobotMap
//!     ...
//! Instructions:
//!   Motor:
//!     Defaults: [Actuator]
//!     ClassName: Motor
//! ```
//!
//! Relative paths in the document resolve against the directory that
//! contains it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalogue::{Catalogue, DefaultGroup, TypeInstructions};
use crate::error::{io_err, ConfigError};

/// One global variable declaration; `value` is a template string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarDecl {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Parsed description document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    /// Manifest template, relative to the description directory.
    #[serde(rename = "Files")]
    pub files: PathBuf,
    #[serde(rename = "Begin Modification")]
    pub begin_modification: String,
    #[serde(rename = "End Modification")]
    pub end_modification: String,
    #[serde(rename = "Macros", default, skip_serializing_if = "Option::is_none")]
    pub macros: Option<PathBuf>,
    #[serde(rename = "Toolbar", default)]
    pub toolbar: bool,
    #[serde(rename = "Vars", default)]
    pub vars: Vec<VarDecl>,
    #[serde(rename = "Defaults", default)]
    pub defaults: BTreeMap<String, DefaultGroup>,
    #[serde(rename = "Instructions")]
    pub instructions: BTreeMap<String, TypeInstructions>,
}

impl Description {
    /// Load and parse a description from `path`.
    ///
    /// Returns `ConfigError::Io` if unreadable and `ConfigError::Parse` (with
    /// path + line context, and the missing field name when one is absent)
    /// if the document does not match the expected shape.
    pub fn load_at(path: &Path) -> Result<LoadedDescription, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let document: Description =
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(LoadedDescription {
            document,
            path: path.to_path_buf(),
            base_dir,
        })
    }

    /// Resolve the instruction catalogue declared by this description.
    pub fn catalogue(&self) -> Result<Catalogue, ConfigError> {
        Catalogue::build(&self.defaults, &self.instructions)
    }

    /// Global variables as `(name, template)` pairs in declaration order.
    pub fn var_pairs(&self) -> Vec<(String, String)> {
        self.vars
            .iter()
            .map(|v| (v.name.clone(), v.value.clone()))
            .collect()
    }
}

/// A description together with where it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDescription {
    pub document: Description,
    pub path: PathBuf,
    pub base_dir: PathBuf,
}

impl LoadedDescription {
    /// Join `relative` against the description directory. Absolute paths
    /// pass through unchanged.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.base_dir.join(relative)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.document.files)
    }

    pub fn macros_path(&self) -> Option<PathBuf> {
        self.document.macros.as_ref().map(|m| self.resolve(m))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
