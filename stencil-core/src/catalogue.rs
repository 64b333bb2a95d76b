//! Instruction catalogue.
//!
//! Every component type gets one [`InstructionSet`], resolved once when the
//! catalogue is built. Per key, the type's own override wins; otherwise the
//! type's defaults groups are scanned in their declared order and the first
//! group defining the key supplies it. Later groups are never consulted once
//! an earlier one matched.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::TypeName;

// ---------------------------------------------------------------------------
// InstructionKey
// ---------------------------------------------------------------------------

/// The fixed set of per-type instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstructionKey {
    Export,
    Import,
    Declaration,
    Construction,
    Extra,
    ClassName,
    SubsystemExport,
    Template,
}

impl InstructionKey {
    /// All keys in a stable order.
    pub fn all() -> &'static [InstructionKey] {
        &[
            InstructionKey::Export,
            InstructionKey::Import,
            InstructionKey::Declaration,
            InstructionKey::Construction,
            InstructionKey::Extra,
            InstructionKey::ClassName,
            InstructionKey::SubsystemExport,
            InstructionKey::Template,
        ]
    }

    /// Spelling used in description documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstructionKey::Export          => "Export",
            InstructionKey::Import          => "Import",
            InstructionKey::Declaration     => "Declaration",
            InstructionKey::Construction    => "Construction",
            InstructionKey::Extra           => "Extra",
            InstructionKey::ClassName       => "ClassName",
            InstructionKey::SubsystemExport => "Subsystem Export",
            InstructionKey::Template        => "Template",
        }
    }
}

impl fmt::Display for InstructionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for InstructionKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstructionKey::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownInstructionKey { key: s.to_string() })
    }
}

// ---------------------------------------------------------------------------
// Raw description shapes
// ---------------------------------------------------------------------------

/// A named, reusable bundle of instruction templates.
pub type DefaultGroup = BTreeMap<String, String>;

/// Per-type instruction block as written in the description document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInstructions {
    /// Defaults groups in precedence order; the first group defining a key wins.
    #[serde(rename = "Defaults", default)]
    pub defaults: Vec<String>,
    /// Explicit per-key overrides.
    #[serde(flatten)]
    pub overrides: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// InstructionSet
// ---------------------------------------------------------------------------

/// Fully resolved instructions for one component type.
///
/// Built only by [`Catalogue::build`], which guarantees every key is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSet {
    values: BTreeMap<InstructionKey, String>,
}

impl InstructionSet {
    pub fn get(&self, key: InstructionKey) -> &str {
        self.values.get(&key).map(String::as_str).unwrap_or_default()
    }

    pub fn export_category(&self) -> &str {
        self.get(InstructionKey::Export)
    }

    pub fn class_name(&self) -> &str {
        self.get(InstructionKey::ClassName)
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstructionKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// Resolved instruction sets for every known component type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalogue {
    sets: BTreeMap<TypeName, InstructionSet>,
}

impl Catalogue {
    /// Resolve every key of every type eagerly.
    ///
    /// Fails on the first type/key that cannot be resolved, or on a type that
    /// references a defaults group which is not declared.
    pub fn build(
        defaults: &BTreeMap<String, DefaultGroup>,
        instructions: &BTreeMap<String, TypeInstructions>,
    ) -> Result<Self, ConfigError> {
        let mut sets = BTreeMap::new();
        for (type_name, decl) in instructions {
            let set = resolve_type(type_name, decl, defaults)?;
            sets.insert(TypeName::from(type_name.as_str()), set);
        }
        Ok(Catalogue { sets })
    }

    pub fn resolve(&self, type_name: &TypeName) -> Result<&InstructionSet, ConfigError> {
        self.sets
            .get(type_name)
            .ok_or_else(|| ConfigError::UnknownComponentType {
                component_type: type_name.0.clone(),
            })
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeName> {
        self.sets.keys()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

fn resolve_type(
    type_name: &str,
    decl: &TypeInstructions,
    defaults: &BTreeMap<String, DefaultGroup>,
) -> Result<InstructionSet, ConfigError> {
    let groups = decl
        .defaults
        .iter()
        .map(|name| {
            defaults
                .get(name)
                .ok_or_else(|| ConfigError::UnknownDefaultGroup {
                    component_type: type_name.to_string(),
                    group: name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for key in decl.overrides.keys() {
        if key.parse::<InstructionKey>().is_err() {
            tracing::warn!("component type '{type_name}': ignoring unknown instruction '{key}'");
        }
    }

    let mut values = BTreeMap::new();
    for key in InstructionKey::all() {
        let name = key.as_str();
        let value = decl
            .overrides
            .get(name)
            .or_else(|| groups.iter().find_map(|group| group.get(name)))
            .ok_or_else(|| ConfigError::UnresolvedInstruction {
                component_type: type_name.to_string(),
                key: name.to_string(),
            })?;
        values.insert(*key, value.clone());
    }
    Ok(InstructionSet { values })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
