//! Component tree model consumed by the exporter.
//!
//! The tree is read-only for the whole export run. All types are
//! serializable/deserializable via serde + serde_yaml, and the serialized
//! form is what templates see.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a component type (the catalogue key).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeName(pub String);

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// One named property on a component. Properties keep their declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A configured component in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "type")]
    pub type_name: TypeName,
    #[serde(rename = "name")]
    pub short_name: String,
    /// Fully qualified name; [`ComponentTree::new`] fills it from the short
    /// name when the source document leaves it out.
    #[serde(default)]
    pub qualified_name: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub children: Vec<Component>,
}

impl Component {
    /// A leaf component with no properties.
    pub fn new(type_name: impl Into<TypeName>, short_name: impl Into<String>) -> Self {
        let short_name = short_name.into();
        Self {
            type_name: type_name.into(),
            qualified_name: short_name.clone(),
            short_name,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(Property::new(key, value));
        self
    }

    pub fn with_child(mut self, child: Component) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_qualified_name(mut self, name: impl Into<String>) -> Self {
        self.qualified_name = name.into();
        self
    }

    /// Value of the property named `key`, if present.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Property keys in declaration order.
    pub fn property_keys(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.key.as_str())
    }

    /// Lazy pre-order traversal starting at (and including) `self`.
    ///
    /// Each call returns a fresh iterator, so traversal can be restarted.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// First component in pre-order whose short name equals `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&Component> {
        self.walk().find(|c| c.short_name == name)
    }

    fn fill_qualified_names(&mut self) {
        if self.qualified_name.is_empty() {
            self.qualified_name = self.short_name.clone();
        }
        for child in &mut self.children {
            child.fill_qualified_names();
        }
    }
}

/// Pre-order iterator over a component subtree.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<&'a Component>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Component;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

// ---------------------------------------------------------------------------
// ComponentTree
// ---------------------------------------------------------------------------

/// Component type whose instances make up the subsystem collection.
pub const SUBSYSTEM_TYPE: &str = "Subsystem";
/// Component types whose instances make up the command collection.
pub const COMMAND_TYPES: &[&str] = &["Command", "Command Group"];

/// The whole component tree handed to an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTree {
    root: Component,
}

impl ComponentTree {
    pub fn new(mut root: Component) -> Self {
        root.fill_qualified_names();
        Self { root }
    }

    /// Parse a YAML component tree from `path`.
    ///
    /// Returns `ConfigError::Io` if unreadable,
    /// `ConfigError::Parse` (with path + line context) if malformed YAML.
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let root: Component = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Component {
        &self.root
    }

    pub fn walk(&self) -> Walk<'_> {
        self.root.walk()
    }

    /// Every component, root included, in pre-order.
    pub fn components(&self) -> Vec<&Component> {
        self.walk().collect()
    }

    pub fn subsystems(&self) -> Vec<&Component> {
        self.walk()
            .filter(|c| c.type_name.0 == SUBSYSTEM_TYPE)
            .collect()
    }

    pub fn commands(&self) -> Vec<&Component> {
        self.walk()
            .filter(|c| COMMAND_TYPES.contains(&c.type_name.0.as_str()))
            .collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Component> {
        self.root.find_by_name(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
