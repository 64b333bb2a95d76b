//! Stencil core library: component tree, description document, instruction
//! catalogue, errors.
//!
//! Public API surface:
//! - [`types`]: component tree model and pre-order walk
//! - [`description`]: exporter description document loading
//! - [`catalogue`]: per-type instruction resolution through defaults groups
//! - [`error`]: [`ConfigError`]

pub mod catalogue;
pub mod description;
pub mod error;
pub mod types;

pub use catalogue::{Catalogue, DefaultGroup, InstructionKey, InstructionSet, TypeInstructions};
pub use description::{Description, LoadedDescription, VarDecl};
pub use error::ConfigError;
pub use types::{Component, ComponentTree, Property, TypeName, Walk};
