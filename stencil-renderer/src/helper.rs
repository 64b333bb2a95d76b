//! Instruction helpers callable from templates.
//!
//! The same operations are available from Rust (methods on [`Helper`]) and
//! from templates, where they are registered as tera functions:
//!
//! | Function                                  | Returns                                          |
//! |-------------------------------------------|--------------------------------------------------|
//! | `class_name_of(component=c)`              | resolved `ClassName` instruction                 |
//! | `instruction_of(component=c, key="...")`  | any raw resolved instruction                     |
//! | `imports_for(category="...", root=r?)`    | sorted, deduplicated imports, newline-joined     |
//! | `exports_to(category="...", component=c)` | whether `c` exports to `category`                |
//! | `declaration_of(component=c)`             | rendered `Declaration` instruction               |
//! | `constructor_of(component=c)`             | rendered `Construction` instruction              |
//! | `extra_of(component=c)`                   | rendered `Extra` instruction                     |
//! | `find_by_name(name="...", root=r?)`       | first pre-order match, or null                   |
//!
//! Components cross the template boundary in their serialized form; `root`
//! defaults to the tree root.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde_json::Value;
use tera::Tera;

use stencil_core::{
    Catalogue, Component, ComponentTree, ConfigError, InstructionKey, InstructionSet,
};

use crate::context;
use crate::engine::{Render, TemplateEngine};
use crate::error::RenderError;
use crate::scope::Scope;

struct Inner {
    catalogue: Arc<Catalogue>,
    tree: Arc<ComponentTree>,
    scope: Scope,
    engine: TemplateEngine,
}

/// Handle to the resolved catalogue and component tree for one export run.
#[derive(Clone)]
pub struct Helper {
    inner: Arc<Inner>,
}

impl Helper {
    /// `scope` is the root scope component scopes are built on; `engine`
    /// supplies the partials instruction templates may import.
    pub fn new(
        catalogue: Arc<Catalogue>,
        tree: Arc<ComponentTree>,
        scope: Scope,
        engine: &TemplateEngine,
    ) -> Self {
        Helper {
            inner: Arc::new(Inner {
                catalogue,
                tree,
                scope,
                engine: engine.without_helper(),
            }),
        }
    }

    /// Same catalogue and tree, with component scopes built on `scope`.
    pub fn rebind(&self, scope: Scope) -> Self {
        Helper {
            inner: Arc::new(Inner {
                catalogue: Arc::clone(&self.inner.catalogue),
                tree: Arc::clone(&self.inner.tree),
                scope,
                engine: self.inner.engine.clone(),
            }),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    pub fn tree(&self) -> &ComponentTree {
        &self.inner.tree
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.inner.catalogue
    }

    pub fn instructions(&self, component: &Component) -> Result<&InstructionSet, ConfigError> {
        self.inner.catalogue.resolve(&component.type_name)
    }

    pub fn class_name_of(&self, component: &Component) -> Result<&str, ConfigError> {
        Ok(self.instructions(component)?.class_name())
    }

    pub fn instruction_of(
        &self,
        component: &Component,
        key: InstructionKey,
    ) -> Result<&str, ConfigError> {
        Ok(self.instructions(component)?.get(key))
    }

    pub fn exports_to(&self, category: &str, component: &Component) -> Result<bool, ConfigError> {
        Ok(self.instructions(component)?.export_category() == category)
    }

    /// Rendered `Import` instruction of every component under `root` whose
    /// export category is `category`; sorted, deduplicated, empty entries
    /// dropped, joined with `\n`.
    pub fn imports_for(&self, root: &Component, category: &str) -> Result<String, RenderError> {
        let mut imports = BTreeSet::new();
        for component in root.walk() {
            if self.exports_to(category, component)? {
                imports.insert(self.render_instruction(component, InstructionKey::Import)?);
            }
        }
        let imports: Vec<_> = imports.into_iter().filter(|i| !i.is_empty()).collect();
        Ok(imports.join("\n"))
    }

    pub fn declaration_of(&self, component: &Component) -> Result<String, RenderError> {
        self.render_instruction(component, InstructionKey::Declaration)
    }

    pub fn constructor_of(&self, component: &Component) -> Result<String, RenderError> {
        self.render_instruction(component, InstructionKey::Construction)
    }

    pub fn extra_of(&self, component: &Component) -> Result<String, RenderError> {
        self.render_instruction(component, InstructionKey::Extra)
    }

    /// First component in pre-order under `root` with short name `name`.
    pub fn find_by_name<'a>(&self, name: &str, root: &'a Component) -> Option<&'a Component> {
        root.find_by_name(name)
    }

    /// Component scope for `component` on top of this helper's root scope.
    pub fn component_scope(&self, component: &Component) -> Result<Scope, RenderError> {
        let instructions = self.instructions(component)?;
        context::component_scope(&self.inner.scope, component, instructions)
    }

    fn render_instruction(
        &self,
        component: &Component,
        key: InstructionKey,
    ) -> Result<String, RenderError> {
        let template = self.instruction_of(component, key)?;
        let scope = self.component_scope(component)?;
        let name = format!("{}/{}", component.type_name, key);
        self.engine().render(&name, template, &scope)
    }

    fn engine(&self) -> TemplateEngine {
        self.inner.engine.with_helper(self.clone())
    }

    /// Register every helper operation as a tera function.
    pub(crate) fn register(&self, tera: &mut Tera) {
        let h = self.clone();
        tera.register_function(
            "class_name_of",
            function(move |args| {
                let c = component_arg(args, "component")?;
                Ok(Value::String(h.class_name_of(&c).map_err(tera_err)?.to_string()))
            }),
        );

        let h = self.clone();
        tera.register_function(
            "instruction_of",
            function(move |args| {
                let c = component_arg(args, "component")?;
                let key: InstructionKey = string_arg(args, "key")?.parse().map_err(tera_err)?;
                Ok(Value::String(h.instruction_of(&c, key).map_err(tera_err)?.to_string()))
            }),
        );

        let h = self.clone();
        tera.register_function(
            "imports_for",
            function(move |args| {
                let category = string_arg(args, "category")?;
                let imports = match optional_component_arg(args, "root")? {
                    Some(root) => h.imports_for(&root, category),
                    None => h.imports_for(h.tree().root(), category),
                };
                Ok(Value::String(imports.map_err(tera_err)?))
            }),
        );

        let h = self.clone();
        tera.register_function(
            "exports_to",
            function(move |args| {
                let category = string_arg(args, "category")?;
                let c = component_arg(args, "component")?;
                Ok(Value::Bool(h.exports_to(category, &c).map_err(tera_err)?))
            }),
        );

        let h = self.clone();
        tera.register_function(
            "declaration_of",
            function(move |args| {
                let c = component_arg(args, "component")?;
                Ok(Value::String(h.declaration_of(&c).map_err(tera_err)?))
            }),
        );

        let h = self.clone();
        tera.register_function(
            "constructor_of",
            function(move |args| {
                let c = component_arg(args, "component")?;
                Ok(Value::String(h.constructor_of(&c).map_err(tera_err)?))
            }),
        );

        let h = self.clone();
        tera.register_function(
            "extra_of",
            function(move |args| {
                let c = component_arg(args, "component")?;
                Ok(Value::String(h.extra_of(&c).map_err(tera_err)?))
            }),
        );

        let h = self.clone();
        tera.register_function(
            "find_by_name",
            function(move |args| {
                let name = string_arg(args, "name")?;
                let found = match optional_component_arg(args, "root")? {
                    Some(root) => h.find_by_name(name, &root).cloned(),
                    None => h.find_by_name(name, h.tree().root()).cloned(),
                };
                match found {
                    Some(c) => serde_json::to_value(c).map_err(tera_err),
                    None => Ok(Value::Null),
                }
            }),
        );
    }
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

type Args = HashMap<String, Value>;

/// Pins the closure signature tera expects.
fn function<F>(f: F) -> F
where
    F: Fn(&Args) -> tera::Result<Value> + Send + Sync,
{
    f
}

fn tera_err(err: impl std::fmt::Display) -> tera::Error {
    tera::Error::msg(err.to_string())
}

fn string_arg<'a>(args: &'a Args, name: &str) -> tera::Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg(format!("expected string argument `{name}`")))
}

fn component_arg(args: &Args, name: &str) -> tera::Result<Component> {
    optional_component_arg(args, name)?
        .ok_or_else(|| tera::Error::msg(format!("missing component argument `{name}`")))
}

fn optional_component_arg(args: &Args, name: &str) -> tera::Result<Option<Component>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| tera::Error::msg(format!("argument `{name}` is not a component: {e}"))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
