//! Context builder: composes the scopes templates render against.
//!
//! ```text
//! root scope       root, exporter_path, components, export_subsystems,
//!                  subsystems, export_commands, commands, globals...
//!   component      ClassName, Name, Short_Name, <normalized properties>
//!   file           per-entry Variables
//!     region       id
//! ```
//!
//! Global variables and per-file variables go through the same
//! [`bind_variables`]: each value is a template rendered against the scope
//! built so far, so a variable sees the ones declared before it and never
//! the ones after it.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use stencil_core::{Catalogue, Component, ComponentTree, InstructionSet};

use crate::engine::{Render, TemplateEngine};
use crate::error::RenderError;
use crate::helper::Helper;
use crate::scope::Scope;

/// Root property toggling subsystem export.
pub const EXPORT_SUBSYSTEMS: &str = "Export Subsystems";
/// Root property toggling command export.
pub const EXPORT_COMMANDS: &str = "Export Commands";

/// Character substituted for spaces in property keys.
pub const KEY_FILLER: char = '_';

/// Root scope plus the engine (with helper functions) bound to it.
#[derive(Clone)]
pub struct RootContext {
    pub scope: Scope,
    pub engine: TemplateEngine,
}

impl RootContext {
    pub fn helper(&self) -> Option<&Helper> {
        self.engine.helper()
    }
}

/// Build the root context for one export run.
///
/// Globals are evaluated in declaration order. Helper functions called from
/// a global render instructions against the root scope built so far, so
/// they see every global declared before it.
pub fn build_root_context(
    tree: Arc<ComponentTree>,
    catalogue: Arc<Catalogue>,
    exporter_path: &Path,
    globals: &[(String, String)],
    engine: &TemplateEngine,
) -> Result<RootContext, RenderError> {
    let base = base_scope(&tree, exporter_path)?;
    let helper = Helper::new(catalogue, tree, base.clone(), engine);
    let mut scope = base;
    for global in globals {
        let bound = engine.with_helper(helper.rebind(scope.clone()));
        scope = bind_variables(&scope, std::slice::from_ref(global), &bound)?;
    }
    let engine = engine.with_helper(helper.rebind(scope.clone()));
    Ok(RootContext { scope, engine })
}

/// Tree-derived bindings of the root scope, before globals.
pub fn base_scope(tree: &ComponentTree, exporter_path: &Path) -> Result<Scope, RenderError> {
    let root = tree.root();
    let bindings = vec![
        ("root", serde_json::to_value(root)?),
        ("exporter_path", Value::String(dir_with_separator(exporter_path))),
        ("components", serde_json::to_value(tree.components())?),
        ("export_subsystems", Value::Bool(flag(root, EXPORT_SUBSYSTEMS))),
        ("subsystems", serde_json::to_value(tree.subsystems())?),
        ("export_commands", Value::Bool(flag(root, EXPORT_COMMANDS))),
        ("commands", serde_json::to_value(tree.commands())?),
    ];
    Ok(Scope::new().extend(bindings))
}

/// Evaluate `vars` in order, each against the scope extended by the ones
/// before it. The parent scope is left untouched.
pub fn bind_variables<R: Render + ?Sized>(
    scope: &Scope,
    vars: &[(String, String)],
    engine: &R,
) -> Result<Scope, RenderError> {
    let mut scope = scope.clone();
    for (name, template) in vars {
        let value = engine.render(&format!("variable `{name}`"), template, &scope)?;
        tracing::debug!("var {name} = {value}");
        scope = scope.with(name.clone(), Value::String(value));
    }
    Ok(scope)
}

/// Scope for rendering one component's instructions.
pub fn component_scope(
    parent: &Scope,
    component: &Component,
    instructions: &InstructionSet,
) -> Result<Scope, RenderError> {
    let mut bindings = vec![
        (
            "ClassName".to_string(),
            Value::String(instructions.class_name().to_string()),
        ),
        (
            "Name".to_string(),
            Value::String(component.qualified_name.clone()),
        ),
        (
            "Short_Name".to_string(),
            Value::String(component.short_name.clone()),
        ),
    ];
    for property in &component.properties {
        bindings.push((
            normalize_property_key(&property.key),
            Value::String(property.value.clone()),
        ));
    }
    Ok(parent.extend(bindings))
}

/// Scope for one marker region of a file being modified.
pub fn region_scope(file_scope: &Scope, id: &str) -> Scope {
    file_scope.with("id", Value::String(id.to_string()))
}

/// `"Speed (RPM)"` → `"Speed_RPM"`: parentheses dropped, spaces become
/// [`KEY_FILLER`].
pub fn normalize_property_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '(' && *c != ')')
        .map(|c| if c == ' ' { KEY_FILLER } else { c })
        .collect()
}

/// `dir` followed by the platform separator, so templates can append a file
/// name directly. An empty path (the working directory) stays empty.
fn dir_with_separator(dir: &Path) -> String {
    let mut path = dir.display().to_string();
    if !path.is_empty() && !path.ends_with(std::path::MAIN_SEPARATOR) {
        path.push(std::path::MAIN_SEPARATOR);
    }
    path
}

fn flag(component: &Component, key: &str) -> bool {
    component.property(key).is_some_and(|v| v.trim() == "true")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn tree() -> ComponentTree {
        ComponentTree::new(
            Component::new("Robot", "robot")
                .with_property(EXPORT_SUBSYSTEMS, "true")
                .with_child(Component::new("Subsystem", "drive"))
                .with_child(Component::new("Command", "auto")),
        )
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[rstest]
    #[case("Channel", "Channel")]
    #[case("Speed (RPM)", "Speed_RPM")]
    #[case("Input Channel (Digital)", "Input_Channel_Digital")]
    #[case("A B", "A_B")]
    fn property_keys_are_normalized(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_property_key(raw), expected);
    }

    #[test]
    fn base_scope_binds_tree_collections() {
        let scope = base_scope(&tree(), Path::new("/exporters/java/")).unwrap();
        assert_eq!(scope.get("export_subsystems"), Some(&json!(true)));
        assert_eq!(scope.get("export_commands"), Some(&json!(false)));
        assert_eq!(scope.get("components").and_then(Value::as_array).map(Vec::len), Some(3));
        assert_eq!(scope.get("subsystems").and_then(Value::as_array).map(Vec::len), Some(1));
        assert_eq!(scope.get("commands").and_then(Value::as_array).map(Vec::len), Some(1));
        assert_eq!(scope.get("exporter_path"), Some(&json!("/exporters/java/")));
    }

    #[cfg(unix)]
    #[rstest]
    #[case("/exporters/java", "/exporters/java/")]
    #[case("/exporters/java/", "/exporters/java/")]
    #[case("", "")]
    fn exporter_path_ends_with_separator(#[case] dir: &str, #[case] expected: &str) {
        let scope = base_scope(&tree(), Path::new(dir)).unwrap();
        assert_eq!(scope.get("exporter_path"), Some(&json!(expected)));
    }

    #[test]
    fn variables_see_earlier_siblings() {
        let engine = TemplateEngine::new();
        let scope = bind_variables(
            &Scope::new(),
            &vars(&[("package", "org.team"), ("path", "src/{{ package }}")]),
            &engine,
        )
        .unwrap();
        assert_eq!(scope.get("path"), Some(&json!("src/org.team")));
    }

    #[test]
    fn forward_reference_fails() {
        let engine = TemplateEngine::new();
        let err = bind_variables(
            &Scope::new(),
            &vars(&[("path", "src/{{ package }}"), ("package", "org.team")]),
            &engine,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("path"), "should name the variable being bound: {msg}");
        assert!(msg.contains("package"), "should name the unbound variable: {msg}");
    }

    #[test]
    fn binding_variables_leaves_parent_untouched() {
        let parent = Scope::new().with("keep", json!("me"));
        let child = bind_variables(&parent, &vars(&[("x", "1")]), &TemplateEngine::new()).unwrap();
        assert!(child.contains("x"));
        assert!(!parent.contains("x"));
    }

    #[test]
    fn region_scope_binds_id() {
        let file = Scope::new().with("id", json!("outer"));
        let region = region_scope(&file, "r1");
        assert_eq!(region.get("id"), Some(&json!("r1")));
        assert_eq!(file.get("id"), Some(&json!("outer")));
    }

    #[test]
    fn globals_can_call_helpers() {
        let catalogue = Catalogue::build(
            &Default::default(),
            &std::collections::BTreeMap::from([(
                "Robot".to_string(),
                stencil_core::TypeInstructions {
                    defaults: vec![],
                    overrides: stencil_core::InstructionKey::all()
                        .iter()
                        .map(|k| (k.as_str().to_string(), "Robot".to_string()))
                        .collect(),
                },
            )]),
        )
        .unwrap();
        let root = build_root_context(
            Arc::new(tree()),
            Arc::new(catalogue),
            Path::new("."),
            &vars(&[("cls", "{{ class_name_of(component=root) }}"), ("file", "{{ cls }}.java")]),
            &TemplateEngine::new(),
        )
        .unwrap();
        assert_eq!(root.scope.get("file"), Some(&json!("Robot.java")));
        assert!(root.helper().is_some_and(|h| h.scope().contains("file")));
    }

    #[test]
    fn globals_calling_helpers_see_earlier_globals() {
        let mut overrides: std::collections::BTreeMap<String, String> =
            stencil_core::InstructionKey::all()
                .iter()
                .map(|k| (k.as_str().to_string(), String::new()))
                .collect();
        overrides.insert(
            "Declaration".to_string(),
            "private {{ package }}.Motor {{ Short_Name }};".to_string(),
        );
        let types = std::collections::BTreeMap::from([
            (
                "Robot".to_string(),
                stencil_core::TypeInstructions {
                    defaults: vec![],
                    overrides: overrides.clone(),
                },
            ),
            (
                "Motor".to_string(),
                stencil_core::TypeInstructions {
                    defaults: vec![],
                    overrides,
                },
            ),
        ]);
        let catalogue = Catalogue::build(&Default::default(), &types).unwrap();
        let tree = ComponentTree::new(
            Component::new("Robot", "robot").with_child(Component::new("Motor", "driveMotor")),
        );

        let root = build_root_context(
            Arc::new(tree),
            Arc::new(catalogue),
            Path::new("."),
            &vars(&[
                ("package", "org.team"),
                (
                    "decl",
                    "{% set m = find_by_name(name=\"driveMotor\") %}{{ declaration_of(component=m) }}",
                ),
            ]),
            &TemplateEngine::new(),
        )
        .unwrap();
        assert_eq!(
            root.scope.get("decl"),
            Some(&json!("private org.team.Motor driveMotor;"))
        );
    }
}
