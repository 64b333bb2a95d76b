//! Layered variable scopes: the rendering context handed to templates.
//!
//! A [`Scope`] is a chain of immutable frames. Extending a scope pushes a new
//! frame that points at its parent; the parent is never touched, so a scope
//! can be shared freely between the root, component, file and region layers.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::RenderError;

#[derive(Debug, Default)]
struct Frame {
    parent: Option<Scope>,
    vars: BTreeMap<String, Value>,
}

/// Immutable, cheaply clonable variable scope.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    frame: Arc<Frame>,
}

impl Scope {
    /// An empty root scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Child scope holding `bindings`; lookups fall back to `self` on miss.
    pub fn extend<I, K>(&self, bindings: I) -> Scope
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Scope {
            frame: Arc::new(Frame {
                parent: Some(self.clone()),
                vars: bindings.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            }),
        }
    }

    /// Child scope with a single binding.
    pub fn with(&self, name: impl Into<String>, value: Value) -> Scope {
        self.extend([(name.into(), value)])
    }

    /// Child scope with a single serializable binding.
    pub fn with_serialized<T: Serialize + ?Sized>(
        &self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<Scope, RenderError> {
        Ok(self.with(name, serde_json::to_value(value)?))
    }

    /// Nearest binding for `name`, searching from this frame outwards.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let mut frame = &self.frame;
        loop {
            if let Some(v) = frame.vars.get(name) {
                return Some(v);
            }
            frame = &frame.parent.as_ref()?.frame;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of frames from the root to this scope, inclusive.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut frame = &self.frame;
        while let Some(parent) = &frame.parent {
            depth += 1;
            frame = &parent.frame;
        }
        depth
    }

    /// Flatten the chain into one map; inner frames shadow outer ones.
    pub fn flatten(&self) -> BTreeMap<String, Value> {
        let mut frames = Vec::new();
        let mut cursor = Some(self);
        while let Some(scope) = cursor {
            frames.push(&scope.frame.vars);
            cursor = scope.frame.parent.as_ref();
        }
        let mut out = BTreeMap::new();
        for vars in frames.into_iter().rev() {
            for (k, v) in vars {
                out.insert(k.clone(), v.clone());
            }
        }
        out
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> tera::Context {
        let mut ctx = tera::Context::new();
        for (k, v) in self.flatten() {
            ctx.insert(k, &v);
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn child_shadows_parent_without_mutating_it() {
        let root = Scope::new().with("name", json!("root"));
        let child = root.with("name", json!("child"));
        assert_eq!(child.get("name"), Some(&json!("child")));
        assert_eq!(root.get("name"), Some(&json!("root")));
    }

    #[test]
    fn lookup_falls_back_to_parent() {
        let root = Scope::new().extend([("a", json!(1)), ("b", json!(2))]);
        let child = root.with("c", json!(3));
        assert_eq!(child.get("a"), Some(&json!(1)));
        assert_eq!(child.get("missing"), None);
        assert!(!root.contains("c"));
        assert_eq!(child.depth(), 3);
    }

    #[test]
    fn siblings_are_independent() {
        let root = Scope::new().with("x", json!("base"));
        let left = root.with("x", json!("left"));
        let right = root.with("y", json!("right"));
        assert_eq!(left.get("x"), Some(&json!("left")));
        assert_eq!(right.get("x"), Some(&json!("base")));
        assert!(!left.contains("y"));
    }

    #[test]
    fn flatten_prefers_innermost() {
        let scope = Scope::new()
            .extend([("a", json!("outer")), ("b", json!("outer"))])
            .with("a", json!("inner"));
        let flat = scope.flatten();
        assert_eq!(flat["a"], json!("inner"));
        assert_eq!(flat["b"], json!("outer"));
        let ctx = scope.to_tera_context();
        assert_eq!(ctx.get("a"), Some(&json!("inner")));
    }
}
