//! Tera rendering engine: the [`Render`] service and [`TemplateEngine`].
//!
//! Rendering is a pure function of `(template, scope)`. The engine carries
//! only what every render needs: partial templates (the exporter's macros)
//! and, once an export is prepared, the [`Helper`] whose operations are
//! exposed to templates as functions. There is no process-wide engine; the
//! exporter builds one and passes it to whoever renders.

use std::path::Path;
use std::sync::Arc;

use tera::Tera;

use crate::error::{io_err, RenderError};
use crate::helper::Helper;
use crate::scope::Scope;

/// Name under which the exporter's macros file is importable:
/// `{% import "macros" as m %}`.
pub const MACROS_TEMPLATE: &str = "macros";

/// Rendering service used by the context builder, planner and materializer.
pub trait Render {
    /// Render `template` (raw template text) against `scope`.
    /// `name` identifies the template in error messages.
    fn render(&self, name: &str, template: &str, scope: &Scope) -> Result<String, RenderError>;

    /// Read the template at `path` and render it against `scope`.
    fn render_file(&self, path: &Path, scope: &Scope) -> Result<String, RenderError> {
        let template = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        self.render(&path.display().to_string(), &template, scope)
    }
}

/// Tera-backed [`Render`] implementation. Cheap to clone.
#[derive(Clone, Default)]
pub struct TemplateEngine {
    partials: Arc<Vec<(String, String)>>,
    helper: Option<Helper>,
}

impl TemplateEngine {
    /// An engine with no partials and no helper functions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a partial template that other templates can import or include.
    ///
    /// The partial is parsed immediately so a malformed file fails here
    /// rather than on first use.
    pub fn with_partial(
        mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, RenderError> {
        let name = name.into();
        let source = source.into();
        let mut partials = self.partials.as_ref().clone();
        partials.push((name.clone(), source));
        build_tera(&partials).map_err(|e| RenderError::template(&name, &e))?;
        self.partials = Arc::new(partials);
        Ok(self)
    }

    /// Load the exporter's macros file as the [`MACROS_TEMPLATE`] partial.
    pub fn with_macros_file(self, path: &Path) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        tracing::debug!("loaded macros from {}", path.display());
        self.with_partial(MACROS_TEMPLATE, source)
    }

    /// Same engine, with `helper`'s operations registered as template functions.
    pub fn with_helper(&self, helper: Helper) -> Self {
        TemplateEngine {
            partials: Arc::clone(&self.partials),
            helper: Some(helper),
        }
    }

    /// Same engine, without helper functions.
    pub fn without_helper(&self) -> Self {
        TemplateEngine {
            partials: Arc::clone(&self.partials),
            helper: None,
        }
    }

    pub fn helper(&self) -> Option<&Helper> {
        self.helper.as_ref()
    }
}

impl Render for TemplateEngine {
    fn render(&self, name: &str, template: &str, scope: &Scope) -> Result<String, RenderError> {
        let mut items = self.partials.as_ref().clone();
        items.push((name.to_string(), template.to_string()));
        let mut tera = build_tera(&items).map_err(|e| RenderError::template(name, &e))?;
        if let Some(helper) = &self.helper {
            helper.register(&mut tera);
        }
        tera.render(name, &scope.to_tera_context())
            .map_err(|e| RenderError::template(name, &e))
    }
}

fn build_tera(templates: &[(String, String)]) -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    // Generated source code is not HTML.
    tera.autoescape_on(vec![]);
    tera.add_raw_templates(templates.iter().map(|(n, s)| (n.as_str(), s.as_str())))?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
