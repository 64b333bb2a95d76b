//! # stencil-renderer
//!
//! Tera-backed rendering for the exporter: immutable layered scopes, the
//! [`Render`] service, helper functions exposed to templates, and the
//! context builder that composes root, component, file and region scopes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stencil_renderer::{Render, Scope, TemplateEngine};
//!
//! fn greet() -> Result<String, stencil_renderer::RenderError> {
//!     let scope = Scope::new().with("Short_Name", "driveMotor".into());
//!     TemplateEngine::new().render("decl", "private Motor {{ Short_Name }};", &scope)
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod helper;
pub mod scope;

pub use context::{build_root_context, RootContext};
pub use engine::{Render, TemplateEngine, MACROS_TEMPLATE};
pub use error::RenderError;
pub use helper::Helper;
pub use scope::Scope;
