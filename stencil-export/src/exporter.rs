//! Exporter facade: the entrypoint used by the CLI.
//!
//! Construction parses the description, resolves the instruction catalogue
//! once and loads the macros. Each export then builds the root context,
//! renders and parses the manifest, and materializes the entries strictly
//! in manifest order. The first failing entry aborts the run; files written
//! by earlier entries stay in place.

use std::path::Path;
use std::sync::Arc;

use stencil_core::{Catalogue, ComponentTree, Description, LoadedDescription};
use stencil_renderer::{build_root_context, RootContext, TemplateEngine};

use crate::diff::{diff_export, FileDiff};
use crate::error::ExportError;
use crate::manifest::{self, FileManifestEntry};
use crate::materializer::{FileOutcome, Materializer};
use crate::writer::WriteResult;

/// Summary of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub exporter: String,
    pub files: Vec<FileOutcome>,
}

impl ExportReport {
    pub fn written(&self) -> usize {
        self.count(|w| matches!(w, WriteResult::Written { .. } | WriteResult::WouldWrite { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|w| matches!(w, WriteResult::Unchanged { .. }))
    }

    fn count(&self, pred: impl Fn(&WriteResult) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.write)).count()
    }
}

/// A loaded exporter description with its resolved catalogue.
pub struct Exporter {
    description: LoadedDescription,
    catalogue: Arc<Catalogue>,
    engine: TemplateEngine,
}

impl Exporter {
    /// Load the description at `path` and build the exporter.
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        Self::from_description(Description::load_at(path)?)
    }

    pub fn from_description(description: LoadedDescription) -> Result<Self, ExportError> {
        let catalogue = Arc::new(description.document.catalogue()?);
        let engine = match description.macros_path() {
            Some(macros) => TemplateEngine::new().with_macros_file(&macros)?,
            None => TemplateEngine::new(),
        };
        tracing::debug!(
            "loaded exporter '{}' with {} component types",
            description.document.name,
            catalogue.len()
        );
        Ok(Exporter {
            description,
            catalogue,
            engine,
        })
    }

    pub fn name(&self) -> &str {
        &self.description.document.name
    }

    pub fn kind(&self) -> &str {
        &self.description.document.kind
    }

    pub fn show_on_toolbar(&self) -> bool {
        self.description.document.toolbar
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn description(&self) -> &LoadedDescription {
        &self.description
    }

    /// Root scope for `tree`, with globals evaluated and helpers bound.
    pub fn prepare(&self, tree: &ComponentTree) -> Result<RootContext, ExportError> {
        let globals = self.description.document.var_pairs();
        Ok(build_root_context(
            Arc::new(tree.clone()),
            Arc::clone(&self.catalogue),
            &self.description.base_dir,
            &globals,
            &self.engine,
        )?)
    }

    /// Manifest entries an export of `tree` would process, in order.
    pub fn plan(&self, tree: &ComponentTree) -> Result<Vec<FileManifestEntry>, ExportError> {
        let root = self.prepare(tree)?;
        manifest::plan(&self.description, &root.scope, &root.engine)
    }

    /// Export `tree`. With `dry_run`, nothing is written.
    pub fn export(&self, tree: &ComponentTree, dry_run: bool) -> Result<ExportReport, ExportError> {
        let root = self.prepare(tree)?;
        let entries = manifest::plan(&self.description, &root.scope, &root.engine)?;
        let materializer = self.materializer(&root.engine);

        let mut files = Vec::with_capacity(entries.len());
        for entry in &entries {
            let outcome = materializer
                .materialize(entry, &root.scope, dry_run)
                .map_err(|e| ExportError::Entry {
                    target: entry.target.clone(),
                    source: Box::new(e),
                })?;
            files.push(outcome);
        }

        tracing::info!("{} export finished ({} files)", self.name(), files.len());
        Ok(ExportReport {
            exporter: self.name().to_string(),
            files,
        })
    }

    /// Unified diffs of what [`Exporter::export`] would change.
    pub fn diff(&self, tree: &ComponentTree) -> Result<Vec<FileDiff>, ExportError> {
        diff_export(self, tree)
    }

    pub(crate) fn materializer<'a>(&'a self, engine: &'a TemplateEngine) -> Materializer<'a> {
        Materializer::new(
            engine,
            &self.description.document.begin_modification,
            &self.description.document.end_modification,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
