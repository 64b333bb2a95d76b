//! File materializer: executes one manifest entry.
//!
//! * **Overwrite path**: the target does not exist yet, or the entry says
//!   `Overwrite`: render the source template and replace the file.
//! * **Modify path**: the target exists and the entry says `Modify`: for
//!   each region id in declaration order, render the begin/end markers for
//!   that id, find the first `begin … end` span in the current text (the
//!   shortest body between them), and replace the span with
//!   `begin \n <patch> \n end`. Everything outside the span is kept byte for
//!   byte. A region whose markers are not found is skipped with a warning.

use std::ops::Range;
use std::path::PathBuf;

use stencil_renderer::context::{bind_variables, region_scope};
use stencil_renderer::{Render, Scope};

use crate::error::ExportError;
use crate::manifest::{FileManifestEntry, UpdateMode};
use crate::writer::{atomic_write, read_existing, WriteResult};

/// Content composed for one entry, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    pub target: PathBuf,
    pub content: String,
    /// The path actually taken; `Modify` entries fall back to `Overwrite`
    /// when the target does not exist.
    pub applied: UpdateMode,
    /// Region ids whose markers were not found in the existing file.
    pub skipped_regions: Vec<String>,
}

/// Result of materializing one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub write: WriteResult,
    pub applied: UpdateMode,
    pub skipped_regions: Vec<String>,
}

/// Executes manifest entries against a root scope.
pub struct Materializer<'a> {
    engine: &'a dyn Render,
    begin_marker: &'a str,
    end_marker: &'a str,
}

impl<'a> Materializer<'a> {
    /// `begin_marker` / `end_marker` are the description's marker templates;
    /// they are rendered per region with `id` bound.
    pub fn new(engine: &'a dyn Render, begin_marker: &'a str, end_marker: &'a str) -> Self {
        Materializer {
            engine,
            begin_marker,
            end_marker,
        }
    }

    /// Root scope extended with the entry's variables, each evaluated
    /// against the variables declared before it.
    pub fn file_scope(
        &self,
        entry: &FileManifestEntry,
        root: &Scope,
    ) -> Result<Scope, ExportError> {
        Ok(bind_variables(root, &entry.variables, self.engine)?)
    }

    /// Compute the new content for `entry` without touching the filesystem
    /// (other than reading the current target and templates).
    pub fn compose(&self, entry: &FileManifestEntry, root: &Scope) -> Result<Composed, ExportError> {
        let scope = self.file_scope(entry, root)?;

        let existing = match entry.update {
            UpdateMode::Overwrite => None,
            UpdateMode::Modify => read_existing(&entry.target)?,
        };

        match existing {
            None => Ok(Composed {
                target: entry.target.clone(),
                content: self.engine.render_file(&entry.source, &scope)?,
                applied: UpdateMode::Overwrite,
                skipped_regions: Vec::new(),
            }),
            Some(current) => {
                let (content, skipped_regions) = self.patch_regions(current, entry, &scope)?;
                Ok(Composed {
                    target: entry.target.clone(),
                    content,
                    applied: UpdateMode::Modify,
                    skipped_regions,
                })
            }
        }
    }

    /// Compose `entry` and write it (or report what would be written).
    pub fn materialize(
        &self,
        entry: &FileManifestEntry,
        root: &Scope,
        dry_run: bool,
    ) -> Result<FileOutcome, ExportError> {
        let composed = self.compose(entry, root)?;
        let write = atomic_write(&composed.target, &composed.content, dry_run)?;
        Ok(FileOutcome {
            write,
            applied: composed.applied,
            skipped_regions: composed.skipped_regions,
        })
    }

    fn patch_regions(
        &self,
        mut text: String,
        entry: &FileManifestEntry,
        scope: &Scope,
    ) -> Result<(String, Vec<String>), ExportError> {
        let mut skipped = Vec::new();
        for (id, patch) in &entry.modifications {
            let region = region_scope(scope, id);
            let begin = self.render_marker("Begin Modification", self.begin_marker, id, &region)?;
            let end = self.render_marker("End Modification", self.end_marker, id, &region)?;

            let Some(span) = find_region(&text, &begin, &end) else {
                tracing::warn!(
                    "{}: region '{id}' not found; left untouched",
                    entry.target.display()
                );
                skipped.push(id.clone());
                continue;
            };

            let body = self.engine.render_file(patch, &region)?;
            text = replace_span(&text, span, &begin, &end, &body);
            tracing::debug!("{}: patched region '{id}'", entry.target.display());
        }
        Ok((text, skipped))
    }

    fn render_marker(
        &self,
        name: &str,
        template: &str,
        id: &str,
        region: &Scope,
    ) -> Result<String, ExportError> {
        let marker = self.engine.render(name, template, region)?;
        if marker.is_empty() {
            let which = if name.starts_with("Begin") { "begin" } else { "end" };
            return Err(ExportError::EmptyMarker {
                region: id.to_string(),
                which,
            });
        }
        Ok(marker)
    }
}

// ---------------------------------------------------------------------------
// Region patching
// ---------------------------------------------------------------------------

/// Byte range of the first `begin … end` span, markers included, with the
/// shortest body between them.
pub fn find_region(text: &str, begin: &str, end: &str) -> Option<Range<usize>> {
    let start = text.find(begin)?;
    let body_start = start + begin.len();
    let body_len = text[body_start..].find(end)?;
    Some(start..body_start + body_len + end.len())
}

/// Replace the body of the first `begin … end` span in `text` with `body`.
///
/// The result is `prefix + begin + "\n" + body + "\n" + end + suffix`, where
/// prefix and suffix are the untouched text around the span. Returns `None`
/// if the span does not exist.
pub fn splice_region(text: &str, begin: &str, end: &str, body: &str) -> Option<String> {
    let span = find_region(text, begin, end)?;
    Some(replace_span(text, span, begin, end, body))
}

fn replace_span(text: &str, span: Range<usize>, begin: &str, end: &str, body: &str) -> String {
    let mut out = String::with_capacity(text.len() + body.len() + 2);
    out.push_str(&text[..span.start]);
    out.push_str(begin);
    out.push('\n');
    out.push_str(body);
    out.push('\n');
    out.push_str(end);
    out.push_str(&text[span.end..]);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
