//! Dry-run unified diff support for `stencil diff`.

use std::path::PathBuf;

use similar::TextDiff;

use stencil_core::ComponentTree;

use crate::{exporter::Exporter, manifest, writer::read_bytes, ExportError};

/// A single composed-file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Compose what `export` would write and compare it to current on-disk
/// content. Files that would not change are left out.
///
/// No files are written.
pub fn diff_export(exporter: &Exporter, tree: &ComponentTree) -> Result<Vec<FileDiff>, ExportError> {
    let root = exporter.prepare(tree)?;
    let entries = manifest::plan(exporter.description(), &root.scope, &root.engine)?;
    let materializer = exporter.materializer(&root.engine);

    let mut diffs = Vec::new();
    for entry in &entries {
        let composed = materializer
            .compose(entry, &root.scope)
            .map_err(|e| ExportError::Entry {
                target: entry.target.clone(),
                source: Box::new(e),
            })?;
        let existing = read_bytes(&entry.target)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();
        if existing == composed.content {
            continue;
        }

        let old_header = format!("a/{}", entry.target.display());
        let new_header = format!("b/{}", entry.target.display());
        let unified = TextDiff::from_lines(&existing, &composed.content)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            path: entry.target.clone(),
            unified_diff: unified,
        });
    }
    Ok(diffs)
}
