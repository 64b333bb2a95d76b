pub mod diff;
pub mod export;
pub mod instructions;
pub mod plan;

use std::path::Path;

use anyhow::{Context, Result};
use stencil_core::ComponentTree;
use stencil_export::Exporter;

/// Load the exporter description and the component tree named on the
/// command line.
pub(crate) fn load(description: &Path, tree: &Path) -> Result<(Exporter, ComponentTree)> {
    let exporter = Exporter::load(description)
        .with_context(|| format!("failed to load description {}", description.display()))?;
    let tree = ComponentTree::load_at(tree)
        .with_context(|| format!("failed to load component tree {}", tree.display()))?;
    tracing::debug!("component tree has {} components", tree.components().len());
    Ok((exporter, tree))
}
