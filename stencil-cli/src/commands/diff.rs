//! `stencil diff`: show unified diffs for what export would write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

/// Arguments for `stencil diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Path to the exporter description document.
    pub description: PathBuf,

    /// Component tree to export (YAML).
    #[arg(long)]
    pub tree: PathBuf,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let (exporter, tree) = super::load(&self.description, &self.tree)?;
        let diffs = exporter
            .diff(&tree)
            .with_context(|| format!("diff failed for '{}'", exporter.name()))?;

        if diffs.is_empty() {
            println!("No differences for '{}'.", exporter.name());
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
