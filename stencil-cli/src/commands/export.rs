//! `stencil export`: render and write every file the manifest lists.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use stencil_export::{ExportReport, WriteResult};

/// Arguments for `stencil export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Path to the exporter description document.
    pub description: PathBuf,

    /// Component tree to export (YAML).
    #[arg(long)]
    pub tree: PathBuf,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl ExportArgs {
    pub fn run(self) -> Result<()> {
        let (exporter, tree) = super::load(&self.description, &self.tree)?;
        let report = exporter
            .export(&tree, self.dry_run)
            .with_context(|| format!("export failed for '{}'", exporter.name()))?;
        print_report(&report, self.dry_run);
        Ok(())
    }
}

fn print_report(report: &ExportReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    if report.files.is_empty() {
        println!("{prefix}✓ '{}': nothing to do", report.exporter);
        return;
    }

    println!(
        "{prefix}✓ '{}' exported ({} written, {} unchanged)",
        report.exporter,
        report.written(),
        report.unchanged()
    );

    for file in &report.files {
        match &file.write {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
        }
        for region in &file.skipped_regions {
            println!(
                "     {} region '{region}' not found; left untouched",
                "warning:".yellow().bold()
            );
        }
    }
}
