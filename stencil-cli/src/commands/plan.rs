//! `stencil plan`: list manifest entries without writing anything.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use stencil_export::FileManifestEntry;

/// Arguments for `stencil plan`.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Path to the exporter description document.
    pub description: PathBuf,

    /// Component tree to export (YAML).
    #[arg(long)]
    pub tree: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let (exporter, tree) = super::load(&self.description, &self.tree)?;
        let entries = exporter
            .plan(&tree)
            .with_context(|| format!("planning failed for '{}'", exporter.name()))?;

        if self.json {
            let payload: Vec<PlanEntryJson> = entries.iter().map(PlanEntryJson::from).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize plan JSON")?
            );
            return Ok(());
        }

        println!("{} | {} files", exporter.name(), entries.len());
        if entries.is_empty() {
            return Ok(());
        }
        let rows: Vec<PlanTableRow> = entries.iter().map(PlanTableRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

#[derive(Tabled)]
struct PlanTableRow {
    #[tabled(rename = "target")]
    target: String,
    #[tabled(rename = "mode")]
    mode: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "regions")]
    regions: String,
}

impl From<&FileManifestEntry> for PlanTableRow {
    fn from(entry: &FileManifestEntry) -> Self {
        PlanTableRow {
            target: entry.target.display().to_string(),
            mode: entry.update.to_string(),
            source: entry.source.display().to_string(),
            regions: region_ids(entry).join(", "),
        }
    }
}

#[derive(Serialize)]
struct PlanEntryJson {
    target: String,
    source: String,
    update: String,
    regions: Vec<String>,
    variables: Vec<String>,
}

impl From<&FileManifestEntry> for PlanEntryJson {
    fn from(entry: &FileManifestEntry) -> Self {
        PlanEntryJson {
            target: entry.target.display().to_string(),
            source: entry.source.display().to_string(),
            update: entry.update.to_string(),
            regions: region_ids(entry),
            variables: entry.variables.iter().map(|(name, _)| name.clone()).collect(),
        }
    }
}

fn region_ids(entry: &FileManifestEntry) -> Vec<String> {
    entry.modifications.iter().map(|(id, _)| id.clone()).collect()
}
