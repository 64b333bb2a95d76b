//! `stencil instructions`: print the resolved instruction set per type.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use stencil_core::{InstructionSet, TypeName};
use stencil_export::Exporter;

/// Arguments for `stencil instructions`.
#[derive(Args, Debug)]
pub struct InstructionsArgs {
    /// Path to the exporter description document.
    pub description: PathBuf,

    /// Only show this component type.
    #[arg(long = "type", value_name = "TYPE")]
    pub component_type: Option<String>,
}

impl InstructionsArgs {
    pub fn run(self) -> Result<()> {
        let exporter = Exporter::load(&self.description).with_context(|| {
            format!("failed to load description {}", self.description.display())
        })?;
        let catalogue = exporter.catalogue();

        let types: Vec<TypeName> = match self.component_type {
            Some(name) => vec![TypeName::from(name)],
            None => catalogue.types().cloned().collect(),
        };

        for type_name in &types {
            let set = catalogue.resolve(type_name)?;
            print_set(type_name, set);
        }
        Ok(())
    }
}

fn print_set(type_name: &TypeName, set: &InstructionSet) {
    println!("{}", type_name.to_string().bold());
    for (key, template) in set.iter() {
        if template.is_empty() {
            println!("  {key:<17} {}", "(empty)".bright_black());
        } else {
            println!("  {key:<17} {template}");
        }
    }
}
