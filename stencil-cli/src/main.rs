//! Stencil: description-driven source generator CLI.
//!
//! # Usage
//!
//! ```text
//! stencil export <description> --tree <tree.yaml> [--dry-run]
//! stencil diff <description> --tree <tree.yaml>
//! stencil plan <description> --tree <tree.yaml> [--json]
//! stencil instructions <description> [--type <T>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, export::ExportArgs, instructions::InstructionsArgs, plan::PlanArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "stencil",
    version,
    about = "Generate source files from a component tree and an exporter description",
    long_about = None,
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the manifest and write every file it lists.
    Export(ExportArgs),

    /// Show unified diff of what export would write.
    Diff(DiffArgs),

    /// List the manifest entries an export would process.
    Plan(PlanArgs),

    /// Print resolved instructions per component type.
    Instructions(InstructionsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Export(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Instructions(args) => args.run(),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
