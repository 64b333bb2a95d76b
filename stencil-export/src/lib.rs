//! # stencil-export
//!
//! Export orchestration: plan the manifest, materialize each entry
//! (overwrite or marker-region modify), and write atomically.
//!
//! ```text
//! Exporter::export(tree)
//!   ├─ build root context (globals, helper functions)
//!   ├─ render + parse manifest          → Vec<FileManifestEntry>
//!   └─ for each entry, in order
//!        ├─ bind per-file variables
//!        ├─ compose (Overwrite | Modify) → String
//!        └─ atomic_write                 → WriteResult
//! ```

pub mod diff;
pub mod error;
pub mod exporter;
pub mod manifest;
pub mod materializer;
pub mod writer;

pub use diff::{diff_export, FileDiff};
pub use error::ExportError;
pub use exporter::{ExportReport, Exporter};
pub use manifest::{FileManifestEntry, UpdateMode};
pub use materializer::{find_region, splice_region, Composed, FileOutcome, Materializer};
pub use writer::WriteResult;
