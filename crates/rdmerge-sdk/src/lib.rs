//! High-level SDK for rdmerge.
//!
//! Resolves run parameters, drives the graph builder and merge engine, and
//! writes the flattened document only when its bytes changed. This is the
//! entry point for tools embedding rdmerge.

pub mod config;
pub mod error;
pub mod flattener;
pub mod output;

pub use config::{FileConfig, MergeConfig, ResolvedConfig, CONFIG_FILE_NAME};
pub use error::{SdkError, SdkResult};
pub use flattener::{DocumentSummary, Flattener, RunReport};
pub use output::{write_if_changed, OutputOptions, WriteOutcome};

// Re-export key types
pub use rdmerge_graph::{AppliedRename, DocumentSource, FsSource, MemorySource, SkippedReference};
pub use rdmerge_merge::{ConflictStrategy, MergeStats};
pub use rdmerge_types::{ErrorCode, NamespaceBinding, Priority};
