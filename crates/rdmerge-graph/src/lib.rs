//! Dependency graph for rdmerge.
//!
//! Walks the merged-dictionary references of an entry document, loading
//! every reachable document exactly once. Each document's namespace
//! declarations are reconciled against a run-wide registry as it is loaded,
//! and every document receives a merge [`Priority`] that rises with depth
//! and with the number of reference paths reaching it.
//!
//! [`Priority`]: rdmerge_types::Priority

pub mod builder;
pub mod error;
pub mod loader;
pub mod locator;
pub mod memory;
pub mod namespace;
pub mod source;

pub use builder::{
    AppliedRename, BuildOptions, DependencyGraph, DependencyRecord, GraphBuilder,
    SkippedReference,
};
pub use error::{GraphError, GraphResult};
pub use loader::DocumentLoader;
pub use locator::{normalize, LocatorResolver, Resolution};
pub use memory::MemorySource;
pub use namespace::{disambiguate, DisambiguateOptions, NamespaceRegistry, PrefixRename};
pub use source::{DocumentSource, FsSource};
