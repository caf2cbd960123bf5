//! Merge engine for rdmerge.
//!
//! Folds every document of a [`DependencyGraph`] into one root element,
//! highest priority first. Keyed leaf entries are deduplicated across
//! documents; which entry survives a clash is decided by a pluggable
//! [`ConflictPolicy`].
//!
//! [`DependencyGraph`]: rdmerge_graph::DependencyGraph

pub mod engine;
pub mod error;
pub mod key;
pub mod policy;

pub use engine::{MergeEngine, MergeOutcome, MergeStats};
pub use error::{MergeError, MergeResult};
pub use key::{element_key, is_leaf};
pub use policy::{
    ConflictPolicy, ConflictResolution, ConflictStrategy, KeepFirst, KeepLast, KeyConflict,
    RejectDuplicates,
};
