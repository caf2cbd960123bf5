//! Merge priority of a document in the reference graph.
//!
//! Priority grows with depth and with the number of reference paths that
//! reach a document. Documents are merged in descending priority, so shared
//! dependencies are folded in before the documents that include them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Merge priority of a loaded document.
///
/// The entry document holds [`Priority::Root`], which orders below every
/// [`Priority::Level`]. The derived ordering relies on variant order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Sentinel held by the entry document.
    Root,
    /// Priority of a referenced document.
    Level(u32),
}

impl Priority {
    /// Priority assigned on the first reach of a document from `parent`.
    ///
    /// The entry document counts as level zero for its children.
    pub fn child_of(parent: Priority) -> Self {
        match parent {
            Priority::Root => Priority::Level(1),
            Priority::Level(n) => Priority::Level(n.saturating_add(1)),
        }
    }

    /// Priority after a document that already holds `self` is reached
    /// again from `parent`: `max(self + 1, parent + 1)`.
    ///
    /// The root keeps its sentinel.
    pub fn revisit(self, parent: Priority) -> Self {
        match self {
            Priority::Root => Priority::Root,
            Priority::Level(n) => Priority::Level(n.saturating_add(1)).max(Self::child_of(parent)),
        }
    }

    /// Returns `true` for the entry document's sentinel.
    pub fn is_root(&self) -> bool {
        matches!(self, Priority::Root)
    }

    /// Numeric level, or `None` for the root.
    pub fn level(&self) -> Option<u32> {
        match self {
            Priority::Root => None,
            Priority::Level(n) => Some(*n),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Root => write!(f, "root"),
            Priority::Level(n) => write!(f, "{n}"),
        }
    }
}
