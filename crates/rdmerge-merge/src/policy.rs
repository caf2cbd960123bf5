//! Conflict policies for keyed entries.
//!
//! Documents are merged highest priority first, so the entry already kept
//! for a key always comes from a document of equal or higher priority than
//! the incoming one.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use rdmerge_types::ElementKey;

use crate::error::{MergeError, MergeResult};

// ---------------------------------------------------------------------------
// Conflict description
// ---------------------------------------------------------------------------

/// A keyed entry clashing with an entry merged from an earlier document.
#[derive(Clone, Copy, Debug)]
pub struct KeyConflict<'a> {
    pub key: &'a ElementKey,
    /// Document the kept entry came from.
    pub kept_from: &'a Path,
    /// Document the incoming entry comes from.
    pub incoming_from: &'a Path,
}

/// What to do with the incoming entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Drop the incoming entry.
    KeepExisting,
    /// Put the incoming entry in place of the kept one.
    Replace,
}

// ---------------------------------------------------------------------------
// ConflictPolicy trait
// ---------------------------------------------------------------------------

/// Decides the outcome of a key conflict.
///
/// The trait is object-safe so the engine can hold a
/// `Box<dyn ConflictPolicy>` chosen at run time.
pub trait ConflictPolicy: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Resolve one conflict, or fail the merge.
    fn resolve(&self, conflict: &KeyConflict<'_>) -> MergeResult<ConflictResolution>;
}

/// The higher-priority entry wins; later duplicates are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeepFirst;

impl ConflictPolicy for KeepFirst {
    fn name(&self) -> &str {
        "keep-first"
    }

    fn resolve(&self, _conflict: &KeyConflict<'_>) -> MergeResult<ConflictResolution> {
        Ok(ConflictResolution::KeepExisting)
    }
}

/// The lower-priority entry replaces the kept one in place.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeepLast;

impl ConflictPolicy for KeepLast {
    fn name(&self) -> &str {
        "keep-last"
    }

    fn resolve(&self, _conflict: &KeyConflict<'_>) -> MergeResult<ConflictResolution> {
        Ok(ConflictResolution::Replace)
    }
}

/// Any cross-document duplicate key fails the merge.
#[derive(Clone, Copy, Debug, Default)]
pub struct RejectDuplicates;

impl ConflictPolicy for RejectDuplicates {
    fn name(&self) -> &str {
        "error"
    }

    fn resolve(&self, conflict: &KeyConflict<'_>) -> MergeResult<ConflictResolution> {
        Err(MergeError::DuplicateKey {
            key: conflict.key.clone(),
            kept_from: conflict.kept_from.to_path_buf(),
            rejected_from: conflict.incoming_from.to_path_buf(),
        })
    }
}

// ---------------------------------------------------------------------------
// ConflictStrategy
// ---------------------------------------------------------------------------

/// Configurable choice among the built-in policies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictStrategy {
    #[default]
    KeepFirst,
    KeepLast,
    Error,
}

impl ConflictStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictStrategy::KeepFirst => "keep-first",
            ConflictStrategy::KeepLast => "keep-last",
            ConflictStrategy::Error => "error",
        }
    }

    pub fn into_policy(self) -> Box<dyn ConflictPolicy> {
        match self {
            ConflictStrategy::KeepFirst => Box::new(KeepFirst),
            ConflictStrategy::KeepLast => Box::new(KeepLast),
            ConflictStrategy::Error => Box::new(RejectDuplicates),
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep-first" => Ok(ConflictStrategy::KeepFirst),
            "keep-last" => Ok(ConflictStrategy::KeepLast),
            "error" => Ok(ConflictStrategy::Error),
            other => Err(format!(
                "unknown conflict policy '{other}' (expected keep-first, keep-last or error)"
            )),
        }
    }
}
