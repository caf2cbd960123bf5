//! Error types for the merge engine.

use std::path::PathBuf;

use rdmerge_types::{ElementKey, ErrorCode};

/// Errors that can occur while merging documents.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Two documents define the same key and the policy rejects it.
    #[error("resource key \"{key}\" is defined in {} and again in {}", kept_from.display(), rejected_from.display())]
    DuplicateKey {
        key: ElementKey,
        /// Document whose entry was already merged.
        kept_from: PathBuf,
        /// Document whose entry was refused.
        rejected_from: PathBuf,
    },
}

impl MergeError {
    /// Stable code identifying the kind of failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            MergeError::DuplicateKey { .. } => ErrorCode::DuplicateKey,
        }
    }
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
