//! Error types for graph construction.

use std::path::{Path, PathBuf};

use rdmerge_doc::DocError;
use rdmerge_types::ErrorCode;

/// Errors that can occur while building the dependency graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A referenced document does not exist.
    #[error("referenced source file does not exist: {}", path.display())]
    SourceFileMissing { path: PathBuf },

    /// A document was reached again while it was still being expanded.
    #[error("cyclic merged-dictionary reference to {}: {}", path.display(), format_chain(chain))]
    CyclicReference {
        /// The document reached twice.
        path: PathBuf,
        /// The active reference path, ending with `path`.
        chain: Vec<PathBuf>,
    },

    /// A document could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: DocError,
    },

    /// A document exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GraphError {
    /// Stable code identifying the kind of failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            GraphError::SourceFileMissing { .. } => ErrorCode::SourceFileMissing,
            GraphError::CyclicReference { .. } => ErrorCode::CyclicReference,
            GraphError::Document { .. } => ErrorCode::DocumentParse,
            GraphError::Io { .. } => ErrorCode::Io,
        }
    }

    /// The document the failure is about.
    pub fn path(&self) -> &Path {
        match self {
            GraphError::SourceFileMissing { path }
            | GraphError::CyclicReference { path, .. }
            | GraphError::Document { path, .. }
            | GraphError::Io { path, .. } => path,
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Convenience alias for graph results.
pub type GraphResult<T> = Result<T, GraphError>;
