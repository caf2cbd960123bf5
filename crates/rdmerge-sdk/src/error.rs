use std::path::PathBuf;

use thiserror::Error;

use rdmerge_types::ErrorCode;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("project path does not exist: {}", .0.display())]
    ProjectPathMissing(PathBuf),

    #[error("source file must have the .xaml extension: {0}")]
    InvalidSourceExtension(String),

    #[error("output file must have the .xaml extension: {0}")]
    InvalidOutputExtension(String),

    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Graph(#[from] rdmerge_graph::GraphError),

    #[error(transparent)]
    Merge(#[from] rdmerge_merge::MergeError),

    #[error("failed to serialize output: {0}")]
    Document(#[from] rdmerge_doc::DocError),
}

impl SdkError {
    /// Stable code identifying the kind of failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            SdkError::ProjectPathMissing(_) => ErrorCode::ProjectPathMissing,
            SdkError::InvalidSourceExtension(_) => ErrorCode::InvalidSourceExtension,
            SdkError::InvalidOutputExtension(_) => ErrorCode::InvalidOutputExtension,
            SdkError::Config { .. } => ErrorCode::Config,
            SdkError::Io { .. } => ErrorCode::Io,
            SdkError::Graph(e) => e.code(),
            SdkError::Merge(e) => e.code(),
            SdkError::Document(_) => ErrorCode::DocumentParse,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
