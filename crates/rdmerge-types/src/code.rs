//! Stable identifiers for the fatal conditions of a merge run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of conditions that halt a merge run.
///
/// Each kind carries a fixed message and a numeric code that tooling can
/// match on. The CLI uses the code as its process exit status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ProjectPathMissing,
    InvalidSourceExtension,
    InvalidOutputExtension,
    SourceFileMissing,
    CyclicReference,
    DocumentParse,
    DuplicateKey,
    Config,
    Io,
}

impl ErrorCode {
    /// All codes, in numeric order.
    pub const ALL: [ErrorCode; 9] = [
        ErrorCode::ProjectPathMissing,
        ErrorCode::InvalidSourceExtension,
        ErrorCode::InvalidOutputExtension,
        ErrorCode::SourceFileMissing,
        ErrorCode::CyclicReference,
        ErrorCode::DocumentParse,
        ErrorCode::DuplicateKey,
        ErrorCode::Config,
        ErrorCode::Io,
    ];

    /// Numeric identifier.
    pub fn code(&self) -> u8 {
        match self {
            ErrorCode::ProjectPathMissing => 1,
            ErrorCode::InvalidSourceExtension => 2,
            ErrorCode::InvalidOutputExtension => 3,
            ErrorCode::SourceFileMissing => 4,
            ErrorCode::CyclicReference => 5,
            ErrorCode::DocumentParse => 6,
            ErrorCode::DuplicateKey => 7,
            ErrorCode::Config => 8,
            ErrorCode::Io => 9,
        }
    }

    /// Fixed human-readable message.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ProjectPathMissing => "project path does not exist",
            ErrorCode::InvalidSourceExtension => "source file must have the .xaml extension",
            ErrorCode::InvalidOutputExtension => "output file must have the .xaml extension",
            ErrorCode::SourceFileMissing => "referenced source file does not exist",
            ErrorCode::CyclicReference => "cyclic merged-dictionary reference",
            ErrorCode::DocumentParse => "document could not be parsed",
            ErrorCode::DuplicateKey => "conflicting resource key",
            ErrorCode::Config => "invalid configuration",
            ErrorCode::Io => "i/o failure",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:03}: {}", self.code(), self.message())
    }
}
