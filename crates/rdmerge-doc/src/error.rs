//! Error types for document parsing and serialization.

/// Errors that can occur while reading or writing a document.
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    /// The XML reader rejected the input.
    #[error("malformed document at byte {position}: {message}")]
    Malformed {
        /// Byte offset reported by the reader.
        position: u64,
        /// Reader diagnostic.
        message: String,
    },

    /// A closing tag did not match the open element.
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedTag { expected: String, found: String },

    /// The input ended with elements still open.
    #[error("unclosed element <{0}>")]
    Unclosed(String),

    /// The input contains no root element.
    #[error("document has no root element")]
    MissingRoot,

    /// Markup or text appears outside the single root element.
    #[error("unexpected content outside the root element")]
    ContentOutsideRoot,

    /// The input is not UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// A byte-order mark named an encoding the bytes do not decode in.
    #[error("document is not valid {encoding}")]
    Undecodable { encoding: &'static str },

    /// The writer failed.
    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Convenience alias for document results.
pub type DocResult<T> = Result<T, DocError>;
