use std::fmt;

use serde::{Deserialize, Serialize};

/// A namespace prefix bound to a URI.
///
/// The empty prefix stands for the default namespace (`xmlns="..."`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceBinding {
    pub prefix: String,
    pub uri: String,
}

impl NamespaceBinding {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// Returns `true` if this binds the default namespace.
    pub fn is_default(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Name of the attribute declaring this binding (`xmlns` or `xmlns:p`).
    pub fn attribute_name(&self) -> String {
        if self.is_default() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", self.prefix)
        }
    }
}

impl fmt::Display for NamespaceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.attribute_name(), self.uri)
    }
}
