//! In-memory document source.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::source::DocumentSource;

/// A fixed set of documents held in memory, keyed by absolute location.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document.
    pub fn insert(&mut self, location: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.insert(location.into(), contents.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, location: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(location, contents);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl DocumentSource for MemorySource {
    fn exists(&self, location: &Path) -> bool {
        self.files.contains_key(location)
    }

    fn read(&self, location: &Path) -> io::Result<Vec<u8>> {
        self.files.get(location).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no document at {}", location.display()),
            )
        })
    }
}
