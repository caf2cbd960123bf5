//! Document Loader: absolute location to parsed tree.

use std::path::Path;

use rdmerge_doc::DocumentTree;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::source::DocumentSource;

/// Loads and parses documents from a [`DocumentSource`].
#[derive(Clone, Debug)]
pub struct DocumentLoader<S> {
    source: S,
}

impl<S: DocumentSource> DocumentLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load the document at `location`.
    ///
    /// A missing document is reported as [`GraphError::SourceFileMissing`];
    /// read and parse failures carry the location they occurred at.
    pub fn load(&self, location: &Path) -> GraphResult<DocumentTree> {
        if !self.source.exists(location) {
            return Err(GraphError::SourceFileMissing {
                path: location.to_path_buf(),
            });
        }

        let bytes = self.source.read(location).map_err(|source| GraphError::Io {
            path: location.to_path_buf(),
            source,
        })?;

        let document = rdmerge_doc::parse(&bytes).map_err(|source| GraphError::Document {
            path: location.to_path_buf(),
            source,
        })?;

        debug!(path = %location.display(), bytes = bytes.len(), "loaded document");
        Ok(document)
    }
}
