//! Where documents come from.

use std::io;
use std::path::Path;

/// Read access to documents by absolute location.
pub trait DocumentSource {
    /// Returns `true` if a document exists at `location`.
    fn exists(&self, location: &Path) -> bool;

    /// Read the raw bytes at `location`.
    fn read(&self, location: &Path) -> io::Result<Vec<u8>>;
}

/// Documents on the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSource;

impl DocumentSource for FsSource {
    fn exists(&self, location: &Path) -> bool {
        location.is_file()
    }

    fn read(&self, location: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(location)
    }
}

impl<S: DocumentSource + ?Sized> DocumentSource for &S {
    fn exists(&self, location: &Path) -> bool {
        (**self).exists(location)
    }

    fn read(&self, location: &Path) -> io::Result<Vec<u8>> {
        (**self).read(location)
    }
}
