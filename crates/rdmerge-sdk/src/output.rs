//! Idempotent output writing.
//!
//! The merged document is serialized first and compared byte for byte with
//! the file on disk. The file is only replaced when the bytes differ, so
//! rerunning on unchanged inputs leaves its timestamp alone.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use similar::TextDiff;
use tracing::info;

use rdmerge_doc::{serialize, DocumentTree, WriteOptions};

use crate::error::{SdkError, SdkResult};

/// Lines of context around each change in a rendered diff.
const DIFF_CONTEXT: usize = 3;

/// Output settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub write: WriteOptions,
    /// Never touch the file; only report.
    pub check_only: bool,
    /// Render a unified diff when the content changes.
    pub diff: bool,
}

/// What happened to the output file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub path: PathBuf,
    /// `true` if the file was (re)written by this run.
    pub written: bool,
    /// `true` if the serialized bytes differ from the file on disk.
    pub changed: bool,
    /// Size of the serialized document.
    pub bytes: usize,
    /// BLAKE3 hex digest of the serialized document.
    pub digest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// Serialize `document` and write it to `path` unless the file already
/// holds the same bytes.
pub fn write_if_changed(
    path: &Path,
    document: &DocumentTree,
    options: &OutputOptions,
) -> SdkResult<WriteOutcome> {
    let bytes = serialize(document, &options.write)?;
    let digest = blake3::hash(&bytes).to_hex().to_string();

    let existing = match std::fs::read(path) {
        Ok(current) => Some(current),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            return Err(SdkError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    let changed = existing.as_deref() != Some(bytes.as_slice());

    let diff = (options.diff && changed).then(|| render_diff(path, existing.as_deref(), &bytes));

    let written = changed && !options.check_only;
    if written {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SdkError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, &bytes).map_err(|e| SdkError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        info!(path = %path.display(), bytes = bytes.len(), "output written");
    } else if changed {
        info!(path = %path.display(), "output is out of date");
    } else {
        info!(path = %path.display(), "output unchanged");
    }

    Ok(WriteOutcome {
        path: path.to_path_buf(),
        written,
        changed,
        bytes: bytes.len(),
        digest,
        diff,
    })
}

/// Unified line diff from the current file (empty when absent) to `new`.
fn render_diff(path: &Path, old: Option<&[u8]>, new: &[u8]) -> String {
    let old = String::from_utf8_lossy(old.unwrap_or_default());
    let new = String::from_utf8_lossy(new);
    let label = path.display().to_string();
    TextDiff::from_lines(old.as_ref(), new.as_ref())
        .unified_diff()
        .context_radius(DIFF_CONTEXT)
        .header(&format!("a/{label}"), &format!("b/{label}"))
        .to_string()
}
