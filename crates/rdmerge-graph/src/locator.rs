//! Resolution of `Source` locators to absolute document locations.
//!
//! Supported forms:
//!
//! - `/{project};component/path/File.xaml`: the component qualifier is
//!   stripped and the rest is resolved against the referencing document's
//!   directory
//! - `/path/File.xaml`: resolved against the project root
//! - `path/File.xaml`, `../File.xaml`: resolved against the referencing
//!   document's directory
//! - `pack://...`: cross-package, never followed

use std::path::{Component, Path, PathBuf};

use rdmerge_types::xaml::PACK_SCHEME;

/// Outcome of resolving a locator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The locator names a document at this normalized absolute location.
    Document(PathBuf),
    /// The locator uses a scheme that is not followed.
    Unsupported,
}

/// Resolves locators for one project.
#[derive(Clone, Debug)]
pub struct LocatorResolver {
    project_root: PathBuf,
    qualifier: String,
}

impl LocatorResolver {
    pub fn new(project_root: impl Into<PathBuf>, project_name: &str) -> Self {
        Self {
            project_root: normalize(&project_root.into()),
            qualifier: format!("/{project_name};component/"),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Resolve `locator` as written in the document at `referrer`.
    pub fn resolve(&self, referrer: &Path, locator: &str) -> Resolution {
        let locator = locator.trim();
        if is_pack_uri(locator) {
            return Resolution::Unsupported;
        }

        let locator = locator.replace('\\', "/");
        let referrer_dir = referrer.parent().unwrap_or(&self.project_root);

        let target = if let Some(rest) = strip_prefix_ignore_case(&locator, &self.qualifier) {
            referrer_dir.join(rest)
        } else if let Some(rest) = locator.strip_prefix('/') {
            self.project_root.join(rest)
        } else {
            referrer_dir.join(&locator)
        };

        Resolution::Document(normalize(&target))
    }
}

fn is_pack_uri(locator: &str) -> bool {
    strip_prefix_ignore_case(locator, PACK_SCHEME).is_some()
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &value[prefix.len()..])
}

/// Normalize a path lexically: drop `.` components and fold `..` into the
/// preceding component. Symlinks are not resolved and the filesystem is
/// not consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` above the root stays at the root.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
