//! Run configuration.
//!
//! Parameters come from three layers: built-in defaults, an optional
//! `rdmerge.toml` file, and explicit overrides (the CLI flags). Later layers
//! win. [`MergeConfig::resolve`] validates the result into absolute paths.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use rdmerge_graph::normalize;
use rdmerge_merge::ConflictStrategy;
use rdmerge_types::xaml::{has_document_extension, DEFAULT_OUTPUT, DEFAULT_SOURCE};

use crate::error::{SdkError, SdkResult};

/// File looked up in the project directory when no config path is given.
pub const CONFIG_FILE_NAME: &str = "rdmerge.toml";

/// Spaces per nesting level in the output.
pub const DEFAULT_INDENT: usize = 4;

// ---------------------------------------------------------------------------
// FileConfig
// ---------------------------------------------------------------------------

/// One optional layer of settings, as read from `rdmerge.toml`.
///
/// Unset fields leave the layer below untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub project_name: Option<String>,
    pub source: Option<String>,
    pub output: Option<String>,
    pub conflict_policy: Option<ConflictStrategy>,
    pub rewrite_attribute_values: Option<bool>,
    pub indent: Option<usize>,
    pub check_only: Option<bool>,
}

impl FileConfig {
    /// Parse TOML text. `origin` names the file in error messages.
    pub fn from_toml_str(text: &str, origin: &Path) -> SdkResult<Self> {
        toml::from_str(text).map_err(|e| SdkError::Config {
            path: origin.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Load an explicitly named config file. A missing file is an error.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SdkError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&text, path)
    }

    /// Load `rdmerge.toml` from the project directory if it exists.
    pub fn discover(project_path: &Path) -> SdkResult<Option<Self>> {
        let candidate = project_path.join(CONFIG_FILE_NAME);
        if !candidate.is_file() {
            return Ok(None);
        }
        Self::load(&candidate).map(Some)
    }

    /// Lay `over` on top of `self`; fields set in `over` win.
    pub fn overlay(self, over: FileConfig) -> FileConfig {
        FileConfig {
            project_name: over.project_name.or(self.project_name),
            source: over.source.or(self.source),
            output: over.output.or(self.output),
            conflict_policy: over.conflict_policy.or(self.conflict_policy),
            rewrite_attribute_values: over.rewrite_attribute_values.or(self.rewrite_attribute_values),
            indent: over.indent.or(self.indent),
            check_only: over.check_only.or(self.check_only),
        }
    }
}

// ---------------------------------------------------------------------------
// MergeConfig
// ---------------------------------------------------------------------------

/// Run parameters before validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeConfig {
    pub project_path: PathBuf,
    /// Assembly name used in component locators. Derived when unset.
    pub project_name: Option<String>,
    /// Entry document, relative to the project path.
    pub source: String,
    /// Output document, relative to the project path.
    pub output: String,
    pub conflict_policy: ConflictStrategy,
    pub rewrite_attribute_values: bool,
    pub indent: usize,
    /// Report whether the output is current without writing it.
    pub check_only: bool,
}

impl MergeConfig {
    /// Defaults for a project directory.
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            project_name: None,
            source: DEFAULT_SOURCE.to_string(),
            output: DEFAULT_OUTPUT.to_string(),
            conflict_policy: ConflictStrategy::default(),
            rewrite_attribute_values: true,
            indent: DEFAULT_INDENT,
            check_only: false,
        }
    }

    /// Apply a settings layer on top of these parameters.
    pub fn with_layer(mut self, layer: FileConfig) -> Self {
        if let Some(name) = layer.project_name {
            self.project_name = Some(name);
        }
        if let Some(source) = layer.source {
            self.source = source;
        }
        if let Some(output) = layer.output {
            self.output = output;
        }
        if let Some(policy) = layer.conflict_policy {
            self.conflict_policy = policy;
        }
        if let Some(rewrite) = layer.rewrite_attribute_values {
            self.rewrite_attribute_values = rewrite;
        }
        if let Some(indent) = layer.indent {
            self.indent = indent;
        }
        if let Some(check) = layer.check_only {
            self.check_only = check;
        }
        self
    }

    /// Validate the parameters.
    ///
    /// Checks, in order: the project path exists, the source ends with
    /// `.xaml`, the output ends with `.xaml`.
    pub fn resolve(&self) -> SdkResult<ResolvedConfig> {
        if !self.project_path.is_dir() {
            return Err(SdkError::ProjectPathMissing(self.project_path.clone()));
        }
        if !has_document_extension(&self.source) {
            return Err(SdkError::InvalidSourceExtension(self.source.clone()));
        }
        if !has_document_extension(&self.output) {
            return Err(SdkError::InvalidOutputExtension(self.output.clone()));
        }

        let absolute = std::path::absolute(&self.project_path).map_err(|e| SdkError::Io {
            path: self.project_path.clone(),
            source: e,
        })?;
        let project_root = normalize(&absolute);

        let project_name = match self.project_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => derive_project_name(&project_root),
        };

        Ok(ResolvedConfig {
            source: project_file(&project_root, &self.source),
            output: project_file(&project_root, &self.output),
            project_root,
            project_name,
            conflict_policy: self.conflict_policy,
            rewrite_attribute_values: self.rewrite_attribute_values,
            indent: self.indent,
            check_only: self.check_only,
        })
    }
}

/// Validated run parameters with absolute, normalized paths.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub project_root: PathBuf,
    pub project_name: String,
    pub source: PathBuf,
    pub output: PathBuf,
    pub conflict_policy: ConflictStrategy,
    pub rewrite_attribute_values: bool,
    pub indent: usize,
    pub check_only: bool,
}

/// The name of the project directory's parent, or of the directory itself
/// when it has no named parent.
fn derive_project_name(project_root: &Path) -> String {
    project_root
        .parent()
        .and_then(Path::file_name)
        .or_else(|| project_root.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Join a project-relative path, written with or without a leading slash.
fn project_file(project_root: &Path, relative: &str) -> PathBuf {
    let relative = relative.replace('\\', "/");
    normalize(&project_root.join(relative.trim_start_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults() {
        let config = MergeConfig::new("/p");
        assert_eq!(config.source, "/LookAndFeel.xaml");
        assert_eq!(config.output, "/FullLookAndFeel.xaml");
        assert_eq!(config.conflict_policy, ConflictStrategy::KeepFirst);
        assert!(config.rewrite_attribute_values);
        assert_eq!(config.indent, 4);
        assert!(!config.check_only);
    }

    #[test]
    fn resolve_joins_paths_under_the_project() {
        let dir = tempdir().unwrap();
        let project = dir.path().join("Suite").join("Demo");
        std::fs::create_dir_all(&project).unwrap();

        let mut config = MergeConfig::new(&project);
        config.source = "/Themes/../LookAndFeel.xaml".into();
        config.output = r"Out\Full.xaml".into();
        let resolved = config.resolve().unwrap();

        assert_eq!(resolved.project_name, "Suite");
        assert_eq!(resolved.source, resolved.project_root.join("LookAndFeel.xaml"));
        assert_eq!(resolved.output, resolved.project_root.join("Out").join("Full.xaml"));
        assert!(resolved.project_root.is_absolute());
    }

    #[test]
    fn explicit_project_name_wins() {
        let dir = tempdir().unwrap();
        let mut config = MergeConfig::new(dir.path());
        config.project_name = Some("Custom".into());
        assert_eq!(config.resolve().unwrap().project_name, "Custom");

        config.project_name = Some("  ".into());
        assert_ne!(config.resolve().unwrap().project_name, "  ");
    }

    #[test]
    fn project_name_falls_back_to_own_name_at_top_level() {
        assert_eq!(derive_project_name(Path::new("/Demo")), "Demo");
        assert_eq!(derive_project_name(Path::new("/work/Demo")), "work");
    }

    #[test]
    fn validation_errors_in_order() {
        let missing = MergeConfig::new("/definitely/not/here/rdmerge");
        let err = missing.resolve().unwrap_err();
        assert!(matches!(err, SdkError::ProjectPathMissing(_)));
        assert_eq!(err.code().code(), 1);

        let dir = tempdir().unwrap();
        let mut config = MergeConfig::new(dir.path());
        config.source = "/LookAndFeel.xml".into();
        config.output = "/Out.txt".into();
        assert!(matches!(config.resolve().unwrap_err(), SdkError::InvalidSourceExtension(_)));

        config.source = "/LookAndFeel.XAML".into();
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, SdkError::InvalidOutputExtension(_)));
        assert_eq!(err.code().code(), 3);
    }

    #[test]
    fn file_config_parses_toml() {
        let text = r#"
            project_name = "Demo"
            source = "/Themes/Main.xaml"
            conflict_policy = "keep-last"
            indent = 2
        "#;
        let layer = FileConfig::from_toml_str(text, Path::new("rdmerge.toml")).unwrap();
        assert_eq!(layer.project_name.as_deref(), Some("Demo"));
        assert_eq!(layer.conflict_policy, Some(ConflictStrategy::KeepLast));
        assert_eq!(layer.indent, Some(2));
        assert_eq!(layer.output, None);
    }

    #[test]
    fn malformed_file_config_is_a_config_error() {
        for text in ["indent = \"wide\"", "unknown_key = 1", "conflict_policy = \"newest\"", "[["] {
            let err = FileConfig::from_toml_str(text, Path::new("rdmerge.toml")).unwrap_err();
            assert!(matches!(err, SdkError::Config { .. }), "{text}");
            assert_eq!(err.code().code(), 8);
        }
    }

    #[test]
    fn discover_reads_project_file() {
        let dir = tempdir().unwrap();
        assert_eq!(FileConfig::discover(dir.path()).unwrap(), None);

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "check_only = true\n").unwrap();
        let layer = FileConfig::discover(dir.path()).unwrap().unwrap();
        assert_eq!(layer.check_only, Some(true));

        let err = FileConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, SdkError::Config { .. }));
    }

    #[test]
    fn later_layers_win() {
        let file = FileConfig {
            source: Some("/FromFile.xaml".into()),
            indent: Some(2),
            conflict_policy: Some(ConflictStrategy::Error),
            ..Default::default()
        };
        let flags = FileConfig {
            source: Some("/FromFlag.xaml".into()),
            ..Default::default()
        };
        let config = MergeConfig::new("/p").with_layer(file.overlay(flags));

        assert_eq!(config.source, "/FromFlag.xaml");
        assert_eq!(config.indent, 2);
        assert_eq!(config.conflict_policy, ConflictStrategy::Error);
        assert_eq!(config.output, "/FullLookAndFeel.xaml");
    }
}
