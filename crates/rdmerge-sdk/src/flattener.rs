use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use rdmerge_doc::WriteOptions;
use rdmerge_graph::{
    AppliedRename, BuildOptions, DisambiguateOptions, DocumentSource, FsSource, GraphBuilder,
    GraphError, SkippedReference,
};
use rdmerge_merge::{ConflictStrategy, MergeEngine, MergeStats};
use rdmerge_types::{NamespaceBinding, Priority};

use crate::config::ResolvedConfig;
use crate::error::SdkResult;
use crate::output::{write_if_changed, OutputOptions, WriteOutcome};

/// A merged document, in merge order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub path: PathBuf,
    pub priority: Priority,
    /// Discovery index.
    pub order: usize,
}

/// Everything a run did.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub project_root: PathBuf,
    pub project_name: String,
    pub entry: PathBuf,
    pub policy: ConflictStrategy,
    pub documents: Vec<DocumentSummary>,
    pub namespaces: Vec<NamespaceBinding>,
    pub renames: Vec<AppliedRename>,
    pub skipped: Vec<SkippedReference>,
    pub stats: MergeStats,
    pub output: WriteOutcome,
}

impl RunReport {
    /// `true` when the output file already matched the merged document.
    pub fn is_up_to_date(&self) -> bool {
        !self.output.changed
    }
}

/// Runs one merge end to end: build the graph, merge, write.
pub struct Flattener<S = FsSource> {
    config: ResolvedConfig,
    source: S,
    show_diff: bool,
}

impl Flattener<FsSource> {
    /// Flatten documents from the local filesystem.
    pub fn new(config: ResolvedConfig) -> Self {
        Self::with_source(config, FsSource)
    }
}

impl<S: DocumentSource> Flattener<S> {
    pub fn with_source(config: ResolvedConfig, source: S) -> Self {
        Self {
            config,
            source,
            show_diff: false,
        }
    }

    /// Render a diff of the output when it changes.
    pub fn show_diff(mut self, show: bool) -> Self {
        self.show_diff = show;
        self
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Execute the run. Nothing is written unless building and merging
    /// both succeed.
    pub fn run(&self) -> SdkResult<RunReport> {
        let config = &self.config;
        info!(
            entry = %config.source.display(),
            project = %config.project_name,
            "flattening resource dictionaries"
        );

        let builder = GraphBuilder::new(
            &self.source,
            BuildOptions {
                project_root: config.project_root.clone(),
                project_name: config.project_name.clone(),
                namespaces: DisambiguateOptions {
                    rewrite_attribute_values: config.rewrite_attribute_values,
                },
            },
        );
        let graph = builder.build(&config.source)?;
        let Some(entry) = graph.entry() else {
            return Err(GraphError::SourceFileMissing {
                path: config.source.clone(),
            }
            .into());
        };
        let root_name = entry.document.root().name().to_string();

        let engine = MergeEngine::with_strategy(config.conflict_policy);
        let merged = engine.merge(&graph, &root_name)?;

        let options = OutputOptions {
            write: WriteOptions {
                indent: config.indent,
                ..Default::default()
            },
            check_only: config.check_only,
            diff: self.show_diff,
        };
        let output = write_if_changed(&config.output, &merged.document, &options)?;

        Ok(RunReport {
            project_root: config.project_root.clone(),
            project_name: config.project_name.clone(),
            entry: config.source.clone(),
            policy: config.conflict_policy,
            documents: graph
                .merge_order()
                .into_iter()
                .map(|record| DocumentSummary {
                    path: record.location.clone(),
                    priority: record.priority,
                    order: record.order,
                })
                .collect(),
            namespaces: graph.namespaces().bindings().to_vec(),
            renames: graph.renames().to_vec(),
            skipped: graph.skipped().to_vec(),
            stats: merged.stats,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MergeConfig;
    use crate::error::SdkError;
    use rdmerge_types::ErrorCode;
    use std::path::Path;
    use tempfile::tempdir;

    const HEAD: &str = r#"xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation" xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml""#;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// A small project: the entry pulls in two themes that share a palette.
    fn project(root: &Path) {
        write(
            root,
            "LookAndFeel.xaml",
            &format!(
                r#"<ResourceDictionary {HEAD}>
                    <ResourceDictionary.MergedDictionaries>
                        <ResourceDictionary Source="/Demo;component/Themes/Buttons.xaml"/>
                        <ResourceDictionary Source="/Demo;component/Themes/Lists.xaml"/>
                        <ResourceDictionary Source="pack://application:,,,/Other;component/Theme.xaml"/>
                    </ResourceDictionary.MergedDictionaries>
                    <SolidColorBrush x:Key="Accent" Color="Red"/>
                </ResourceDictionary>"#
            ),
        );
        write(
            root,
            "Themes/Buttons.xaml",
            &format!(
                r#"<ResourceDictionary {HEAD}>
                    <ResourceDictionary.MergedDictionaries>
                        <ResourceDictionary Source="Palette.xaml"/>
                    </ResourceDictionary.MergedDictionaries>
                    <Style x:Key="Button"/>
                </ResourceDictionary>"#
            ),
        );
        write(
            root,
            "Themes/Lists.xaml",
            &format!(
                r#"<ResourceDictionary {HEAD}>
                    <ResourceDictionary.MergedDictionaries>
                        <ResourceDictionary Source="/Themes/Palette.xaml"/>
                    </ResourceDictionary.MergedDictionaries>
                    <Style x:Key="List"/>
                </ResourceDictionary>"#
            ),
        );
        write(
            root,
            "Themes/Palette.xaml",
            &format!(
                r#"<ResourceDictionary {HEAD}>
                    <SolidColorBrush x:Key="Accent" Color="Green"/>
                </ResourceDictionary>"#
            ),
        );
    }

    fn config(root: &Path) -> MergeConfig {
        let mut config = MergeConfig::new(root);
        config.project_name = Some("Demo".into());
        config
    }

    #[test]
    fn flattens_a_project() {
        let dir = tempdir().unwrap();
        project(dir.path());

        let report = Flattener::new(config(dir.path()).resolve().unwrap()).run().unwrap();

        let order: Vec<String> = report
            .documents
            .iter()
            .map(|d| d.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(order, vec!["Palette.xaml", "Buttons.xaml", "Lists.xaml", "LookAndFeel.xaml"]);
        assert_eq!(report.documents[0].priority, Priority::Level(3));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.stats.elements, 3);
        assert_eq!(report.stats.duplicates_dropped, 1);
        assert!(report.output.written);

        let written = std::fs::read_to_string(dir.path().join("FullLookAndFeel.xaml")).unwrap();
        assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(written.contains(r#"<SolidColorBrush x:Key="Accent" Color="Green"/>"#));
        assert!(!written.contains("Red"));
        assert!(!written.contains("MergedDictionaries"));
    }

    #[test]
    fn second_run_writes_nothing() {
        let dir = tempdir().unwrap();
        project(dir.path());
        let resolved = config(dir.path()).resolve().unwrap();

        let first = Flattener::new(resolved.clone()).run().unwrap();
        let second = Flattener::new(resolved).run().unwrap();

        assert!(first.output.written);
        assert!(!second.output.written);
        assert!(second.is_up_to_date());
        assert_eq!(first.output.digest, second.output.digest);
    }

    #[test]
    fn check_mode_reports_without_writing() {
        let dir = tempdir().unwrap();
        project(dir.path());
        let mut config = config(dir.path());
        config.check_only = true;

        let report = Flattener::new(config.resolve().unwrap()).show_diff(true).run().unwrap();

        assert!(!report.is_up_to_date());
        assert!(!report.output.written);
        assert!(report.output.diff.is_some());
        assert!(!dir.path().join("FullLookAndFeel.xaml").exists());
    }

    #[test]
    fn failures_leave_no_output() {
        let dir = tempdir().unwrap();
        project(dir.path());
        std::fs::remove_file(dir.path().join("Themes/Palette.xaml")).unwrap();

        let err = Flattener::new(config(dir.path()).resolve().unwrap()).run().unwrap_err();

        assert!(matches!(err, SdkError::Graph(_)));
        assert_eq!(err.code(), ErrorCode::SourceFileMissing);
        assert!(!dir.path().join("FullLookAndFeel.xaml").exists());
    }

    #[test]
    fn rejected_duplicates_carry_their_code() {
        let dir = tempdir().unwrap();
        project(dir.path());
        let mut config = config(dir.path());
        config.conflict_policy = ConflictStrategy::Error;

        let err = Flattener::new(config.resolve().unwrap()).run().unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateKey);
        assert_eq!(err.code().code(), 7);
    }

    #[test]
    fn missing_entry_document() {
        let dir = tempdir().unwrap();
        let err = Flattener::new(config(dir.path()).resolve().unwrap()).run().unwrap_err();
        assert_eq!(err.code(), ErrorCode::SourceFileMissing);
    }

    #[test]
    fn report_serializes_to_json() {
        let dir = tempdir().unwrap();
        project(dir.path());
        let report = Flattener::new(config(dir.path()).resolve().unwrap()).run().unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["policy"], "keep-first");
        assert_eq!(json["documents"][3]["priority"], "root");
        assert_eq!(json["documents"][0]["priority"]["level"], 3);
        assert_eq!(json["output"]["written"], true);
    }
}
