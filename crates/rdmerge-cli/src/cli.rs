use std::path::PathBuf;

use clap::Parser;
use rdmerge_sdk::{ConflictStrategy, FileConfig};

#[derive(Parser, Debug)]
#[command(
    name = "rdmerge",
    about = "Flatten linked XAML resource dictionaries into a single document",
    version,
)]
pub struct Cli {
    /// Project directory holding the entry document
    pub project_path: PathBuf,

    /// Assembly name used in `/{name};component/` locators [default: parent directory name]
    #[arg(long)]
    pub project_name: Option<String>,

    /// Entry document, relative to the project directory
    #[arg(long)]
    pub source: Option<String>,

    /// Output document, relative to the project directory
    #[arg(long)]
    pub output: Option<String>,

    /// Config file to use instead of `<PROJECT_PATH>/rdmerge.toml`
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// What to do when two documents define the same key
    #[arg(long, value_enum)]
    pub on_conflict: Option<ConflictArg>,

    /// Leave `prefix:Type` references inside attribute values untouched
    #[arg(long)]
    pub no_rewrite_values: bool,

    /// Spaces per nesting level in the output
    #[arg(long)]
    pub indent: Option<usize>,

    /// Only report whether the output is up to date (exit status 10 if not)
    #[arg(long)]
    pub check: bool,

    /// Print a diff when the output changes
    #[arg(long)]
    pub diff: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ConflictArg {
    KeepFirst,
    KeepLast,
    Error,
}

impl From<ConflictArg> for ConflictStrategy {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::KeepFirst => ConflictStrategy::KeepFirst,
            ConflictArg::KeepLast => ConflictStrategy::KeepLast,
            ConflictArg::Error => ConflictStrategy::Error,
        }
    }
}

impl Cli {
    /// The settings given on the command line, as the topmost config layer.
    pub fn overrides(&self) -> FileConfig {
        FileConfig {
            project_name: self.project_name.clone(),
            source: self.source.clone(),
            output: self.output.clone(),
            conflict_policy: self.on_conflict.map(ConflictStrategy::from),
            rewrite_attribute_values: self.no_rewrite_values.then_some(false),
            indent: self.indent,
            check_only: self.check.then_some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_path_only() {
        let cli = Cli::try_parse_from(["rdmerge", "./Demo"]).unwrap();
        assert_eq!(cli.project_path, PathBuf::from("./Demo"));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.verbose);
        assert_eq!(cli.overrides(), FileConfig::default());
    }

    #[test]
    fn all_options() {
        let cli = Cli::try_parse_from([
            "rdmerge",
            "/work/Demo",
            "--project-name",
            "Demo",
            "--source",
            "/Themes/Main.xaml",
            "--output",
            "/Out.xaml",
            "--on-conflict",
            "keep-last",
            "--no-rewrite-values",
            "--indent",
            "2",
            "--check",
            "--diff",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();

        assert!(cli.diff);
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);

        let layer = cli.overrides();
        assert_eq!(layer.project_name.as_deref(), Some("Demo"));
        assert_eq!(layer.source.as_deref(), Some("/Themes/Main.xaml"));
        assert_eq!(layer.output.as_deref(), Some("/Out.xaml"));
        assert_eq!(layer.conflict_policy, Some(ConflictStrategy::KeepLast));
        assert_eq!(layer.rewrite_attribute_values, Some(false));
        assert_eq!(layer.indent, Some(2));
        assert_eq!(layer.check_only, Some(true));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Cli::try_parse_from(["rdmerge"]).is_err());
        assert!(Cli::try_parse_from(["rdmerge", "p", "--on-conflict", "newest"]).is_err());
        assert!(Cli::try_parse_from(["rdmerge", "p", "--indent", "wide"]).is_err());
        assert!(Cli::try_parse_from(["rdmerge", "p", "--format", "xml"]).is_err());
    }
}
