use std::process::ExitCode;

use colored::Colorize;
use rdmerge_sdk::{ErrorCode, FileConfig, Flattener, MergeConfig, RunReport, SdkError};

use crate::cli::*;

/// Exit status of `--check` when the output is out of date. Sits above
/// every [`ErrorCode`] so scripts can tell it apart from a failure.
const OUT_OF_DATE: u8 = 10;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::discover(&cli.project_path)?.unwrap_or_default(),
    };
    let config = MergeConfig::new(&cli.project_path)
        .with_layer(file.overlay(cli.overrides()))
        .resolve()?;
    let check_only = config.check_only;

    let report = Flattener::new(config).show_diff(cli.diff).run()?;

    match cli.format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if check_only && !report.is_up_to_date() {
        Ok(ExitCode::from(OUT_OF_DATE))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Print a failure and map it to the process exit status.
pub fn report_error(err: &anyhow::Error) -> ExitCode {
    let code = err
        .downcast_ref::<SdkError>()
        .map(SdkError::code)
        .unwrap_or(ErrorCode::Io);
    eprintln!("{} {:#}", format!("error[E{:03}]:", code.code()).red().bold(), err);
    ExitCode::from(code.code())
}

fn print_report(report: &RunReport) {
    println!(
        "Flattening {} (project {})",
        report.entry.display().to_string().bold(),
        report.project_name.cyan()
    );

    println!("Merge order:");
    for doc in &report.documents {
        let path = doc.path.strip_prefix(&report.project_root).unwrap_or(doc.path.as_path());
        println!("  {:>5}  {}", doc.priority.to_string().cyan(), path.display());
    }

    for applied in &report.renames {
        let rename = &applied.rename;
        let from = if rename.from.is_empty() { "(default)" } else { rename.from.as_str() };
        println!(
            "  {} {} -> {} in {}",
            "renamed".yellow(),
            from,
            rename.to.bold(),
            applied.location.display()
        );
    }
    for skipped in &report.skipped {
        println!(
            "  {} {} in {}",
            "skipped".dimmed(),
            skipped.locator,
            skipped.referrer.display()
        );
    }

    let stats = &report.stats;
    println!(
        "{} documents, {} entries, {} duplicates dropped, {} replaced",
        stats.documents.to_string().bold(),
        stats.elements.to_string().bold(),
        stats.duplicates_dropped,
        stats.duplicates_replaced
    );

    let output = &report.output;
    let digest = output.digest.get(..12).unwrap_or(&output.digest);
    if output.written {
        println!(
            "{} Wrote {} ({} bytes, blake3 {})",
            "✓".green().bold(),
            output.path.display().to_string().bold(),
            output.bytes,
            digest.dimmed()
        );
    } else if output.changed {
        println!(
            "{} {} is out of date",
            "✗".red().bold(),
            output.path.display().to_string().bold()
        );
    } else {
        println!(
            "{} {} is up to date",
            "✓".green().bold(),
            output.path.display().to_string().bold()
        );
    }

    if let Some(diff) = &output.diff {
        for line in diff.lines() {
            if line.starts_with('+') && !line.starts_with("+++") {
                println!("{}", line.green());
            } else if line.starts_with('-') && !line.starts_with("---") {
                println!("{}", line.red());
            } else {
                println!("{line}");
            }
        }
    }
}
