use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

mod cli;
mod commands;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match commands::run_command(cli) {
        Ok(code) => code,
        Err(err) => commands::report_error(&err),
    }
}
