//! fwinflate - Command-line utility for unpacking firmware restore archives.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use console::Term;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let diagnostics = init_tracing(cli.verbose);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match run(&cli, &*formatter, diagnostics) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli, formatter: &dyn output::OutputFormatter, diagnostics: bool) -> Result<()> {
    match &cli.command {
        cli::Commands::Extract(args) => {
            commands::extract::execute(args, formatter, show_progress(cli, diagnostics))
        }
        cli::Commands::DefaultDir => commands::default_dir::execute(formatter),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    }
}

/// The progress bar shares stderr with log lines, so it is hidden whenever
/// diagnostics are enabled.
fn show_progress(cli: &cli::Cli, diagnostics: bool) -> bool {
    !cli.quiet && !cli.json && !diagnostics
}

/// Logs go to stderr. `RUST_LOG` wins over the `--verbose` default.
///
/// Without either, only library errors are logged: failures already reach
/// the user through the output formatter. Returns `true` when diagnostic
/// logging was requested.
fn init_tracing(verbose: bool) -> bool {
    let from_env = EnvFilter::try_from_default_env().ok();
    let diagnostics = verbose || from_env.is_some();
    let default_level = if verbose { "debug" } else { "error" };
    let filter = from_env.unwrap_or_else(|| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(Term::stderr().is_term())
        .with_target(false)
        .init();

    diagnostics
}
