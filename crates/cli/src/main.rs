//! rcache CLI Application
//!
//! Lists, searches, adds and clears cached research findings.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use research_cache_cli::cli::{
    Cli, CliError, EXIT_OK, EXIT_WARNINGS, OkEnvelope, exit_code_for, exit_code_for_parse_error,
    render_error,
};
use research_cache_cli::commands::{self, CommandOutput};
use research_cache_cli::tracing::{Level, TracingConfig, init_tracing};
use research_cache_cli::{command_span, context_from_cli};

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if let Err(io_err) = err.print() {
                eprintln!("Failed to print usage: {io_err}");
            }
            std::process::exit(exit_code_for_parse_error(&err));
        }
    };
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let tracing_config = TracingConfig {
        format: cli.log_format,
        level: Level::from(cli.level),
        ..TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("Warning: {e}");
    }

    let span = command_span!(cli.command.name());
    let _guard = span.enter();

    let json_mode = cli.json;
    let result = context_from_cli(&cli, chrono::Local::now().date_naive())
        .and_then(|ctx| commands::execute(cli.command, &ctx));

    match result {
        Ok(output) => match print_output(&output, json_mode) {
            Ok(()) if output.warnings > 0 => EXIT_WARNINGS,
            Ok(()) => EXIT_OK,
            Err(err) => {
                render_error(&err, json_mode);
                exit_code_for(&err)
            }
        },
        Err(err) => {
            tracing::debug!(error = %err, "Command failed");
            render_error(&err, json_mode);
            exit_code_for(&err)
        }
    }
}

fn print_output(output: &CommandOutput, json_mode: bool) -> Result<(), CliError> {
    if json_mode {
        let envelope = OkEnvelope::new(&output.data);
        let json = serde_json::to_string(&envelope)
            .map_err(|e| CliError::other(format!("JSON serialization failed: {e}")))?;
        println!("{json}");
    } else {
        println!("{}", output.text);
        if output.warnings > 0 {
            eprintln!(
                "Warning: skipped {} malformed cache entries (run with -L warn for details)",
                output.warnings
            );
        }
    }
    Ok(())
}
