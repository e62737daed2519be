//! CLI entry point for the apml tool.
//!
//! Captures the invocation with clap, dispatches it against the simulated
//! platform, renders the outcome and exits with its status: 0 on success,
//! 1 when the platform rejected the command, 2 for a malformed invocation.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use apml_cli::{
    cli::{Cli, render_outcome, run_cli},
    logging::{self, LoggingError},
};
use tracing::error;

/// Run the invocation and render its outcome, returning the exit status.
fn try_main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let outcome = run_cli(&cli);
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut writer = BufWriter::new(stdout.lock());
    render_outcome(&outcome, &mut writer, stderr.lock()).context("failed to render output")?;
    writer.flush().context("failed to flush output")?;
    Ok(ExitCode::from(outcome.exit_code()))
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    match try_main() {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "command execution failed");
            ExitCode::FAILURE
        }
    }
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
