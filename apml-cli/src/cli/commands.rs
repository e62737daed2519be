//! Argument capture, execution and rendering for the apml CLI.

use std::{
    io::{self, Write},
    time::Duration,
};

use apml_core::{
    DispatchOutcome, Dispatcher, Entry, Report, SimulatedPlatform, TOOL_NAME, TelemetryClient,
    UsageError, command_usage,
};
use clap::Parser;
use tracing::{field, info, instrument, warn};

const DEFAULT_QUIESCE_MS: u64 = 10;
const DEFAULT_SOCKETS: u8 = 2;
const LABEL_WIDTH: usize = 40;
const VALUE_WIDTH: usize = 24;

/// Top-level options parsed by [`clap`].
///
/// Help and version flags are not clap's: they are captured in `tokens` and
/// answered by the dispatcher, which generates help from the command table.
#[derive(Debug, Parser, Clone)]
#[command(
    name = TOOL_NAME,
    about = "Out-of-band CPU management over APML.",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Delay between a write and the read that verifies it.
    #[arg(long = "quiesce-ms", default_value_t = DEFAULT_QUIESCE_MS)]
    pub quiesce_ms: u64,

    /// Number of sockets the simulated platform manages.
    #[arg(long, default_value_t = DEFAULT_SOCKETS)]
    pub sockets: u8,

    /// Socket index, command and command arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub tokens: Vec<String>,
}

/// Executes `cli` against a [`SimulatedPlatform`].
///
/// # Examples
/// ```
/// use apml_cli::cli::{Cli, run_cli};
///
/// let cli = Cli {
///     quiesce_ms: 0,
///     sockets: 1,
///     tokens: vec!["0".into(), "--showtdp".into()],
/// };
/// assert_eq!(run_cli(&cli).exit_code(), 0);
/// ```
#[instrument(
    name = "cli.run",
    skip(cli),
    fields(sockets = cli.sockets, quiesce_ms = cli.quiesce_ms),
)]
#[must_use]
pub fn run_cli(cli: &Cli) -> DispatchOutcome {
    let mut platform = SimulatedPlatform::with_sockets(cli.sockets)
        .with_quiescence(Duration::from_millis(cli.quiesce_ms));
    run_with(&mut platform, &cli.tokens)
}

/// Dispatches `tokens` against `client` and logs the outcome.
pub fn run_with(client: &mut dyn TelemetryClient, tokens: &[String]) -> DispatchOutcome {
    let outcome = Dispatcher::new(client).run(tokens);
    match &outcome {
        DispatchOutcome::Dispatched(report) => {
            info!(entries = report.entries().len(), "command completed");
        }
        DispatchOutcome::Usage(err) => {
            warn!(code = %err.code(), error = %err, "invocation rejected");
        }
        DispatchOutcome::Domain { action, error } => {
            warn!(
                action = *action,
                code = error.code(),
                status = field::debug(error.status()),
                "command failed"
            );
        }
    }
    outcome
}

/// Writes a report to `out` and any failure message to `err`.
///
/// # Errors
/// Returns [`io::Error`] if either writer fails.
///
/// # Examples
/// ```
/// use apml_cli::cli::render_outcome;
/// use apml_core::{DispatchOutcome, DomainError, OobStatus};
///
/// let outcome = DispatchOutcome::Domain {
///     action: "get tdp",
///     error: DomainError::from_status(OobStatus::CmdTimeout),
/// };
/// let (mut out, mut err) = (Vec::new(), Vec::new());
/// render_outcome(&outcome, &mut out, &mut err)?;
/// assert!(out.is_empty());
/// assert_eq!(String::from_utf8_lossy(&err), "Failed to get tdp, Err[13]: Command timed out\n");
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn render_outcome(
    outcome: &DispatchOutcome,
    mut out: impl Write,
    mut err: impl Write,
) -> io::Result<()> {
    match outcome {
        DispatchOutcome::Dispatched(report) => render_report(report, out),
        DispatchOutcome::Usage(usage) => render_usage_error(usage, err),
        DispatchOutcome::Domain { action, error } => {
            out.flush()?;
            writeln!(err, "Failed to {action}, {error}")
        }
    }
}

fn render_usage_error(usage: &UsageError, mut err: impl Write) -> io::Result<()> {
    writeln!(err, "Error: {usage}")?;
    match usage.command().and_then(command_usage) {
        Some(line) => writeln!(err, "{line}"),
        None => writeln!(err, "Try `{TOOL_NAME} --help' for more information."),
    }
}

/// Writes `report` as bordered tables separated by free-text notes.
///
/// # Errors
/// Returns [`io::Error`] if writing fails.
pub fn render_report(report: &Report, mut out: impl Write) -> io::Result<()> {
    let mut table = Table::new(&mut out);
    if let Some(title) = report.title() {
        table.banner(title)?;
    }
    for entry in report.entries() {
        match entry {
            Entry::Field { label, value } => table.row(label, value)?,
            Entry::Failure { label, error } => table.row(label, &error.to_string())?,
            Entry::Heading(label) => table.heading(label)?,
            Entry::Note(text) => table.note(text)?,
        }
    }
    table.close()
}

struct Table<W> {
    out: W,
    open: bool,
}

impl<W: Write> Table<W> {
    const fn new(out: W) -> Self {
        Self { out, open: false }
    }

    fn rule(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "-".repeat(LABEL_WIDTH + VALUE_WIDTH + 7))
    }

    fn ensure_open(&mut self) -> io::Result<()> {
        if !self.open {
            self.rule()?;
            self.open = true;
        }
        Ok(())
    }

    fn banner(&mut self, title: &str) -> io::Result<()> {
        self.ensure_open()?;
        writeln!(self.out, "| {title:^width$} |", width = LABEL_WIDTH + VALUE_WIDTH + 3)?;
        self.rule()
    }

    fn heading(&mut self, label: &str) -> io::Result<()> {
        if self.open {
            self.rule()?;
        }
        self.ensure_open()?;
        writeln!(self.out, "| {label:<width$} |", width = LABEL_WIDTH + VALUE_WIDTH + 3)
    }

    fn row(&mut self, label: &str, value: &str) -> io::Result<()> {
        self.ensure_open()?;
        writeln!(self.out, "| {label:<LABEL_WIDTH$} | {value:<VALUE_WIDTH$} |")
    }

    fn note(&mut self, text: &str) -> io::Result<()> {
        self.close()?;
        writeln!(self.out, "{text}")
    }

    fn close(&mut self) -> io::Result<()> {
        if self.open {
            self.rule()?;
            self.open = false;
        }
        Ok(())
    }
}
