//! Command-line interface for the apml tool.
//!
//! Raw tokens are handed to the core dispatcher unchanged; this module owns
//! only option capture, the simulated platform and console rendering.

mod commands;

pub use commands::{Cli, render_outcome, render_report, run_cli, run_with};

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;
