//! Support library for the apml CLI binary.
//!
//! Exposes the CLI pipeline so doctests and tests can run invocations and
//! inspect rendered output without spawning a process.

pub mod cli;
pub mod logging;
