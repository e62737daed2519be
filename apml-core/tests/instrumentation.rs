//! Instrumentation emitted while dispatching.

mod common;

use apml_core::{DomainError, OobStatus, SimulatedPlatform};
use apml_test_support::tracing::capture;
use common::dispatch;
use rstest::rstest;
use tracing::Level;

#[rstest]
#[case(&["1", "-p"], Some("1"), Some("showpower"), "dispatched")]
#[case(&["0", "--showdimmpower"], Some("0"), Some("showdimmpower"), "usage")]
#[case(&["x", "--showpower"], None, None, "usage")]
#[case(&["0"], Some("0"), Some("summary"), "dispatched")]
fn dispatch_span_records_socket_command_and_outcome(
    #[case] tokens: &[&str],
    #[case] socket: Option<&str>,
    #[case] command: Option<&str>,
    #[case] outcome: &str,
) {
    let mut platform = SimulatedPlatform::new();
    let (_, recording) = capture(|| dispatch(&mut platform, tokens));

    let span = recording.span("dispatch.run").expect("dispatch span closed");
    assert_eq!(span.field("socket"), socket);
    assert_eq!(span.field("command"), command);
    assert_eq!(span.field("outcome"), Some(outcome));
}

#[test]
fn domain_failures_mark_the_span() {
    let mut platform = SimulatedPlatform::new();
    platform.fail_on("read_tdp", DomainError::from_status(OobStatus::Permission));
    let (outcome, recording) = capture(|| dispatch(&mut platform, &["0", "--showtdp"]));

    assert_eq!(outcome.exit_code(), 1);
    let span = recording.span("dispatch.run").expect("dispatch span closed");
    assert_eq!(span.field("outcome"), Some("domain"));
}

#[test]
fn summary_failures_are_logged_as_warnings() {
    let mut platform = SimulatedPlatform::new();
    platform.fail_on("read_tsi_alert_config", DomainError::from_status(OobStatus::TryAgain));
    let (_, recording) = capture(|| dispatch(&mut platform, &["0", "--showtsiregisters"]));

    let warnings: Vec<_> = recording.events_at(Level::WARN).collect();
    assert_eq!(warnings.len(), 1);
    let warning = warnings[0];
    assert_eq!(warning.field("label"), Some("_TSI_ALERT_CONFIG"));
    assert_eq!(warning.field("error"), Some("Err[11]: Device busy, try again"));
    assert_eq!(warning.span.as_deref(), Some("dispatch.run"));
}
