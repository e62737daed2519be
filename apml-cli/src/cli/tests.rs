//! Unit tests for option capture, execution and rendering.

use apml_core::{DomainError, OobStatus, Report, SimulatedPlatform};
use apml_test_support::tracing::capture;
use clap::Parser;
use rstest::rstest;

use super::test_helpers::{invoke, tokens};
use super::{Cli, render_report, run_cli};

#[rstest]
#[case(&["apml", "0", "--showpower"], &["0", "--showpower"])]
#[case(&["apml", "--help", "sbtsi"], &["--help", "sbtsi"])]
#[case(&["apml", "-v"], &["-v"])]
#[case(&["apml", "1", "-T", "-2.5"], &["1", "-T", "-2.5"])]
#[case(&["apml"], &[])]
fn tokens_reach_the_dispatcher_unchanged(#[case] argv: &[&str], #[case] expected: &[&str]) {
    let cli = Cli::try_parse_from(argv).expect("arguments parse");
    assert_eq!(cli.tokens, tokens(expected));
    assert_eq!((cli.sockets, cli.quiesce_ms), (2, 10));
}

#[test]
fn platform_options_precede_the_tokens() {
    let cli = Cli::try_parse_from(["apml", "--sockets", "1", "--quiesce-ms", "0", "1", "--showtdp"])
        .expect("arguments parse");
    assert_eq!((cli.sockets, cli.quiesce_ms), (1, 0));
    let outcome = run_cli(&cli);
    assert_eq!(outcome.exit_code(), 1, "socket 1 is absent: {outcome:?}");
}

#[test]
fn report_renders_as_a_bordered_table() {
    let mut report = Report::titled("Demo");
    report
        .field("Power (Watts)", "125.000")
        .note("done")
        .heading("Group")
        .field("Fmax", "3700");
    let mut out = Vec::new();
    render_report(&report, &mut out).expect("render");
    let text = String::from_utf8(out).expect("utf-8");
    let lines: Vec<&str> = text.lines().collect();

    let rule = "-".repeat(71);
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0], rule);
    assert_eq!(lines[1].trim_matches(|c: char| c == '|' || c == ' '), "Demo");
    assert_eq!(
        lines[3],
        format!("| {:<40} | {:<24} |", "Power (Watts)", "125.000")
    );
    assert_eq!(lines[5], "done");
    assert_eq!(lines[7], format!("| {:<67} |", "Group"));
    assert!(lines[8].starts_with("| Fmax "));
    assert_eq!(lines[9], rule);
}

#[test]
fn summary_failures_render_inline() {
    let mut platform = SimulatedPlatform::new();
    platform.fail_on("read_tdp", DomainError::from_status(OobStatus::NotSupported));
    let rendered = invoke(&mut platform, &["0", "--showmailboxsummary"]);
    assert_eq!(rendered.outcome.exit_code(), 0);
    assert!(rendered.stderr.is_empty());
    let failure = rendered
        .stdout
        .lines()
        .find(|line| line.starts_with("| TDP Avg (Watts)"))
        .expect("failed line is still listed");
    assert!(failure.contains("Err[3]: Requested operation not supported"));
}

#[test]
fn usage_errors_print_the_command_usage() {
    let mut platform = SimulatedPlatform::new();
    let rendered = invoke(&mut platform, &["0", "--setdimmpower", "1a"]);
    assert_eq!(rendered.outcome.exit_code(), 2);
    assert!(rendered.stdout.is_empty());
    assert_eq!(
        rendered.stderr,
        "Error: `setdimmpower` requires argument 2 [POWER]\n\
         Usage: apml [SOC_NUM] -P, --setdimmpower [DIMM_ADDR][POWER][UPDATERATE]\n"
    );
}

#[rstest]
#[case(&["zero"])]
#[case(&["0", "--nosuchcommand"])]
fn usage_errors_without_a_command_point_at_help(#[case] raw: &[&str]) {
    let mut platform = SimulatedPlatform::new();
    let rendered = invoke(&mut platform, raw);
    assert_eq!(rendered.outcome.exit_code(), 2);
    let last = rendered.stderr.lines().last().expect("two lines");
    assert_eq!(last, "Try `apml --help' for more information.");
}

#[test]
fn domain_errors_name_the_action() {
    let mut platform = SimulatedPlatform::new();
    let rendered = invoke(&mut platform, &["0", "--setlowtempthreshold", "80"]);
    assert_eq!(rendered.outcome.exit_code(), 1);
    assert_eq!(
        rendered.stderr,
        "Failed to set Lower Temp threshold limit, Err[12]: Input value is invalid\n"
    );
}

#[test]
fn help_lists_modules_on_stdout() {
    let mut platform = SimulatedPlatform::new();
    let rendered = invoke(&mut platform, &["--help"]);
    assert_eq!(rendered.outcome.exit_code(), 0);
    for module in ["1. mailbox", "2. sbrmi", "3. sbtsi", "4. reg-access", "5. cpuid"] {
        assert!(rendered.stdout.contains(module), "missing {module}");
    }
}

#[test]
fn run_cli_records_platform_options_on_its_span() {
    let cli = Cli {
        quiesce_ms: 0,
        sockets: 1,
        tokens: tokens(&["0", "--showsktfreqrange"]),
    };
    let (outcome, recording) = capture(|| run_cli(&cli));
    assert_eq!(outcome.exit_code(), 0);

    let span = recording.span("cli.run").expect("cli span closed");
    assert_eq!(span.field("sockets"), Some("1"));
    assert_eq!(span.field("quiesce_ms"), Some("0"));
    let inner = recording.span("dispatch.run").expect("dispatch span closed");
    assert_eq!(inner.field("command"), Some("showsktfreqrange"));
    assert!(recording.messages().contains(&"command completed"));
}
