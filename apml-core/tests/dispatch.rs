//! End-to-end dispatch against the simulated platform.

mod common;

use apml_core::{
    DispatchOutcome, DomainError, OobStatus, SimulatedPlatform, UsageError, table::COMMANDS,
};
use common::{dispatch, dispatched, sample_tokens};
use rstest::rstest;

#[test]
fn every_command_dispatches_with_sample_arguments() {
    for command in COMMANDS {
        let mut platform = SimulatedPlatform::new();
        let mut tokens = vec!["0".to_owned(), format!("--{}", command.name)];
        tokens.extend(sample_tokens(command));
        let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();

        let outcome = dispatch(&mut platform, &tokens);
        assert!(
            matches!(outcome, DispatchOutcome::Dispatched(_)),
            "{} failed: {outcome:?}",
            command.name
        );
    }
}

#[test]
fn every_alias_reaches_the_same_handler_as_its_name() {
    for command in COMMANDS.iter().filter(|command| command.arity.is_empty()) {
        let Some(alias) = command.alias else {
            continue;
        };
        let by_name = dispatch(&mut SimulatedPlatform::new(), &["0", command.name]);
        let alias = format!("-{alias}");
        let by_alias = dispatch(&mut SimulatedPlatform::new(), &["0", alias.as_str()]);
        assert_eq!(by_name, by_alias, "{}", command.name);
    }
}

#[test]
fn dimm_power_written_by_alias_reads_back() {
    let mut platform = SimulatedPlatform::new();
    let written = dispatched(dispatch(&mut platform, &["0", "-P", "1a", "500", "100"]));
    assert_eq!(written.failures().count(), 0);

    let read = dispatched(dispatch(&mut platform, &["0", "--showdimmpower", "0x1a"]));
    assert_eq!(read.value_of("DIMM Power (mW)"), Some("500"));
    assert_eq!(read.value_of("Update rate (ms)"), Some("100"));
    assert_eq!(platform.calls(), &["write_dimm_power", "read_dimm_power"]);
}

#[test]
fn lookahead_stops_at_an_option_token() {
    let mut platform = SimulatedPlatform::new();
    let outcome = dispatch(&mut platform, &["0", "--setdimmpower", "1a", "--showpower"]);
    assert_eq!(
        outcome,
        DispatchOutcome::Usage(UsageError::MissingArgument {
            command: "setdimmpower",
            position: 2,
            slot: "POWER",
        })
    );
    assert!(platform.calls().is_empty());
}

#[rstest]
#[case(&["0", "--setpowerlimit", "4294967296"])]
#[case(&["0", "--setdimmpower", "1a", "32768", "1"])]
#[case(&["0", "--showdimmpower", "zz"])]
#[case(&["0", "--showtdp", "extra"])]
fn malformed_arguments_never_reach_the_platform(#[case] tokens: &[&str]) {
    let mut platform = SimulatedPlatform::new();
    let outcome = dispatch(&mut platform, tokens);
    assert_eq!(outcome.exit_code(), 2, "{outcome:?}");
    assert!(platform.calls().is_empty());
}

#[test]
fn unknown_domain_codes_are_surfaced_verbatim() {
    let mut platform = SimulatedPlatform::new();
    platform.fail_on("read_tdp", DomainError::new(77, "vendor mailbox rejected the request"));
    let outcome = dispatch(&mut platform, &["0", "--showtdp"]);
    let DispatchOutcome::Domain { action, error } = &outcome else {
        panic!("expected a domain failure, got {outcome:?}");
    };
    assert_eq!(*action, "get tdp");
    assert_eq!(error.to_string(), "Err[77]: vendor mailbox rejected the request");
    assert_eq!(error.status(), None);
    assert_eq!(outcome.exit_code(), 1);
}

#[test]
fn socket_summary_continues_past_failures() {
    let mut platform = SimulatedPlatform::new();
    platform.fail_on("read_prochot_status", DomainError::from_status(OobStatus::FileError));
    platform.fail_on("read_tsi_temp_offset", DomainError::from_status(OobStatus::Interrupted));

    let report = dispatched(dispatch(&mut platform, &["0"]));
    let failed: Vec<_> = report.failures().map(|(label, _)| label.to_owned()).collect();
    assert_eq!(failed, vec!["PROCHOT Status", "_TEMP_OFFSET"]);
    assert_eq!(report.value_of("PROCHOT Residency (%)"), Some("0.00"));
    assert!(report.value_of("_TSI_REVISION").is_some());
}

#[test]
fn summary_reads_are_separated_by_quiescence() {
    let mut platform = SimulatedPlatform::new();
    dispatched(dispatch(&mut platform, &["0", "--showtsiregisters"]));
    let calls = platform.calls();
    assert!(!calls.is_empty());
    for pair in calls.windows(2) {
        assert!(
            pair.contains(&"quiesce"),
            "consecutive reads without quiescence: {pair:?}"
        );
    }
}

#[rstest]
#[case("--set_and_verify_dramthrottle", "90", "write_dram_throttle", "read_dram_throttle")]
#[case("--set_verify_updaterate", "8", "write_tsi_update_rate", "read_tsi_update_rate")]
fn verify_reads_follow_the_write(
    #[case] command: &str,
    #[case] value: &str,
    #[case] write: &str,
    #[case] read: &str,
) {
    let mut platform = SimulatedPlatform::new();
    dispatched(dispatch(&mut platform, &["1", command, value]));
    assert_eq!(platform.calls(), &[write, "quiesce", read]);
}

#[test]
fn dram_throttle_reports_the_clamp() {
    let mut platform = SimulatedPlatform::new();
    let report = dispatched(dispatch(
        &mut platform,
        &["0", "--set_and_verify_dramthrottle", "90"],
    ));
    assert_eq!(
        report.notes().collect::<Vec<_>>(),
        vec!["Set to max dram throttle: 80 %", "Set and Verify Success 80 %"]
    );
}

#[test]
fn power_limit_is_clamped_to_the_platform_maximum() {
    let mut platform = SimulatedPlatform::new();
    dispatched(dispatch(&mut platform, &["0", "--setpowerlimit", "999999"]));
    let report = dispatched(dispatch(&mut platform, &["0", "--showpower"]));
    assert_eq!(report.value_of("PowerLimit (Watts)"), Some("320.000"));
}

#[test]
fn sockets_are_independent() {
    let mut platform = SimulatedPlatform::new();
    dispatched(dispatch(&mut platform, &["1", "--sethightempthreshold", "60.5"]));
    let socket0 = dispatched(dispatch(&mut platform, &["0", "--showtsiregisters"]));
    let socket1 = dispatched(dispatch(&mut platform, &["1", "--showtsiregisters"]));
    assert_eq!(socket0.value_of("_HIGH_THRESHOLD_TEMP"), Some("70.000 °C"));
    assert_eq!(socket1.value_of("_HIGH_THRESHOLD_TEMP"), Some("60.500 °C"));
}
