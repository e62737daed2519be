//! SB-TSI thermal sensor commands.

use crate::{
    error::{DomainError, HandlerError, OobStatus},
    report::Report,
    telemetry::{SocketIndex, TelemetryClient},
    types::{TempStatus, TsiConfigBit},
    validate::TypedArgs,
};

use super::{During, Summary, done, enabled, hex};

/// Accepted range of the low temperature threshold in °C.
const LOW_THRESHOLD_RANGE: std::ops::RangeInclusive<f64> = 0.0..=70.0;

type HandlerResult = Result<Report, HandlerError>;

fn celsius(value: f64) -> String {
    format!("{value:.3} °C")
}

fn alert(status: TempStatus) -> String {
    if status.low_alert {
        "CPU Temp Low Alert"
    } else if status.high_alert {
        "CPU Temp Hi Alert"
    } else {
        "No Temp Alert"
    }
    .to_owned()
}

/// Every SB-TSI reading, continuing past failed lines.
pub(crate) fn summary(client: &mut dyn TelemetryClient, socket: SocketIndex) -> Report {
    let mut summary = Summary::new(client, socket, "SB-TSI REGISTER SUMMARY");

    summary.field("_CPUTEMP", |c, s| c.read_tsi_cpu_temp(s), celsius);
    summary.field("_STATUS", |c, s| c.read_tsi_temp_status(s), alert);
    if let Some(config) = summary.read("_CONFIG", |c, s| c.read_tsi_config(s)) {
        summary
            .report()
            .heading("_CONFIG")
            .field("ALERT_L pin", enabled(!config.alert_mask))
            .field(
                "Runstop",
                if config.run_stop {
                    "Comparison Disabled"
                } else {
                    "Comparison Enabled"
                },
            )
            .field(
                "Atomic Rd order",
                if config.read_order {
                    "Decimal Latches Integer"
                } else {
                    "Integer latches Decimal"
                },
            )
            .field("ARA response", enabled(!config.ara_disabled));
    }
    summary.field(
        "_TSI_UPDATERATE",
        |c, s| c.read_tsi_update_rate(s),
        |hz| format!("{hz:.3} Hz"),
    );
    summary.field(
        "_HIGH_THRESHOLD_TEMP",
        |c, s| c.read_tsi_high_threshold(s),
        celsius,
    );
    summary.field(
        "_LOW_THRESHOLD_TEMP",
        |c, s| c.read_tsi_low_threshold(s),
        celsius,
    );
    summary.field("_TEMP_OFFSET", |c, s| c.read_tsi_temp_offset(s), celsius);
    summary.field(
        "_TIMEOUT_CONFIG",
        |c, s| c.read_tsi_timeout_config(s),
        |on| enabled(on).to_owned(),
    );
    summary.field(
        "_THRESHOLD_SAMPLE",
        |c, s| c.read_tsi_alert_threshold(s),
        |samples| samples.to_string(),
    );
    summary.field(
        "_TSI_ALERT_CONFIG",
        |c, s| c.read_tsi_alert_config(s),
        |on| enabled(on).to_owned(),
    );
    summary.field(
        "_TSI_MANUFACTURE_ID",
        |c, s| c.read_tsi_manufacturer_id(s),
        hex,
    );
    summary.field("_TSI_REVISION", |c, s| c.read_tsi_revision(s), hex);
    summary.finish()
}

pub fn show_tsi_registers(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    Ok(summary(client, socket))
}

/// Write the update rate and confirm the platform kept it.
///
/// The sensor only supports powers of two; a read-back that differs from the
/// request is reported as [`OobStatus::TryAgain`].
pub fn set_verify_update_rate(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let requested = args.float(0)?;
    client
        .write_tsi_update_rate(socket, requested)
        .during("set Update rate")?;
    client.quiesce();
    let applied = client
        .read_tsi_update_rate(socket)
        .during("verify Update rate")?;
    if applied != requested {
        return Err(HandlerError::domain(
            "verify Update rate",
            DomainError::from_status(OobStatus::TryAgain),
        ));
    }
    Ok(done(format!("Set and verify Success {applied:.3}")))
}

pub fn set_high_temp_threshold(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    client
        .write_tsi_high_threshold(socket, args.float(0)?)
        .during("set Higher Temp threshold limit")?;
    Ok(done("Set Success"))
}

pub fn set_low_temp_threshold(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    const ACTION: &str = "set Lower Temp threshold limit";
    let celsius = args.float(0)?;
    if !LOW_THRESHOLD_RANGE.contains(&celsius) {
        return Err(HandlerError::domain(
            ACTION,
            DomainError::from_status(OobStatus::InvalidInput),
        ));
    }
    client
        .write_tsi_low_threshold(socket, celsius)
        .during(ACTION)?;
    Ok(done("Set Success"))
}

pub fn set_temp_offset(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    client
        .write_tsi_temp_offset(socket, args.float(0)?)
        .during("set Temp offset")?;
    Ok(done("Set CPU temp offset success"))
}

fn flag(args: &TypedArgs) -> Result<bool, HandlerError> {
    Ok(args.unsigned::<u8>(0)? == 1)
}

pub fn set_timeout_config(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    client
        .write_tsi_timeout_config(socket, flag(args)?)
        .during("set timeout config")?;
    Ok(done("Set timeout config success"))
}

pub fn set_alert_threshold(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    client
        .write_tsi_alert_threshold(socket, args.unsigned(0)?)
        .during("set alert threshold sample")?;
    Ok(done("Set alert threshold success"))
}

pub fn set_alert_config(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    client
        .write_tsi_alert_config(socket, flag(args)?)
        .during("set alert config")?;
    Ok(done("Set alert config success"))
}

fn config_bit(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
    bit: TsiConfigBit,
) -> HandlerResult {
    let value = flag(args)?;
    let (action, message) = match bit {
        TsiConfigBit::AlertMask => (
            "set tsi config alert_mask",
            format!("ALERT_L pin {}", enabled(!value)),
        ),
        TsiConfigBit::RunStop => (
            "set tsi config runstop_mask",
            format!(
                "runstop bit {}",
                if value {
                    "Comparisons Disabled"
                } else {
                    "Comparisons Enabled"
                }
            ),
        ),
        TsiConfigBit::ReadOrder => (
            "set tsi config readorder_mask",
            format!(
                "Atomic read bit {}",
                if value {
                    "Decimal Latches Integer"
                } else {
                    "Integer Latches Decimal"
                }
            ),
        ),
        TsiConfigBit::Ara => (
            "set tsi config ara_mask",
            format!("ARA Disable bit {}", enabled(!value)),
        ),
    };
    client
        .write_tsi_config_bit(socket, bit, value)
        .during(action)?;
    Ok(done(message))
}

pub fn set_alert_mask(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    config_bit(client, socket, args, TsiConfigBit::AlertMask)
}

pub fn set_run_stop(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    config_bit(client, socket, args, TsiConfigBit::RunStop)
}

pub fn set_read_order(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    config_bit(client, socket, args, TsiConfigBit::ReadOrder)
}

pub fn set_ara(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    config_bit(client, socket, args, TsiConfigBit::Ara)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{simulator::SimulatedPlatform, table, validate::validate};

    fn run(
        platform: &mut SimulatedPlatform,
        name: &str,
        tokens: &[&str],
    ) -> HandlerResult {
        let command = table::find(name).expect("command exists");
        let args = validate(command, tokens).expect("arguments are valid");
        (command.handler)(platform, SocketIndex::new(0), &args)
    }

    #[test]
    fn supported_update_rate_is_verified() {
        let mut platform = SimulatedPlatform::new();
        let report = run(&mut platform, "-u", &["0.25"]).expect("power of two");
        assert_eq!(report.notes().collect::<Vec<_>>(), vec!["Set and verify Success 0.250"]);
        assert_eq!(
            platform.calls(),
            &["write_tsi_update_rate", "quiesce", "read_tsi_update_rate"]
        );
    }

    #[test]
    fn snapped_update_rate_asks_to_try_again() {
        let mut platform = SimulatedPlatform::new();
        let err = run(&mut platform, "set_verify_updaterate", &["3"]).expect_err("not a power of two");
        match err {
            HandlerError::Domain { error, .. } => {
                assert_eq!(error.status(), Some(OobStatus::TryAgain));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[rstest]
    #[case("-0.5")]
    #[case("70.25")]
    fn low_threshold_outside_range_never_reaches_the_platform(#[case] token: &str) {
        let mut platform = SimulatedPlatform::new();
        let err = run(&mut platform, "setlowtempthreshold", &[token]).expect_err("rejected");
        assert!(matches!(
            err,
            HandlerError::Domain { ref error, .. } if error.status() == Some(OobStatus::InvalidInput)
        ));
        assert!(platform.calls().is_empty());
    }

    #[rstest]
    #[case("setalertmask", "1", "ALERT_L pin Disabled")]
    #[case("setrunstop", "0", "runstop bit Comparisons Enabled")]
    #[case("setreadorder", "1", "Atomic read bit Decimal Latches Integer")]
    #[case("setara", "0", "ARA Disable bit Enabled")]
    fn config_bits_describe_the_new_state(
        #[case] name: &str,
        #[case] value: &str,
        #[case] message: &str,
    ) {
        let mut platform = SimulatedPlatform::new();
        let report = run(&mut platform, name, &[value]).expect("config write");
        assert_eq!(report.notes().collect::<Vec<_>>(), vec![message]);
    }

    #[test]
    fn summary_reflects_writes() {
        let mut platform = SimulatedPlatform::new();
        run(&mut platform, "sethightempthreshold", &["85.5"]).expect("high threshold");
        run(&mut platform, "setalertmask", &["1"]).expect("mask");
        let report = run(&mut platform, "showtsiregisters", &[]).expect("summary");
        assert_eq!(report.value_of("_HIGH_THRESHOLD_TEMP"), Some("85.500 °C"));
        assert_eq!(report.value_of("ALERT_L pin"), Some("Disabled"));
        assert_eq!(report.value_of("_STATUS"), Some("No Temp Alert"));
    }

    #[test]
    fn summary_continues_past_failures() {
        let mut platform = SimulatedPlatform::new();
        platform.fail_on("read_tsi_update_rate", DomainError::from_status(OobStatus::CmdTimeout));
        let report = run(&mut platform, "showtsiregisters", &[]).expect("summary");
        let failures: Vec<_> = report.failures().map(|(label, _)| label).collect();
        assert_eq!(failures, vec!["_TSI_UPDATERATE"]);
        assert!(report.value_of("_TSI_REVISION").is_some());
    }
}
