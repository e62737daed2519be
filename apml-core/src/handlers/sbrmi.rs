//! SB-RMI register summary.

use std::ops::RangeInclusive;

use crate::{
    error::HandlerError,
    report::Report,
    telemetry::{SocketIndex, TelemetryClient},
    types::RegisterInterface,
    validate::TypedArgs,
};

use super::{Summary, hex, mailbox::RMI_REVISION_REGISTER};

const SINGLE_REGISTERS: [(&str, u8); 3] = [
    ("_RMI_CONTROL", 0x01),
    ("_RMI_STATUS", 0x02),
    ("_RMI_READSIZE", 0x03),
];

const BANKS: [(&str, &str, RangeInclusive<u8>); 5] = [
    ("_RMI_THREADENSTATUS", "THREADENSTATUS", 0x04..=0x0B),
    ("_RMI_ALERTSTATUS", "ALERTSTATUS", 0x10..=0x1F),
    ("_RMI_ALERTMASK", "ALERTMASK", 0x20..=0x2F),
    ("_RMI_OUTBOUNDMSG", "OUTBNDMSG", 0x30..=0x37),
    ("_RMI_INBOUNDMSG", "INBNDMSG", 0x38..=0x3F),
];

const TRAILING_REGISTERS: [(&str, u8); 4] = [
    ("_RMI_SWINTERRUPT", 0x40),
    ("_RMI_THREADNUMBER", 0x41),
    ("_RMI_THREADCS", 0x4B),
    ("_RMI_RASSTATUS", 0x4C),
];

fn label(name: &str, register: u8) -> String {
    format!("{name} [{register:#x}]")
}

fn read_byte(summary: &mut Summary<'_>, name: &str, register: u8) {
    summary.field(
        &label(name, register),
        |c, s| c.read_register(s, RegisterInterface::Sbrmi, register),
        hex,
    );
}

/// Dump the SB-RMI register file.
///
/// The revision register must be readable; every later register is reported
/// individually, with a failure line when it cannot be read.
pub fn show_rmi_registers(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> Result<Report, HandlerError> {
    let mut summary = Summary::new(client, socket, "SB-RMI REGISTER SUMMARY");
    let revision = summary.require("get RMI revision", |c, s| {
        c.read_register(s, RegisterInterface::Sbrmi, RMI_REVISION_REGISTER)
    })?;
    summary
        .report()
        .field(label("_RMI_REVISION", RMI_REVISION_REGISTER), hex(revision));

    for (name, register) in SINGLE_REGISTERS {
        read_byte(&mut summary, name, register);
    }
    for (heading, name, registers) in BANKS {
        let (first, last) = (*registers.start(), *registers.end());
        summary
            .report()
            .heading(format!("{heading} [{first:#x} ~ {last:#x}]"));
        for (index, register) in registers.enumerate() {
            summary.field(
                &format!("{name}[{index}]"),
                |c, s| c.read_register(s, RegisterInterface::Sbrmi, register),
                hex,
            );
        }
    }
    for (name, register) in TRAILING_REGISTERS {
        read_byte(&mut summary, name, register);
    }
    Ok(summary.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{DomainError, OobStatus},
        simulator::SimulatedPlatform,
        table,
        validate::validate,
    };

    fn run(platform: &mut SimulatedPlatform) -> Result<Report, HandlerError> {
        let command = table::find("showrmiregisters").expect("command exists");
        let args = validate(command, &[] as &[&str]).expect("no arguments");
        show_rmi_registers(platform, SocketIndex::new(1), &args)
    }

    #[test]
    fn dumps_every_register_group() {
        let mut platform = SimulatedPlatform::new();
        let report = run(&mut platform).expect("summary");
        assert_eq!(report.title(), Some("SB-RMI REGISTER SUMMARY"));
        assert_eq!(report.value_of("_RMI_REVISION [0x0]"), Some("0x20"));
        assert!(report.value_of("OUTBNDMSG[7]").is_some());
        assert!(report.value_of("_RMI_RASSTATUS [0x4c]").is_some());
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn revision_failure_aborts() {
        let mut platform = SimulatedPlatform::new();
        platform.fail_on("read_register", DomainError::from_status(OobStatus::Permission));
        let err = run(&mut platform).expect_err("revision unreadable");
        assert!(matches!(err, HandlerError::Domain { action: "get RMI revision", .. }));
    }
}
