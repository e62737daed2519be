//! Raw register, MSR and CPUID access.

use crate::{
    error::HandlerError,
    report::Report,
    telemetry::{SocketIndex, TelemetryClient},
    types::RegisterInterface,
    validate::TypedArgs,
};

use super::{During, done, hex};

fn interface(args: &TypedArgs) -> Result<RegisterInterface, HandlerError> {
    Ok(RegisterInterface::parse(args.command(), args.text(0)?)?)
}

pub fn read_register(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> Result<Report, HandlerError> {
    let interface = interface(args)?;
    let register: u8 = args.unsigned(1)?;
    let value = client
        .read_register(socket, interface, register)
        .during("read register")?;
    let mut report = Report::new();
    report.field(format!("{interface} {}", hex(register)), hex(value));
    Ok(report)
}

pub fn write_register(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> Result<Report, HandlerError> {
    let interface = interface(args)?;
    let register: u8 = args.unsigned(1)?;
    client
        .write_register(socket, interface, register, args.unsigned(2)?)
        .during("write register")?;
    Ok(done(format!(
        "Write to register {} is successful",
        hex(register)
    )))
}

pub fn read_msr_register(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> Result<Report, HandlerError> {
    let address: u32 = args.unsigned(0)?;
    let value = client
        .read_msr(socket, args.unsigned(1)?, address)
        .during("read MSR register")?;
    let mut report = Report::new();
    report.field(format!("MSR register [{address:#010x}]"), hex(value));
    Ok(report)
}

pub fn read_cpuid_register(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> Result<Report, HandlerError> {
    let function: u32 = args.unsigned(0)?;
    let extended: u32 = args.unsigned(1)?;
    let registers = client
        .read_cpuid(socket, args.unsigned(2)?, function, extended)
        .during("read CPUID register")?;
    let mut report = Report::titled(format!(
        "CPUID register[{function:#010x}][{extended:#x}]"
    ));
    report
        .field("eax", hex(registers.eax))
        .field("ebx", hex(registers.ebx))
        .field("ecx", hex(registers.ecx))
        .field("edx", hex(registers.edx));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::UsageError, simulator::SimulatedPlatform, table, validate::validate,
    };

    fn run(
        platform: &mut SimulatedPlatform,
        name: &str,
        tokens: &[&str],
    ) -> Result<Report, HandlerError> {
        let command = table::find(name).expect("command exists");
        let args = validate(command, tokens).expect("arguments are valid");
        (command.handler)(platform, SocketIndex::new(0), &args)
    }

    #[test]
    fn written_register_reads_back() {
        let mut platform = SimulatedPlatform::new();
        let written = run(&mut platform, "writeregister", &["SBTSI", "0x09", "200"]).expect("write");
        assert_eq!(
            written.notes().collect::<Vec<_>>(),
            vec!["Write to register 0x9 is successful"]
        );
        let read = run(&mut platform, "-e", &["sbtsi", "9"]).expect("read");
        assert_eq!(read.value_of("sbtsi 0x9"), Some("0xc8"));
    }

    #[test]
    fn unknown_interface_is_a_usage_error() {
        let mut platform = SimulatedPlatform::new();
        let err = run(&mut platform, "readregister", &["i2c", "0x01"]).expect_err("interface");
        assert_eq!(
            err,
            HandlerError::Usage(UsageError::UnsupportedValue {
                command: "readregister",
                slot: "INTERFACE",
                token: "i2c".to_owned(),
            })
        );
        assert!(platform.calls().is_empty());
    }

    #[test]
    fn cpuid_reports_all_four_registers() {
        let mut platform = SimulatedPlatform::new();
        let report = run(&mut platform, "readcpuidregister", &["0x8000001D", "3", "0"]).expect("cpuid");
        assert_eq!(report.title(), Some("CPUID register[0x8000001d][0x3]"));
        assert_eq!(report.value_of("eax"), Some(hex(15_u32 << 14).as_str()));
        assert!(report.value_of("edx").is_some());
    }

    #[test]
    fn msr_label_is_zero_padded() {
        let mut platform = SimulatedPlatform::new();
        let report = run(&mut platform, "readmsrregister", &["1b", "0"]).expect("msr");
        assert!(report.value_of("MSR register [0x0000001b]").is_some());
    }
}
