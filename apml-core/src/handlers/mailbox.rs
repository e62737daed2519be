//! SB-RMI mailbox commands.

use crate::{
    codec::{self, build_bandwidth_selector, decode_temperature, encode_temperature},
    error::{DomainError, HandlerError, OobStatus, UsageError},
    report::Report,
    telemetry::{SocketIndex, TelemetryClient},
    types::{
        DfPstateRange, DimmPower, DimmThermal, DpmLevel, LclkDpmLevelRange, LinkWidthRange,
        McaBank, NbioErrorLog, PciAddress, RegisterInterface,
    },
    validate::TypedArgs,
};

use super::{During, Summary, bist, cpuid, done, hex, watts};

/// Register sampled by the summary's NBIO line.
const SUMMARY_NBIO: NbioErrorLog = NbioErrorLog {
    quadrant: 0x03,
    offset: 0x20,
};
/// RMI revision whose CCX BIST result is reported raw.
const RAW_CCX_BIST_REVISION: u8 = 0x10;
/// Register holding the SB-RMI revision.
pub(crate) const RMI_REVISION_REGISTER: u8 = 0x00;

type HandlerResult = Result<Report, HandlerError>;

/// Every mailbox reading, continuing past failed lines.
pub(crate) fn summary(client: &mut dyn TelemetryClient, socket: SocketIndex) -> Report {
    let mut summary = Summary::new(client, socket, "SB-RMI MAILBOX SUMMARY");

    summary.field("Power (Watts)", |c, s| c.read_socket_power(s), watts);
    summary.field("PowerLimit (Watts)", |c, s| c.read_socket_power_limit(s), watts);
    summary.field(
        "PowerLimitMax (Watts)",
        |c, s| c.read_max_socket_power_limit(s),
        watts,
    );
    summary.field("TDP Avg (Watts)", |c, s| c.read_tdp(s), watts);
    summary.field("TDP Min (Watts)", |c, s| c.read_min_tdp(s), watts);
    summary.field("TDP Max (Watts)", |c, s| c.read_max_tdp(s), watts);

    if let Some(ddr) = summary.read("DDR BANDWIDTH", |c, s| c.read_ddr_bandwidth(s)) {
        summary
            .report()
            .heading("DDR BANDWIDTH")
            .field("DDR Max BW (GB/s)", ddr.max_bw.to_string())
            .field("DDR Utilized BW (GB/s)", ddr.utilized_bw.to_string())
            .field("DDR Utilized Percent(%)", ddr.utilized_pct.to_string());
    }

    summary.field(
        "BIOS Boostlimit [0x0] (MHz)",
        |c, s| c.read_bios_boost_fmax(s, 0),
        |mhz| mhz.to_string(),
    );
    summary.field(
        "APML Boostlimit [0x0] (MHz)",
        |c, s| c.read_apml_boost_limit(s, 0),
        |mhz| mhz.to_string(),
    );
    summary.field(
        "DRAM_Throttle (%)",
        |c, s| c.read_dram_throttle(s),
        |percent| percent.to_string(),
    );
    summary.field(
        "PROCHOT Status",
        |c, s| c.read_prochot_status(s),
        |asserted| prochot(asserted).to_owned(),
    );
    summary.field(
        "PROCHOT Residency (%)",
        |c, s| c.read_prochot_residency(s),
        |percent| format!("{percent:.2}"),
    );
    summary.field(
        &format!("NBIO_Err_Log_Reg [{:#x}]", SUMMARY_NBIO.register()),
        |c, s| c.read_nbio_error_log(s, SUMMARY_NBIO),
        |value| value.to_string(),
    );
    summary.field("IOD_Bist_Result", |c, s| c.read_iod_bist(s), |r| bist(r).to_owned());
    summary.field(
        "CCD_Bist_Result [0x0]",
        |c, s| c.read_ccd_bist(s, 0),
        |r| bist(r).to_owned(),
    );
    summary.field("CCX_Bist_Result [0x0]", |c, s| c.read_ccx_bist(s, 0), hex);

    if let Some(limit) = summary.read("Curr_Active_Freq_Limit", |c, s| c.read_socket_freq_limit(s)) {
        summary
            .report()
            .heading("Curr_Active_Freq_Limit")
            .field("Freqlimit (MHz)", limit.frequency_mhz.to_string())
            .field("Source", sources(&limit.sources));
    }

    summary.field(
        "Power_Telemetry (Watts)",
        |c, s| c.read_svi_telemetry_all_rails(s),
        watts,
    );

    if let Some(range) = summary.read("Socket_Freq_Range (MHz)", |c, s| c.read_socket_freq_range(s)) {
        summary
            .report()
            .heading("Socket_Freq_Range (MHz)")
            .field("Fmax", range.fmax.to_string())
            .field("Fmin", range.fmin.to_string());
    }

    if let Some(df) = summary.read("Data_Fabric_Freq", |c, s| c.read_df_pstate_frequency(s)) {
        summary
            .report()
            .heading("Data_Fabric_Freq")
            .field("Fclk", df.fclk.to_string())
            .field("Mclk", df.mclk.to_string())
            .field("Uclk", df.uclk.to_string());
    }

    summary.field(
        "CPU_Base_Freq (MHz)",
        |c, s| c.read_cpu_base_frequency(s),
        |mhz| mhz.to_string(),
    );
    summary.field(
        "Package_Energy (MJ)",
        |c, s| c.read_package_energy(s),
        |energy| format!("{energy:.6}"),
    );
    summary.field(
        "THREADS_PER_CORE",
        |c, s| c.read_threads_per_core(s),
        |threads| threads.to_string(),
    );
    summary.field(
        "THREADS_PER_SOCKET",
        |c, s| c.read_threads_per_socket(s),
        |threads| threads.to_string(),
    );
    summary.finish()
}

const fn prochot(asserted: bool) -> &'static str {
    if asserted { "PROCHOT" } else { "NOT_PROCHOT" }
}

fn sources(names: &[String]) -> String {
    if names.is_empty() {
        "Reserved".to_owned()
    } else {
        names.join(" ")
    }
}

pub fn show_mailbox_summary(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    Ok(summary(client, socket))
}

pub fn show_power(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let power = client.read_socket_power(socket).during("get power")?;
    let limit = client
        .read_socket_power_limit(socket)
        .during("get powerlimit")?;
    let max = client
        .read_max_socket_power_limit(socket)
        .during("get maxpower")?;
    let mut report = Report::new();
    report
        .field("Power (Watts)", watts(power))
        .field("PowerLimit (Watts)", watts(limit))
        .field("PowerLimitMax (Watts)", watts(max));
    Ok(report)
}

pub fn show_tdp(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let tdp = client.read_tdp(socket).during("get tdp")?;
    let min = client.read_min_tdp(socket).during("get min tdp")?;
    let max = client.read_max_tdp(socket).during("get max_tdp")?;
    let mut report = Report::new();
    report
        .field("TDP (Watts)", watts(tdp))
        .field("Min_TDP (Watts)", watts(min))
        .field("Max_TDP (Watts)", watts(max));
    Ok(report)
}

/// Clamp the request to the socket maximum, then write it.
///
/// When the maximum cannot be read the request is written unchanged and the
/// platform decides.
pub fn set_power_limit(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let mut power: u32 = args.unsigned(0)?;
    let mut report = Report::new();
    if let Ok(max) = client.read_max_socket_power_limit(socket)
        && power > max
    {
        report.note(format!(
            "Input power is not within accepted limit, so value set to default max {} Watts",
            watts(max)
        ));
        power = max;
    }
    client
        .write_socket_power_limit(socket, power)
        .during("set power_limit")?;
    report.note(format!("Set power_limit : {} Watts successfully", watts(power)));
    Ok(report)
}

pub fn show_ddr_bandwidth(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let ddr = client
        .read_ddr_bandwidth(socket)
        .during("get DDR Bandwidth")?;
    let mut report = Report::new();
    report
        .field("DDR Max BW (GB/s)", ddr.max_bw.to_string())
        .field("DDR Utilized BW (GB/s)", ddr.utilized_bw.to_string())
        .field("DDR Utilized Percent(%)", ddr.utilized_pct.to_string());
    Ok(report)
}

pub fn show_boost_limit(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let thread: u32 = args.unsigned(0)?;
    let apml = client
        .read_apml_boost_limit(socket, thread)
        .during("get apml_boostlimit")?;
    client.quiesce();
    let bios = client
        .read_bios_boost_fmax(socket, thread)
        .during("get bios_boostlimit")?;
    let mut report = Report::new();
    report
        .field(format!("core[{thread:03}] apml_boostlimit (MHz)"), apml.to_string())
        .field(format!("core[{thread:03}] bios_boostlimit (MHz)"), bios.to_string());
    Ok(report)
}

pub fn set_apml_boost_limit(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let thread: u32 = args.unsigned(0)?;
    let limit: u32 = args.unsigned(1)?;
    client
        .write_apml_boost_limit(socket, thread, limit)
        .during("set apml_boostlimit")?;
    Ok(done(format!("core[{thread}] apml_boostlimit set successfully")))
}

pub fn set_apml_socket_boost_limit(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let limit: u32 = args.unsigned(0)?;
    client
        .write_apml_boost_limit_all_cores(socket, limit)
        .during("set apml_boostlimit for all cores")?;
    Ok(done("apml_boostlimit for all cores set successfully"))
}

/// Write the throttle, wait for it to settle and report what the platform
/// actually applied.
pub fn set_and_verify_dram_throttle(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let requested: u32 = args.unsigned(0)?;
    client
        .write_dram_throttle(socket, requested)
        .during("set DRAM throttle")?;
    client.quiesce();
    let applied = client
        .read_dram_throttle(socket)
        .during("verify DRAM throttle")?;

    let mut report = Report::new();
    if applied < requested {
        report.note(format!("Set to max dram throttle: {applied} %"));
    } else if applied > requested {
        report.note(format!("Set to min dram throttle: {applied} %"));
    }
    report.note(format!("Set and Verify Success {applied} %"));
    Ok(report)
}

pub fn set_dimm_power(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let power = DimmPower {
        dimm_addr: args.unsigned(0)?,
        power: args.unsigned(1)?,
        update_rate: args.unsigned(2)?,
    };
    client
        .write_dimm_power(socket, power)
        .during("set dimm power")?;
    Ok(done("Dimm power set successfully"))
}

/// Encode the temperature into its scaled code and report it.
///
/// A temperature outside the encodable range is rejected as
/// [`OobStatus::InvalidInput`] without reaching the platform.
pub fn set_dimm_thermal_sensor(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    const ACTION: &str = "set dimm thermal sensor";
    let dimm_addr = args.unsigned(0)?;
    let celsius = args.float(1)?;
    let update_rate = args.unsigned(2)?;
    let sensor = encode_temperature(celsius).map_err(|err| {
        HandlerError::domain(
            ACTION,
            DomainError::new(OobStatus::InvalidInput.code(), err.to_string()),
        )
    })?;
    client
        .write_dimm_thermal_sensor(
            socket,
            DimmThermal {
                dimm_addr,
                sensor,
                update_rate,
            },
        )
        .during(ACTION)?;
    Ok(done("Dimm thermal sensor set successfully"))
}

pub fn show_dimm_power(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let power = client
        .read_dimm_power(socket, args.unsigned(0)?)
        .during("get dimm power")?;
    let mut report = Report::new();
    report
        .field("DIMM Power (mW)", power.power.to_string())
        .field("Update rate (ms)", power.update_rate.to_string());
    Ok(report)
}

pub fn show_dimm_thermal_sensor(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let thermal = client
        .read_dimm_thermal_sensor(socket, args.unsigned(0)?)
        .during("get dimm temp")?;
    let mut report = Report::new();
    report
        .field(
            "DIMM Temp (°C)(raw)",
            format!(
                "{:.3} ({:#x})",
                decode_temperature(thermal.sensor),
                thermal.sensor
            ),
        )
        .field("Update rate (ms)", thermal.update_rate.to_string());
    Ok(report)
}

pub fn show_dimm_temp_range_and_refresh_rate(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let rate = client
        .read_dimm_temp_range_and_refresh_rate(socket, args.unsigned(0)?)
        .during("get dimm temp range and refresh rate")?;
    let mut report = Report::new();
    report
        .field("Range", rate.range.to_string())
        .field("Refresh rate", rate.refresh_rate.to_string());
    Ok(report)
}

pub fn show_pcie_config_space_data(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let address = PciAddress {
        segment: args.unsigned(0)?,
        offset: args.unsigned(1)?,
        bus: args.unsigned(2)?,
        device: args.unsigned(3)?,
        func: args.unsigned(4)?,
    };
    let data = client
        .read_pcie_config_data(socket, address)
        .during("get data from PCIe config space")?;
    let mut report = Report::new();
    report.field("Data PCIe", hex(data));
    Ok(report)
}

pub fn show_valid_mca_banks(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let validity = client
        .read_valid_mca_banks(socket)
        .during("get MCA banks with valid status after a fatal error")?;
    let mut report = Report::new();
    report
        .field("Valid MCA banks", validity.bank_count.to_string())
        .field("Bytes per bank", validity.bytes_per_bank.to_string());
    Ok(report)
}

pub fn show_ras_mca_msr(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let bank = McaBank {
        index: args.unsigned(0)?,
        offset: args.unsigned(1)?,
    };
    let data = client
        .read_mca_msr(socket, bank)
        .during("get MCA bank data")?;
    let mut report = Report::new();
    report.field("Data MCA bank", hex(data));
    Ok(report)
}

pub fn show_fch_reset_reason(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let reason = client
        .read_fch_reset_reason(socket, args.unsigned(0)?)
        .during("get previous reset reason")?;
    let mut report = Report::new();
    report.field("FCH Previous reset reason", hex(reason));
    Ok(report)
}

pub fn show_socket_freq_limit(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let limit = client
        .read_socket_freq_limit(socket)
        .during("get socket freq limit")?;
    let mut report = Report::new();
    report
        .field("Frequency (MHz)", limit.frequency_mhz.to_string())
        .field("Source", sources(&limit.sources));
    Ok(report)
}

pub fn show_cclk_limit(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let thread: u32 = args.unsigned(0)?;
    let mhz = client
        .read_core_clock_limit(socket, thread)
        .during("get core freq limit")?;
    let mut report = Report::new();
    report.field(format!("Frequency [{thread:03}] (MHz)"), mhz.to_string());
    Ok(report)
}

pub fn show_svi_telemetry_all_rails(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let power = client
        .read_svi_telemetry_all_rails(socket)
        .during("get svi based telemetry for all rails")?;
    let mut report = Report::new();
    report.field("Telemetry Power (Watts)", watts(power));
    Ok(report)
}

pub fn show_socket_freq_range(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let range = client
        .read_socket_freq_range(socket)
        .during("get Fmax and Fmin")?;
    let mut report = Report::new();
    report
        .field("Fmax (MHz)", range.fmax.to_string())
        .field("Fmin (MHz)", range.fmin.to_string());
    Ok(report)
}

/// Resolve the link and type tokens.
///
/// Rejects an unknown link and a type the link kind does not carry before the
/// platform is called.
fn selector(
    args: &TypedArgs,
    inter_socket: bool,
) -> Result<codec::BandwidthSelector, HandlerError> {
    let link = args.text(0)?;
    let bandwidth_type = args.text(1)?;
    let selector = build_bandwidth_selector(link, bandwidth_type, inter_socket).map_err(|_| {
        UsageError::UnsupportedValue {
            command: args.command(),
            slot: "LINKID",
            token: link.to_owned(),
        }
    })?;
    if !selector.has_type() {
        return Err(UsageError::UnsupportedValue {
            command: args.command(),
            slot: "BW",
            token: bandwidth_type.to_owned(),
        }
        .into());
    }
    Ok(selector)
}

pub fn show_io_bandwidth(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let selector = selector(args, false)?;
    let mbps = client
        .read_io_bandwidth(socket, selector)
        .during("get current IO bandwidth")?;
    let mut report = Report::new();
    report.field("IO bandwidth (Mbps)", mbps.to_string());
    Ok(report)
}

pub fn show_xgmi_bandwidth(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let selector = selector(args, true)?;
    let mbps = client
        .read_xgmi_bandwidth(socket, selector)
        .during("get current bandwidth on xGMI link")?;
    let mut report = Report::new();
    report.field("xGMI Bandwidth (Mbps)", mbps.to_string());
    Ok(report)
}

fn width_range(args: &TypedArgs) -> Result<LinkWidthRange, HandlerError> {
    Ok(LinkWidthRange {
        min: args.unsigned(0)?,
        max: args.unsigned(1)?,
    })
}

pub fn set_gmi3_link_width_range(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    client
        .write_gmi3_link_width_range(socket, width_range(args)?)
        .during("write GMI3 link width range")?;
    Ok(done("GMI3 link width set successfully"))
}

pub fn set_xgmi_link_width_range(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    client
        .write_xgmi_link_width_range(socket, width_range(args)?)
        .during("write xGMI link width range")?;
    Ok(done("xGMI link width set successfully"))
}

const PROCHOT_ENFORCED: &str = "PROCHOT_L is asserted, lowest DF-Pstate is enforced.";

pub fn apb_disable(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let asserted = client
        .write_apb_disable(socket, args.unsigned(0)?)
        .during("set data fabric pstate")?;
    Ok(done(if asserted {
        PROCHOT_ENFORCED
    } else {
        "Data fabric pstate set successfully"
    }))
}

pub fn enable_df_pstate_dynamic(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let asserted = client
        .write_apb_enable(socket)
        .during("write apb enable")?;
    Ok(done(if asserted {
        PROCHOT_ENFORCED
    } else {
        "Successfully set to dynamic data fabric pstate control"
    }))
}

pub fn show_fclk_mclk_uclk(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let df = client
        .read_df_pstate_frequency(socket)
        .during("get data fabric clock, memory clock and UMC clock divider")?;
    let mut report = Report::new();
    report
        .field("FCLK (MHz)", df.fclk.to_string())
        .field("MEMCLK (MHz)", df.mclk.to_string())
        .field("UCLK Divider", df.uclk.to_string());
    Ok(report)
}

pub fn set_lclk_dpm_level(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let range = LclkDpmLevelRange {
        nbio_id: args.unsigned(0)?,
        dpm: DpmLevel {
            max: args.unsigned(1)?,
            min: args.unsigned(2)?,
        },
    };
    client
        .write_lclk_dpm_level_range(socket, range)
        .during("write dpm level")?;
    Ok(done("Lclk dpm level set successfully"))
}

pub fn show_cpu_base_freq(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let mhz = client
        .read_cpu_base_frequency(socket)
        .during("get cpu base freq")?;
    let mut report = Report::new();
    report.field("Frequency (MHz)", mhz.to_string());
    Ok(report)
}

pub fn set_pcie_gen_rate_ctrl(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let previous = client
        .control_pcie_gen5_rate(socket, args.unsigned(0)?)
        .during("write PCIegen5 rate control")?;
    let mut report = Report::new();
    report.field("Previous Mode", previous.to_string());
    Ok(report)
}

pub fn set_power_efficiency_mode(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    client
        .write_power_efficiency_mode(socket, args.unsigned(0)?)
        .during("set pwr efficiency profile policy")?;
    Ok(done("Mode set successfully"))
}

pub fn show_rapl_core(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let thread: u32 = args.unsigned(0)?;
    let energy = client
        .read_core_energy(socket, thread)
        .during("get core energy")?;
    let mut report = Report::new();
    report.field(format!("Core[{thread:03}] Energy (KJ)"), format!("{energy:.6}"));
    Ok(report)
}

pub fn show_rapl_pkg(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let energy = client
        .read_package_energy(socket)
        .during("get package energy")?;
    let mut report = Report::new();
    report.field("Package energy (MJ)", format!("{energy:.6}"));
    Ok(report)
}

pub fn set_df_pstate_range(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let range = DfPstateRange {
        max_pstate: args.unsigned(0)?,
        min_pstate: args.unsigned(1)?,
    };
    client
        .write_df_pstate_range(socket, range)
        .during("set data fabric pstate range")?;
    Ok(done("Data fabric pstate range set successfully"))
}

pub fn show_iod_bist(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let result = client
        .read_iod_bist(socket)
        .during("get the iod bist status")?;
    let mut report = Report::new();
    report.field("IOD BIST STATUS", bist(result));
    Ok(report)
}

pub fn show_ccd_bist(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let result = client
        .read_ccd_bist(socket, args.unsigned(0)?)
        .during("get the ccd bist status")?;
    let mut report = Report::new();
    report.field("CCD BIST STATUS", bist(result));
    Ok(report)
}

/// Decode a CCX BIST result.
///
/// RMI revision 0x10 parts report the raw word. Later parts carry the L3
/// result in bit 0 and one bit per core from bit 16, where a set bit is a
/// pass.
pub fn show_ccx_bist(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    const ACTION: &str = "get the ccx bist status";
    let result = client
        .read_ccx_bist(socket, args.unsigned(0)?)
        .during(ACTION)?;
    let revision = client
        .read_register(socket, RegisterInterface::Sbrmi, RMI_REVISION_REGISTER)
        .during(ACTION)?;

    let mut report = Report::new();
    if revision == RAW_CCX_BIST_REVISION {
        report.field("CCX BIST RESULT", hex(result));
        return Ok(report);
    }

    let info = cpuid::ccx_info(client, socket).during("get the CCX info")?;
    report.field("L3 BIST", passed(result & 1 == 1));
    for core in 0..info.cores_per_ccx {
        let bit = 16 + core;
        let pass = bit < u32::BITS && (result >> bit) & 1 == 1;
        report.field(format!("CORE[{core}]"), passed(pass));
    }
    Ok(report)
}

const fn passed(pass: bool) -> &'static str {
    if pass { "Bist pass" } else { "Bist fail" }
}

pub fn show_nbio_error_logging_register(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let log = NbioErrorLog {
        quadrant: args.unsigned(0)?,
        offset: args.unsigned(1)?,
    };
    let value = client
        .read_nbio_error_log(socket, log)
        .during("get the nbio error log register")?;
    let mut report = Report::new();
    report.field("NBIO ERROR LOG REG", value.to_string());
    Ok(report)
}

pub fn show_dram_throttle(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let percent = client
        .read_dram_throttle(socket)
        .during("get the dram throttle")?;
    let mut report = Report::new();
    report.field("DRAM THROTTLE (%)", percent.to_string());
    Ok(report)
}

pub fn show_prochot_status(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let asserted = client
        .read_prochot_status(socket)
        .during("get the prochot status")?;
    let mut report = Report::new();
    report.field("PROCHOT STATUS", prochot(asserted));
    Ok(report)
}

pub fn show_prochot_residency(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let residency = client
        .read_prochot_residency(socket)
        .during("get the prochot residency")?;
    let mut report = Report::new();
    report.field("PROCHOT RESIDENCY (%)", format!("{residency:.2}"));
    Ok(report)
}

pub fn show_lclk_dpm_level_range(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    args: &TypedArgs,
) -> HandlerResult {
    let dpm = client
        .read_lclk_dpm_level_range(socket, args.unsigned(0)?)
        .during("get the lclk dpm level range")?;
    let mut report = Report::new();
    report
        .field("MIN DPM", dpm.min.to_string())
        .field("MAX DPM", dpm.max.to_string());
    Ok(report)
}

pub fn show_ras_last_transact_addr(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let address = client
        .read_ras_last_transaction_address(socket)
        .during("get the RAS last transact addr")?;
    let mut report = Report::new();
    report.field("RAS LAST TRANSACT ADDR", hex(address));
    Ok(report)
}

pub fn show_power_consumed(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> HandlerResult {
    let power = client.read_socket_power(socket).during("get power")?;
    let mut report = Report::new();
    report.field("Power (Watts)", watts(power));
    Ok(report)
}
