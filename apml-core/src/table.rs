//! The command table.
//!
//! [`COMMANDS`] is the only place arity and argument kinds are declared.

use crate::{
    command::{Arity, Command, Slot},
    handlers::{cpuid, mailbox, reg_access, sbrmi, sbtsi},
    help::HelpModule,
};

const U8: u64 = u8::MAX as u64;
const U16: u64 = u16::MAX as u64;
const U32: u64 = u32::MAX as u64;

const NONE: Arity = Arity::Fixed(&[]);
const THREAD: Arity = Arity::Fixed(&[Slot::decimal("THREAD", U32)]);
const DIMM_ADDR: Arity = Arity::Fixed(&[Slot::hex("DIMM_ADDR", U8)]);
const BIT: Arity = Arity::Fixed(&[Slot::decimal("VALUE", 1)]);
const LINK_BW: Arity = Arity::Lookahead(&[Slot::text("LINKID"), Slot::text("BW")]);
const WIDTH_RANGE: Arity =
    Arity::Lookahead(&[Slot::decimal("MIN", U8), Slot::decimal("MAX", U8)]);
const MODE: Arity = Arity::Fixed(&[Slot::decimal("MODE", U8)]);
const INSTANCE: Arity = Arity::Fixed(&[Slot::decimal("INSTANCE", U32)]);
const NBIOID: Arity = Arity::Fixed(&[Slot::decimal("NBIOID", U8)]);

/// Every command the tool understands, grouped by help module.
pub static COMMANDS: &[Command] = &[
    // mailbox
    Command {
        name: "showmailboxsummary",
        alias: Some('Y'),
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Get summary of the mailbox commands",
        handler: mailbox::show_mailbox_summary,
    },
    Command {
        name: "showpower",
        alias: Some('p'),
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Get Power for a given socket in Watts",
        handler: mailbox::show_power,
    },
    Command {
        name: "showtdp",
        alias: Some('t'),
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Get TDP for a given socket in Watts",
        handler: mailbox::show_tdp,
    },
    Command {
        name: "setpowerlimit",
        alias: Some('s'),
        module: HelpModule::Mailbox,
        arity: Arity::Fixed(&[Slot::decimal("POWER", U32)]),
        summary: "Set powerlimit for a given socket in mWatts",
        handler: mailbox::set_power_limit,
    },
    Command {
        name: "showddrbandwidth",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show DDR Bandwidth of a system",
        handler: mailbox::show_ddr_bandwidth,
    },
    Command {
        name: "showboostlimit",
        alias: Some('b'),
        module: HelpModule::Mailbox,
        arity: THREAD,
        summary: "Get APML and BIOS boostlimit for a given core index in MHz",
        handler: mailbox::show_boost_limit,
    },
    Command {
        name: "setapmlboostlimit",
        alias: Some('d'),
        module: HelpModule::Mailbox,
        arity: Arity::Lookahead(&[
            Slot::decimal("THREAD", U32),
            Slot::decimal("BOOSTLIMIT", U32),
        ]),
        summary: "Set APML boostlimit for a given core in MHz",
        handler: mailbox::set_apml_boost_limit,
    },
    Command {
        name: "setapmlsocketboostlimit",
        alias: Some('a'),
        module: HelpModule::Mailbox,
        arity: Arity::Fixed(&[Slot::decimal("BOOSTLIMIT", U32)]),
        summary: "Set APML boostlimit for all cores in a socket in MHz",
        handler: mailbox::set_apml_socket_boost_limit,
    },
    Command {
        name: "set_and_verify_dramthrottle",
        alias: Some('l'),
        module: HelpModule::Mailbox,
        arity: Arity::Fixed(&[Slot::decimal("THROTTLE", U32)]),
        summary: "Set DRAM THROTTLE (0 to 80 %) for a given socket",
        handler: mailbox::set_and_verify_dram_throttle,
    },
    Command {
        name: "setdimmpower",
        alias: Some('P'),
        module: HelpModule::Mailbox,
        arity: Arity::Lookahead(&[
            Slot::hex("DIMM_ADDR", U8),
            Slot::decimal("POWER", 0x7FFF),
            Slot::decimal("UPDATERATE", 0x1FF),
        ]),
        summary: "Set dimm power (mW) and update rate (ms) reported by bmc",
        handler: mailbox::set_dimm_power,
    },
    Command {
        name: "setdimmthermalsensor",
        alias: Some('T'),
        module: HelpModule::Mailbox,
        arity: Arity::Lookahead(&[
            Slot::hex("DIMM_ADDR", U8),
            Slot::float("TEMP"),
            Slot::decimal("UPDATERATE", 0x1FF),
        ]),
        summary: "Set dimm temperature (°C) and update rate (ms) reported by bmc",
        handler: mailbox::set_dimm_thermal_sensor,
    },
    Command {
        name: "showdimmpower",
        alias: Some('O'),
        module: HelpModule::Mailbox,
        arity: DIMM_ADDR,
        summary: "Show per dimm power consumption",
        handler: mailbox::show_dimm_power,
    },
    Command {
        name: "showdimmthermalsensor",
        alias: Some('E'),
        module: HelpModule::Mailbox,
        arity: DIMM_ADDR,
        summary: "Show per dimm thermal sensor",
        handler: mailbox::show_dimm_thermal_sensor,
    },
    Command {
        name: "showdimmtemprangeandrefreshrate",
        alias: Some('S'),
        module: HelpModule::Mailbox,
        arity: DIMM_ADDR,
        summary: "Show per dimm temp range and refresh rate",
        handler: mailbox::show_dimm_temp_range_and_refresh_rate,
    },
    Command {
        name: "showPCIeconfigspacedata",
        alias: Some('R'),
        module: HelpModule::Mailbox,
        arity: Arity::Lookahead(&[
            Slot::decimal("SEGMENT", 0xF),
            Slot::decimal("OFFSET", 0xFFF),
            Slot::hex("BUS", U8),
            Slot::hex("DEVICE", 0x1F),
            Slot::decimal("FUNC", 0x7),
        ]),
        summary: "Show 32 bit data from extended PCI config space",
        handler: mailbox::show_pcie_config_space_data,
    },
    Command {
        name: "showvalidmcabanks",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show number of MCA banks & bytes/bank with valid status after a fatal error",
        handler: mailbox::show_valid_mca_banks,
    },
    Command {
        name: "showrasmcamsr",
        alias: Some('D'),
        module: HelpModule::Mailbox,
        arity: Arity::Lookahead(&[
            Slot::decimal("MCA_BANK_INDEX", U16),
            Slot::decimal("OFFSET", U16),
        ]),
        summary: "Show 32 bit data from specified MCA bank and offset",
        handler: mailbox::show_ras_mca_msr,
    },
    Command {
        name: "showfchresetreason",
        alias: Some('F'),
        module: HelpModule::Mailbox,
        arity: Arity::Fixed(&[Slot::decimal("FCHID", 1)]),
        summary: "Show previous reset reason from FCH register",
        handler: mailbox::show_fch_reset_reason,
    },
    Command {
        name: "showsktfreqlimit",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show per socket current active freq limit",
        handler: mailbox::show_socket_freq_limit,
    },
    Command {
        name: "showcclklimit",
        alias: Some('C'),
        module: HelpModule::Mailbox,
        arity: THREAD,
        summary: "Show core clock limit",
        handler: mailbox::show_cclk_limit,
    },
    Command {
        name: "showsvitelemetryallrails",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show svi based pwr telemetry for all rails",
        handler: mailbox::show_svi_telemetry_all_rails,
    },
    Command {
        name: "showsktfreqrange",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show per socket fmax fmin",
        handler: mailbox::show_socket_freq_range,
    },
    Command {
        name: "showiobandwidth",
        alias: Some('B'),
        module: HelpModule::Mailbox,
        arity: LINK_BW,
        summary: "Show IO bandwidth, LINKID P0-P3/G0-G3, BW AGG_BW",
        handler: mailbox::show_io_bandwidth,
    },
    Command {
        name: "showxGMIbandwidth",
        alias: Some('G'),
        module: HelpModule::Mailbox,
        arity: LINK_BW,
        summary: "Show current xGMI bandwidth, LINKID P0-P3/G0-G3, BW AGG_BW/RD_BW/WR_BW",
        handler: mailbox::show_xgmi_bandwidth,
    },
    Command {
        name: "setGMI3linkwidthrange",
        alias: Some('H'),
        module: HelpModule::Mailbox,
        arity: WIDTH_RANGE,
        summary: "Set GMI3 link width range (0, 1, 2), max value >= min value",
        handler: mailbox::set_gmi3_link_width_range,
    },
    Command {
        name: "setxGMIlinkwidthrange",
        alias: Some('L'),
        module: HelpModule::Mailbox,
        arity: WIDTH_RANGE,
        summary: "Set xGMI link width range (0, 1, 2), max value >= min value",
        handler: mailbox::set_xgmi_link_width_range,
    },
    Command {
        name: "APBDisable",
        alias: Some('M'),
        module: HelpModule::Mailbox,
        arity: Arity::Fixed(&[Slot::decimal("PSTATE", U8)]),
        summary: "APB Disable specifies DF P-state, 0 is highest & 2 is the lowest",
        handler: mailbox::apb_disable,
    },
    Command {
        name: "enabledfpstatedynamic",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Set df pstate dynamic",
        handler: mailbox::enable_df_pstate_dynamic,
    },
    Command {
        name: "showfclkmclkuclk",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show df clock, memory clock and umc clock divider",
        handler: mailbox::show_fclk_mclk_uclk,
    },
    Command {
        name: "setlclkdpmlevel",
        alias: Some('N'),
        module: HelpModule::Mailbox,
        arity: Arity::Lookahead(&[
            Slot::decimal("NBIOID", U8),
            Slot::decimal("MAXDPM", U8),
            Slot::decimal("MINDPM", U8),
        ]),
        summary: "Set dpm level range (0 - 3) on an nbio, max value >= min value",
        handler: mailbox::set_lclk_dpm_level,
    },
    Command {
        name: "showcpubasefreq",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show cpu base frequency",
        handler: mailbox::show_cpu_base_freq,
    },
    Command {
        name: "setPCIegenratectrl",
        alias: Some('Z'),
        module: HelpModule::Mailbox,
        arity: MODE,
        summary: "Set PCIe link rate control (0, 1, 2)",
        handler: mailbox::set_pcie_gen_rate_ctrl,
    },
    Command {
        name: "setpwrefficiencymode",
        alias: Some('U'),
        module: HelpModule::Mailbox,
        arity: MODE,
        summary: "Set power efficiency profile policy (0, 1, 2)",
        handler: mailbox::set_power_efficiency_mode,
    },
    Command {
        name: "showraplcore",
        alias: Some('J'),
        module: HelpModule::Mailbox,
        arity: THREAD,
        summary: "Show running average power on specified core",
        handler: mailbox::show_rapl_core,
    },
    Command {
        name: "showraplpkg",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show running average power on pkg",
        handler: mailbox::show_rapl_pkg,
    },
    Command {
        name: "setdfpstaterange",
        alias: Some('V'),
        module: HelpModule::Mailbox,
        arity: Arity::Lookahead(&[
            Slot::decimal("MAX_PSTATE", U8),
            Slot::decimal("MIN_PSTATE", U8),
        ]),
        summary: "Set data fabric pstate range (0 - 2), max pstate <= min pstate",
        handler: mailbox::set_df_pstate_range,
    },
    Command {
        name: "showiodbist",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show IOD bist status",
        handler: mailbox::show_iod_bist,
    },
    Command {
        name: "showccdbist",
        alias: None,
        module: HelpModule::Mailbox,
        arity: INSTANCE,
        summary: "Show CCD bist status",
        handler: mailbox::show_ccd_bist,
    },
    Command {
        name: "showccxbist",
        alias: None,
        module: HelpModule::Mailbox,
        arity: INSTANCE,
        summary: "Show CCX bist status",
        handler: mailbox::show_ccx_bist,
    },
    Command {
        name: "shownbioerrorloggingregister",
        alias: None,
        module: HelpModule::Mailbox,
        arity: Arity::Lookahead(&[
            Slot::hex("QUADRANT", U8),
            Slot::hex("OFFSET", 0xFF_FFFF),
        ]),
        summary: "Show nbio error logging register",
        handler: mailbox::show_nbio_error_logging_register,
    },
    Command {
        name: "showdramthrottle",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show dram throttle",
        handler: mailbox::show_dram_throttle,
    },
    Command {
        name: "showprochotstatus",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show prochot status",
        handler: mailbox::show_prochot_status,
    },
    Command {
        name: "showprochotresidency",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show prochot residency",
        handler: mailbox::show_prochot_residency,
    },
    Command {
        name: "showlclkdpmlevelrange",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NBIOID,
        summary: "Show LCLK DPM level range",
        handler: mailbox::show_lclk_dpm_level_range,
    },
    Command {
        name: "showraslasttransactaddr",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show RAS last transaction address",
        handler: mailbox::show_ras_last_transact_addr,
    },
    Command {
        name: "showpowerconsumed",
        alias: None,
        module: HelpModule::Mailbox,
        arity: NONE,
        summary: "Show consumed power",
        handler: mailbox::show_power_consumed,
    },
    // sbrmi
    Command {
        name: "showrmiregisters",
        alias: None,
        module: HelpModule::Sbrmi,
        arity: NONE,
        summary: "Get values of SB-RMI reg commands for a given socket",
        handler: sbrmi::show_rmi_registers,
    },
    // sbtsi
    Command {
        name: "showtsiregisters",
        alias: None,
        module: HelpModule::Sbtsi,
        arity: NONE,
        summary: "Get values of SB-TSI reg commands for a given socket",
        handler: sbtsi::show_tsi_registers,
    },
    Command {
        name: "set_verify_updaterate",
        alias: Some('u'),
        module: HelpModule::Sbtsi,
        arity: Arity::Fixed(&[Slot::float("UPDATERATE")]),
        summary: "Set APML Freq Update rate, valid values are 2^i, i=[-4,6]",
        handler: sbtsi::set_verify_update_rate,
    },
    Command {
        name: "sethightempthreshold",
        alias: Some('X'),
        module: HelpModule::Sbtsi,
        arity: Arity::Fixed(&[Slot::float("TEMP")]),
        summary: "Set APML High Temp Threshold (°C)",
        handler: sbtsi::set_high_temp_threshold,
    },
    Command {
        name: "setlowtempthreshold",
        alias: Some('w'),
        module: HelpModule::Sbtsi,
        arity: Arity::Fixed(&[Slot::float("TEMP")]),
        summary: "Set APML Low Temp Threshold (°C), between 0 and 70",
        handler: sbtsi::set_low_temp_threshold,
    },
    Command {
        name: "settempoffset",
        alias: Some('x'),
        module: HelpModule::Sbtsi,
        arity: Arity::Fixed(&[Slot::float("VALUE")]),
        summary: "Set APML CPU Temp Offset, VALUE = [-CPU_TEMP(°C), 127 °C]",
        handler: sbtsi::set_temp_offset,
    },
    Command {
        name: "settimeoutconfig",
        alias: Some('y'),
        module: HelpModule::Sbtsi,
        arity: BIT,
        summary: "Set/Reset APML CPU timeout config, VALUE = 0 or 1",
        handler: sbtsi::set_timeout_config,
    },
    Command {
        name: "setalertthreshold",
        alias: Some('g'),
        module: HelpModule::Sbtsi,
        arity: Arity::Fixed(&[Slot::decimal("VALUE", 8)]),
        summary: "Set APML CPU alert threshold sample, VALUE = 1 to 8",
        handler: sbtsi::set_alert_threshold,
    },
    Command {
        name: "setalertconfig",
        alias: Some('j'),
        module: HelpModule::Sbtsi,
        arity: BIT,
        summary: "Set/Reset APML CPU alert config, VALUE = 0 or 1",
        handler: sbtsi::set_alert_config,
    },
    Command {
        name: "setalertmask",
        alias: Some('k'),
        module: HelpModule::Sbtsi,
        arity: BIT,
        summary: "Set/Reset APML CPU alert mask, VALUE = 0 or 1",
        handler: sbtsi::set_alert_mask,
    },
    Command {
        name: "setrunstop",
        alias: Some('m'),
        module: HelpModule::Sbtsi,
        arity: BIT,
        summary: "Set/Reset APML CPU runstop, VALUE = 0 or 1",
        handler: sbtsi::set_run_stop,
    },
    Command {
        name: "setreadorder",
        alias: Some('n'),
        module: HelpModule::Sbtsi,
        arity: BIT,
        summary: "Set/Reset APML CPU read order, VALUE = 0 or 1",
        handler: sbtsi::set_read_order,
    },
    Command {
        name: "setara",
        alias: Some('o'),
        module: HelpModule::Sbtsi,
        arity: BIT,
        summary: "Set/Reset APML CPU ARA, VALUE = 0 or 1",
        handler: sbtsi::set_ara,
    },
    // reg-access
    Command {
        name: "readregister",
        alias: Some('e'),
        module: HelpModule::RegAccess,
        arity: Arity::Lookahead(&[Slot::text("INTERFACE"), Slot::hex("REGISTER", U8)]),
        summary: "Read a register, INTERFACE sbrmi or sbtsi",
        handler: reg_access::read_register,
    },
    Command {
        name: "writeregister",
        alias: None,
        module: HelpModule::RegAccess,
        arity: Arity::Lookahead(&[
            Slot::text("INTERFACE"),
            Slot::hex("REGISTER", U8),
            Slot::decimal("VALUE", U8),
        ]),
        summary: "Write to a register, INTERFACE sbrmi or sbtsi",
        handler: reg_access::write_register,
    },
    Command {
        name: "readmsrregister",
        alias: None,
        module: HelpModule::RegAccess,
        arity: Arity::Lookahead(&[Slot::hex("REGISTER", U32), Slot::decimal("THREAD", U32)]),
        summary: "Read MSR register",
        handler: reg_access::read_msr_register,
    },
    Command {
        name: "readcpuidregister",
        alias: None,
        module: HelpModule::RegAccess,
        arity: Arity::Lookahead(&[
            Slot::hex("FUNC", U32),
            Slot::hex("EXT_FUNC", U32),
            Slot::decimal("THREAD", U32),
        ]),
        summary: "Read CPUID register",
        handler: reg_access::read_cpuid_register,
    },
    // cpuid
    Command {
        name: "showthreadspercoreandsocket",
        alias: None,
        module: HelpModule::Cpuid,
        arity: NONE,
        summary: "Show threads per core and socket",
        handler: cpuid::show_threads_per_core_and_socket,
    },
    Command {
        name: "showccxinfo",
        alias: None,
        module: HelpModule::Cpuid,
        arity: NONE,
        summary: "Show max num of cores per ccx and ccx instances",
        handler: cpuid::show_ccx_info,
    },
    Command {
        name: "showSMTstatus",
        alias: None,
        module: HelpModule::Cpuid,
        arity: NONE,
        summary: "Show SMT enabled status",
        handler: cpuid::show_smt_status,
    },
];

/// Look up a command by `--name`, bare `name` or `-c` alias.
///
/// # Examples
/// ```
/// use apml_core::table;
///
/// let by_alias = table::find("-p").expect("alias resolves");
/// let by_name = table::find("--showpower").expect("long name resolves");
/// assert_eq!(by_alias.name, by_name.name);
/// assert!(table::find("--nosuchcommand").is_none());
/// ```
#[must_use]
pub fn find(token: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|command| command.matches(token))
}

/// Commands listed under `module`, in table order.
pub fn in_module(module: HelpModule) -> impl Iterator<Item = &'static Command> {
    COMMANDS
        .iter()
        .filter(move |command| command.module == module)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::command::ArgKind;

    #[test]
    fn names_are_unique() {
        let mut seen = HashSet::new();
        for command in COMMANDS {
            assert!(seen.insert(command.name), "duplicate name {}", command.name);
        }
    }

    #[test]
    fn aliases_are_unique_and_skip_reserved_flags() {
        let mut seen = HashSet::new();
        for alias in COMMANDS.iter().filter_map(|command| command.alias) {
            assert!(seen.insert(alias), "duplicate alias {alias}");
            assert!(!matches!(alias, 'h' | 'v'), "alias {alias} is reserved");
        }
    }

    #[test]
    fn arities_stay_within_five_slots() {
        for command in COMMANDS {
            assert!(command.arity.len() <= 5, "{} declares too many slots", command.name);
        }
    }

    #[test]
    fn integer_slots_carry_a_bound() {
        for command in COMMANDS {
            for slot in command.slots() {
                if let ArgKind::Decimal { max } | ArgKind::Hex { max } = slot.kind {
                    assert!(max > 0, "{}[{}] has an empty range", command.name, slot.name);
                }
            }
        }
    }

    #[test]
    fn every_module_lists_commands() {
        for module in HelpModule::ALL {
            assert!(in_module(module).next().is_some(), "{module} is empty");
        }
    }

    #[test]
    fn bare_name_and_alias_resolve_to_the_same_entry() {
        for command in COMMANDS {
            let by_name = find(command.name).expect("bare name resolves");
            assert_eq!(by_name.name, command.name);
            if let Some(alias) = command.alias {
                let by_alias = find(&format!("-{alias}")).expect("alias resolves");
                assert_eq!(by_alias.name, command.name);
            }
        }
    }
}
