//! Value types exchanged with the telemetry collaborator.

use std::fmt;

use crate::error::UsageError;

/// DDR bandwidth figures for a socket.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DdrBandwidth {
    /// Theoretical maximum in GB/s.
    pub max_bw: u32,
    /// Utilised bandwidth in GB/s.
    pub utilized_bw: u32,
    /// Utilisation as a percentage of the maximum.
    pub utilized_pct: u32,
}

/// Power report for a DIMM.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DimmPower {
    /// SPD address of the DIMM.
    pub dimm_addr: u8,
    /// Power in mW, 15 bits wide.
    pub power: u16,
    /// Update rate in ms, 9 bits wide.
    pub update_rate: u16,
}

/// Thermal sensor report for a DIMM.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DimmThermal {
    /// SPD address of the DIMM.
    pub dimm_addr: u8,
    /// Scaled 12-bit temperature code, see [`crate::codec`].
    pub sensor: u16,
    /// Update rate in ms, 9 bits wide.
    pub update_rate: u16,
}

/// Address in extended PCI configuration space.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PciAddress {
    /// 4-bit segment.
    pub segment: u8,
    /// 12-bit register offset.
    pub offset: u16,
    /// Bus number.
    pub bus: u8,
    /// 5-bit device number.
    pub device: u8,
    /// 3-bit function number.
    pub func: u8,
}

/// MCA bank and register offset to read.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct McaBank {
    /// Bank index as reported by [`McaValidity`].
    pub index: u16,
    /// Byte offset inside the bank.
    pub offset: u16,
}

/// MCA banks holding valid status after a fatal error.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct McaValidity {
    /// Bytes per bank.
    pub bytes_per_bank: u16,
    /// Number of valid banks.
    pub bank_count: u16,
}

/// DIMM temperature range and refresh rate from the MR4 register.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TempRefreshRate {
    /// Temperature range field.
    pub range: u8,
    /// Refresh rate field.
    pub refresh_rate: u8,
}

/// Current active frequency limit and the sources imposing it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FreqLimit {
    /// Frequency in MHz.
    pub frequency_mhz: u16,
    /// Names of the limiting sources; empty when reserved.
    pub sources: Vec<String>,
}

/// Socket frequency range in MHz.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FreqRange {
    /// Maximum frequency.
    pub fmax: u16,
    /// Minimum frequency.
    pub fmin: u16,
}

/// Link width range for GMI3 or xGMI links.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LinkWidthRange {
    /// Minimum width selector.
    pub min: u8,
    /// Maximum width selector.
    pub max: u8,
}

/// Data fabric clocks for the current DF P-state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DfPstateFrequency {
    /// Fabric clock in MHz.
    pub fclk: u16,
    /// Memory clock in MHz.
    pub mclk: u16,
    /// UMC clock divider.
    pub uclk: u8,
}

/// Minimum and maximum DPM level.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DpmLevel {
    /// Highest DPM level.
    pub max: u8,
    /// Lowest DPM level.
    pub min: u8,
}

/// LCLK DPM level range for one NBIO.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LclkDpmLevelRange {
    /// NBIO identifier.
    pub nbio_id: u8,
    /// Requested level range.
    pub dpm: DpmLevel,
}

/// DF P-state range; the maximum P-state is the numerically lower one.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DfPstateRange {
    /// Highest-performance P-state.
    pub max_pstate: u8,
    /// Lowest-performance P-state.
    pub min_pstate: u8,
}

/// NBIO error logging register selector.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NbioErrorLog {
    /// NBIO quadrant.
    pub quadrant: u8,
    /// 24-bit register offset.
    pub offset: u32,
}

impl NbioErrorLog {
    /// Combined register address `quadrant << 24 | offset`.
    #[must_use]
    pub const fn register(self) -> u32 {
        ((self.quadrant as u32) << 24) | (self.offset & 0x00FF_FFFF)
    }
}

/// SB-TSI temperature alert status.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TempStatus {
    /// Temperature is below the low threshold.
    pub low_alert: bool,
    /// Temperature is above the high threshold.
    pub high_alert: bool,
}

/// SB-TSI configuration register bits.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TsiConfig {
    /// ALERT_L pin masked.
    pub alert_mask: bool,
    /// Comparisons stopped.
    pub run_stop: bool,
    /// Decimal latches integer on atomic reads.
    pub read_order: bool,
    /// ARA response disabled.
    pub ara_disabled: bool,
}

/// Writable bit of the SB-TSI configuration register.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TsiConfigBit {
    /// ALERT_L pin mask.
    AlertMask,
    /// Run/stop comparisons.
    RunStop,
    /// Atomic read order.
    ReadOrder,
    /// Alert response address.
    Ara,
}

/// Side-band interface addressed by raw register commands.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RegisterInterface {
    /// SB-RMI.
    Sbrmi,
    /// SB-TSI.
    Sbtsi,
}

impl RegisterInterface {
    /// Parse `sbrmi` or `sbtsi`, ignoring case.
    ///
    /// # Errors
    /// Returns [`UsageError::UnsupportedValue`] for any other token.
    pub fn parse(command: &'static str, token: &str) -> Result<Self, UsageError> {
        if token.eq_ignore_ascii_case("sbrmi") {
            Ok(Self::Sbrmi)
        } else if token.eq_ignore_ascii_case("sbtsi") {
            Ok(Self::Sbtsi)
        } else {
            Err(UsageError::UnsupportedValue {
                command,
                slot: "INTERFACE",
                token: token.to_owned(),
            })
        }
    }
}

impl fmt::Display for RegisterInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sbrmi => "sbrmi",
            Self::Sbtsi => "sbtsi",
        })
    }
}

/// Registers returned by a CPUID read.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CpuidRegisters {
    /// EAX.
    pub eax: u32,
    /// EBX.
    pub ebx: u32,
    /// ECX.
    pub ecx: u32,
    /// EDX.
    pub edx: u32,
}
