//! The telemetry collaborator capability.
//!
//! Every command handler reaches the hardware through [`TelemetryClient`].
//! Implementations own the transport, the bus protocol and the quiescence
//! delay between a write and its confirming read.

use std::{fmt, num::ParseIntError, str::FromStr};

use crate::{
    codec::BandwidthSelector,
    error::{DomainError, OobStatus},
    types::{
        CpuidRegisters, DdrBandwidth, DfPstateFrequency, DfPstateRange, DimmPower, DimmThermal,
        DpmLevel, FreqLimit, FreqRange, LclkDpmLevelRange, LinkWidthRange, McaBank, McaValidity,
        NbioErrorLog, PciAddress, RegisterInterface, TempRefreshRate, TempStatus, TsiConfig,
        TsiConfigBit,
    },
};

/// Result type returned by [`TelemetryClient`] operations.
pub type TelemetryResult<T> = Result<T, DomainError>;

/// Index of a managed CPU socket.
///
/// The core only checks that the index is a decimal `u8`; whether the socket
/// exists is for the collaborator to decide.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SocketIndex(u8);

impl SocketIndex {
    /// Wrap a raw index.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Raw index.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for SocketIndex {
    fn from(index: u8) -> Self {
        Self(index)
    }
}

impl FromStr for SocketIndex {
    type Err = ParseIntError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        token.parse().map(Self)
    }
}

impl fmt::Display for SocketIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn unsupported<T>() -> TelemetryResult<T> {
    Err(DomainError::from_status(OobStatus::NotSupported))
}

/// Out-of-band operations a handler may request.
///
/// Methods take `&mut self`: a handle drives one ordered bus and is never
/// shared between threads at the same time. Every operation defaults to
/// [`OobStatus::NotSupported`], so a backend implements the subset its
/// platform provides.
///
/// Power, bandwidth and telemetry readings are in the units the firmware
/// reports: mW, GB/s, Mbps and MHz.
///
/// # Examples
/// ```
/// use apml_core::{SocketIndex, TelemetryClient, TelemetryResult};
///
/// struct PowerOnly;
///
/// impl TelemetryClient for PowerOnly {
///     fn read_socket_power(&mut self, _socket: SocketIndex) -> TelemetryResult<u32> {
///         Ok(95_000)
///     }
/// }
///
/// let mut client = PowerOnly;
/// assert_eq!(client.read_socket_power(SocketIndex::new(0)), Ok(95_000));
/// assert_eq!(client.read_tdp(SocketIndex::new(0)).map_err(|e| e.code()), Err(3));
/// ```
#[expect(unused_variables, reason = "default bodies ignore their parameters")]
pub trait TelemetryClient {
    /// Wait out the settle interval the bus requires between a write and the
    /// read that confirms it.
    fn quiesce(&mut self) {}

    // Power and TDP.

    /// Current socket power in mW.
    fn read_socket_power(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        unsupported()
    }

    /// Current socket power limit in mW.
    fn read_socket_power_limit(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        unsupported()
    }

    /// Largest power limit the socket accepts, in mW.
    fn read_max_socket_power_limit(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        unsupported()
    }

    /// Set the socket power limit in mW.
    fn write_socket_power_limit(&mut self, socket: SocketIndex, limit_mw: u32) -> TelemetryResult<()> {
        unsupported()
    }

    /// Thermal design power in mW.
    fn read_tdp(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        unsupported()
    }

    /// Minimum configurable TDP in mW.
    fn read_min_tdp(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        unsupported()
    }

    /// Maximum configurable TDP in mW.
    fn read_max_tdp(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        unsupported()
    }

    // Memory and boost.

    /// DDR bandwidth figures.
    fn read_ddr_bandwidth(&mut self, socket: SocketIndex) -> TelemetryResult<DdrBandwidth> {
        unsupported()
    }

    /// APML boost limit for a core in MHz.
    fn read_apml_boost_limit(&mut self, socket: SocketIndex, thread: u32) -> TelemetryResult<u32> {
        unsupported()
    }

    /// BIOS boost limit for a core in MHz.
    fn read_bios_boost_fmax(&mut self, socket: SocketIndex, thread: u32) -> TelemetryResult<u32> {
        unsupported()
    }

    /// Set the APML boost limit for a core in MHz.
    fn write_apml_boost_limit(
        &mut self,
        socket: SocketIndex,
        thread: u32,
        limit_mhz: u32,
    ) -> TelemetryResult<()> {
        unsupported()
    }

    /// Set the APML boost limit for every core in MHz.
    fn write_apml_boost_limit_all_cores(
        &mut self,
        socket: SocketIndex,
        limit_mhz: u32,
    ) -> TelemetryResult<()> {
        unsupported()
    }

    /// Request a DRAM throttle percentage; the platform may clamp it.
    fn write_dram_throttle(&mut self, socket: SocketIndex, percent: u32) -> TelemetryResult<()> {
        unsupported()
    }

    /// Current DRAM throttle percentage.
    fn read_dram_throttle(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        unsupported()
    }

    // DIMM reporting.

    /// Report DIMM power on behalf of the BMC.
    fn write_dimm_power(&mut self, socket: SocketIndex, power: DimmPower) -> TelemetryResult<()> {
        unsupported()
    }

    /// Report a DIMM thermal sensor reading on behalf of the BMC.
    fn write_dimm_thermal_sensor(
        &mut self,
        socket: SocketIndex,
        thermal: DimmThermal,
    ) -> TelemetryResult<()> {
        unsupported()
    }

    /// DIMM temperature range and refresh rate.
    fn read_dimm_temp_range_and_refresh_rate(
        &mut self,
        socket: SocketIndex,
        dimm_addr: u8,
    ) -> TelemetryResult<TempRefreshRate> {
        unsupported()
    }

    /// DIMM power consumption.
    fn read_dimm_power(&mut self, socket: SocketIndex, dimm_addr: u8) -> TelemetryResult<DimmPower> {
        unsupported()
    }

    /// DIMM thermal sensor.
    fn read_dimm_thermal_sensor(
        &mut self,
        socket: SocketIndex,
        dimm_addr: u8,
    ) -> TelemetryResult<DimmThermal> {
        unsupported()
    }

    // RAS.

    /// 32-bit word from extended PCI configuration space.
    fn read_pcie_config_data(
        &mut self,
        socket: SocketIndex,
        address: PciAddress,
    ) -> TelemetryResult<u32> {
        unsupported()
    }

    /// MCA banks with valid status after a fatal error.
    fn read_valid_mca_banks(&mut self, socket: SocketIndex) -> TelemetryResult<McaValidity> {
        unsupported()
    }

    /// 32-bit word from an MCA bank.
    fn read_mca_msr(&mut self, socket: SocketIndex, bank: McaBank) -> TelemetryResult<u32> {
        unsupported()
    }

    /// Previous reset reason from an FCH.
    fn read_fch_reset_reason(&mut self, socket: SocketIndex, fch_id: u32) -> TelemetryResult<u32> {
        unsupported()
    }

    /// Last transaction address recorded by RAS.
    fn read_ras_last_transaction_address(&mut self, socket: SocketIndex) -> TelemetryResult<u64> {
        unsupported()
    }

    // Frequency and links.

    /// Current active socket frequency limit.
    fn read_socket_freq_limit(&mut self, socket: SocketIndex) -> TelemetryResult<FreqLimit> {
        unsupported()
    }

    /// Current active core clock limit in MHz.
    fn read_core_clock_limit(&mut self, socket: SocketIndex, thread: u32) -> TelemetryResult<u16> {
        unsupported()
    }

    /// SVI-based power telemetry for all rails, in mW.
    fn read_svi_telemetry_all_rails(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        unsupported()
    }

    /// Socket fmax and fmin.
    fn read_socket_freq_range(&mut self, socket: SocketIndex) -> TelemetryResult<FreqRange> {
        unsupported()
    }

    /// Current bandwidth of an I/O link in Mbps.
    fn read_io_bandwidth(
        &mut self,
        socket: SocketIndex,
        selector: BandwidthSelector,
    ) -> TelemetryResult<u32> {
        unsupported()
    }

    /// Current bandwidth of an xGMI link in Mbps.
    fn read_xgmi_bandwidth(
        &mut self,
        socket: SocketIndex,
        selector: BandwidthSelector,
    ) -> TelemetryResult<u32> {
        unsupported()
    }

    /// Set the GMI3 link width range.
    fn write_gmi3_link_width_range(
        &mut self,
        socket: SocketIndex,
        range: LinkWidthRange,
    ) -> TelemetryResult<()> {
        unsupported()
    }

    /// Set the xGMI link width range.
    fn write_xgmi_link_width_range(
        &mut self,
        socket: SocketIndex,
        range: LinkWidthRange,
    ) -> TelemetryResult<()> {
        unsupported()
    }

    // Data fabric and PCIe.

    /// Disable APB and pin the DF P-state. Returns whether PROCHOT_L is
    /// asserted, in which case the lowest P-state is enforced.
    fn write_apb_disable(&mut self, socket: SocketIndex, pstate: u8) -> TelemetryResult<bool> {
        unsupported()
    }

    /// Re-enable dynamic DF P-state control. Returns whether PROCHOT_L is
    /// asserted.
    fn write_apb_enable(&mut self, socket: SocketIndex) -> TelemetryResult<bool> {
        unsupported()
    }

    /// Fabric, memory and UMC clocks.
    fn read_df_pstate_frequency(&mut self, socket: SocketIndex) -> TelemetryResult<DfPstateFrequency> {
        unsupported()
    }

    /// Set the LCLK DPM level range of an NBIO.
    fn write_lclk_dpm_level_range(
        &mut self,
        socket: SocketIndex,
        range: LclkDpmLevelRange,
    ) -> TelemetryResult<()> {
        unsupported()
    }

    /// LCLK DPM level range of an NBIO.
    fn read_lclk_dpm_level_range(&mut self, socket: SocketIndex, nbio_id: u8) -> TelemetryResult<DpmLevel> {
        unsupported()
    }

    /// CPU base frequency in MHz.
    fn read_cpu_base_frequency(&mut self, socket: SocketIndex) -> TelemetryResult<u16> {
        unsupported()
    }

    /// Set the PCIe Gen5 rate control mode. Returns the previous mode.
    fn control_pcie_gen5_rate(&mut self, socket: SocketIndex, mode: u8) -> TelemetryResult<u8> {
        unsupported()
    }

    /// Set the power efficiency profile policy.
    fn write_power_efficiency_mode(&mut self, socket: SocketIndex, mode: u8) -> TelemetryResult<()> {
        unsupported()
    }

    /// Set the DF P-state range.
    fn write_df_pstate_range(&mut self, socket: SocketIndex, range: DfPstateRange) -> TelemetryResult<()> {
        unsupported()
    }

    // Energy.

    /// Core energy counter in kJ.
    fn read_core_energy(&mut self, socket: SocketIndex, thread: u32) -> TelemetryResult<f64> {
        unsupported()
    }

    /// Package energy counter in MJ.
    fn read_package_energy(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        unsupported()
    }

    // Built-in self test and error logs.

    /// IOD BIST result; zero means pass.
    fn read_iod_bist(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        unsupported()
    }

    /// CCD BIST result; zero means pass.
    fn read_ccd_bist(&mut self, socket: SocketIndex, instance: u32) -> TelemetryResult<u32> {
        unsupported()
    }

    /// Raw CCX BIST result.
    fn read_ccx_bist(&mut self, socket: SocketIndex, instance: u32) -> TelemetryResult<u32> {
        unsupported()
    }

    /// NBIO error logging register.
    fn read_nbio_error_log(&mut self, socket: SocketIndex, log: NbioErrorLog) -> TelemetryResult<u32> {
        unsupported()
    }

    // PROCHOT.

    /// Whether PROCHOT is asserted.
    fn read_prochot_status(&mut self, socket: SocketIndex) -> TelemetryResult<bool> {
        unsupported()
    }

    /// PROCHOT residency as a percentage.
    fn read_prochot_residency(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        unsupported()
    }

    // SB-TSI.

    /// CPU temperature in °C.
    fn read_tsi_cpu_temp(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        unsupported()
    }

    /// Temperature alert status.
    fn read_tsi_temp_status(&mut self, socket: SocketIndex) -> TelemetryResult<TempStatus> {
        unsupported()
    }

    /// Configuration register.
    fn read_tsi_config(&mut self, socket: SocketIndex) -> TelemetryResult<TsiConfig> {
        unsupported()
    }

    /// Set one configuration bit.
    fn write_tsi_config_bit(
        &mut self,
        socket: SocketIndex,
        bit: TsiConfigBit,
        value: bool,
    ) -> TelemetryResult<()> {
        unsupported()
    }

    /// Temperature update rate in Hz.
    fn read_tsi_update_rate(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        unsupported()
    }

    /// Set the temperature update rate in Hz.
    fn write_tsi_update_rate(&mut self, socket: SocketIndex, rate_hz: f64) -> TelemetryResult<()> {
        unsupported()
    }

    /// High temperature threshold in °C.
    fn read_tsi_high_threshold(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        unsupported()
    }

    /// Set the high temperature threshold in °C.
    fn write_tsi_high_threshold(&mut self, socket: SocketIndex, celsius: f64) -> TelemetryResult<()> {
        unsupported()
    }

    /// Low temperature threshold in °C.
    fn read_tsi_low_threshold(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        unsupported()
    }

    /// Set the low temperature threshold in °C.
    fn write_tsi_low_threshold(&mut self, socket: SocketIndex, celsius: f64) -> TelemetryResult<()> {
        unsupported()
    }

    /// CPU temperature offset in °C.
    fn read_tsi_temp_offset(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        unsupported()
    }

    /// Set the CPU temperature offset in °C.
    fn write_tsi_temp_offset(&mut self, socket: SocketIndex, celsius: f64) -> TelemetryResult<()> {
        unsupported()
    }

    /// Whether the bus timeout is enabled.
    fn read_tsi_timeout_config(&mut self, socket: SocketIndex) -> TelemetryResult<bool> {
        unsupported()
    }

    /// Enable or disable the bus timeout.
    fn write_tsi_timeout_config(&mut self, socket: SocketIndex, enabled: bool) -> TelemetryResult<()> {
        unsupported()
    }

    /// Number of samples above threshold before an alert.
    fn read_tsi_alert_threshold(&mut self, socket: SocketIndex) -> TelemetryResult<u8> {
        unsupported()
    }

    /// Set the number of samples above threshold before an alert.
    fn write_tsi_alert_threshold(&mut self, socket: SocketIndex, samples: u8) -> TelemetryResult<()> {
        unsupported()
    }

    /// Whether alert comparison is enabled.
    fn read_tsi_alert_config(&mut self, socket: SocketIndex) -> TelemetryResult<bool> {
        unsupported()
    }

    /// Enable or disable alert comparison.
    fn write_tsi_alert_config(&mut self, socket: SocketIndex, enabled: bool) -> TelemetryResult<()> {
        unsupported()
    }

    /// Manufacturer identifier.
    fn read_tsi_manufacturer_id(&mut self, socket: SocketIndex) -> TelemetryResult<u8> {
        unsupported()
    }

    /// SB-TSI revision.
    fn read_tsi_revision(&mut self, socket: SocketIndex) -> TelemetryResult<u8> {
        unsupported()
    }

    // Register access and CPUID.

    /// Read a byte-wide side-band register.
    fn read_register(
        &mut self,
        socket: SocketIndex,
        interface: RegisterInterface,
        register: u8,
    ) -> TelemetryResult<u8> {
        unsupported()
    }

    /// Write a byte-wide side-band register.
    fn write_register(
        &mut self,
        socket: SocketIndex,
        interface: RegisterInterface,
        register: u8,
        value: u8,
    ) -> TelemetryResult<()> {
        unsupported()
    }

    /// Read an MSR on a thread.
    fn read_msr(&mut self, socket: SocketIndex, thread: u32, address: u32) -> TelemetryResult<u64> {
        unsupported()
    }

    /// Execute CPUID on a thread.
    fn read_cpuid(
        &mut self,
        socket: SocketIndex,
        thread: u32,
        function: u32,
        extended: u32,
    ) -> TelemetryResult<CpuidRegisters> {
        unsupported()
    }

    /// Threads per core.
    fn read_threads_per_core(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        unsupported()
    }

    /// Threads per socket.
    fn read_threads_per_socket(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        unsupported()
    }
}
