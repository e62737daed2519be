//! In-memory [`TelemetryClient`] used by the binary and the tests.
//!
//! Every socket starts from the same plausible state. Writes are validated
//! against the ranges real firmware enforces and reflected by later reads,
//! so set-then-verify flows behave as they would on hardware.

use std::{collections::HashMap, thread, time::Duration};

use tracing::trace;

use crate::{
    codec::BandwidthSelector,
    error::{DomainError, OobStatus},
    telemetry::{SocketIndex, TelemetryClient, TelemetryResult},
    types::{
        CpuidRegisters, DdrBandwidth, DfPstateFrequency, DfPstateRange, DimmPower, DimmThermal,
        DpmLevel, FreqLimit, FreqRange, LclkDpmLevelRange, LinkWidthRange, McaBank, McaValidity,
        NbioErrorLog, PciAddress, RegisterInterface, TempRefreshRate, TempStatus, TsiConfig,
        TsiConfigBit,
    },
};

const DEFAULT_SOCKETS: u8 = 2;
const MAX_DRAM_THROTTLE: u32 = 80;
const MAX_LINK_WIDTH: u8 = 2;
const MAX_DF_PSTATE: u8 = 2;
const MAX_DPM_LEVEL: u8 = 3;
const MAX_NBIO: u8 = 3;
const MAX_MODE: u8 = 2;
const L3_SHARING_FIELD: u32 = 15;
const RMI_REVISION: u8 = 0x20;
const TSI_REVISION: u8 = 0x04;
const TSI_THRESHOLD_STEP: f64 = 0.125;
const TSI_OFFSET_STEP: f64 = 0.25;
const EFFICIENCY_STEP_MW: u32 = 5000;
const FCLK_STEP_MHZ: u16 = 200;
/// Link masks at or above this bit select GMI links.
const GMI_LINKS: u8 = 0x10;
const UPDATE_RATE_EXPONENTS: std::ops::RangeInclusive<i32> = -4..=6;

fn invalid() -> DomainError {
    DomainError::from_status(OobStatus::InvalidInput)
}

/// Bandwidth shrinks with the widest link width the range allows.
fn scale_by_width(full: u32, range: LinkWidthRange) -> u32 {
    full * (u32::from(range.max) + 1) / (u32::from(MAX_LINK_WIDTH) + 1)
}

fn snap(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

#[derive(Clone, Debug)]
struct SocketState {
    power: u32,
    power_limit: u32,
    max_power_limit: u32,
    tdp: u32,
    min_tdp: u32,
    max_tdp: u32,
    ddr: DdrBandwidth,
    bios_boost: u32,
    apml_boost: HashMap<u32, u32>,
    dram_throttle: u32,
    dimm_power: HashMap<u8, DimmPower>,
    dimm_thermal: HashMap<u8, DimmThermal>,
    mca: McaValidity,
    freq_limit: FreqLimit,
    freq_range: FreqRange,
    gmi3_width: LinkWidthRange,
    xgmi_width: LinkWidthRange,
    apb_pstate: Option<u8>,
    df_pstate_range: DfPstateRange,
    df_frequency: DfPstateFrequency,
    lclk_dpm: HashMap<u8, DpmLevel>,
    base_frequency: u16,
    pcie_rate_mode: u8,
    efficiency_mode: u8,
    package_energy: f64,
    ccx_bist: u32,
    prochot: bool,
    prochot_residency: f64,
    cpu_temp: f64,
    tsi_config: TsiConfig,
    update_rate: f64,
    high_threshold: f64,
    low_threshold: f64,
    temp_offset: f64,
    timeout_enabled: bool,
    alert_threshold: u8,
    alert_config: bool,
    registers: HashMap<(RegisterInterface, u8), u8>,
    threads_per_core: u32,
    threads_per_socket: u32,
}

impl Default for SocketState {
    fn default() -> Self {
        Self {
            power: 125_000,
            power_limit: 200_000,
            max_power_limit: 320_000,
            tdp: 280_000,
            min_tdp: 225_000,
            max_tdp: 400_000,
            ddr: DdrBandwidth {
                max_bw: 400,
                utilized_bw: 100,
                utilized_pct: 25,
            },
            bios_boost: 3700,
            apml_boost: HashMap::new(),
            dram_throttle: 0,
            dimm_power: HashMap::new(),
            dimm_thermal: HashMap::new(),
            mca: McaValidity {
                bytes_per_bank: 128,
                bank_count: 2,
            },
            freq_limit: FreqLimit {
                frequency_mhz: 3500,
                sources: vec!["OPN Max".to_owned()],
            },
            freq_range: FreqRange {
                fmax: 3700,
                fmin: 400,
            },
            gmi3_width: LinkWidthRange { min: 0, max: 2 },
            xgmi_width: LinkWidthRange { min: 0, max: 2 },
            apb_pstate: None,
            df_pstate_range: DfPstateRange {
                max_pstate: 0,
                min_pstate: 2,
            },
            df_frequency: DfPstateFrequency {
                fclk: 1600,
                mclk: 1600,
                uclk: 1,
            },
            lclk_dpm: HashMap::new(),
            base_frequency: 2400,
            pcie_rate_mode: 0,
            efficiency_mode: 0,
            package_energy: 2.75,
            ccx_bist: 0x00FF_0001,
            prochot: false,
            prochot_residency: 0.0,
            cpu_temp: 45.125,
            tsi_config: TsiConfig::default(),
            update_rate: 16.0,
            high_threshold: 70.0,
            low_threshold: 0.0,
            temp_offset: 0.0,
            timeout_enabled: true,
            alert_threshold: 1,
            alert_config: false,
            registers: HashMap::from([((RegisterInterface::Sbrmi, 0x00), RMI_REVISION)]),
            threads_per_core: 2,
            threads_per_socket: 128,
        }
    }
}

impl SocketState {
    fn check_thread(&self, thread: u32) -> TelemetryResult<()> {
        if thread < self.threads_per_socket {
            Ok(())
        } else {
            Err(invalid())
        }
    }

    fn apml_boost(&self, thread: u32) -> u32 {
        self.apml_boost
            .get(&thread)
            .copied()
            .unwrap_or(self.bios_boost)
    }
}

/// Simulated APML platform with a configurable number of sockets.
///
/// # Examples
/// ```
/// use apml_core::{SimulatedPlatform, SocketIndex, TelemetryClient};
///
/// let mut platform = SimulatedPlatform::with_sockets(1);
/// platform.write_dram_throttle(SocketIndex::new(0), 95)?;
/// assert_eq!(platform.read_dram_throttle(SocketIndex::new(0))?, 80);
/// assert!(platform.read_socket_power(SocketIndex::new(1)).is_err());
/// # Ok::<(), apml_core::DomainError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SimulatedPlatform {
    sockets: Vec<SocketState>,
    quiescence: Duration,
    calls: Vec<&'static str>,
    failures: HashMap<&'static str, DomainError>,
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPlatform {
    /// Two sockets, no settle delay.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sockets(DEFAULT_SOCKETS)
    }

    /// `count` sockets, no settle delay.
    #[must_use]
    pub fn with_sockets(count: u8) -> Self {
        Self {
            sockets: vec![SocketState::default(); usize::from(count)],
            quiescence: Duration::ZERO,
            calls: Vec::new(),
            failures: HashMap::new(),
        }
    }

    /// Sleep for `delay` on every [`TelemetryClient::quiesce`].
    #[must_use]
    pub fn with_quiescence(mut self, delay: Duration) -> Self {
        self.quiescence = delay;
        self
    }

    /// Override the thread topology of every socket.
    #[must_use]
    pub fn with_threads(mut self, per_core: u32, per_socket: u32) -> Self {
        for socket in &mut self.sockets {
            socket.threads_per_core = per_core;
            socket.threads_per_socket = per_socket;
        }
        self
    }

    /// Make every later call of `operation` fail with `error`.
    ///
    /// `operation` is the [`TelemetryClient`] method name, e.g.
    /// `"read_socket_power"`.
    pub fn fail_on(&mut self, operation: &'static str, error: DomainError) {
        self.failures.insert(operation, error);
    }

    /// Seed a raw register without recording a call.
    pub fn set_register(
        &mut self,
        socket: SocketIndex,
        interface: RegisterInterface,
        register: u8,
        value: u8,
    ) {
        if let Some(state) = self.sockets.get_mut(usize::from(socket.get())) {
            state.registers.insert((interface, register), value);
        }
    }

    /// Operations performed so far, including `"quiesce"`, in order.
    #[must_use]
    pub fn calls(&self) -> &[&'static str] {
        &self.calls
    }

    fn enter(
        &mut self,
        operation: &'static str,
        socket: SocketIndex,
    ) -> TelemetryResult<&mut SocketState> {
        trace!(operation, socket = %socket, "simulated call");
        self.calls.push(operation);
        if let Some(error) = self.failures.get(operation) {
            return Err(error.clone());
        }
        self.sockets
            .get_mut(usize::from(socket.get()))
            .ok_or_else(|| DomainError::from_status(OobStatus::NotFound))
    }
}

impl TelemetryClient for SimulatedPlatform {
    fn quiesce(&mut self) {
        self.calls.push("quiesce");
        if !self.quiescence.is_zero() {
            thread::sleep(self.quiescence);
        }
    }

    fn read_socket_power(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        let state = self.enter("read_socket_power", socket)?;
        Ok(state.power - EFFICIENCY_STEP_MW * u32::from(state.efficiency_mode))
    }

    fn read_socket_power_limit(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        Ok(self.enter("read_socket_power_limit", socket)?.power_limit)
    }

    fn read_max_socket_power_limit(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        Ok(self.enter("read_max_socket_power_limit", socket)?.max_power_limit)
    }

    fn write_socket_power_limit(&mut self, socket: SocketIndex, limit_mw: u32) -> TelemetryResult<()> {
        let state = self.enter("write_socket_power_limit", socket)?;
        state.power_limit = limit_mw.min(state.max_power_limit);
        Ok(())
    }

    fn read_tdp(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        Ok(self.enter("read_tdp", socket)?.tdp)
    }

    fn read_min_tdp(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        Ok(self.enter("read_min_tdp", socket)?.min_tdp)
    }

    fn read_max_tdp(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        Ok(self.enter("read_max_tdp", socket)?.max_tdp)
    }

    fn read_ddr_bandwidth(&mut self, socket: SocketIndex) -> TelemetryResult<DdrBandwidth> {
        Ok(self.enter("read_ddr_bandwidth", socket)?.ddr)
    }

    fn read_apml_boost_limit(&mut self, socket: SocketIndex, thread: u32) -> TelemetryResult<u32> {
        let state = self.enter("read_apml_boost_limit", socket)?;
        state.check_thread(thread)?;
        Ok(state.apml_boost(thread))
    }

    fn read_bios_boost_fmax(&mut self, socket: SocketIndex, thread: u32) -> TelemetryResult<u32> {
        let state = self.enter("read_bios_boost_fmax", socket)?;
        state.check_thread(thread)?;
        Ok(state.bios_boost)
    }

    fn write_apml_boost_limit(
        &mut self,
        socket: SocketIndex,
        thread: u32,
        limit_mhz: u32,
    ) -> TelemetryResult<()> {
        let state = self.enter("write_apml_boost_limit", socket)?;
        state.check_thread(thread)?;
        let limit = limit_mhz.min(state.bios_boost);
        state.apml_boost.insert(thread, limit);
        Ok(())
    }

    fn write_apml_boost_limit_all_cores(
        &mut self,
        socket: SocketIndex,
        limit_mhz: u32,
    ) -> TelemetryResult<()> {
        let state = self.enter("write_apml_boost_limit_all_cores", socket)?;
        let limit = limit_mhz.min(state.bios_boost);
        for thread in 0..state.threads_per_socket {
            state.apml_boost.insert(thread, limit);
        }
        Ok(())
    }

    fn write_dram_throttle(&mut self, socket: SocketIndex, percent: u32) -> TelemetryResult<()> {
        self.enter("write_dram_throttle", socket)?.dram_throttle = percent.min(MAX_DRAM_THROTTLE);
        Ok(())
    }

    fn read_dram_throttle(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        Ok(self.enter("read_dram_throttle", socket)?.dram_throttle)
    }

    fn write_dimm_power(&mut self, socket: SocketIndex, power: DimmPower) -> TelemetryResult<()> {
        self.enter("write_dimm_power", socket)?
            .dimm_power
            .insert(power.dimm_addr, power);
        Ok(())
    }

    fn write_dimm_thermal_sensor(
        &mut self,
        socket: SocketIndex,
        thermal: DimmThermal,
    ) -> TelemetryResult<()> {
        self.enter("write_dimm_thermal_sensor", socket)?
            .dimm_thermal
            .insert(thermal.dimm_addr, thermal);
        Ok(())
    }

    fn read_dimm_temp_range_and_refresh_rate(
        &mut self,
        socket: SocketIndex,
        _dimm_addr: u8,
    ) -> TelemetryResult<TempRefreshRate> {
        self.enter("read_dimm_temp_range_and_refresh_rate", socket)?;
        Ok(TempRefreshRate {
            range: 1,
            refresh_rate: 0,
        })
    }

    fn read_dimm_power(&mut self, socket: SocketIndex, dimm_addr: u8) -> TelemetryResult<DimmPower> {
        let state = self.enter("read_dimm_power", socket)?;
        Ok(state.dimm_power.get(&dimm_addr).copied().unwrap_or(DimmPower {
            dimm_addr,
            ..DimmPower::default()
        }))
    }

    fn read_dimm_thermal_sensor(
        &mut self,
        socket: SocketIndex,
        dimm_addr: u8,
    ) -> TelemetryResult<DimmThermal> {
        let state = self.enter("read_dimm_thermal_sensor", socket)?;
        Ok(state
            .dimm_thermal
            .get(&dimm_addr)
            .copied()
            .unwrap_or(DimmThermal {
                dimm_addr,
                ..DimmThermal::default()
            }))
    }

    fn read_pcie_config_data(
        &mut self,
        socket: SocketIndex,
        address: PciAddress,
    ) -> TelemetryResult<u32> {
        self.enter("read_pcie_config_data", socket)?;
        Ok(if address.offset == 0 { 0x1480_1022 } else { 0 })
    }

    fn read_valid_mca_banks(&mut self, socket: SocketIndex) -> TelemetryResult<McaValidity> {
        Ok(self.enter("read_valid_mca_banks", socket)?.mca)
    }

    fn read_mca_msr(&mut self, socket: SocketIndex, bank: McaBank) -> TelemetryResult<u32> {
        let state = self.enter("read_mca_msr", socket)?;
        if bank.index >= state.mca.bank_count || bank.offset >= state.mca.bytes_per_bank {
            return Err(invalid());
        }
        Ok(0)
    }

    fn read_fch_reset_reason(&mut self, socket: SocketIndex, _fch_id: u32) -> TelemetryResult<u32> {
        self.enter("read_fch_reset_reason", socket)?;
        Ok(0x0008_0800)
    }

    fn read_ras_last_transaction_address(&mut self, socket: SocketIndex) -> TelemetryResult<u64> {
        self.enter("read_ras_last_transaction_address", socket)?;
        Ok(0)
    }

    fn read_socket_freq_limit(&mut self, socket: SocketIndex) -> TelemetryResult<FreqLimit> {
        Ok(self.enter("read_socket_freq_limit", socket)?.freq_limit.clone())
    }

    fn read_core_clock_limit(&mut self, socket: SocketIndex, thread: u32) -> TelemetryResult<u16> {
        let state = self.enter("read_core_clock_limit", socket)?;
        state.check_thread(thread)?;
        Ok(state.freq_limit.frequency_mhz)
    }

    fn read_svi_telemetry_all_rails(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        let state = self.enter("read_svi_telemetry_all_rails", socket)?;
        Ok(state.power - state.power / 20)
    }

    fn read_socket_freq_range(&mut self, socket: SocketIndex) -> TelemetryResult<FreqRange> {
        Ok(self.enter("read_socket_freq_range", socket)?.freq_range)
    }

    fn read_io_bandwidth(
        &mut self,
        socket: SocketIndex,
        selector: BandwidthSelector,
    ) -> TelemetryResult<u32> {
        let state = self.enter("read_io_bandwidth", socket)?;
        if selector.type_mask != 1 {
            return Err(invalid());
        }
        let base = 16_000 + 1000 * selector.link_mask.trailing_zeros();
        if selector.link_mask < GMI_LINKS {
            Ok(base)
        } else {
            Ok(scale_by_width(base, state.gmi3_width))
        }
    }

    fn read_xgmi_bandwidth(
        &mut self,
        socket: SocketIndex,
        selector: BandwidthSelector,
    ) -> TelemetryResult<u32> {
        let state = self.enter("read_xgmi_bandwidth", socket)?;
        if !selector.has_type() {
            return Err(invalid());
        }
        let base = 32_000 / (1 + selector.type_mask.trailing_zeros());
        Ok(scale_by_width(base, state.xgmi_width))
    }

    fn write_gmi3_link_width_range(
        &mut self,
        socket: SocketIndex,
        range: LinkWidthRange,
    ) -> TelemetryResult<()> {
        let state = self.enter("write_gmi3_link_width_range", socket)?;
        if range.max > MAX_LINK_WIDTH || range.min > range.max {
            return Err(invalid());
        }
        state.gmi3_width = range;
        Ok(())
    }

    fn write_xgmi_link_width_range(
        &mut self,
        socket: SocketIndex,
        range: LinkWidthRange,
    ) -> TelemetryResult<()> {
        let state = self.enter("write_xgmi_link_width_range", socket)?;
        if range.max > MAX_LINK_WIDTH || range.min > range.max {
            return Err(invalid());
        }
        state.xgmi_width = range;
        Ok(())
    }

    fn write_apb_disable(&mut self, socket: SocketIndex, pstate: u8) -> TelemetryResult<bool> {
        let state = self.enter("write_apb_disable", socket)?;
        if pstate > MAX_DF_PSTATE {
            return Err(invalid());
        }
        state.apb_pstate = Some(if state.prochot { MAX_DF_PSTATE } else { pstate });
        Ok(state.prochot)
    }

    fn write_apb_enable(&mut self, socket: SocketIndex) -> TelemetryResult<bool> {
        let state = self.enter("write_apb_enable", socket)?;
        state.apb_pstate = None;
        Ok(state.prochot)
    }

    fn read_df_pstate_frequency(&mut self, socket: SocketIndex) -> TelemetryResult<DfPstateFrequency> {
        let state = self.enter("read_df_pstate_frequency", socket)?;
        let mut frequency = state.df_frequency;
        let pstate = state.apb_pstate.unwrap_or(state.df_pstate_range.max_pstate);
        frequency.fclk -= FCLK_STEP_MHZ * u16::from(pstate);
        Ok(frequency)
    }

    fn write_lclk_dpm_level_range(
        &mut self,
        socket: SocketIndex,
        range: LclkDpmLevelRange,
    ) -> TelemetryResult<()> {
        let state = self.enter("write_lclk_dpm_level_range", socket)?;
        if range.nbio_id > MAX_NBIO || range.dpm.max > MAX_DPM_LEVEL || range.dpm.min > range.dpm.max
        {
            return Err(invalid());
        }
        state.lclk_dpm.insert(range.nbio_id, range.dpm);
        Ok(())
    }

    fn read_lclk_dpm_level_range(&mut self, socket: SocketIndex, nbio_id: u8) -> TelemetryResult<DpmLevel> {
        let state = self.enter("read_lclk_dpm_level_range", socket)?;
        if nbio_id > MAX_NBIO {
            return Err(invalid());
        }
        Ok(state
            .lclk_dpm
            .get(&nbio_id)
            .copied()
            .unwrap_or(DpmLevel {
                max: MAX_DPM_LEVEL,
                min: 0,
            }))
    }

    fn read_cpu_base_frequency(&mut self, socket: SocketIndex) -> TelemetryResult<u16> {
        Ok(self.enter("read_cpu_base_frequency", socket)?.base_frequency)
    }

    fn control_pcie_gen5_rate(&mut self, socket: SocketIndex, mode: u8) -> TelemetryResult<u8> {
        let state = self.enter("control_pcie_gen5_rate", socket)?;
        if mode > MAX_MODE {
            return Err(invalid());
        }
        Ok(std::mem::replace(&mut state.pcie_rate_mode, mode))
    }

    fn write_power_efficiency_mode(&mut self, socket: SocketIndex, mode: u8) -> TelemetryResult<()> {
        let state = self.enter("write_power_efficiency_mode", socket)?;
        if mode > MAX_MODE {
            return Err(invalid());
        }
        state.efficiency_mode = mode;
        Ok(())
    }

    fn write_df_pstate_range(&mut self, socket: SocketIndex, range: DfPstateRange) -> TelemetryResult<()> {
        let state = self.enter("write_df_pstate_range", socket)?;
        if range.min_pstate > MAX_DF_PSTATE || range.max_pstate > range.min_pstate {
            return Err(invalid());
        }
        state.df_pstate_range = range;
        Ok(())
    }

    fn read_core_energy(&mut self, socket: SocketIndex, thread: u32) -> TelemetryResult<f64> {
        let state = self.enter("read_core_energy", socket)?;
        state.check_thread(thread)?;
        Ok(state.package_energy * 1000.0 / f64::from(state.threads_per_socket))
    }

    fn read_package_energy(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        Ok(self.enter("read_package_energy", socket)?.package_energy)
    }

    fn read_iod_bist(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        self.enter("read_iod_bist", socket)?;
        Ok(0)
    }

    fn read_ccd_bist(&mut self, socket: SocketIndex, _instance: u32) -> TelemetryResult<u32> {
        self.enter("read_ccd_bist", socket)?;
        Ok(0)
    }

    fn read_ccx_bist(&mut self, socket: SocketIndex, _instance: u32) -> TelemetryResult<u32> {
        Ok(self.enter("read_ccx_bist", socket)?.ccx_bist)
    }

    fn read_nbio_error_log(&mut self, socket: SocketIndex, _log: NbioErrorLog) -> TelemetryResult<u32> {
        self.enter("read_nbio_error_log", socket)?;
        Ok(0)
    }

    fn read_prochot_status(&mut self, socket: SocketIndex) -> TelemetryResult<bool> {
        Ok(self.enter("read_prochot_status", socket)?.prochot)
    }

    fn read_prochot_residency(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        Ok(self.enter("read_prochot_residency", socket)?.prochot_residency)
    }

    fn read_tsi_cpu_temp(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        let state = self.enter("read_tsi_cpu_temp", socket)?;
        Ok(state.cpu_temp + state.temp_offset)
    }

    fn read_tsi_temp_status(&mut self, socket: SocketIndex) -> TelemetryResult<TempStatus> {
        let state = self.enter("read_tsi_temp_status", socket)?;
        let temp = state.cpu_temp + state.temp_offset;
        Ok(TempStatus {
            low_alert: temp < state.low_threshold,
            high_alert: temp >= state.high_threshold,
        })
    }

    fn read_tsi_config(&mut self, socket: SocketIndex) -> TelemetryResult<TsiConfig> {
        Ok(self.enter("read_tsi_config", socket)?.tsi_config)
    }

    fn write_tsi_config_bit(
        &mut self,
        socket: SocketIndex,
        bit: TsiConfigBit,
        value: bool,
    ) -> TelemetryResult<()> {
        let config = &mut self.enter("write_tsi_config_bit", socket)?.tsi_config;
        match bit {
            TsiConfigBit::AlertMask => config.alert_mask = value,
            TsiConfigBit::RunStop => config.run_stop = value,
            TsiConfigBit::ReadOrder => config.read_order = value,
            TsiConfigBit::Ara => config.ara_disabled = value,
        }
        Ok(())
    }

    fn read_tsi_update_rate(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        Ok(self.enter("read_tsi_update_rate", socket)?.update_rate)
    }

    /// Snaps the request to the nearest supported power of two.
    fn write_tsi_update_rate(&mut self, socket: SocketIndex, rate_hz: f64) -> TelemetryResult<()> {
        let state = self.enter("write_tsi_update_rate", socket)?;
        if rate_hz.is_nan() || rate_hz <= 0.0 {
            return Err(invalid());
        }
        let exponent = (rate_hz.log2().round() as i32)
            .clamp(*UPDATE_RATE_EXPONENTS.start(), *UPDATE_RATE_EXPONENTS.end());
        state.update_rate = 2_f64.powi(exponent);
        Ok(())
    }

    fn read_tsi_high_threshold(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        Ok(self.enter("read_tsi_high_threshold", socket)?.high_threshold)
    }

    fn write_tsi_high_threshold(&mut self, socket: SocketIndex, celsius: f64) -> TelemetryResult<()> {
        let state = self.enter("write_tsi_high_threshold", socket)?;
        if !(0.0..=255.875).contains(&celsius) {
            return Err(invalid());
        }
        state.high_threshold = snap(celsius, TSI_THRESHOLD_STEP);
        Ok(())
    }

    fn read_tsi_low_threshold(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        Ok(self.enter("read_tsi_low_threshold", socket)?.low_threshold)
    }

    fn write_tsi_low_threshold(&mut self, socket: SocketIndex, celsius: f64) -> TelemetryResult<()> {
        let state = self.enter("write_tsi_low_threshold", socket)?;
        if !(0.0..=255.875).contains(&celsius) {
            return Err(invalid());
        }
        state.low_threshold = snap(celsius, TSI_THRESHOLD_STEP);
        Ok(())
    }

    fn read_tsi_temp_offset(&mut self, socket: SocketIndex) -> TelemetryResult<f64> {
        Ok(self.enter("read_tsi_temp_offset", socket)?.temp_offset)
    }

    fn write_tsi_temp_offset(&mut self, socket: SocketIndex, celsius: f64) -> TelemetryResult<()> {
        let state = self.enter("write_tsi_temp_offset", socket)?;
        if celsius < -state.cpu_temp || celsius > 127.0 {
            return Err(invalid());
        }
        state.temp_offset = snap(celsius, TSI_OFFSET_STEP);
        Ok(())
    }

    fn read_tsi_timeout_config(&mut self, socket: SocketIndex) -> TelemetryResult<bool> {
        Ok(self.enter("read_tsi_timeout_config", socket)?.timeout_enabled)
    }

    fn write_tsi_timeout_config(&mut self, socket: SocketIndex, enabled: bool) -> TelemetryResult<()> {
        self.enter("write_tsi_timeout_config", socket)?.timeout_enabled = enabled;
        Ok(())
    }

    fn read_tsi_alert_threshold(&mut self, socket: SocketIndex) -> TelemetryResult<u8> {
        Ok(self.enter("read_tsi_alert_threshold", socket)?.alert_threshold)
    }

    fn write_tsi_alert_threshold(&mut self, socket: SocketIndex, samples: u8) -> TelemetryResult<()> {
        let state = self.enter("write_tsi_alert_threshold", socket)?;
        if !(1..=8).contains(&samples) {
            return Err(invalid());
        }
        state.alert_threshold = samples;
        Ok(())
    }

    fn read_tsi_alert_config(&mut self, socket: SocketIndex) -> TelemetryResult<bool> {
        Ok(self.enter("read_tsi_alert_config", socket)?.alert_config)
    }

    fn write_tsi_alert_config(&mut self, socket: SocketIndex, enabled: bool) -> TelemetryResult<()> {
        self.enter("write_tsi_alert_config", socket)?.alert_config = enabled;
        Ok(())
    }

    fn read_tsi_manufacturer_id(&mut self, socket: SocketIndex) -> TelemetryResult<u8> {
        self.enter("read_tsi_manufacturer_id", socket)?;
        Ok(0x00)
    }

    fn read_tsi_revision(&mut self, socket: SocketIndex) -> TelemetryResult<u8> {
        self.enter("read_tsi_revision", socket)?;
        Ok(TSI_REVISION)
    }

    fn read_register(
        &mut self,
        socket: SocketIndex,
        interface: RegisterInterface,
        register: u8,
    ) -> TelemetryResult<u8> {
        let state = self.enter("read_register", socket)?;
        Ok(state
            .registers
            .get(&(interface, register))
            .copied()
            .unwrap_or_default())
    }

    fn write_register(
        &mut self,
        socket: SocketIndex,
        interface: RegisterInterface,
        register: u8,
        value: u8,
    ) -> TelemetryResult<()> {
        self.enter("write_register", socket)?
            .registers
            .insert((interface, register), value);
        Ok(())
    }

    fn read_msr(&mut self, socket: SocketIndex, thread: u32, address: u32) -> TelemetryResult<u64> {
        let state = self.enter("read_msr", socket)?;
        state.check_thread(thread)?;
        Ok(match address {
            0x1B => 0xFEE0_0900,
            0xC001_0015 => 0x0900_0000,
            _ => 0,
        })
    }

    fn read_cpuid(
        &mut self,
        socket: SocketIndex,
        thread: u32,
        function: u32,
        extended: u32,
    ) -> TelemetryResult<CpuidRegisters> {
        let state = self.enter("read_cpuid", socket)?;
        state.check_thread(thread)?;
        Ok(match (function, extended) {
            (0x8000_001D, 3) => CpuidRegisters {
                eax: L3_SHARING_FIELD << 14,
                ebx: 0x03C0_003F,
                ecx: 0x0000_7FFF,
                edx: 0x0000_0001,
            },
            (0x0000_0000, _) => CpuidRegisters {
                eax: 0x10,
                ebx: 0x6874_7541,
                ecx: 0x444D_4163,
                edx: 0x6974_6E65,
            },
            _ => CpuidRegisters::default(),
        })
    }

    fn read_threads_per_core(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        Ok(self.enter("read_threads_per_core", socket)?.threads_per_core)
    }

    fn read_threads_per_socket(&mut self, socket: SocketIndex) -> TelemetryResult<u32> {
        Ok(self.enter("read_threads_per_socket", socket)?.threads_per_socket)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const S0: SocketIndex = SocketIndex::new(0);

    #[test]
    fn sockets_beyond_the_count_are_not_found() {
        let mut platform = SimulatedPlatform::with_sockets(1);
        assert_eq!(
            platform.read_tdp(SocketIndex::new(1)).map_err(|err| err.status()),
            Err(Some(OobStatus::NotFound))
        );
        assert!(platform.read_tdp(S0).is_ok());
    }

    #[test]
    fn injected_failures_apply_to_the_named_operation_only() {
        let mut platform = SimulatedPlatform::new();
        platform.fail_on("read_tdp", DomainError::new(42, "vendor specific"));
        let err = platform.read_tdp(S0).expect_err("injected");
        assert_eq!((err.code(), err.message()), (42, "vendor specific"));
        assert_eq!(err.status(), None);
        assert!(platform.read_min_tdp(S0).is_ok());
    }

    #[rstest]
    #[case(0.0625, 0.0625)]
    #[case(3.0, 4.0)]
    #[case(100.0, 64.0)]
    #[case(0.01, 0.0625)]
    fn update_rate_snaps_to_supported_powers_of_two(#[case] requested: f64, #[case] stored: f64) {
        let mut platform = SimulatedPlatform::new();
        platform.write_tsi_update_rate(S0, requested).expect("write");
        assert_eq!(platform.read_tsi_update_rate(S0), Ok(stored));
    }

    #[rstest]
    #[case(LinkWidthRange { min: 0, max: 3 })]
    #[case(LinkWidthRange { min: 2, max: 1 })]
    fn link_width_ranges_are_validated(#[case] range: LinkWidthRange) {
        let mut platform = SimulatedPlatform::new();
        assert_eq!(
            platform.write_xgmi_link_width_range(S0, range),
            Err(DomainError::from_status(OobStatus::InvalidInput))
        );
    }

    #[test]
    fn narrower_links_report_less_bandwidth() {
        let mut platform = SimulatedPlatform::new();
        let selector = BandwidthSelector {
            link_mask: 0x10,
            type_mask: 0x01,
        };
        assert_eq!(platform.read_xgmi_bandwidth(S0, selector), Ok(32_000));
        platform
            .write_xgmi_link_width_range(S0, LinkWidthRange { min: 0, max: 0 })
            .expect("width");
        assert_eq!(platform.read_xgmi_bandwidth(S0, selector), Ok(10_666));
    }

    #[test]
    fn offset_shifts_the_reported_temperature() {
        let mut platform = SimulatedPlatform::new();
        platform.write_tsi_temp_offset(S0, 30.0).expect("offset");
        platform.write_tsi_high_threshold(S0, 70.0).expect("threshold");
        assert_eq!(platform.read_tsi_cpu_temp(S0), Ok(75.125));
        assert_eq!(
            platform.read_tsi_temp_status(S0),
            Ok(TempStatus {
                low_alert: false,
                high_alert: true
            })
        );
    }

    #[test]
    fn quiesce_is_recorded() {
        let mut platform = SimulatedPlatform::new().with_quiescence(Duration::from_millis(1));
        platform.write_dram_throttle(S0, 10).expect("write");
        platform.quiesce();
        assert_eq!(platform.calls(), &["write_dram_throttle", "quiesce"]);
    }
}
