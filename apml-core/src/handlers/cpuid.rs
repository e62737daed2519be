//! Processor topology queries derived from thread counts and CPUID.

use crate::{
    error::{HandlerError, OobStatus},
    report::Report,
    telemetry::{SocketIndex, TelemetryClient, TelemetryResult},
    validate::TypedArgs,
};

use super::During;

/// CPUID leaf describing the cache hierarchy.
const CACHE_TOPOLOGY_LEAF: u32 = 0x8000_001D;
/// Sub-leaf of [`CACHE_TOPOLOGY_LEAF`] describing the L3.
const L3_SUBLEAF: u32 = 3;

/// Core complex layout of a socket.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CcxInfo {
    /// Cores sharing one L3.
    pub cores_per_ccx: u32,
    /// Core complexes in the socket.
    pub instances: u32,
}

/// Derive the CCX layout.
///
/// CPUID `0x8000001D/3` reports, in EAX bits 25:14, the number of threads
/// sharing the L3 minus one. A zero thread-per-core count is reported as
/// [`OobStatus::InvalidInput`] rather than dividing by it.
pub(crate) fn ccx_info(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
) -> TelemetryResult<CcxInfo> {
    let threads_per_core = client.read_threads_per_core(socket)?;
    let threads_per_l3 = max_threads_per_l3(client, socket)?;
    let threads_per_socket = client.read_threads_per_socket(socket)?;
    if threads_per_core == 0 {
        return Err(OobStatus::InvalidInput.into());
    }
    Ok(CcxInfo {
        cores_per_ccx: threads_per_l3 / threads_per_core + 1,
        instances: threads_per_socket / (threads_per_l3 + 1),
    })
}

fn max_threads_per_l3(client: &mut dyn TelemetryClient, socket: SocketIndex) -> TelemetryResult<u32> {
    let registers = client.read_cpuid(socket, 0, CACHE_TOPOLOGY_LEAF, L3_SUBLEAF)?;
    Ok((registers.eax >> 14) & 0xFFF)
}

pub fn show_threads_per_core_and_socket(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> Result<Report, HandlerError> {
    let per_core = client
        .read_threads_per_core(socket)
        .during("get threads per core")?;
    let per_socket = client
        .read_threads_per_socket(socket)
        .during("get threads per socket")?;
    let mut report = Report::new();
    report
        .field("THREADS PER CORE", per_core.to_string())
        .field("THREADS PER SOCKET", per_socket.to_string());
    Ok(report)
}

pub fn show_ccx_info(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> Result<Report, HandlerError> {
    let info = ccx_info(client, socket).during("get the ccx information")?;
    let mut report = Report::new();
    report
        .field("No of cores per CCX", info.cores_per_ccx.to_string())
        .field("No of CCX instances", info.instances.to_string());
    Ok(report)
}

pub fn show_smt_status(
    client: &mut dyn TelemetryClient,
    socket: SocketIndex,
    _args: &TypedArgs,
) -> Result<Report, HandlerError> {
    let per_core = client
        .read_threads_per_core(socket)
        .during("get SMT status")?;
    let mut report = Report::new();
    report.field(
        "SMT STATUS",
        if per_core > 1 { "ENABLED" } else { "DISABLED" },
    );
    Ok(report)
}
