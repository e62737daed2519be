//! Command handlers.
//!
//! Every handler has the [`crate::command::Handler`] signature. Single-value
//! commands stop at the first collaborator failure; summaries record a
//! [`crate::Entry::Failure`] for the line and carry on.

pub mod cpuid;
pub mod mailbox;
pub mod reg_access;
pub mod sbrmi;
pub mod sbtsi;

use tracing::warn;

use crate::{
    codec::milli_to_unit,
    error::HandlerError,
    report::Report,
    telemetry::{SocketIndex, TelemetryClient, TelemetryResult},
};

/// Attach the action a handler was performing to a collaborator failure.
pub(crate) trait During<T> {
    fn during(self, action: &'static str) -> Result<T, HandlerError>;
}

impl<T> During<T> for TelemetryResult<T> {
    fn during(self, action: &'static str) -> Result<T, HandlerError> {
        self.map_err(|error| HandlerError::domain(action, error))
    }
}

/// Combined mailbox and SB-TSI summary shown when only a socket is given.
///
/// # Examples
/// ```
/// use apml_core::{handlers, SimulatedPlatform, SocketIndex};
///
/// let mut platform = SimulatedPlatform::new();
/// let report = handlers::system_summary(&mut platform, SocketIndex::new(0));
/// assert_eq!(report.value_of("Power (Watts)"), Some("125.000"));
/// assert!(report.value_of("_CPUTEMP").is_some());
/// ```
#[must_use]
pub fn system_summary(client: &mut dyn TelemetryClient, socket: SocketIndex) -> Report {
    let mut report = Report::titled("APML System Management Interface");
    report.extend(mailbox::summary(client, socket));
    report.extend(sbtsi::summary(client, socket));
    report
}

/// Reads that tolerate individual failures.
pub(crate) struct Summary<'a> {
    client: &'a mut dyn TelemetryClient,
    socket: SocketIndex,
    report: Report,
    started: bool,
}

impl<'a> Summary<'a> {
    pub(crate) fn new(
        client: &'a mut dyn TelemetryClient,
        socket: SocketIndex,
        title: &str,
    ) -> Self {
        Self {
            client,
            socket,
            report: Report::titled(title),
            started: false,
        }
    }

    fn perform<T>(
        &mut self,
        op: impl FnOnce(&mut dyn TelemetryClient, SocketIndex) -> TelemetryResult<T>,
    ) -> TelemetryResult<T> {
        if self.started {
            self.client.quiesce();
        }
        self.started = true;
        op(&mut *self.client, self.socket)
    }

    /// Like [`Summary::read`], but a failure aborts the whole summary.
    pub(crate) fn require<T>(
        &mut self,
        action: &'static str,
        op: impl FnOnce(&mut dyn TelemetryClient, SocketIndex) -> TelemetryResult<T>,
    ) -> Result<T, HandlerError> {
        self.perform(op).during(action)
    }

    /// Quiesce after the previous read, then perform `op`.
    ///
    /// A failure is recorded against `label` and yields `None`.
    pub(crate) fn read<T>(
        &mut self,
        label: &str,
        op: impl FnOnce(&mut dyn TelemetryClient, SocketIndex) -> TelemetryResult<T>,
    ) -> Option<T> {
        match self.perform(op) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(socket = %self.socket, label, %error, "summary read failed");
                self.report.failure(label, error);
                None
            }
        }
    }

    /// Read one value and record it as a field.
    pub(crate) fn field<T>(
        &mut self,
        label: &str,
        op: impl FnOnce(&mut dyn TelemetryClient, SocketIndex) -> TelemetryResult<T>,
        render: impl FnOnce(T) -> String,
    ) {
        if let Some(value) = self.read(label, op) {
            self.report.field(label, render(value));
        }
    }

    pub(crate) fn report(&mut self) -> &mut Report {
        &mut self.report
    }

    pub(crate) fn finish(self) -> Report {
        self.report
    }
}

pub(crate) fn watts(milliwatts: u32) -> String {
    format!("{:.3}", milli_to_unit(milliwatts))
}

pub(crate) const fn bist(result: u32) -> &'static str {
    if result == 0 { "Bist pass" } else { "Bist fail" }
}

pub(crate) const fn enabled(flag: bool) -> &'static str {
    if flag { "Enabled" } else { "Disabled" }
}

pub(crate) fn hex(value: impl Into<u64>) -> String {
    format!("{:#x}", value.into())
}

pub(crate) fn done(message: impl Into<String>) -> Report {
    let mut report = Report::new();
    report.note(message);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{DomainError, OobStatus},
        simulator::SimulatedPlatform,
    };

    #[test]
    fn summary_quiesces_between_reads_and_records_failures() {
        let mut platform = SimulatedPlatform::new();
        platform.fail_on("read_tdp", DomainError::from_status(OobStatus::CmdTimeout));
        let mut summary = Summary::new(&mut platform, SocketIndex::new(0), "test");
        summary.field("Power", |c, s| c.read_socket_power(s), watts);
        summary.field("TDP", |c, s| c.read_tdp(s), watts);
        summary.field("Min TDP", |c, s| c.read_min_tdp(s), watts);
        let report = summary.finish();

        assert_eq!(report.value_of("Power"), Some("125.000"));
        assert_eq!(report.value_of("TDP"), None);
        assert_eq!(report.value_of("Min TDP"), Some("225.000"));
        let failures: Vec<_> = report.failures().map(|(label, _)| label).collect();
        assert_eq!(failures, vec!["TDP"]);
        assert_eq!(
            platform.calls(),
            &[
                "read_socket_power",
                "quiesce",
                "read_tdp",
                "quiesce",
                "read_min_tdp"
            ]
        );
    }

    #[test]
    fn during_names_the_action() {
        let result: TelemetryResult<u32> = Err(DomainError::from_status(OobStatus::NotFound));
        assert_eq!(
            result.during("get power").map_err(|err| err.to_string()),
            Err("failed to get power, Err[1]: Device not found".to_owned())
        );
    }

    #[test]
    fn formatting_helpers() {
        assert_eq!(watts(125_500), "125.500");
        assert_eq!(bist(0), "Bist pass");
        assert_eq!(bist(4), "Bist fail");
        assert_eq!(hex(0x2a_u8), "0x2a");
        assert_eq!(enabled(false), "Disabled");
    }
}
