//! Routes an invocation to help, a summary or a command handler.

use tracing::{Span, debug, field, instrument};

use crate::{
    error::{DomainError, HandlerError, UsageError},
    handlers,
    help::{self, HelpModule},
    report::Report,
    table,
    telemetry::{SocketIndex, TelemetryClient},
    validate::validate,
};

/// Result of a single invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum DispatchOutcome {
    /// The invocation produced a report.
    Dispatched(Report),
    /// The invocation was malformed; nothing reached the collaborator.
    Usage(UsageError),
    /// The collaborator rejected a command.
    Domain {
        /// What was being attempted, phrased for "failed to ...".
        action: &'static str,
        /// Error as reported by the collaborator.
        error: DomainError,
    },
}

impl DispatchOutcome {
    /// Process exit status: 0 on success, 1 for domain and 2 for usage errors.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Dispatched(_) => 0,
            Self::Domain { .. } => 1,
            Self::Usage(_) => 2,
        }
    }

    /// Short name of the outcome, as recorded on the dispatch span.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Dispatched(_) => "dispatched",
            Self::Usage(_) => "usage",
            Self::Domain { .. } => "domain",
        }
    }
}

impl From<HandlerError> for DispatchOutcome {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Usage(usage) => Self::Usage(usage),
            HandlerError::Domain { action, error } => Self::Domain { action, error },
        }
    }
}

impl From<UsageError> for DispatchOutcome {
    fn from(err: UsageError) -> Self {
        Self::Usage(err)
    }
}

/// Drives one [`TelemetryClient`] from raw command-line tokens.
///
/// # Examples
/// ```
/// use apml_core::{DispatchOutcome, Dispatcher, SimulatedPlatform};
///
/// let mut platform = SimulatedPlatform::new();
/// let mut dispatcher = Dispatcher::new(&mut platform);
///
/// let DispatchOutcome::Dispatched(report) = dispatcher.run(&["0", "--showtdp"]) else {
///     panic!("showtdp succeeds on the simulator");
/// };
/// assert_eq!(report.value_of("TDP (Watts)"), Some("280.000"));
///
/// let outcome = dispatcher.run(&["zero", "--showtdp"]);
/// assert_eq!(outcome.exit_code(), 2);
/// ```
pub struct Dispatcher<'a> {
    client: &'a mut dyn TelemetryClient,
}

impl<'a> Dispatcher<'a> {
    /// Dispatch against `client`.
    pub fn new(client: &'a mut dyn TelemetryClient) -> Self {
        Self { client }
    }

    /// Run one invocation.
    ///
    /// `tokens` excludes the program name. Help and version flags win over
    /// everything else; otherwise the first token is the socket and the
    /// second, when present, the command.
    #[instrument(
        name = "dispatch.run",
        skip_all,
        fields(
            tokens = tokens.len(),
            socket = field::Empty,
            command = field::Empty,
            outcome = field::Empty,
        ),
    )]
    pub fn run<S: AsRef<str>>(&mut self, tokens: &[S]) -> DispatchOutcome {
        let outcome = self.route(tokens);
        Span::current().record("outcome", outcome.kind());
        debug!(exit_code = outcome.exit_code(), "dispatch finished");
        outcome
    }

    fn route<S: AsRef<str>>(&mut self, tokens: &[S]) -> DispatchOutcome {
        let tokens: Vec<&str> = tokens.iter().map(AsRef::<str>::as_ref).collect();

        if let Some(position) = tokens.iter().position(|t| matches!(*t, "--help" | "-h")) {
            return match tokens.get(position + 1) {
                None => DispatchOutcome::Dispatched(help::general_usage()),
                Some(module) => match HelpModule::from_token(module) {
                    Ok(module) => DispatchOutcome::Dispatched(help::module_usage(module)),
                    Err(err) => err.into(),
                },
            };
        }
        if tokens.iter().any(|t| matches!(*t, "--version" | "-v")) {
            return DispatchOutcome::Dispatched(help::version());
        }

        let Some((&socket_token, rest)) = tokens.split_first() else {
            return DispatchOutcome::Dispatched(help::general_usage());
        };
        let socket = match socket_token.parse::<SocketIndex>() {
            Ok(socket) => socket,
            Err(_) => {
                return UsageError::InvalidSocket {
                    token: socket_token.to_owned(),
                }
                .into();
            }
        };
        Span::current().record("socket", field::display(socket));

        let Some((&command_token, args)) = rest.split_first() else {
            Span::current().record("command", "summary");
            return DispatchOutcome::Dispatched(handlers::system_summary(
                &mut *self.client,
                socket,
            ));
        };
        let Some(command) = table::find(command_token) else {
            return UsageError::UnknownCommand {
                token: command_token.to_owned(),
            }
            .into();
        };
        Span::current().record("command", command.name);

        let typed = match validate(command, args) {
            Ok(typed) => typed,
            Err(err) => return err.into(),
        };
        match (command.handler)(&mut *self.client, socket, &typed) {
            Ok(report) => DispatchOutcome::Dispatched(report),
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{error::OobStatus, simulator::SimulatedPlatform};

    fn dispatch(platform: &mut SimulatedPlatform, tokens: &[&str]) -> DispatchOutcome {
        Dispatcher::new(platform).run(tokens)
    }

    #[rstest]
    #[case(&[])]
    #[case(&["--help"])]
    #[case(&["0", "-h"])]
    fn help_never_reaches_the_platform(#[case] tokens: &[&str]) {
        let mut platform = SimulatedPlatform::new();
        let outcome = dispatch(&mut platform, tokens);
        let DispatchOutcome::Dispatched(report) = outcome else {
            panic!("help dispatches");
        };
        assert_eq!(report.title(), Some("Usage"));
        assert!(platform.calls().is_empty());
    }

    #[test]
    fn help_accepts_module_numbers() {
        let mut platform = SimulatedPlatform::new();
        let DispatchOutcome::Dispatched(report) = dispatch(&mut platform, &["--help", "3"]) else {
            panic!("module help dispatches");
        };
        assert!(report.notes().any(|note| note.contains("--showtsiregisters")));
    }

    #[test]
    fn unknown_help_module_is_a_usage_error() {
        let mut platform = SimulatedPlatform::new();
        assert_eq!(
            dispatch(&mut platform, &["--help", "9"]),
            DispatchOutcome::Usage(UsageError::UnknownHelpModule {
                module: "9".to_owned()
            })
        );
    }

    #[test]
    fn version_flag_reports_the_crate_version() {
        let mut platform = SimulatedPlatform::new();
        let DispatchOutcome::Dispatched(report) = dispatch(&mut platform, &["-v"]) else {
            panic!("version dispatches");
        };
        assert!(report.notes().any(|note| note.ends_with(env!("CARGO_PKG_VERSION"))));
    }

    #[rstest]
    #[case("-1")]
    #[case("256")]
    #[case("one")]
    fn bad_socket_tokens_are_rejected(#[case] token: &str) {
        let mut platform = SimulatedPlatform::new();
        let outcome = dispatch(&mut platform, &[token, "--showpower"]);
        assert_eq!(
            outcome,
            DispatchOutcome::Usage(UsageError::InvalidSocket {
                token: token.to_owned()
            })
        );
        assert_eq!(outcome.exit_code(), 2);
        assert!(platform.calls().is_empty());
    }

    #[test]
    fn unknown_command_is_a_usage_error() {
        let mut platform = SimulatedPlatform::new();
        assert_eq!(
            dispatch(&mut platform, &["0", "--frobnicate"]),
            DispatchOutcome::Usage(UsageError::UnknownCommand {
                token: "--frobnicate".to_owned()
            })
        );
    }

    #[test]
    fn socket_alone_shows_the_system_summary() {
        let mut platform = SimulatedPlatform::new();
        let DispatchOutcome::Dispatched(report) = dispatch(&mut platform, &["1"]) else {
            panic!("summary dispatches");
        };
        assert_eq!(report.title(), Some("APML System Management Interface"));
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn missing_socket_reaches_the_platform_as_not_found() {
        let mut platform = SimulatedPlatform::with_sockets(1);
        let outcome = dispatch(&mut platform, &["1", "--showtdp"]);
        let DispatchOutcome::Domain { error, .. } = &outcome else {
            panic!("socket 1 does not exist");
        };
        assert_eq!(error.status(), Some(OobStatus::NotFound));
        assert_eq!(outcome.exit_code(), 1);
    }

    #[test]
    fn validation_failures_make_no_calls() {
        let mut platform = SimulatedPlatform::new();
        let outcome = dispatch(&mut platform, &["0", "--setpowerlimit"]);
        assert_eq!(outcome.kind(), "usage");
        assert!(platform.calls().is_empty());
    }
}
