//! Error types for the APML core library.
//!
//! Separates caller mistakes ([`UsageError`]) from failures reported by the
//! telemetry collaborator ([`DomainError`]) and exposes stable codes for both.

use std::{fmt, sync::Arc};

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Malformed or missing command-line input, detected before any collaborator
/// call is made.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum UsageError {
    /// The socket index was not a decimal number that fits the socket range.
    #[error("socket index `{token}` is not a valid decimal socket number")]
    InvalidSocket {
        /// Token supplied in the socket position.
        token: String,
    },
    /// The command token matched no entry in the command table.
    #[error("unrecognized command `{token}`")]
    UnknownCommand {
        /// Token supplied in the command position.
        token: String,
    },
    /// Fewer tokens were supplied than the command declares.
    #[error("`{command}` requires argument {position} [{slot}]")]
    MissingArgument {
        /// Canonical name of the command being validated.
        command: &'static str,
        /// One-based position of the missing argument.
        position: usize,
        /// Declared name of the missing slot.
        slot: &'static str,
    },
    /// A token failed the parse required by its slot kind.
    #[error("`{command}` argument {position} [{slot}] must be a valid {expected} value, got `{token}`")]
    InvalidArgument {
        /// Canonical name of the command being validated.
        command: &'static str,
        /// One-based position of the offending argument.
        position: usize,
        /// Declared name of the offending slot.
        slot: &'static str,
        /// Human-readable name of the expected kind.
        expected: &'static str,
        /// Token as supplied.
        token: String,
    },
    /// A parsed integer exceeded the width of the field it feeds.
    #[error("`{command}` argument {position} [{slot}] must not exceed {max}, got {value}")]
    OutOfRange {
        /// Canonical name of the command being validated.
        command: &'static str,
        /// One-based position of the offending argument.
        position: usize,
        /// Declared name of the offending slot.
        slot: &'static str,
        /// Largest accepted value.
        max: u64,
        /// Value that was parsed.
        value: u64,
    },
    /// Tokens remained after every declared slot was filled.
    #[error("`{command}` does not accept the extra argument `{token}`")]
    UnexpectedArgument {
        /// Canonical name of the command being validated.
        command: &'static str,
        /// First surplus token.
        token: String,
    },
    /// `--help` named a module that does not exist.
    #[error("unknown help module `{module}`")]
    UnknownHelpModule {
        /// Module name as supplied.
        module: String,
    },
    /// A free-form token was outside the vocabulary the command understands.
    #[error("`{command}` does not support {slot} `{token}`")]
    UnsupportedValue {
        /// Canonical name of the command.
        command: &'static str,
        /// Declared name of the slot.
        slot: &'static str,
        /// Token as supplied.
        token: String,
    },
}

impl UsageError {
    /// Canonical name of the command the error concerns, when it concerns one.
    #[must_use]
    pub const fn command(&self) -> Option<&'static str> {
        match self {
            Self::MissingArgument { command, .. }
            | Self::InvalidArgument { command, .. }
            | Self::OutOfRange { command, .. }
            | Self::UnexpectedArgument { command, .. }
            | Self::UnsupportedValue { command, .. } => Some(*command),
            Self::InvalidSocket { .. } | Self::UnknownCommand { .. } | Self::UnknownHelpModule { .. } => {
                None
            }
        }
    }
}

define_error_codes! {
    /// Stable codes describing [`UsageError`] variants.
    enum UsageErrorCode for UsageError {
        /// The socket index was not a decimal number.
        InvalidSocket => InvalidSocket { .. } => "USAGE_INVALID_SOCKET",
        /// The command token matched no entry in the command table.
        UnknownCommand => UnknownCommand { .. } => "USAGE_UNKNOWN_COMMAND",
        /// Fewer tokens were supplied than the command declares.
        MissingArgument => MissingArgument { .. } => "USAGE_MISSING_ARGUMENT",
        /// A token failed the parse required by its slot kind.
        InvalidArgument => InvalidArgument { .. } => "USAGE_INVALID_ARGUMENT",
        /// A parsed integer exceeded the width of its field.
        OutOfRange => OutOfRange { .. } => "USAGE_OUT_OF_RANGE",
        /// Tokens remained after every slot was filled.
        UnexpectedArgument => UnexpectedArgument { .. } => "USAGE_UNEXPECTED_ARGUMENT",
        /// `--help` named a module that does not exist.
        UnknownHelpModule => UnknownHelpModule { .. } => "USAGE_UNKNOWN_HELP_MODULE",
        /// A free-form token was outside the supported vocabulary.
        UnsupportedValue => UnsupportedValue { .. } => "USAGE_UNSUPPORTED_VALUE",
    }
}

/// Status codes reported by the out-of-band management library.
///
/// Codes outside this catalogue are still carried verbatim by
/// [`DomainError`]; [`DomainError::status`] returns `None` for them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum OobStatus {
    /// The requested device or socket does not exist.
    NotFound,
    /// The caller lacks permission to reach the device.
    Permission,
    /// The platform does not implement the operation.
    NotSupported,
    /// The device node could not be opened or read.
    FileError,
    /// The transfer was interrupted.
    Interrupted,
    /// The device returned a payload of unexpected size.
    UnexpectedSize,
    /// An unclassified failure.
    UnknownError,
    /// A required output pointer was missing.
    ArgPtrNull,
    /// The library ran out of memory.
    NoMemory,
    /// The library was used before initialisation.
    NotInitialized,
    /// The device is busy; retry later.
    TryAgain,
    /// An input parameter was rejected.
    InvalidInput,
    /// The firmware did not answer within its deadline.
    CmdTimeout,
    /// The message size was rejected by the mailbox.
    InvalidMsgSize,
}

impl OobStatus {
    const ALL: [Self; 14] = [
        Self::NotFound,
        Self::Permission,
        Self::NotSupported,
        Self::FileError,
        Self::Interrupted,
        Self::UnexpectedSize,
        Self::UnknownError,
        Self::ArgPtrNull,
        Self::NoMemory,
        Self::NotInitialized,
        Self::TryAgain,
        Self::InvalidInput,
        Self::CmdTimeout,
        Self::InvalidMsgSize,
    ];

    /// Numeric status code as reported by the library.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::NotFound => 1,
            Self::Permission => 2,
            Self::NotSupported => 3,
            Self::FileError => 4,
            Self::Interrupted => 5,
            Self::UnexpectedSize => 6,
            Self::UnknownError => 7,
            Self::ArgPtrNull => 8,
            Self::NoMemory => 9,
            Self::NotInitialized => 10,
            Self::TryAgain => 11,
            Self::InvalidInput => 12,
            Self::CmdTimeout => 13,
            Self::InvalidMsgSize => 14,
        }
    }

    /// Canonical message for the status.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotFound => "Device not found",
            Self::Permission => "Permission denied",
            Self::NotSupported => "Requested operation not supported",
            Self::FileError => "Problem accessing a file",
            Self::Interrupted => "An interrupt occurred during execution",
            Self::UnexpectedSize => "Unexpected amount of data read",
            Self::UnknownError => "An unknown error occurred",
            Self::ArgPtrNull => "Parsed argument is invalid",
            Self::NoMemory => "Not enough memory to allocate",
            Self::NotInitialized => "Library not initialised",
            Self::TryAgain => "Device busy, try again",
            Self::InvalidInput => "Input value is invalid",
            Self::CmdTimeout => "Command timed out",
            Self::InvalidMsgSize => "Invalid message size",
        }
    }

    /// Look up the status for a numeric code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }
}

impl fmt::Display for OobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Failure reported by the telemetry collaborator.
///
/// The core never rewrites the code or message; they reach the report and the
/// console unchanged.
///
/// # Examples
/// ```
/// use apml_core::{DomainError, OobStatus};
///
/// let err = DomainError::from_status(OobStatus::TryAgain);
/// assert_eq!(err.code(), 11);
/// assert_eq!(err.to_string(), "Err[11]: Device busy, try again");
/// ```
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("Err[{code}]: {message}")]
pub struct DomainError {
    code: i32,
    message: Arc<str>,
}

impl DomainError {
    /// Build an error from a raw code and message.
    #[must_use]
    pub fn new(code: i32, message: impl Into<Arc<str>>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Build an error carrying the canonical message of `status`.
    #[must_use]
    pub fn from_status(status: OobStatus) -> Self {
        Self::new(status.code(), status.message())
    }

    /// Numeric code as reported by the collaborator.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }

    /// Message as reported by the collaborator.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Known status for the code, if it is part of the catalogue.
    #[must_use]
    pub fn status(&self) -> Option<OobStatus> {
        OobStatus::from_code(self.code)
    }
}

impl From<OobStatus> for DomainError {
    fn from(status: OobStatus) -> Self {
        Self::from_status(status)
    }
}

/// Failure of the [`crate::codec`] conversions.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CodecError {
    /// The temperature cannot be represented in the 12-bit scaled encoding.
    #[error("temperature {celsius} °C is outside [-256, 255.75]")]
    TemperatureOutOfRange {
        /// Value that was rejected.
        celsius: f64,
    },
    /// A raw code used more than 12 bits.
    #[error("temperature code {code:#x} exceeds 12 bits")]
    CodeOutOfRange {
        /// Code that was rejected.
        code: u16,
    },
    /// The link token matched none of the known link identifiers.
    #[error("unknown link identifier `{token}`")]
    UnknownLink {
        /// Upper-cased token that failed to match.
        token: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`CodecError`] variants.
    enum CodecErrorCode for CodecError {
        /// The temperature cannot be represented.
        TemperatureOutOfRange => TemperatureOutOfRange { .. } => "CODEC_TEMPERATURE_OUT_OF_RANGE",
        /// A raw code used more than 12 bits.
        CodeOutOfRange => CodeOutOfRange { .. } => "CODEC_CODE_OUT_OF_RANGE",
        /// The link token was not recognised.
        UnknownLink => UnknownLink { .. } => "CODEC_UNKNOWN_LINK",
    }
}

/// Error returned by a command handler.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum HandlerError {
    /// The handler rejected an argument before calling the collaborator.
    #[error(transparent)]
    Usage(#[from] UsageError),
    /// The collaborator reported a failure.
    #[error("failed to {action}, {error}")]
    Domain {
        /// What the handler was trying to do, phrased for "failed to ...".
        action: &'static str,
        /// Error returned by the collaborator.
        #[source]
        error: DomainError,
    },
}

impl HandlerError {
    /// Wrap a collaborator failure with the action that triggered it.
    #[must_use]
    pub const fn domain(action: &'static str, error: DomainError) -> Self {
        Self::Domain { action, error }
    }
}
