//! APML core library.
//!
//! Validates out-of-band management invocations against a declarative
//! command table and drives a [`TelemetryClient`] to produce [`Report`]s.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod codec;
pub mod command;
mod dispatch;
mod error;
pub mod handlers;
mod help;
mod report;
#[cfg(any(test, feature = "simulator"))]
#[cfg_attr(docsrs, doc(cfg(feature = "simulator")))]
mod simulator;
pub mod table;
mod telemetry;
pub mod types;
pub mod validate;

pub use crate::{
    dispatch::{DispatchOutcome, Dispatcher},
    error::{
        CodecError, CodecErrorCode, DomainError, HandlerError, OobStatus, UsageError,
        UsageErrorCode,
    },
    help::{HelpModule, TOOL_NAME, command_usage, general_usage, module_usage, version},
    report::{Entry, Report},
    telemetry::{SocketIndex, TelemetryClient, TelemetryResult},
};

#[cfg(any(test, feature = "simulator"))]
pub use crate::simulator::SimulatedPlatform;
