//! Help catalogue generated from the command table.

use std::fmt;

use crate::{error::UsageError, report::Report, table};

/// Name of the binary shown in usage text.
pub const TOOL_NAME: &str = "apml";

/// Group a command is listed under in `--help <module>`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HelpModule {
    /// SB-RMI mailbox commands.
    Mailbox,
    /// SB-RMI register summary.
    Sbrmi,
    /// SB-TSI thermal sensor commands.
    Sbtsi,
    /// Raw register, MSR and CPUID access.
    RegAccess,
    /// Processor topology queries.
    Cpuid,
}

impl HelpModule {
    /// Every module in listing order.
    pub const ALL: [Self; 5] = [
        Self::Mailbox,
        Self::Sbrmi,
        Self::Sbtsi,
        Self::RegAccess,
        Self::Cpuid,
    ];

    /// Name accepted after `--help`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mailbox => "mailbox",
            Self::Sbrmi => "sbrmi",
            Self::Sbtsi => "sbtsi",
            Self::RegAccess => "reg-access",
            Self::Cpuid => "cpuid",
        }
    }

    /// One-based number accepted after `--help`.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Mailbox => 1,
            Self::Sbrmi => 2,
            Self::Sbtsi => 3,
            Self::RegAccess => 4,
            Self::Cpuid => 5,
        }
    }

    const fn heading(self) -> &'static str {
        match self {
            Self::Mailbox => "MAILBOX COMMANDS",
            Self::Sbrmi => "SB-RMI COMMANDS",
            Self::Sbtsi => "SB-TSI COMMANDS",
            Self::RegAccess => "REG-ACCESS",
            Self::Cpuid => "CPUID",
        }
    }

    /// Resolve a module from its name or number.
    ///
    /// # Errors
    /// Returns [`UsageError::UnknownHelpModule`] when `token` names no module.
    ///
    /// # Examples
    /// ```
    /// use apml_core::HelpModule;
    ///
    /// assert_eq!(HelpModule::from_token("4"), Ok(HelpModule::RegAccess));
    /// assert_eq!(HelpModule::from_token("sbtsi"), Ok(HelpModule::Sbtsi));
    /// assert!(HelpModule::from_token("6").is_err());
    /// ```
    pub fn from_token(token: &str) -> Result<Self, UsageError> {
        Self::ALL
            .into_iter()
            .find(|module| module.name() == token || module.number().to_string() == token)
            .ok_or_else(|| UsageError::UnknownHelpModule {
                module: token.to_owned(),
            })
    }
}

impl fmt::Display for HelpModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// General usage listing the modules.
#[must_use]
pub fn general_usage() -> Report {
    let mut report = Report::titled("Usage");
    report
        .note(format!(
            "Usage: {TOOL_NAME} [SOC_NUM] [Option<s>] / [--help] [module-name]"
        ))
        .note("Where:  SOC_NUM : socket number 0 or 1")
        .heading("Description")
        .note(format!("{TOOL_NAME} -v                 Displays tool version"))
        .note(format!(
            "{TOOL_NAME} --help <MODULE>    Displays help on the options for the specified module"
        ))
        .note(format!(
            "{TOOL_NAME} <SOC_NUM>          Shows the mailbox and SB-TSI summary for a socket"
        ))
        .note(format!(
            "{TOOL_NAME} <SOC_NUM> <option> Runs the specified option"
        ))
        .heading("MODULES");
    for module in HelpModule::ALL {
        report.note(format!("{}. {}", module.number(), module.name()));
    }
    report
}

/// Listing of every command in `module`.
#[must_use]
pub fn module_usage(module: HelpModule) -> Report {
    let mut report = Report::titled(format!("Usage: {TOOL_NAME} [SOC_NUM] [Option]"));
    report.heading(format!("< {} >", module.heading()));
    for command in table::in_module(module) {
        report.note(format!("  {:<56} {}", command.synopsis(), command.summary));
    }
    report
}

/// Usage line for a single command, when `name` is in the table.
#[must_use]
pub fn command_usage(name: &str) -> Option<String> {
    table::find(name).map(|command| format!("Usage: {TOOL_NAME} [SOC_NUM] {command}"))
}

/// Version report.
#[must_use]
pub fn version() -> Report {
    let mut report = Report::new();
    report.note(format!(
        "{TOOL_NAME} version : {}",
        env!("CARGO_PKG_VERSION")
    ));
    report
}
