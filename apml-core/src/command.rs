//! Declarative command descriptions.
//!
//! A [`Command`] owns its argument slots and its handler, so adding a command
//! means adding one entry to [`crate::table::COMMANDS`] and nothing else.

use std::fmt;

use crate::{
    error::HandlerError, help::HelpModule, report::Report, telemetry::SocketIndex,
    telemetry::TelemetryClient, validate::TypedArgs,
};

/// Signature shared by every command handler.
pub type Handler =
    fn(&mut dyn TelemetryClient, SocketIndex, &TypedArgs) -> Result<Report, HandlerError>;

/// Expected kind of a positional argument.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArgKind {
    /// Unsigned decimal integer no larger than `max`.
    Decimal {
        /// Largest accepted value.
        max: u64,
    },
    /// Unsigned hexadecimal integer, optional `0x` prefix, no larger than `max`.
    Hex {
        /// Largest accepted value.
        max: u64,
    },
    /// Finite floating point number.
    Float,
    /// Free-form token passed through unchanged.
    Text,
}

impl ArgKind {
    /// Human-readable name used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Decimal { .. } => "decimal",
            Self::Hex { .. } => "hexadecimal",
            Self::Float => "floating-point",
            Self::Text => "string",
        }
    }
}

/// A named positional argument.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Slot {
    /// Name shown in help and diagnostics, e.g. `DIMM_ADDR`.
    pub name: &'static str,
    /// Kind the token must parse as.
    pub kind: ArgKind,
}

impl Slot {
    /// Decimal slot bounded by `max`.
    #[must_use]
    pub const fn decimal(name: &'static str, max: u64) -> Self {
        Self {
            name,
            kind: ArgKind::Decimal { max },
        }
    }

    /// Hexadecimal slot bounded by `max`.
    #[must_use]
    pub const fn hex(name: &'static str, max: u64) -> Self {
        Self {
            name,
            kind: ArgKind::Hex { max },
        }
    }

    /// Floating point slot.
    #[must_use]
    pub const fn float(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Float,
        }
    }

    /// Free-form slot.
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Text,
        }
    }
}

/// How a command consumes the tokens that follow it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arity {
    /// Every slot takes the next token as-is.
    Fixed(&'static [Slot]),
    /// Slots after the first only accept tokens that do not look like an
    /// option; a `-`-prefixed token that fails the slot's parse counts as
    /// missing.
    Lookahead(&'static [Slot]),
}

impl Arity {
    /// Declared slots in positional order.
    #[must_use]
    pub const fn slots(self) -> &'static [Slot] {
        match self {
            Self::Fixed(slots) | Self::Lookahead(slots) => slots,
        }
    }

    /// Number of tokens the command requires.
    #[must_use]
    pub const fn len(self) -> usize {
        self.slots().len()
    }

    /// Whether the command takes no arguments.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub(crate) const fn is_lookahead(self) -> bool {
        matches!(self, Self::Lookahead(_))
    }
}

/// One entry of the command table.
#[derive(Clone, Copy, Debug)]
pub struct Command {
    /// Canonical long name, matched as `--name` or `name`.
    pub name: &'static str,
    /// Legacy single-character alias, matched as `-c`.
    pub alias: Option<char>,
    /// Help module the command is listed under.
    pub module: HelpModule,
    /// Positional arguments.
    pub arity: Arity,
    /// One-line description shown in help.
    pub summary: &'static str,
    /// Function invoked once the arguments validate.
    pub handler: Handler,
}

impl Command {
    /// Declared slots in positional order.
    #[must_use]
    pub const fn slots(&self) -> &'static [Slot] {
        self.arity.slots()
    }

    /// Whether `token` names this command.
    #[must_use]
    pub fn matches(&self, token: &str) -> bool {
        if let Some(long) = token.strip_prefix("--") {
            return long == self.name;
        }
        if let Some(short) = token.strip_prefix('-') {
            let mut chars = short.chars();
            return match (chars.next(), chars.next(), self.alias) {
                (Some(c), None, Some(alias)) => c == alias,
                _ => false,
            };
        }
        token == self.name
    }

    /// Invocation synopsis such as `-P, --setdimmpower [DIMM_ADDR][POWER][UPDATERATE]`.
    #[must_use]
    pub fn synopsis(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alias) = self.alias {
            write!(f, "-{alias}, ")?;
        }
        write!(f, "--{}", self.name)?;
        if !self.arity.is_empty() {
            f.write_str(" ")?;
            for slot in self.slots() {
                write!(f, "[{}]", slot.name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table;
    use rstest::rstest;

    #[rstest]
    #[case("--setdimmpower", true)]
    #[case("setdimmpower", true)]
    #[case("-P", true)]
    #[case("-p", false)]
    #[case("--P", false)]
    #[case("-PP", false)]
    #[case("---setdimmpower", false)]
    fn matches_long_bare_and_alias_forms(#[case] token: &str, #[case] expected: bool) {
        let command = table::find("setdimmpower").expect("command exists");
        assert_eq!(command.matches(token), expected);
    }

    #[test]
    fn synopsis_lists_alias_and_slots() {
        let command = table::find("setdimmpower").expect("command exists");
        assert_eq!(
            command.synopsis(),
            "-P, --setdimmpower [DIMM_ADDR][POWER][UPDATERATE]"
        );
        let bare = table::find("showddrbandwidth").expect("command exists");
        assert_eq!(bare.synopsis(), "--showddrbandwidth");
    }
}
