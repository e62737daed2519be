//! Argument validation against a command's declared slots.
//!
//! Validation is pure: it either returns every argument typed, or a single
//! [`UsageError`] describing the first offending slot.

use crate::{
    command::{ArgKind, Command, Slot},
    error::UsageError,
};

/// A parsed argument.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    /// Value of a [`ArgKind::Decimal`] or [`ArgKind::Hex`] slot.
    Unsigned(u64),
    /// Value of a [`ArgKind::Float`] slot.
    Float(f64),
    /// Value of a [`ArgKind::Text`] slot.
    Text(String),
}

/// Arguments of one invocation, typed and in slot order.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedArgs {
    command: &'static str,
    slots: &'static [Slot],
    values: Vec<ArgValue>,
}

impl TypedArgs {
    /// Canonical name of the command the arguments belong to.
    #[must_use]
    pub const fn command(&self) -> &'static str {
        self.command
    }

    /// Values in slot order.
    #[must_use]
    pub fn values(&self) -> &[ArgValue] {
        &self.values
    }

    /// Integer in slot `index`, converted to the handler's field type.
    ///
    /// # Errors
    /// Returns [`UsageError::MissingArgument`] when the slot does not hold an
    /// integer and [`UsageError::OutOfRange`] when the value does not fit `T`.
    pub fn unsigned<T: TryFrom<u64>>(&self, index: usize) -> Result<T, UsageError> {
        match self.values.get(index) {
            Some(ArgValue::Unsigned(value)) => {
                T::try_from(*value).map_err(|_| UsageError::OutOfRange {
                    command: self.command,
                    position: index + 1,
                    slot: self.slot_name(index),
                    max: self.slot_bound(index),
                    value: *value,
                })
            }
            _ => Err(self.missing(index)),
        }
    }

    /// Float in slot `index`.
    ///
    /// # Errors
    /// Returns [`UsageError::MissingArgument`] when the slot does not hold a
    /// float.
    pub fn float(&self, index: usize) -> Result<f64, UsageError> {
        match self.values.get(index) {
            Some(ArgValue::Float(value)) => Ok(*value),
            _ => Err(self.missing(index)),
        }
    }

    /// Text in slot `index`.
    ///
    /// # Errors
    /// Returns [`UsageError::MissingArgument`] when the slot does not hold
    /// text.
    pub fn text(&self, index: usize) -> Result<&str, UsageError> {
        match self.values.get(index) {
            Some(ArgValue::Text(value)) => Ok(value),
            _ => Err(self.missing(index)),
        }
    }

    fn slot_name(&self, index: usize) -> &'static str {
        self.slots.get(index).map_or("?", |slot| slot.name)
    }

    fn slot_bound(&self, index: usize) -> u64 {
        match self.slots.get(index).map(|slot| slot.kind) {
            Some(ArgKind::Decimal { max } | ArgKind::Hex { max }) => max,
            _ => 0,
        }
    }

    fn missing(&self, index: usize) -> UsageError {
        UsageError::MissingArgument {
            command: self.command,
            position: index + 1,
            slot: self.slot_name(index),
        }
    }
}

/// Validate `tokens` against the slots declared by `command`.
///
/// # Errors
/// Returns the first [`UsageError`] found: a missing slot, a token that fails
/// its kind's parse, an integer above the slot bound or a surplus token.
///
/// # Examples
/// ```
/// use apml_core::{table, validate::{validate, ArgValue}};
///
/// let command = table::find("setdimmpower").expect("command exists");
/// let args = validate(command, &["1a", "500", "100"])?;
/// assert_eq!(
///     args.values(),
///     &[ArgValue::Unsigned(0x1a), ArgValue::Unsigned(500), ArgValue::Unsigned(100)]
/// );
/// # Ok::<(), apml_core::UsageError>(())
/// ```
pub fn validate<S: AsRef<str>>(
    command: &'static Command,
    tokens: &[S],
) -> Result<TypedArgs, UsageError> {
    let slots = command.slots();
    let mut values = Vec::with_capacity(slots.len());

    for (index, slot) in slots.iter().enumerate() {
        let position = index + 1;
        let missing = || UsageError::MissingArgument {
            command: command.name,
            position,
            slot: slot.name,
        };
        let token = tokens
            .get(index)
            .map(AsRef::<str>::as_ref)
            .ok_or_else(missing)?;
        let parsed = parse(slot.kind, token);

        if index > 0 && command.arity.is_lookahead() && looks_like_option(token) {
            match parsed {
                Ok(value) if slot.kind != ArgKind::Text => {
                    values.push(bounded(command, position, slot, value)?);
                    continue;
                }
                _ => return Err(missing()),
            }
        }

        let value = parsed.map_err(|()| UsageError::InvalidArgument {
            command: command.name,
            position,
            slot: slot.name,
            expected: slot.kind.label(),
            token: token.to_owned(),
        })?;
        values.push(bounded(command, position, slot, value)?);
    }

    if let Some(extra) = tokens.get(slots.len()) {
        return Err(UsageError::UnexpectedArgument {
            command: command.name,
            token: AsRef::<str>::as_ref(extra).to_owned(),
        });
    }

    Ok(TypedArgs {
        command: command.name,
        slots,
        values,
    })
}

fn looks_like_option(token: &str) -> bool {
    token.starts_with('-')
}

fn bounded(
    command: &Command,
    position: usize,
    slot: &Slot,
    value: ArgValue,
) -> Result<ArgValue, UsageError> {
    if let (ArgValue::Unsigned(parsed), ArgKind::Decimal { max } | ArgKind::Hex { max }) =
        (&value, slot.kind)
        && *parsed > max
    {
        return Err(UsageError::OutOfRange {
            command: command.name,
            position,
            slot: slot.name,
            max,
            value: *parsed,
        });
    }
    Ok(value)
}

fn parse(kind: ArgKind, token: &str) -> Result<ArgValue, ()> {
    match kind {
        ArgKind::Decimal { .. } => parse_radix(token, 10).map(ArgValue::Unsigned),
        ArgKind::Hex { .. } => {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            parse_radix(digits, 16).map(ArgValue::Unsigned)
        }
        ArgKind::Float => token
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(ArgValue::Float)
            .ok_or(()),
        ArgKind::Text => Ok(ArgValue::Text(token.to_owned())),
    }
}

fn parse_radix(digits: &str, radix: u32) -> Result<u64, ()> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(());
    }
    u64::from_str_radix(digits, radix).map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table;
    use rstest::rstest;

    fn command(name: &str) -> &'static Command {
        table::find(name).expect("command exists")
    }

    #[test]
    fn three_slot_command_reports_missing_third_slot() {
        let err = validate(command("setdimmpower"), &["1a", "500"]).expect_err("arity");
        assert_eq!(
            err,
            UsageError::MissingArgument {
                command: "setdimmpower",
                position: 3,
                slot: "UPDATERATE",
            }
        );
    }

    #[test]
    fn hex_parse_failure_names_the_slot() {
        let err = validate(command("showPCIeconfigspacedata"), &["0", "16", "zz", "1", "0"])
            .expect_err("bus must be hex");
        assert_eq!(
            err,
            UsageError::InvalidArgument {
                command: "showPCIeconfigspacedata",
                position: 3,
                slot: "BUS",
                expected: "hexadecimal",
                token: "zz".to_owned(),
            }
        );
    }

    #[test]
    fn second_slot_hex_failure_in_three_slot_command() {
        let err = validate(command("writeregister"), &["sbrmi", "xyz", "1"]).expect_err("hex");
        assert!(matches!(
            err,
            UsageError::InvalidArgument { position: 2, slot: "REGISTER", .. }
        ));
    }

    #[rstest]
    #[case("1a", 0x1a)]
    #[case("0x1A", 0x1a)]
    #[case("0XfF", 0xff)]
    fn hex_accepts_optional_prefix(#[case] token: &str, #[case] expected: u64) {
        let args = validate(command("showdimmpower"), &[token]).expect("valid hex");
        assert_eq!(args.unsigned::<u8>(0), Ok(u8::try_from(expected).expect("fits")));
    }

    #[rstest]
    #[case("")]
    #[case("+5")]
    #[case("5 ")]
    #[case("1e3")]
    #[case("0x10")]
    fn decimal_parse_is_strict(#[case] token: &str) {
        let err = validate(command("setpowerlimit"), &[token]).expect_err("strict decimal");
        assert!(matches!(err, UsageError::InvalidArgument { expected: "decimal", .. }));
    }

    #[rstest]
    #[case("nan")]
    #[case("inf")]
    #[case("12.5.1")]
    #[case("")]
    fn float_rejects_non_finite_and_malformed(#[case] token: &str) {
        let err = validate(command("sethightempthreshold"), &[token]).expect_err("float");
        assert!(matches!(err, UsageError::InvalidArgument { expected: "floating-point", .. }));
    }

    #[test]
    fn bound_violation_is_out_of_range() {
        let err = validate(command("setdimmpower"), &["1a", "32768", "100"]).expect_err("bound");
        assert_eq!(
            err,
            UsageError::OutOfRange {
                command: "setdimmpower",
                position: 2,
                slot: "POWER",
                max: 0x7FFF,
                value: 32768,
            }
        );
    }

    #[test]
    fn surplus_tokens_are_rejected() {
        let err = validate(command("showpower"), &["7"]).expect_err("no args accepted");
        assert_eq!(
            err,
            UsageError::UnexpectedArgument {
                command: "showpower",
                token: "7".to_owned(),
            }
        );
    }

    #[test]
    fn lookahead_treats_option_tokens_as_missing() {
        let err = validate(command("showxGMIbandwidth"), &["P0", "-p"]).expect_err("lookahead");
        assert_eq!(
            err,
            UsageError::MissingArgument {
                command: "showxGMIbandwidth",
                position: 2,
                slot: "BW",
            }
        );
    }

    #[test]
    fn lookahead_keeps_negative_numbers_for_float_slots() {
        let args = validate(command("setdimmthermalsensor"), &["1a", "-12.5", "10"])
            .expect("negative temperatures are values");
        assert_eq!(args.float(1), Ok(-12.5));
    }

    #[test]
    fn first_slot_is_taken_as_is() {
        let args = validate(command("setlowtempthreshold"), &["-5"]).expect("fixed arity");
        assert_eq!(args.float(0), Ok(-5.0));
    }

    #[test]
    fn setdimmpower_end_to_end_parse() {
        let args = validate(command("-P"), &["1a", "500", "100"]).expect("valid");
        assert_eq!(args.command(), "setdimmpower");
        assert_eq!(args.unsigned::<u8>(0), Ok(0x1a));
        assert_eq!(args.unsigned::<u16>(1), Ok(500));
        assert_eq!(args.unsigned::<u16>(2), Ok(100));
    }

    #[test]
    fn accessors_report_kind_mismatches() {
        let args = validate(command("readregister"), &["sbtsi", "0x10"]).expect("valid");
        assert_eq!(args.text(0), Ok("sbtsi"));
        assert!(matches!(
            args.float(1),
            Err(UsageError::MissingArgument { position: 2, .. })
        ));
        assert!(matches!(
            args.unsigned::<u8>(5),
            Err(UsageError::MissingArgument { position: 6, slot: "?", .. })
        ));
    }

    #[test]
    fn narrowing_conversion_failure_is_out_of_range() {
        let args = validate(command("readmsrregister"), &["c0010015", "3"]).expect("valid");
        assert!(matches!(
            args.unsigned::<u8>(0),
            Err(UsageError::OutOfRange { value: 0xc001_0015, .. })
        ));
        assert_eq!(args.unsigned::<u32>(0), Ok(0xc001_0015));
    }
}
