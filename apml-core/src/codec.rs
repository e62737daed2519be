//! Conversions between raw register encodings and engineering units.
//!
//! Covers the 12-bit scaled temperature used by the DIMM thermal commands and
//! the link/bandwidth bitmask selectors used by the bandwidth commands.

use crate::error::CodecError;

/// Resolution of a scaled temperature code in degrees Celsius.
pub const TEMPERATURE_STEP: f64 = 0.25;
/// Lowest temperature the scaled encoding represents.
pub const MIN_TEMPERATURE: f64 = -256.0;
/// Highest temperature the scaled encoding represents.
pub const MAX_TEMPERATURE: f64 = 255.75;

const CODE_MASK: u16 = 0x0FFF;
const POSITIVE_LIMIT: u16 = 0x03FF;
const NEGATIVE_BASE: i32 = 0x800;

/// Encode a temperature in degrees Celsius into its 12-bit scaled code.
///
/// Non-negative values map to `round(t / 0.25)`; negative values map to
/// `0x800 + round(t / 0.25)`. Anything outside `[-256, 255.75]`, and any
/// non-finite input, is rejected.
///
/// # Errors
/// Returns [`CodecError::TemperatureOutOfRange`] when `celsius` cannot be
/// represented.
///
/// # Examples
/// ```
/// use apml_core::codec::{decode_temperature, encode_temperature};
///
/// let code = encode_temperature(-1.25)?;
/// assert_eq!(code, 0x7FB);
/// assert_eq!(decode_temperature(code), -1.25);
/// # Ok::<(), apml_core::CodecError>(())
/// ```
pub fn encode_temperature(celsius: f64) -> Result<u16, CodecError> {
    if !celsius.is_finite() || !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&celsius) {
        return Err(CodecError::TemperatureOutOfRange { celsius });
    }
    let steps = (celsius / TEMPERATURE_STEP).round() as i32;
    let code = if celsius >= 0.0 {
        steps
    } else {
        NEGATIVE_BASE + steps
    };
    u16::try_from(code).map_err(|_| CodecError::TemperatureOutOfRange { celsius })
}

/// Decode a 12-bit scaled code into degrees Celsius.
///
/// Bits above the twelfth are ignored. Codes from `0x400` upward take the
/// offset branch: `0x400..=0x7FF` are the negative temperatures produced by
/// [`encode_temperature`], while `0x800..=0xFFF` are never produced by it
/// and decode to `[0, 511.75]`. No code panics.
#[must_use]
pub fn decode_temperature(code: u16) -> f64 {
    let code = code & CODE_MASK;
    if code <= POSITIVE_LIMIT {
        f64::from(code) * TEMPERATURE_STEP
    } else {
        f64::from(i32::from(code) - NEGATIVE_BASE) * TEMPERATURE_STEP
    }
}

/// A validated 12-bit scaled temperature.
///
/// # Examples
/// ```
/// use apml_core::codec::ScaledTemperature;
///
/// let temp = ScaledTemperature::from_celsius(42.5)?;
/// assert_eq!(temp.code(), 170);
/// assert_eq!(temp.celsius(), 42.5);
/// # Ok::<(), apml_core::CodecError>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ScaledTemperature(u16);

impl ScaledTemperature {
    /// Encode `celsius` with [`encode_temperature`].
    ///
    /// # Errors
    /// Returns [`CodecError::TemperatureOutOfRange`] when the value cannot be
    /// represented.
    pub fn from_celsius(celsius: f64) -> Result<Self, CodecError> {
        encode_temperature(celsius).map(Self)
    }

    /// Wrap a raw code.
    ///
    /// # Errors
    /// Returns [`CodecError::CodeOutOfRange`] when `code` uses more than 12
    /// bits.
    pub fn from_code(code: u16) -> Result<Self, CodecError> {
        if code > CODE_MASK {
            return Err(CodecError::CodeOutOfRange { code });
        }
        Ok(Self(code))
    }

    /// Raw 12-bit code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self.0
    }

    /// Decoded value in degrees Celsius.
    #[must_use]
    pub fn celsius(self) -> f64 {
        decode_temperature(self.0)
    }
}

/// Link identifiers understood by the bandwidth commands, in bit order.
pub const LINK_NAMES: [&str; 8] = ["P0", "P1", "P2", "P3", "G0", "G1", "G2", "G3"];
/// Bandwidth types understood by the inter-socket bandwidth command, in bit order.
pub const BANDWIDTH_TYPES: [&str; 3] = ["AGG_BW", "RD_BW", "WR_BW"];

/// Bitmask pair selecting a link and a bandwidth metric.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct BandwidthSelector {
    /// One bit per entry of [`LINK_NAMES`].
    pub link_mask: u8,
    /// One bit per entry of [`BANDWIDTH_TYPES`]; bit 0 only for I/O links.
    pub type_mask: u8,
}

impl BandwidthSelector {
    /// Whether a bandwidth type bit is set.
    #[must_use]
    pub const fn has_type(self) -> bool {
        self.type_mask != 0
    }
}

/// Build the selector for a link token and a bandwidth type token.
///
/// Both tokens are upper-cased before matching. For I/O links
/// (`inter_socket == false`) only `AGG_BW` sets a type bit; an unknown type
/// token yields `type_mask == 0` rather than an error, so callers that need a
/// type must check [`BandwidthSelector::has_type`].
///
/// # Errors
/// Returns [`CodecError::UnknownLink`] when the link token matches none of
/// [`LINK_NAMES`].
///
/// # Examples
/// ```
/// use apml_core::codec::build_bandwidth_selector;
///
/// let selector = build_bandwidth_selector("p2", "Rd_Bw", true)?;
/// assert_eq!(selector.link_mask, 0b100);
/// assert_eq!(selector.type_mask, 0b010);
/// # Ok::<(), apml_core::CodecError>(())
/// ```
pub fn build_bandwidth_selector(
    link: &str,
    bandwidth_type: &str,
    inter_socket: bool,
) -> Result<BandwidthSelector, CodecError> {
    let link = link.to_ascii_uppercase();
    let bandwidth_type = bandwidth_type.to_ascii_uppercase();

    let link_mask = LINK_NAMES
        .iter()
        .position(|name| *name == link)
        .map(|index| 1_u8 << index)
        .ok_or(CodecError::UnknownLink { token: link })?;

    let accepted = if inter_socket {
        &BANDWIDTH_TYPES[..]
    } else {
        &BANDWIDTH_TYPES[..1]
    };
    let type_mask = accepted
        .iter()
        .position(|name| *name == bandwidth_type)
        .map_or(0, |index| 1_u8 << index);

    Ok(BandwidthSelector {
        link_mask,
        type_mask,
    })
}

/// Convert a milli-unit reading (mW, mV) into units.
#[must_use]
pub fn milli_to_unit(value: u32) -> f64 {
    f64::from(value) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0x000)]
    #[case(0.25, 0x001)]
    #[case(255.75, 0x3FF)]
    #[case(-0.25, 0x7FF)]
    #[case(-256.0, 0x400)]
    #[case(25.1, 0x064)]
    fn encodes_known_values(#[case] celsius: f64, #[case] expected: u16) {
        assert_eq!(encode_temperature(celsius), Ok(expected));
    }

    #[rstest]
    #[case(256.0)]
    #[case(-256.25)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn rejects_unrepresentable_temperatures(#[case] celsius: f64) {
        let err = encode_temperature(celsius).expect_err("value must be rejected");
        assert!(matches!(err, CodecError::TemperatureOutOfRange { .. }));
    }

    #[rstest]
    #[case(0x000, 0.0)]
    #[case(0x3FF, 255.75)]
    #[case(0x800, 0.0)]
    #[case(0x400, -256.0)]
    #[case(0x600, -128.0)]
    #[case(0xFFF, 511.75)]
    fn decodes_every_branch(#[case] code: u16, #[case] expected: f64) {
        assert_eq!(decode_temperature(code), expected);
    }

    #[test]
    fn decode_ignores_bits_above_twelve() {
        assert_eq!(decode_temperature(0xF010), decode_temperature(0x010));
    }

    #[test]
    fn scaled_temperature_rejects_wide_codes() {
        assert_eq!(
            ScaledTemperature::from_code(0x1000),
            Err(CodecError::CodeOutOfRange { code: 0x1000 })
        );
        let temp = ScaledTemperature::from_code(0x7FF).expect("12-bit code is valid");
        assert_eq!(temp.celsius(), -0.25);
    }

    proptest! {
        #[test]
        fn quarter_degree_steps_round_trip(step in -1024_i32..=1023) {
            let celsius = f64::from(step) * TEMPERATURE_STEP;
            let code = encode_temperature(celsius).expect("in-range value encodes");
            prop_assert!(code <= CODE_MASK);
            prop_assert_eq!(decode_temperature(code), celsius);
        }

        #[test]
        fn arbitrary_in_range_values_recover_within_one_step(
            celsius in MIN_TEMPERATURE..=MAX_TEMPERATURE,
        ) {
            let code = encode_temperature(celsius).expect("in-range value encodes");
            let recovered = decode_temperature(code);
            prop_assert!((recovered - celsius).abs() <= TEMPERATURE_STEP);
        }

        #[test]
        fn decode_never_panics(code in any::<u16>()) {
            let celsius = decode_temperature(code);
            prop_assert!(celsius.is_finite());
        }
    }

    #[test]
    fn selector_sets_exactly_one_link_and_type_bit() {
        let selector = build_bandwidth_selector("p2", "rd_bw", true).expect("valid tokens");
        assert_eq!(selector.link_mask, 1 << 2);
        assert_eq!(selector.type_mask, 1 << 1);

        let mixed = build_bandwidth_selector("P2", "rD_Bw", true).expect("valid tokens");
        assert_eq!(mixed, selector);
    }

    #[rstest]
    #[case("P0", 0)]
    #[case("p3", 3)]
    #[case("g0", 4)]
    #[case("G3", 7)]
    fn link_bits_follow_declaration_order(#[case] link: &str, #[case] bit: u32) {
        let selector = build_bandwidth_selector(link, "AGG_BW", true).expect("valid link");
        assert_eq!(u32::from(selector.link_mask), 1 << bit);
    }

    #[test]
    fn unknown_link_fails() {
        assert_eq!(
            build_bandwidth_selector("Z9", "AGG_BW", true),
            Err(CodecError::UnknownLink {
                token: "Z9".to_owned()
            })
        );
    }

    #[rstest]
    #[case("agg_bw", true, 0b001)]
    #[case("wr_bw", true, 0b100)]
    #[case("bogus", true, 0)]
    #[case("AGG_BW", false, 0b001)]
    #[case("RD_BW", false, 0)]
    fn type_mask_depends_on_link_class(
        #[case] bandwidth_type: &str,
        #[case] inter_socket: bool,
        #[case] expected: u8,
    ) {
        let selector =
            build_bandwidth_selector("G1", bandwidth_type, inter_socket).expect("valid link");
        assert_eq!(selector.type_mask, expected);
        assert_eq!(selector.has_type(), expected != 0);
    }

    #[test]
    fn milli_units_scale_by_one_thousand() {
        assert_eq!(milli_to_unit(123_456), 123.456);
    }
}
