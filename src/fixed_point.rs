//! The MS430's numeric encodings.
//!
//! Non-integer quantities are sent as a whole-number part (one or two bytes,
//! little-endian) followed by a separate fraction byte holding tenths or hundredths.
//! Temperature additionally uses the top bit of its integer byte as a sign flag.
//!
//! These functions do no length checking; the decoders in [`crate::decode`] verify
//! buffer lengths before calling them.

/// Mask selecting the sign flag of an encoded temperature.
pub const TEMPERATURE_SIGN_MASK: u8 = 0x80;

/// Mask selecting the magnitude of an encoded temperature's integer part.
pub const TEMPERATURE_VALUE_MASK: u8 = 0x7F;

/// Decode an unsigned fixed-point value.
///
/// The first `int_width` bytes are the little-endian integer part and the byte after
/// them is the fractional part, counted in units of `10^-fraction_digits`.
///
/// ```
/// # use ms430_hal::fixed_point::decode_unsigned_fixed;
/// // 0x0102 + 34/100
/// let value = decode_unsigned_fixed(&[0x02, 0x01, 34], 2, 2);
/// assert!((value - 258.34).abs() < 1e-3);
/// ```
pub fn decode_unsigned_fixed(bytes: &[u8], int_width: usize, fraction_digits: u32) -> f32 {
    let integer = decode_uint_le(&bytes[..int_width]);
    let fraction = bytes[int_width];
    integer as f32 + f32::from(fraction) / 10u32.pow(fraction_digits) as f32
}

/// Decode a signed-magnitude value with a one decimal place fraction.
///
/// The magnitude is `(value_byte & value_mask) + fraction_byte / 10`, negated when
/// `value_byte & sign_mask` is non-zero. The sign applies to the combined value, so
/// `-0.5` is sent as `[0x80, 5]`.
pub fn decode_signed_magnitude(
    value_byte: u8,
    fraction_byte: u8,
    sign_mask: u8,
    value_mask: u8,
) -> f32 {
    let magnitude = f32::from(value_byte & value_mask) + f32::from(fraction_byte) / 10.0;
    if value_byte & sign_mask != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Split a `u16` into `[low, high]` bytes.
pub fn encode_u16_le(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

/// Combine `[low, high]` bytes into a `u16`.
pub fn decode_u16_le(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}

/// Combine four little-endian bytes into a `u32`.
pub fn decode_u32_le(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes)
}

/// Little-endian integer of up to four bytes.
fn decode_uint_le(bytes: &[u8]) -> u32 {
    debug_assert!(bytes.len() <= 4, "Integer part wider than 32 bits.");
    bytes
        .iter()
        .rev()
        .fold(0u32, |acc, &byte| (acc << 8) | u32::from(byte))
}

#[cfg(test)]
mod test {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn unsigned_fixed_single_byte_integer() {
        assert_approx_eq!(decode_unsigned_fixed(&[55, 3], 1, 1), 55.3, 1e-4);
        assert_approx_eq!(decode_unsigned_fixed(&[12, 5], 1, 2), 12.05, 1e-4);
    }

    #[test]
    fn unsigned_fixed_is_little_endian() {
        // 0x0E9E = 3742
        assert_eq!(decode_unsigned_fixed(&[0x9E, 0x0E, 0], 2, 2), 3742.0);
    }

    #[test]
    fn signed_magnitude_sign_applies_to_whole_value() {
        let t = |v, f| decode_signed_magnitude(v, f, TEMPERATURE_SIGN_MASK, TEMPERATURE_VALUE_MASK);
        assert_approx_eq!(t(21, 4), 21.4, 1e-4);
        assert_approx_eq!(t(0x80 | 21, 4), -21.4, 1e-4);
        assert_eq!(t(0x80, 5), -0.5);
        assert_approx_eq!(t(0x7F, 9), 127.9, 1e-4);
    }

    #[test]
    fn u16_bytes() {
        assert_eq!(encode_u16_le(0x1234), [0x34, 0x12]);
        assert_eq!(decode_u16_le([0x34, 0x12]), 0x1234);
        assert_eq!(decode_u32_le([0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
    }
}
