//! # Codec: Big-Endian Buffer Conversion
//!
//! Converts between flat big-endian byte buffers and `rug::Integer`
//! magnitudes. Sign is purely a serialization concern: decoding always yields
//! a non-negative value, and encoding prepends a zero guard byte whenever the
//! leading byte would otherwise read as negative to a two's-complement
//! consumer.

use rug::integer::Order;
use rug::Integer;

/// Interpret `buf` as a big-endian unsigned magnitude. Empty decodes to zero.
pub fn decode(buf: &[u8]) -> Integer {
    Integer::from_digits(buf, Order::Msf)
}

/// Big-endian magnitude of `value`, left-padded with zeros to at least
/// `min_len` bytes, plus one zero guard byte if the leading byte has its
/// high bit set. Zero encodes as a single zero byte (or its padding).
///
/// `value` must be non-negative; only its magnitude is written.
pub fn encode(value: &Integer, min_len: usize) -> Vec<u8> {
    let digits = value.to_digits::<u8>(Order::Msf);
    let len = digits.len().max(min_len).max(1);
    let mut out = vec![0u8; len - digits.len()];
    out.extend_from_slice(&digits);
    if out[0] & 0x80 != 0 {
        out.insert(0, 0);
    }
    out
}

/// Bytes needed to hold `bits` bits: `ceil(bits / 8)`.
pub fn min_bytes_for_bits(bits: u32) -> usize {
    (bits as usize).div_ceil(8)
}
