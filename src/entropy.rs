//! # Entropy: Injected Secure Random Source
//!
//! Every operation that needs randomness takes `&mut R` where
//! `R: RngCore + CryptoRng`. Production callers pass `OsRng`; tests pass a
//! seeded `StdRng`. A failing source is a [`Error::Resource`] and is never
//! retried.

use rand::{CryptoRng, RngCore};
use rug::integer::Order;
use rug::Integer;

use crate::error::{Error, Result};

/// Extra bits drawn beyond `bound`'s width so reduction bias stays below 2^-64.
const OVERSAMPLE_BITS: u32 = 64;

/// Fill `buf` from the source, mapping source failure to a resource error.
pub fn fill<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, buf: &mut [u8]) -> Result<()> {
    rng.try_fill_bytes(buf)
        .map_err(|e| Error::Resource(format!("random source unavailable: {e}")))
}

/// Exactly `bits` random bits as a non-negative integer (`< 2^bits`).
pub fn random_bits<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, bits: u32) -> Result<Integer> {
    let len = (bits as usize).div_ceil(8);
    let mut buf = vec![0u8; len];
    fill(rng, &mut buf)?;
    let excess = (len * 8) as u32 - bits;
    if let Some(first) = buf.first_mut() {
        *first &= 0xffu8 >> excess;
    }
    Ok(Integer::from_digits(&buf[..], Order::Msf))
}

/// A value in `[0, bound)`. `bound` must be positive.
pub fn random_below<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    bound: &Integer,
) -> Result<Integer> {
    if *bound <= 0 {
        return Err(Error::Resource(format!(
            "random_below called with non-positive bound {bound}"
        )));
    }
    let width = bound.significant_bits() as u32 + OVERSAMPLE_BITS;
    let mut value = random_bits(rng, width)?;
    value %= bound;
    Ok(value)
}
