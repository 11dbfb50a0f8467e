//! # primeforge: Random Prime Generation and Primality Checking
//!
//! Generates cryptographically strong random primes of an exact bit length,
//! optionally safe (`(p-1)/2` also prime) and optionally constrained to a
//! congruence class `p ≡ rem (mod add)`, the shapes needed for RSA and
//! Diffie-Hellman parameters. Also checks arbitrary big-endian integers for
//! primality.
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`codec`] | big-endian buffer ⇄ `rug::Integer`, sign guard byte |
//! | [`primality`] | trial division + Miller–Rabin, automatic round policy |
//! | [`candidate`] | random odd candidates with forced bit pattern and constraint |
//! | [`builder`] | bounded Draw → Test → SafeTest → Accept loop |
//! | [`entropy`] | injected `RngCore + CryptoRng` source |
//!
//! [`generate_prime`] and [`check_prime`] are the buffer-in/buffer-out entry
//! points backed by the operating system RNG. Everything underneath takes the
//! random source as a parameter so it can be seeded in tests.
//!
//! All calls are synchronous and self-contained. Generation time is
//! unbounded in the worst case short of the attempt budget; callers needing
//! bounded latency must enforce their own timeout.

pub mod builder;
pub mod candidate;
pub mod codec;
pub mod config;
pub mod entropy;
pub mod error;
pub mod primality;

pub use builder::{GenerateRequest, PrimeBuilder};
pub use candidate::{CandidateGenerator, Constraint};
pub use error::{Error, Result};

use rand::rngs::OsRng;

/// Generate a `bits`-bit prime and return it big-endian.
///
/// `add`/`rem` are big-endian constraint magnitudes and must be given
/// together. The result is `ceil(bits / 8)` bytes, plus a leading zero byte
/// when the high bit of the first byte is set.
pub fn generate_prime(
    bits: u32,
    safe: bool,
    add: Option<&[u8]>,
    rem: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let request = GenerateRequest::from_buffers(bits, safe, add, rem)?;
    PrimeBuilder::new().generate(&mut OsRng, &request)
}

/// Check whether the big-endian integer in `buffer` is prime.
/// `rounds == 0` selects the round count from the bit length.
pub fn check_prime(buffer: &[u8], rounds: u32) -> Result<bool> {
    PrimeBuilder::check(&mut OsRng, buffer, rounds)
}
