//! Shared test helpers for integration tests.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use rug::integer::IsPrime;
use rug::Integer;

/// Deterministic source so failures reproduce.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Independent oracle: GMP's own Miller-Rabin (plus Baillie-PSW).
pub fn gmp_says_prime(n: &Integer) -> bool {
    n.is_probably_prime(40) != IsPrime::No
}

/// Bit length of a big-endian buffer's magnitude.
pub fn bit_length(buf: &[u8]) -> u32 {
    primeforge::codec::decode(buf).significant_bits() as u32
}
