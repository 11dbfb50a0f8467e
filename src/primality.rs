//! # Primality: Trial Division + Miller–Rabin
//!
//! Decides primality of arbitrary-precision integers in short-circuiting
//! stages:
//!
//! 1. **Tiny values**: below 2 is composite, 2 and 3 are prime.
//! 2. **Parity**: even values above 2 are composite.
//! 3. **Trial division** by the 96 odd primes below 512. A survivor below
//!    512² has no factor at or below its square root, so it is prime outright.
//! 4. **Round selection**: `rounds == 0` picks a count from [`auto_rounds`].
//! 5. **Miller–Rabin** with a fresh uniformly random base in `[2, n-2]` per
//!    round, drawn from the injected source.
//!
//! A prime is never rejected. A composite survives all rounds with
//! probability at most 4^-rounds for adversarial inputs, and far less for
//! random candidates.
//!
//! ## Automatic Round Count
//!
//! The step table follows the Damgård–Landrock–Pomerance bound for random
//! odd candidates, targeting a false-positive rate of at most 2^-128 (the
//! same thresholds BoringSSL uses for `BN_prime_checks_for_generation`).
//! Longer inputs need fewer rounds because a random composite of that size
//! is overwhelmingly unlikely to be a strong pseudoprime to a random base.
//!
//! ## References
//!
//! - I. Damgård, P. Landrock, C. Pomerance, "Average case error estimates for
//!   the strong probable prime test", Math. Comp. 61 (1993), 177–194.
//! - FIPS 186-5, Appendix B.3.

use rand::{CryptoRng, RngCore};
use rug::Integer;

use crate::entropy;
use crate::error::{Error, Result};

/// Odd primes below 512 for the trial-division stage.
pub const SMALL_PRIMES: [u32; 96] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307,
    311, 313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419, 421,
    431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503, 509,
];

/// Odd values below this that survive trial division are prime.
const TRIAL_DIVISION_BOUND: u32 = 512 * 512;

/// `(min_bits, rounds)`, checked top-down.
const ROUND_TABLE: [(u32, u32); 7] = [
    (3747, 3),
    (1345, 4),
    (476, 5),
    (400, 6),
    (347, 7),
    (308, 8),
    (55, 27),
];

/// Rounds used below the smallest table entry.
const MAX_AUTO_ROUNDS: u32 = 34;

/// Miller–Rabin rounds for a `bits`-bit input when the caller asks for the
/// automatic policy.
pub fn auto_rounds(bits: u32) -> u32 {
    ROUND_TABLE
        .iter()
        .find(|&&(min_bits, _)| bits >= min_bits)
        .map(|&(_, rounds)| rounds)
        .unwrap_or(MAX_AUTO_ROUNDS)
}

/// Outcome of the deterministic pre-filter stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Prime,
    Composite,
    /// Passed trial division; only a probabilistic test can decide.
    Undecided,
}

/// Stages 1–3: tiny values, parity, and trial division.
pub fn screen(n: &Integer) -> Screen {
    if *n < 2 {
        return Screen::Composite;
    }
    if *n <= 3 {
        return Screen::Prime;
    }
    if n.is_even() {
        return Screen::Composite;
    }
    if has_small_factor(n) {
        return Screen::Composite;
    }
    if *n < TRIAL_DIVISION_BOUND {
        Screen::Prime
    } else {
        Screen::Undecided
    }
}

/// Quick check if n is divisible by any odd small prime.
/// Returns true if n is definitely composite (has a small factor).
/// Returns false if n might be prime (passed trial division).
pub fn has_small_factor(n: &Integer) -> bool {
    for &p in &SMALL_PRIMES {
        if n.is_divisible_u(p) {
            // If n equals the small prime itself, it's prime, not composite
            return *n > p;
        }
    }
    false
}

/// Full test: screen, then `rounds` Miller–Rabin rounds (`0` = automatic).
pub fn is_prime<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    n: &Integer,
    rounds: u32,
) -> Result<bool> {
    match screen(n) {
        Screen::Prime => Ok(true),
        Screen::Composite => Ok(false),
        Screen::Undecided => {
            let rounds = if rounds == 0 {
                auto_rounds(n.significant_bits() as u32)
            } else {
                rounds
            };
            miller_rabin(rng, n, rounds)
        }
    }
}

/// Miller–Rabin with random bases. `n` must be odd and at least 5.
///
/// Returns `Ok(false)` on the first round whose base witnesses compositeness.
pub fn miller_rabin<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    n: &Integer,
    rounds: u32,
) -> Result<bool> {
    if *n < 5 || n.is_even() {
        return Err(Error::usage(
            "n",
            format!("miller_rabin requires an odd modulus >= 5, got {n}"),
        ));
    }

    // n - 1 = d * 2^s with d odd
    let n_minus_one = Integer::from(n - 1u32);
    let s = n_minus_one.find_one(0).unwrap_or(0);
    let d = Integer::from(&n_minus_one >> s);
    // Bases are drawn from [2, n-2], a span of n-3 values.
    let base_span = Integer::from(n - 3u32);

    'witness: for _ in 0..rounds {
        let base = entropy::random_below(rng, &base_span)? + 2u32;
        let mut x = base
            .pow_mod(&d, n)
            .map_err(|_| Error::Resource("modular exponentiation failed".into()))?;

        if x == 1 || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x.square_mut();
            x %= n;
            if x == n_minus_one {
                continue 'witness;
            }
            if x == 1 {
                return Ok(false);
            }
        }
        return Ok(false);
    }
    Ok(true)
}
