//! # Builder: Generate-and-Test Prime Construction
//!
//! Orchestrates [`CandidateGenerator`] and the primality tester in a bounded
//! loop:
//!
//! ```text
//!   ┌──────► Draw ──► Test ──► SafeTest ──► Accept
//!   │          │        │          │
//!   └──────────┴────────┴──────────┘  (reject: discard, draw again)
//! ```
//!
//! - **Draw**: one candidate from the generator (counts against the budget).
//! - **Test**: the candidate through the automatic round policy. For safe
//!   primes, `q = (p - 1) / 2` is also trial-divided here so most bad pairs are
//!   dropped before any Miller–Rabin work.
//! - **SafeTest**: only when `safe`; full test of `q`.
//! - **Accept**: encode with `ceil(bits / 8)` bytes plus the sign guard.
//!
//! The loop is bounded by an attempt budget (64·bits draws, 64·bits² for safe
//! primes, both orders of magnitude above the prime-number-theorem
//! expectation). Parameters are validated before the first random draw.

use rand::{CryptoRng, RngCore};
use rug::Integer;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::candidate::{CandidateGenerator, Constraint, DEFAULT_MAX_REDRAWS};
use crate::codec;
use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use crate::primality::{self, Screen};

/// Smallest bit length with distinct positions for the top two bits and the
/// odd bit.
pub const MIN_BITS: u32 = 3;

/// Largest bit length accepted.
pub const MAX_BITS: u32 = 65_536;

/// Budget multiplier: draws per bit (per bit² for safe primes).
const ATTEMPTS_PER_BIT: u64 = 64;

/// Parameters of a single generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub bits: u32,
    pub safe: bool,
    pub constraint: Option<Constraint>,
}

impl GenerateRequest {
    pub fn new(bits: u32, safe: bool) -> Self {
        GenerateRequest {
            bits,
            safe,
            constraint: None,
        }
    }

    pub fn with_constraint(mut self, add: Integer, rem: Integer) -> Self {
        self.constraint = Some(Constraint::new(add, rem));
        self
    }

    /// Build a request from big-endian constraint buffers, which must be
    /// given together or not at all.
    pub fn from_buffers(
        bits: u32,
        safe: bool,
        add: Option<&[u8]>,
        rem: Option<&[u8]>,
    ) -> Result<Self> {
        let request = GenerateRequest::new(bits, safe);
        match (add, rem) {
            (None, None) => Ok(request),
            (Some(add), Some(rem)) => {
                Ok(request.with_constraint(codec::decode(add), codec::decode(rem)))
            }
            (Some(_), None) => Err(Error::usage("rem", "required when add is given")),
            (None, Some(_)) => Err(Error::usage("add", "required when rem is given")),
        }
    }

    /// Reject parameters no candidate can satisfy. Needs no randomness.
    pub fn validate(&self) -> Result<()> {
        let bits = self.bits;
        if bits < MIN_BITS {
            return Err(Error::usage(
                "bits",
                format!("must be at least {MIN_BITS}, got {bits}"),
            ));
        }
        if bits > MAX_BITS {
            return Err(Error::usage(
                "bits",
                format!("must be at most {MAX_BITS}, got {bits}"),
            ));
        }
        let Some(Constraint { add, rem }) = &self.constraint else {
            return Ok(());
        };
        if *add <= 0 {
            return Err(Error::usage("add", format!("must be positive, got {add}")));
        }
        if add.significant_bits() as u32 > bits {
            return Err(Error::usage(
                "add",
                format!(
                    "must not be wider than the requested {bits} bits, got {} bits",
                    add.significant_bits()
                ),
            ));
        }
        if *rem < 0 || rem >= add {
            return Err(Error::usage(
                "rem",
                format!("must be in [0, add), got {rem} with add = {add}"),
            ));
        }
        if add.is_even() && rem.is_even() {
            return Err(Error::usage(
                "rem",
                format!("must be odd when add is even, got {rem} with add = {add}"),
            ));
        }
        if self.safe && add.is_divisible_u(4) && rem.mod_u(4) != 3 {
            return Err(Error::usage(
                "rem",
                format!(
                    "safe primes are 3 mod 4, but add = {add} is a multiple of 4 \
                     and rem = {rem} is {} mod 4",
                    rem.mod_u(4)
                ),
            ));
        }
        // A common factor g of add and rem divides every candidate, so only
        // p = g could qualify, and that is never a random choice.
        let shared = Integer::from(add.gcd_ref(rem));
        if shared != 1 {
            return Err(Error::usage(
                "rem",
                format!("shares the factor {shared} with add = {add}, so no candidate is prime"),
            ));
        }
        if self.safe {
            // An odd r dividing add and rem - 1 divides every (p-1)/2.
            let rem_minus_one = Integer::from(rem - 1u32);
            let mut shared = Integer::from(add.gcd_ref(&rem_minus_one));
            let twos = shared.find_one(0).unwrap_or(0);
            shared >>= twos;
            if shared != 1 {
                return Err(Error::usage(
                    "rem",
                    format!(
                        "safe primes need (p-1)/2 prime, but {shared} divides both add = {add} \
                         and rem - 1 = {rem_minus_one}"
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Draw,
    Test,
    SafeTest,
    Accept,
}

/// Generate-and-test driver. Holds only limits; every call is independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeBuilder {
    max_attempts: Option<u64>,
    max_redraws: u32,
}

impl Default for PrimeBuilder {
    fn default() -> Self {
        PrimeBuilder {
            max_attempts: None,
            max_redraws: DEFAULT_MAX_REDRAWS,
        }
    }
}

impl PrimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        PrimeBuilder {
            max_attempts: config.max_attempts,
            max_redraws: config.max_redraws,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    pub fn with_max_redraws(mut self, max_redraws: u32) -> Self {
        self.max_redraws = max_redraws.max(1);
        self
    }

    /// Draw budget for a request of this shape.
    pub fn attempt_budget(&self, bits: u32, safe: bool) -> u64 {
        if let Some(max) = self.max_attempts {
            return max;
        }
        let bits = u64::from(bits);
        if safe {
            ATTEMPTS_PER_BIT.saturating_mul(bits).saturating_mul(bits)
        } else {
            ATTEMPTS_PER_BIT.saturating_mul(bits)
        }
    }

    /// Generate a prime and encode it big-endian with a sign guard byte.
    pub fn generate<R: RngCore + CryptoRng + ?Sized>(
        &self,
        rng: &mut R,
        request: &GenerateRequest,
    ) -> Result<Vec<u8>> {
        let prime = self.generate_integer(rng, request)?;
        Ok(codec::encode(&prime, codec::min_bytes_for_bits(request.bits)))
    }

    /// Generate a prime as an integer.
    pub fn generate_integer<R: RngCore + CryptoRng + ?Sized>(
        &self,
        rng: &mut R,
        request: &GenerateRequest,
    ) -> Result<Integer> {
        request.validate()?;

        let GenerateRequest { bits, safe, .. } = *request;
        let budget = self.attempt_budget(bits, safe);
        let generator = CandidateGenerator::new(bits, safe, request.constraint.as_ref())
            .with_max_redraws(self.max_redraws);
        debug!(
            bits,
            safe,
            constrained = request.constraint.is_some(),
            budget,
            "generating prime"
        );

        let start = Instant::now();
        let mut attempts: u64 = 0;
        let mut candidate = Integer::new();
        let mut stage = Stage::Draw;

        while stage != Stage::Accept {
            stage = match stage {
                Stage::Draw => {
                    if attempts >= budget {
                        warn!(bits, safe, attempts, "prime generation exhausted its budget");
                        return Err(Error::Exhausted { bits, attempts });
                    }
                    attempts += 1;
                    candidate = generator.next(rng)?;
                    Stage::Test
                }
                Stage::Test => {
                    if safe && primality::screen(&half_below(&candidate)) == Screen::Composite {
                        trace!(attempts, "(p-1)/2 has a small factor, redrawing");
                        Stage::Draw
                    } else if primality::is_prime(rng, &candidate, 0)? {
                        if safe {
                            Stage::SafeTest
                        } else {
                            Stage::Accept
                        }
                    } else {
                        trace!(attempts, "candidate composite, redrawing");
                        Stage::Draw
                    }
                }
                Stage::SafeTest => {
                    if primality::is_prime(rng, &half_below(&candidate), 0)? {
                        Stage::Accept
                    } else {
                        trace!(attempts, "(p-1)/2 composite, redrawing");
                        Stage::Draw
                    }
                }
                Stage::Accept => Stage::Accept,
            };
        }

        info!(
            bits,
            safe,
            attempts,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "prime generated"
        );
        Ok(candidate)
    }

    /// Decode `buffer` and test it; `rounds == 0` selects automatically.
    pub fn check<R: RngCore + CryptoRng + ?Sized>(
        rng: &mut R,
        buffer: &[u8],
        rounds: u32,
    ) -> Result<bool> {
        let value = codec::decode(buffer);
        primality::is_prime(rng, &value, rounds)
    }
}

/// `(p - 1) / 2` for odd `p`.
fn half_below(p: &Integer) -> Integer {
    Integer::from(p >> 1u32)
}
