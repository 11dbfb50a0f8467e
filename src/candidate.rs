//! # Candidate: Random Odd Candidates of Exact Bit Length
//!
//! Draws `bits` random bits and forces a fixed pattern:
//!
//! - the top bit, so the candidate has exactly `bits` bits;
//! - the second-highest bit, so a product of two such values never comes up
//!   one bit short;
//! - the bottom bit (odd);
//! - for safe primes, bit 1 as well, giving `candidate ≡ 3 (mod 4)` so that
//!   `(candidate - 1) / 2` is odd.
//!
//! With a congruence constraint `(add, rem)` the candidate is moved up to the
//! next value `≡ rem (mod add)`, then stepped by `add` through a short window
//! until the parity pattern holds again. Moving up past `2^bits` or leaving
//! the window without a fit discards the draw. One call returns one
//! candidate; primality is the caller's business.

use rand::{CryptoRng, RngCore};
use rug::Integer;
use tracing::trace;

use crate::entropy;
use crate::error::{Error, Result};

/// Default number of consecutive unusable draws before giving up.
pub const DEFAULT_MAX_REDRAWS: u32 = 64;

/// Steps of `+add` tried after the first congruent value. Four covers every
/// residue mod 4 when `add` is odd.
const FIT_WINDOW: u32 = 4;

/// A congruence constraint: accepted values satisfy `p ≡ rem (mod add)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub add: Integer,
    pub rem: Integer,
}

impl Constraint {
    pub fn new(add: Integer, rem: Integer) -> Self {
        Constraint { add, rem }
    }

    /// True if `value ≡ rem (mod add)`.
    pub fn is_satisfied_by(&self, value: &Integer) -> bool {
        Integer::from(value % &self.add) == self.rem
    }
}

/// Produces candidates for one generation request.
#[derive(Debug, Clone)]
pub struct CandidateGenerator<'a> {
    bits: u32,
    safe: bool,
    constraint: Option<&'a Constraint>,
    max_redraws: u32,
}

impl<'a> CandidateGenerator<'a> {
    /// `bits` must be at least 3; [`crate::builder::GenerateRequest`]
    /// validates this before a generator is built.
    pub fn new(bits: u32, safe: bool, constraint: Option<&'a Constraint>) -> Self {
        CandidateGenerator {
            bits,
            safe,
            constraint,
            max_redraws: DEFAULT_MAX_REDRAWS,
        }
    }

    pub fn with_max_redraws(mut self, max_redraws: u32) -> Self {
        self.max_redraws = max_redraws.max(1);
        self
    }

    /// Next candidate matching the forced bit pattern and the constraint.
    ///
    /// Fails with [`Error::Exhausted`] when `max_redraws` consecutive draws
    /// could not be fitted to the constraint.
    pub fn next<R: RngCore + CryptoRng + ?Sized>(&self, rng: &mut R) -> Result<Integer> {
        for redraw in 0..self.max_redraws {
            let candidate = self.draw(rng)?;
            let Some(constraint) = self.constraint else {
                return Ok(candidate);
            };
            if let Some(fitted) = self.fit(candidate, constraint) {
                return Ok(fitted);
            }
            trace!(bits = self.bits, redraw, "candidate: constraint fit failed, redrawing");
        }
        Err(Error::Exhausted {
            bits: self.bits,
            attempts: u64::from(self.max_redraws),
        })
    }

    /// Random `bits`-bit value with the forced pattern applied.
    fn draw<R: RngCore + CryptoRng + ?Sized>(&self, rng: &mut R) -> Result<Integer> {
        let mut candidate = entropy::random_bits(rng, self.bits)?;
        candidate.set_bit(self.bits - 1, true);
        candidate.set_bit(self.bits - 2, true);
        candidate.set_bit(0, true);
        if self.safe {
            candidate.set_bit(1, true);
        }
        Ok(candidate)
    }

    /// Smallest value `>= candidate` that is congruent, odd (and `3 mod 4`
    /// when safe) within the window, still `bits` bits wide.
    fn fit(&self, candidate: Integer, constraint: &Constraint) -> Option<Integer> {
        let r = Integer::from(&candidate % &constraint.add);
        let mut delta = Integer::from(&constraint.rem - &r);
        if delta < 0 {
            delta += &constraint.add;
        }
        let mut fitted = candidate + delta;
        // fitted only grows from a value with the top two bits set, so staying
        // within `bits` bits keeps both of them set.
        for _ in 0..FIT_WINDOW {
            if fitted.significant_bits() as u32 > self.bits {
                return None;
            }
            if self.has_parity_pattern(&fitted) {
                return Some(fitted);
            }
            fitted += &constraint.add;
        }
        None
    }

    fn has_parity_pattern(&self, value: &Integer) -> bool {
        if self.safe {
            value.mod_u(4) == 3
        } else {
            value.is_odd()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::testing::BrokenRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2024)
    }

    fn assert_pattern(c: &Integer, bits: u32) {
        assert_eq!(c.significant_bits() as u32, bits, "{c} is not {bits} bits");
        assert!(c.get_bit(bits - 1));
        assert!(c.get_bit(bits - 2), "{c} lacks second-highest bit");
        assert!(c.is_odd(), "{c} is even");
    }

    #[test]
    fn candidates_have_forced_pattern() {
        let mut rng = rng();
        for bits in [3u32, 4, 8, 9, 16, 64, 65, 512] {
            let generator = CandidateGenerator::new(bits, false, None);
            for _ in 0..50 {
                let c = generator.next(&mut rng).unwrap();
                assert_pattern(&c, bits);
            }
        }
    }

    #[test]
    fn safe_candidates_are_three_mod_four() {
        let mut rng = rng();
        let generator = CandidateGenerator::new(128, true, None);
        for _ in 0..100 {
            let c = generator.next(&mut rng).unwrap();
            assert_pattern(&c, 128);
            assert_eq!(c.mod_u(4), 3);
        }
    }

    #[test]
    fn three_bit_candidate_is_seven() {
        let mut rng = rng();
        let generator = CandidateGenerator::new(3, false, None);
        assert_eq!(generator.next(&mut rng).unwrap(), 7);
    }

    #[test]
    fn candidates_vary_between_draws() {
        let mut rng = rng();
        let generator = CandidateGenerator::new(256, false, None);
        let a = generator.next(&mut rng).unwrap();
        let b = generator.next(&mut rng).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn same_seed_gives_same_candidate() {
        let generator = CandidateGenerator::new(256, false, None);
        let a = generator.next(&mut StdRng::seed_from_u64(9)).unwrap();
        let b = generator.next(&mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn constrained_candidates_satisfy_congruence() {
        let mut rng = rng();
        let constraint = Constraint::new(Integer::from(12), Integer::from(11));
        let generator = CandidateGenerator::new(64, false, Some(&constraint));
        for _ in 0..100 {
            let c = generator.next(&mut rng).unwrap();
            assert_pattern(&c, 64);
            assert!(constraint.is_satisfied_by(&c), "{c} mod 12 != 11");
        }
    }

    #[test]
    fn odd_modulus_with_even_remainder_still_yields_odd_candidates() {
        let mut rng = rng();
        let constraint = Constraint::new(Integer::from(7), Integer::from(2));
        for safe in [false, true] {
            let generator = CandidateGenerator::new(48, safe, Some(&constraint));
            for _ in 0..100 {
                let c = generator.next(&mut rng).unwrap();
                assert_pattern(&c, 48);
                assert!(constraint.is_satisfied_by(&c));
                if safe {
                    assert_eq!(c.mod_u(4), 3);
                }
            }
        }
    }

    #[test]
    fn safe_with_modulus_two_mod_four() {
        let mut rng = rng();
        // p ≡ 1 (mod 6) forces odd; stepping by 6 alternates p mod 4 between 1 and 3
        let constraint = Constraint::new(Integer::from(6), Integer::from(1));
        let generator = CandidateGenerator::new(40, true, Some(&constraint));
        for _ in 0..100 {
            let c = generator.next(&mut rng).unwrap();
            assert!(constraint.is_satisfied_by(&c));
            assert_eq!(c.mod_u(4), 3);
        }
    }

    #[test]
    fn unreachable_window_exhausts() {
        // 16-bit candidates live in [49152, 65536); 40001 and 80001 both miss it
        let constraint = Constraint::new(Integer::from(40000), Integer::from(1));
        let generator = CandidateGenerator::new(16, false, Some(&constraint)).with_max_redraws(8);
        let err = generator.next(&mut rng()).unwrap_err();
        assert_eq!(
            err,
            Error::Exhausted {
                bits: 16,
                attempts: 8
            }
        );
    }

    #[test]
    fn broken_source_is_resource_failure() {
        let generator = CandidateGenerator::new(64, false, None);
        assert!(matches!(
            generator.next(&mut BrokenRng),
            Err(Error::Resource(_))
        ));
    }
}
