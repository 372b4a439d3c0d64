//! String-seeded linear congruential generator.
//!
//! Every pseudo-random choice in a render goes through [`SeededRng`] so that the same content
//! always produces the same video. The constants are part of the output contract: changing them
//! changes typing rhythm, track choice and start offsets for existing content.

const MULTIPLIER: u64 = 9301;
const INCREMENT: u64 = 49297;
const MODULUS: u64 = 233_280;
const SEED_RANGE: u64 = 1000;

/// Deterministic draw source re-derivable from a string seed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Initial state is the sum of the seed's UTF-16 code units modulo 1000.
    pub fn from_seed(seed: &str) -> Self {
        let sum = seed
            .encode_utf16()
            .fold(0u64, |acc, unit| acc.wrapping_add(u64::from(unit)));
        Self {
            state: sum % SEED_RANGE,
        }
    }

    /// Numeric state before the next draw.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER + INCREMENT) % MODULUS;
        self.state as f64 / MODULUS as f64
    }

    /// Next value in `[min, max)`.
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// `floor(draw * n)`, always `< n` for `n > 0`.
    pub fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.next_f64() * n as f64).floor() as usize).min(n - 1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/prng.rs"]
mod tests;
