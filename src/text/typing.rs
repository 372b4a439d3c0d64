use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::prng::SeededRng;

/// Per-character delay range in milliseconds, `[min, max)`.
pub const CHAR_DELAY_MS: (f64, f64) = (30.0, 80.0);
/// Pause before each word after the first, `[min, max)` milliseconds.
pub const WORD_PAUSE_MS: (f64, f64) = (100.0, 400.0);

/// Question text as displayed by the typewriter: words joined by single spaces.
pub fn display_text(question: &str) -> String {
    question.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of delays [`generate_typing_intervals`] emits for `question`.
pub fn expected_interval_count(question: &str) -> usize {
    let mut words = 0usize;
    let mut chars = 0usize;
    for word in question.split_whitespace() {
        words += 1;
        chars += word.chars().count();
    }
    chars + words.saturating_sub(1)
}

/// Delays in milliseconds, one per character plus one pause before every word but the first.
///
/// Order is display order: `[c, c, c, pause, c, c, pause, c, ...]`. Empty text yields an empty
/// sequence.
pub fn generate_typing_intervals(question: &str, seed: &str) -> Vec<f64> {
    let mut rng = SeededRng::from_seed(seed);
    let mut out = Vec::with_capacity(expected_interval_count(question));
    for (w, word) in question.split_whitespace().enumerate() {
        if w > 0 {
            out.push(rng.range_f64(WORD_PAUSE_MS.0, WORD_PAUSE_MS.1));
        }
        for _ in word.chars() {
            out.push(rng.range_f64(CHAR_DELAY_MS.0, CHAR_DELAY_MS.1));
        }
    }
    out
}

/// Sum of all delays, in seconds.
pub fn typewriter_total_secs(intervals_ms: &[f64]) -> f64 {
    intervals_ms.iter().sum::<f64>() / 1000.0
}

/// Times (seconds from typewriter start) at which each character of [`display_text`] appears.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RevealSchedule {
    pub times: Vec<f64>,
}

impl RevealSchedule {
    /// Pair the display text of `question` with `intervals_ms`.
    ///
    /// Inter-word pauses reveal the separating space.
    pub fn build(question: &str, intervals_ms: &[f64]) -> ReelResult<Self> {
        let expected = expected_interval_count(question);
        if intervals_ms.len() != expected {
            return Err(ReelError::validation(format!(
                "typing intervals length {} does not match question ({} expected)",
                intervals_ms.len(),
                expected
            )));
        }
        if intervals_ms.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(ReelError::validation(
                "typing intervals must be finite and >= 0",
            ));
        }

        let mut t = 0.0;
        let times = intervals_ms
            .iter()
            .map(|d| {
                t += d / 1000.0;
                t
            })
            .collect();
        Ok(Self { times })
    }

    /// Number of characters visible `elapsed` seconds after the typewriter started.
    pub fn visible_at(&self, elapsed: f64) -> usize {
        self.times.partition_point(|&t| t <= elapsed)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn total_secs(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/typing.rs"]
mod tests;
