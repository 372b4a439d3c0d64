use crate::text::{reflow, typing};

pub const MIN_QUESTION_SECS: f64 = 2.0;
pub const PER_QUESTION_LINE_SECS: f64 = 0.8;
pub const TYPEWRITER_TAIL_SECS: f64 = 1.0;
pub const MIN_ANSWER_SECS: f64 = 4.0;
pub const PER_ANSWER_LINE_SECS: f64 = 0.6;
pub const TRANSITION_SECS: f64 = 0.4;
pub const HOLD_SECS: f64 = 0.5;

/// Breakdown of a video's length in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct DurationEstimate {
    pub typewriter: f64,
    pub question: f64,
    pub transition: f64,
    pub answer: f64,
    pub hold: f64,
    pub total: f64,
}

impl DurationEstimate {
    /// Offset of the first answer frame.
    pub fn answer_start(&self) -> f64 {
        self.question + self.transition
    }
}

/// Estimate durations from already derived inputs.
pub fn estimate_duration(
    question_lines: usize,
    typing_intervals_ms: &[f64],
    answer_lines: usize,
) -> DurationEstimate {
    let typewriter = typing::typewriter_total_secs(typing_intervals_ms);
    let question = MIN_QUESTION_SECS.max(
        (question_lines as f64 * PER_QUESTION_LINE_SECS).max(typewriter + TYPEWRITER_TAIL_SECS),
    );
    let answer = MIN_ANSWER_SECS.max(answer_lines as f64 * PER_ANSWER_LINE_SECS);
    DurationEstimate {
        typewriter,
        question,
        transition: TRANSITION_SECS,
        answer,
        hold: HOLD_SECS,
        total: question + TRANSITION_SECS + answer + HOLD_SECS,
    }
}

/// Number of display lines the question wraps to.
pub fn question_line_count(question: &str) -> usize {
    reflow::wrap_words(question, reflow::WRAP_COLUMNS).len()
}

#[cfg(test)]
#[path = "../../tests/unit/timing/duration.rs"]
mod tests;
