use crate::foundation::error::{ReelError, ReelResult};

/// Immutable question/answer input of a render.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContentPair {
    pub question: String,
    pub answer: String,
}

impl ContentPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Deterministic seed driving every pseudo-random choice for this content.
    ///
    /// `question-answer`, lower-cased, with whitespace runs collapsed to one space and trimmed.
    pub fn seed(&self) -> String {
        let raw = format!("{}-{}", self.question, self.answer).to_lowercase();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// A render needs a question; the answer may be empty.
    pub fn validate(&self) -> ReelResult<()> {
        if self.question.trim().is_empty() {
            return Err(ReelError::config("question text must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/pair.rs"]
mod tests;
