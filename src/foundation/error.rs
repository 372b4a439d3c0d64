/// Crate-wide result alias.
pub type ReelResult<T> = Result<T, ReelError>;

/// Error type for every fallible operation in the synthesis pipeline.
///
/// Variants map onto three handling classes, see [`ErrorClass`].
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Missing render-target elements, unsupported environment, empty required inputs.
    #[error("configuration error: {0}")]
    Config(String),

    /// A value failed a structural check (bad sizes, out-of-order samples, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Audio could not be decoded or resampled. Callers fall back to silence.
    #[error("audio error: {0}")]
    Audio(String),

    /// The encoder failed while frames were being produced.
    #[error("encode error: {0}")]
    Encode(String),

    /// The render was cancelled through its [`crate::CancelFlag`].
    #[error("render cancelled")]
    Cancelled,

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually IO with attached context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// How an error must be handled by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Fatal, raised before any frame work starts.
    Configuration,
    /// Non-fatal, resolved by a silent or no-audio fallback.
    Degraded,
    /// Aborts the whole render, no partial output.
    Fatal,
}

impl ReelError {
    /// Build a [`ReelError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`ReelError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Audio`].
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Build a [`ReelError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReelError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Classify this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Serde(_) => ErrorClass::Configuration,
            Self::Audio(_) => ErrorClass::Degraded,
            Self::Encode(_) | Self::Cancelled | Self::Other(_) => ErrorClass::Fatal,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
