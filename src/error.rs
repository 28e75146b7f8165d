//! Error taxonomy for the engine
//!
//! Errors are values, never control-flow interrupts. Most invalid inputs are
//! absorbed locally (out-of-bounds writes are no-ops, rejected commands leave
//! the document unchanged); the variants below cover the cases the driver
//! actually needs to hear about.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A caller-supplied argument was outside its documented domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was attempted against document state that forbids it.
    #[error("state violation: {0}")]
    StateViolation(String),

    /// Document load/save failed; the prior document stays loaded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A bounded resource (history, buffers) hit its cap.
    #[error("resource exhausted: {0}")]
    ResourceExhaustion(String),

    /// A floating selection could not be committed (owner layer vanished).
    #[error("floating selection stuck: {0}")]
    FloatingStuck(String),

    /// The render target does not match the source dimensions.
    #[error("rendering error: {0}")]
    Rendering(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for EngineError {
    fn from(err: base64::DecodeError) -> Self {
        EngineError::Serialization(format!("base64: {err}"))
    }
}
