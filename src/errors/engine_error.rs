use thiserror::Error;

/// Engine-level error taxonomy.
///
/// Variants are `Clone` so an error can settle a shared in-flight future
/// that several callers are awaiting at once.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// A provider call failed at the network layer.
    #[error("transport error: {0}")]
    Transport(String),

    /// A provider call did not complete within its deadline. Treated the
    /// same as `Transport` for fallback-chain purposes.
    #[error("provider timed out: {0}")]
    Timeout(String),

    /// A provider responded, but the payload did not parse into the
    /// expected structure. Never retried against the same provider with
    /// the same input.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// Microphone access was denied or no input device is available.
    /// Not retryable without user action outside the engine.
    #[error("audio device unavailable: {0}")]
    DevicePermission(String),

    /// Every content provider in the chain failed. The message names each
    /// provider and its underlying failure.
    #[error("all content providers failed: {0}")]
    ProviderChain(String),

    /// Document-grounded extraction failed. There is no fallback for this
    /// branch, so the failure is terminal.
    #[error("document extraction failed: {0}")]
    Extraction(String),

    /// A component was driven out of turn (e.g. `stop` while idle).
    /// A programming error, not a runtime-recoverable condition.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Malformed audio container or transport text.
    #[error("audio codec error: {0}")]
    Codec(String),
}

impl EngineError {
    /// Whether a caller-facing retry affordance makes sense for this error.
    ///
    /// Invalid-response errors count as retryable from the user's
    /// perspective even though they are logged as a distinct kind.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            EngineError::DevicePermission(_) | EngineError::InvalidState(_)
        )
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
