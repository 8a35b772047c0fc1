//! Text-safe transport encoding for binary audio.
//!
//! Provider request/response bodies are JSON, so audio buffers travel as
//! base64 text. The round-trip must be byte-exact.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

use crate::errors::{EngineError, EngineResult};

/// Encodes a binary buffer for embedding in a JSON body.
pub fn to_transport_text(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes transport text back into the original bytes.
pub fn from_transport_text(text: &str) -> EngineResult<Bytes> {
    STANDARD
        .decode(text)
        .map(Bytes::from)
        .map_err(|e| EngineError::Codec(format!("invalid transport text: {e}")))
}
