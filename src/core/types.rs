//! Core domain types for the shadow-reading practice engine.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Learner proficiency level. One of the two dimensions keying the
/// challenge cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    /// Short label used inside provider instructions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

/// Practice content style. The second cache-key dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Daily,
    #[serde(rename = "IELTS")]
    Ielts,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Daily => "daily",
            Mode::Ielts => "ielts",
        }
    }
}

/// A practice passage together with its synthesized reference audio.
///
/// Immutable once produced. The text and the audio are always created
/// together; a challenge is never exposed without a decodable reference
/// audio buffer.
#[derive(Debug, Clone)]
pub struct Challenge {
    /// Short topic label returned by the content provider.
    pub topic: String,
    /// Exactly three sentences of practice text.
    pub text: String,
    /// Set when the passage was extracted from an uploaded document.
    pub source_url: Option<String>,
    /// WAV-framed reference audio synthesized from `text`.
    pub reference_audio: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serde_names() {
        assert_eq!(serde_json::to_string(&Mode::Daily).unwrap(), "\"Daily\"");
        assert_eq!(serde_json::to_string(&Mode::Ielts).unwrap(), "\"IELTS\"");
        let parsed: Mode = serde_json::from_str("\"IELTS\"").unwrap();
        assert_eq!(parsed, Mode::Ielts);
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(Level::Beginner.as_str(), "beginner");
        assert_eq!(Level::Advanced.as_str(), "advanced");
    }
}
