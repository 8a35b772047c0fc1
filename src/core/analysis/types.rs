//! Alignment analysis result types.
//!
//! Provider JSON is parsed into these shapes at the boundary; anything
//! that does not fit becomes an invalid-response error rather than a
//! loosely-typed value propagating deeper into the system.

use serde::{Deserialize, Serialize};

/// Per-word pronunciation judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    Good,
    Average,
    Poor,
}

/// One word of the reference text with its judgment and optional time
/// bounds in both recordings. Index position matches word position in the
/// reference text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAlignment {
    pub word: String,
    pub status: WordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_end: Option<f64>,
}

impl WordAlignment {
    /// All four timestamps present, so segment bounds can be used
    /// directly instead of the proportional estimate.
    pub fn has_explicit_bounds(&self) -> bool {
        self.ref_start.is_some()
            && self.ref_end.is_some()
            && self.user_start.is_some()
            && self.user_end.is_some()
    }
}

/// Free-form strengths/weaknesses notes on pronunciation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PronunciationNotes {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Complete comparative scoring result for one recording submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Overall score, 0..=100.
    pub score: u8,
    pub fluency: String,
    /// Ordered to match the reference text's word order.
    pub words: Vec<WordAlignment>,
    pub pronunciation: PronunciationNotes,
    pub intonation: String,
    pub suggestions: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_status_lowercase_wire_names() {
        assert_eq!(serde_json::to_string(&WordStatus::Good).unwrap(), "\"good\"");
        let parsed: WordStatus = serde_json::from_str("\"poor\"").unwrap();
        assert_eq!(parsed, WordStatus::Poor);
    }

    #[test]
    fn test_alignment_with_partial_timestamps_is_not_explicit() {
        let alignment = WordAlignment {
            word: "hello".to_string(),
            status: WordStatus::Average,
            phonetic: None,
            issue: None,
            ref_start: Some(0.1),
            ref_end: Some(0.5),
            user_start: Some(0.2),
            user_end: None,
        };
        assert!(!alignment.has_explicit_bounds());
    }
}
