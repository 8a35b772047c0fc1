//! Alignment analysis client.
//!
//! Submits the reference recording, the user recording, and the reference
//! text to the analysis provider, and parses the structured per-word
//! alignment result. A response that does not parse is surfaced as the
//! distinct invalid-response error kind: retrying malformed JSON with the
//! same instruction is unlikely to help, so the caller gets to decide.

pub mod types;

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

pub use types::{AnalysisResult, PronunciationNotes, WordAlignment, WordStatus};

use crate::core::audio::to_transport_text;
use crate::errors::{EngineError, EngineResult};

/// Fixed instruction sent with every analysis request. Requires a status
/// classification for every word of the reference text and, where
/// estimable, four timestamps in seconds.
const ANALYSIS_INSTRUCTION: &str = "Compare the user's recording against the reference \
recording of the given text. For every word of the reference text, in order, return a \
status of good, average, or poor, a phonetic transcription and issue note where helpful, \
and where estimable four timestamps in seconds: refStart, refEnd, userStart, userEnd. \
Also return an overall 0-100 score, a fluency remark, pronunciation strengths and \
weaknesses, an intonation remark, and suggestions. Respond with strict JSON only \
matching the agreed schema.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisRequest<'a> {
    user_audio: String,
    user_mime: &'a str,
    ref_audio: String,
    ref_text: &'a str,
    instruction_text: &'a str,
}

/// HTTP client for the alignment analysis provider.
pub struct AlignmentClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl AlignmentClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Submits both recordings plus the reference text for comparative
    /// scoring. The returned word list is ordered to match `ref_text`.
    pub async fn analyze(
        &self,
        user_audio: &[u8],
        user_mime: &str,
        ref_audio: &[u8],
        ref_text: &str,
    ) -> EngineResult<AnalysisResult> {
        let request = AnalysisRequest {
            user_audio: to_transport_text(user_audio),
            user_mime,
            ref_audio: to_transport_text(ref_audio),
            ref_text,
            instruction_text: ANALYSIS_INSTRUCTION,
        };

        debug!(
            user_bytes = user_audio.len(),
            ref_bytes = ref_audio.len(),
            "Submitting recordings for alignment analysis"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout(format!("analysis: {e}"))
                } else {
                    EngineError::Transport(format!("analysis: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Transport(format!("analysis: HTTP {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| EngineError::Transport(format!("analysis: {e}")))?;

        let result = parse_analysis_response(&body)?;
        info!(
            score = result.score,
            words = result.words.len(),
            "Analysis result received"
        );
        Ok(result)
    }
}

/// Parses and validates a provider response body. Malformed payloads and
/// out-of-range scores both become invalid-response errors, kept distinct
/// from transport failures.
pub fn parse_analysis_response(body: &[u8]) -> EngineResult<AnalysisResult> {
    let result: AnalysisResult = serde_json::from_slice(body)
        .map_err(|e| EngineError::InvalidResponse(format!("analysis: {e}")))?;

    if result.score > 100 {
        return Err(EngineError::InvalidResponse(format!(
            "analysis: score {} out of range",
            result.score
        )));
    }
    if result.words.is_empty() {
        return Err(EngineError::InvalidResponse(
            "analysis: empty word alignment list".to_string(),
        ));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_body() -> Vec<u8> {
        serde_json::json!({
            "score": 82,
            "fluency": "Mostly smooth with minor hesitation",
            "words": [
                {
                    "word": "hello",
                    "status": "good",
                    "refStart": 0.0,
                    "refEnd": 0.4,
                    "userStart": 0.1,
                    "userEnd": 0.6
                },
                {
                    "word": "world",
                    "status": "poor",
                    "phonetic": "/wɜːld/",
                    "issue": "vowel too short"
                }
            ],
            "pronunciation": {
                "strengths": ["clear consonants"],
                "weaknesses": ["long vowels"]
            },
            "intonation": "Falling intonation missing at sentence ends",
            "suggestions": "Slow down on multi-syllable words"
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_parse_valid_response_preserves_word_order() {
        let result = parse_analysis_response(&valid_body()).unwrap();
        assert_eq!(result.score, 82);
        assert_eq!(result.words.len(), 2);
        assert_eq!(result.words[0].word, "hello");
        assert_eq!(result.words[1].word, "world");
        assert!(result.words[0].has_explicit_bounds());
        assert!(!result.words[1].has_explicit_bounds());
    }

    #[test]
    fn test_malformed_json_is_invalid_response() {
        let err = parse_analysis_response(b"I think it went well!").unwrap_err();
        assert!(matches!(err, EngineError::InvalidResponse(_)));
    }

    #[test]
    fn test_score_out_of_range_rejected() {
        let body = valid_body();
        let text = String::from_utf8(body).unwrap().replace("82", "182");
        let err = parse_analysis_response(text.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidResponse(_)));
    }

    #[test]
    fn test_empty_word_list_rejected() {
        let body = serde_json::json!({
            "score": 50,
            "fluency": "",
            "words": [],
            "pronunciation": { "strengths": [], "weaknesses": [] },
            "intonation": "",
            "suggestions": ""
        })
        .to_string();
        let err = parse_analysis_response(body.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidResponse(_)));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let body = String::from_utf8(valid_body())
            .unwrap()
            .replace("\"good\"", "\"excellent\"");
        let err = parse_analysis_response(body.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidResponse(_)));
    }
}
