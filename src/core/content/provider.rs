//! Content provider abstraction and the HTTP implementation.
//!
//! Providers are tried in order by the chain in `mod.rs`; each one takes
//! an instruction and returns a topic plus exactly three sentences of
//! text. Responses are parsed into an explicit shape at the boundary, and
//! malformed payloads become the distinct invalid-response error kind so
//! callers can tell "the provider is down" from "the provider spoke
//! nonsense".

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{EngineError, EngineResult};

/// A generated passage before synthesis: topic label plus text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PassageDraft {
    pub topic: String,
    pub text: String,
}

/// A provider that can turn an instruction into a passage draft.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Stable name used in logs and aggregated error messages.
    fn name(&self) -> &str;

    async fn generate(&self, instruction: &str) -> EngineResult<PassageDraft>;

    /// Document-grounded extraction. Only the primary provider can see
    /// uploaded documents; the default refuses.
    async fn extract_from_document(
        &self,
        _document_ref: &str,
        _instruction: &str,
    ) -> EngineResult<PassageDraft> {
        Err(EngineError::Extraction(format!(
            "{} cannot access uploaded documents",
            self.name()
        )))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    instruction_text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionRequest<'a> {
    document_ref: &'a str,
    instruction_text: &'a str,
}

/// HTTP content provider speaking the JSON contract
/// `{ instructionText } -> { topic, text }`.
pub struct HttpContentProvider {
    name: String,
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    /// Whether this provider holds the uploaded reference documents.
    supports_documents: bool,
}

impl HttpContentProvider {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        supports_documents: bool,
    ) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        Ok(Self {
            name: name.into(),
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            supports_documents,
        })
    }

    async fn post_for_draft<B: Serialize>(&self, body: &B) -> EngineResult<PassageDraft> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout(format!("{}: {e}", self.name))
                } else {
                    EngineError::Transport(format!("{}: {e}", self.name))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Transport(format!(
                "{}: HTTP {status}",
                self.name
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EngineError::Transport(format!("{}: {e}", self.name)))?;

        parse_draft(&self.name, &bytes)
    }
}

/// Parses a provider response body into a draft, rejecting anything that
/// is not well-formed `{ topic, text }` with non-empty fields.
pub fn parse_draft(provider: &str, body: &[u8]) -> EngineResult<PassageDraft> {
    let draft: PassageDraft = serde_json::from_slice(body).map_err(|e| {
        EngineError::InvalidResponse(format!("{provider}: {e}"))
    })?;

    if draft.topic.trim().is_empty() || draft.text.trim().is_empty() {
        return Err(EngineError::InvalidResponse(format!(
            "{provider}: empty topic or text"
        )));
    }

    debug!(provider, topic = %draft.topic, "Parsed passage draft");
    Ok(draft)
}

#[async_trait]
impl ContentProvider for HttpContentProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, instruction: &str) -> EngineResult<PassageDraft> {
        self.post_for_draft(&GenerateRequest {
            instruction_text: instruction,
        })
        .await
    }

    async fn extract_from_document(
        &self,
        document_ref: &str,
        instruction: &str,
    ) -> EngineResult<PassageDraft> {
        if !self.supports_documents {
            return Err(EngineError::Extraction(format!(
                "{} cannot access uploaded documents",
                self.name
            )));
        }
        self.post_for_draft(&ExtractionRequest {
            document_ref,
            instruction_text: instruction,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_draft_accepts_well_formed_body() {
        let body = br#"{"topic": "Morning routines", "text": "One. Two. Three."}"#;
        let draft = parse_draft("primary", body).unwrap();
        assert_eq!(draft.topic, "Morning routines");
        assert_eq!(draft.text, "One. Two. Three.");
    }

    #[test]
    fn test_parse_draft_rejects_malformed_json() {
        let err = parse_draft("primary", b"three sentences about weather").unwrap_err();
        assert!(matches!(err, EngineError::InvalidResponse(_)));
        assert!(err.to_string().contains("primary"));
    }

    #[test]
    fn test_parse_draft_rejects_missing_fields() {
        let err = parse_draft("fallback", br#"{"topic": "x"}"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_draft_rejects_empty_text() {
        let err = parse_draft("fallback", br#"{"topic": "x", "text": "  "}"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidResponse(_)));
    }
}
