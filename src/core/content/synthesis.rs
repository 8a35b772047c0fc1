//! Speech synthesis client.
//!
//! Single-provider dependency: there is no fallback for synthesis, so a
//! failure here is terminal for the current challenge-generation attempt.
//! The provider returns headerless 16-bit mono PCM at a fixed sample
//! rate; container framing happens downstream in the audio codec.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::errors::{EngineError, EngineResult};

/// Speech synthesis provider boundary.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes `text` with the given voice identity, returning raw
    /// PCM samples at the provider's fixed sample rate.
    async fn synthesize(&self, text: &str, voice_id: &str) -> EngineResult<Bytes>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
}

/// HTTP synthesizer speaking `{ text, voiceId } -> raw PCM bytes`.
pub struct HttpSpeechSynthesizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpSpeechSynthesizer {
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
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeechSynthesizer {
    async fn synthesize(&self, text: &str, voice_id: &str) -> EngineResult<Bytes> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SynthesisRequest { text, voice_id })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout(format!("speech synthesis: {e}"))
                } else {
                    EngineError::Transport(format!("speech synthesis: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Transport(format!(
                "speech synthesis: HTTP {status}"
            )));
        }

        let pcm = response
            .bytes()
            .await
            .map_err(|e| EngineError::Transport(format!("speech synthesis: {e}")))?;

        if pcm.is_empty() {
            return Err(EngineError::InvalidResponse(
                "speech synthesis returned an empty buffer".to_string(),
            ));
        }

        debug!(bytes = pcm.len(), voice_id, "Reference audio synthesized");
        Ok(pcm)
    }
}
