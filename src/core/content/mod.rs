//! Content provider chain: challenge text generation with provider
//! fallback, plus reference audio synthesis.
//!
//! The chain is an ordered list of provider strategies tried in turn,
//! first success wins. Text generation strictly precedes synthesis: the
//! reference audio is synthesized from the exact text the content step
//! committed, never from a guess at it.

pub mod prompts;
pub mod provider;
pub mod synthesis;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

pub use provider::{ContentProvider, HttpContentProvider, PassageDraft};
pub use synthesis::{HttpSpeechSynthesizer, SpeechSynthesizer};

use crate::core::audio::encode_wav;
use crate::core::cache::ChallengeLoader;
use crate::core::types::{Challenge, Level, Mode};
use crate::errors::{EngineError, EngineResult};

/// Produces complete challenges: passage text from the provider chain,
/// reference audio from the synthesizer, WAV-framed together.
pub struct ChallengeService {
    providers: Vec<Arc<dyn ContentProvider>>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    voice_id: String,
    sample_rate: u32,
}

impl ChallengeService {
    pub fn new(
        providers: Vec<Arc<dyn ContentProvider>>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        voice_id: impl Into<String>,
        sample_rate: u32,
    ) -> Self {
        Self {
            providers,
            synthesizer,
            voice_id: voice_id.into(),
            sample_rate,
        }
    }

    /// Generates a challenge, falling back across the provider chain for
    /// the text step. With a source document the primary provider extracts
    /// the passage instead; that branch has no fallback.
    pub async fn generate_challenge(
        &self,
        level: Level,
        mode: Mode,
        source_document: Option<&str>,
    ) -> EngineResult<Challenge> {
        let (draft, source_url) = match source_document {
            Some(document_ref) => {
                let draft = self.extract_draft(document_ref).await?;
                (draft, Some(document_ref.to_string()))
            }
            None => (self.generate_draft(level, mode).await?, None),
        };

        // Synthesis only starts once the text has committed.
        let pcm = self
            .synthesizer
            .synthesize(&draft.text, &self.voice_id)
            .await?;
        let reference_audio = encode_wav(&pcm, self.sample_rate);

        info!(
            topic = %draft.topic,
            audio_bytes = reference_audio.len(),
            "Challenge generated"
        );

        Ok(Challenge {
            topic: draft.topic,
            text: draft.text,
            source_url,
            reference_audio,
        })
    }

    /// Tries each provider in order with its own instruction template;
    /// first success wins. On total failure the aggregated error names
    /// every provider and its underlying failure.
    async fn generate_draft(&self, level: Level, mode: Mode) -> EngineResult<PassageDraft> {
        let mut failures: Vec<String> = Vec::new();

        for (index, provider) in self.providers.iter().enumerate() {
            let instruction = if index == 0 {
                prompts::primary_instruction(level, mode)
            } else {
                prompts::fallback_instruction(level, mode)
            };

            match provider.generate(&instruction).await {
                Ok(draft) => {
                    if index > 0 {
                        info!(provider = provider.name(), "Fallback provider succeeded");
                    }
                    return Ok(draft);
                }
                Err(err) => {
                    warn!(provider = provider.name(), error = %err, "Content provider failed");
                    failures.push(format!("{}: {}", provider.name(), err));
                }
            }
        }

        Err(EngineError::ProviderChain(failures.join("; ")))
    }

    /// Document-grounded extraction via the primary provider. A failure
    /// here is terminal: the fallback provider cannot see the document.
    async fn extract_draft(&self, document_ref: &str) -> EngineResult<PassageDraft> {
        let primary = self.providers.first().ok_or_else(|| {
            EngineError::Extraction("no content provider configured".to_string())
        })?;

        primary
            .extract_from_document(document_ref, &prompts::extraction_instruction())
            .await
            .map_err(|err| match err {
                EngineError::Extraction(_) => err,
                other => EngineError::Extraction(format!("{}: {}", primary.name(), other)),
            })
    }
}

#[async_trait]
impl ChallengeLoader for ChallengeService {
    async fn load(&self, level: Level, mode: Mode) -> EngineResult<Challenge> {
        self.generate_challenge(level, mode, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::core::audio::decode_wav;

    struct ScriptedProvider {
        name: String,
        result: Result<PassageDraft, EngineError>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn ok(name: &str, topic: &str, text: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                result: Ok(PassageDraft {
                    topic: topic.to_string(),
                    text: text.to_string(),
                }),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &str, err: EngineError) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                result: Err(err),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ContentProvider for ScriptedProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn generate(&self, _instruction: &str) -> EngineResult<PassageDraft> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }

        async fn extract_from_document(
            &self,
            _document_ref: &str,
            _instruction: &str,
        ) -> EngineResult<PassageDraft> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    struct RecordingSynthesizer {
        texts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingSynthesizer {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                texts: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                texts: Mutex::new(Vec::new()),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSynthesizer {
        async fn synthesize(&self, text: &str, _voice_id: &str) -> EngineResult<Bytes> {
            self.texts.lock().push(text.to_string());
            if self.fail {
                return Err(EngineError::Transport("synthesis outage".to_string()));
            }
            Ok(Bytes::from_static(&[0, 1, 2, 3, 4, 5, 6, 7]))
        }
    }

    fn service(
        providers: Vec<Arc<dyn ContentProvider>>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> ChallengeService {
        ChallengeService::new(providers, synthesizer, "reference-voice", 24000)
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = ScriptedProvider::ok("primary", "Weather", "A. B. C.");
        let fallback = ScriptedProvider::ok("fallback", "Unused", "X. Y. Z.");
        let synth = RecordingSynthesizer::new();

        let svc = service(vec![primary.clone(), fallback.clone()], synth);
        let challenge = svc
            .generate_challenge(Level::Beginner, Mode::Daily, None)
            .await
            .unwrap();

        assert_eq!(challenge.topic, "Weather");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_primary_timeout_falls_back_to_secondary() {
        let primary =
            ScriptedProvider::failing("primary", EngineError::Timeout("30s elapsed".to_string()));
        let fallback = ScriptedProvider::ok("fallback", "Commuting", "X. Y. Z.");
        let synth = RecordingSynthesizer::new();

        let svc = service(vec![primary, fallback.clone()], synth);
        let challenge = svc
            .generate_challenge(Level::Advanced, Mode::Ielts, None)
            .await
            .unwrap();

        assert_eq!(challenge.topic, "Commuting");
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_parse_failure_triggers_fallback_like_transport() {
        let primary = ScriptedProvider::failing(
            "primary",
            EngineError::InvalidResponse("not JSON".to_string()),
        );
        let fallback = ScriptedProvider::ok("fallback", "Cooking", "X. Y. Z.");
        let synth = RecordingSynthesizer::new();

        let svc = service(vec![primary, fallback], synth);
        let challenge = svc
            .generate_challenge(Level::Beginner, Mode::Daily, None)
            .await
            .unwrap();
        assert_eq!(challenge.topic, "Cooking");
    }

    #[tokio::test]
    async fn test_total_failure_names_both_providers() {
        let primary =
            ScriptedProvider::failing("primary", EngineError::Timeout("deadline".to_string()));
        let fallback = ScriptedProvider::failing(
            "fallback",
            EngineError::InvalidResponse("truncated".to_string()),
        );
        let synth = RecordingSynthesizer::new();

        let svc = service(vec![primary, fallback], synth);
        let err = svc
            .generate_challenge(Level::Beginner, Mode::Daily, None)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, EngineError::ProviderChain(_)));
        assert!(message.contains("primary"));
        assert!(message.contains("fallback"));
        assert!(message.contains("deadline"));
        assert!(message.contains("truncated"));
    }

    #[tokio::test]
    async fn test_synthesis_uses_exact_committed_text() {
        let primary = ScriptedProvider::ok("primary", "Weather", "First. Second. Third.");
        let synth = RecordingSynthesizer::new();

        let svc = service(vec![primary], synth.clone());
        let challenge = svc
            .generate_challenge(Level::Beginner, Mode::Daily, None)
            .await
            .unwrap();

        assert_eq!(synth.texts.lock().as_slice(), ["First. Second. Third."]);
        let wav = decode_wav(&challenge.reference_audio).unwrap();
        assert_eq!(wav.sample_rate, 24000);
        assert_eq!(wav.pcm.len(), 8);
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_terminal() {
        let primary = ScriptedProvider::ok("primary", "Weather", "A. B. C.");
        let synth = RecordingSynthesizer::failing();

        let svc = service(vec![primary], synth);
        let err = svc
            .generate_challenge(Level::Beginner, Mode::Daily, None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Transport(_)));
    }

    #[tokio::test]
    async fn test_document_branch_records_source() {
        let primary = ScriptedProvider::ok("primary", "Reports", "A. B. C.");
        let synth = RecordingSynthesizer::new();

        let svc = service(vec![primary], synth);
        let challenge = svc
            .generate_challenge(Level::Intermediate, Mode::Daily, Some("doc-42"))
            .await
            .unwrap();

        assert_eq!(challenge.source_url.as_deref(), Some("doc-42"));
    }

    #[tokio::test]
    async fn test_document_branch_has_no_fallback() {
        let primary = ScriptedProvider::failing(
            "primary",
            EngineError::Transport("document service down".to_string()),
        );
        let fallback = ScriptedProvider::ok("fallback", "Unused", "X. Y. Z.");
        let synth = RecordingSynthesizer::new();

        let svc = service(vec![primary, fallback.clone()], synth);
        let err = svc
            .generate_challenge(Level::Beginner, Mode::Daily, Some("doc-123"))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Extraction(_)));
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }
}
