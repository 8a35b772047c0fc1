use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::core::analysis::AlignmentClient;
use crate::core::cache::ChallengeCache;
use crate::core::content::{
    ChallengeService, ContentProvider, HttpContentProvider, HttpSpeechSynthesizer,
};
use crate::errors::EngineResult;

/// Core-layer shared state: the provider chain, the challenge cache, and
/// the alignment analysis client, wired up once at startup.
#[derive(Clone)]
pub struct EngineState {
    pub cache: Arc<ChallengeCache>,
    pub service: Arc<ChallengeService>,
    pub analyzer: Arc<AlignmentClient>,
}

impl EngineState {
    /// Builds the engine from configuration: primary and fallback content
    /// providers, the speech synthesizer, and the analysis client.
    pub fn new(config: &ServerConfig) -> EngineResult<Self> {
        let timeout = Duration::from_secs(config.provider_timeout_seconds);

        let primary: Arc<dyn ContentProvider> = Arc::new(HttpContentProvider::new(
            "primary",
            config.primary_content_url.clone(),
            config.primary_content_api_key.clone(),
            timeout,
            true,
        )?);
        let fallback: Arc<dyn ContentProvider> = Arc::new(HttpContentProvider::new(
            "fallback",
            config.fallback_content_url.clone(),
            config.fallback_content_api_key.clone(),
            timeout,
            false,
        )?);

        let synthesizer = Arc::new(HttpSpeechSynthesizer::new(
            config.speech_url.clone(),
            config.speech_api_key.clone(),
            timeout,
        )?);

        let service = Arc::new(ChallengeService::new(
            vec![primary, fallback],
            synthesizer,
            config.voice_id.clone(),
            config.sample_rate,
        ));

        let cache = Arc::new(ChallengeCache::with_ttl(
            service.clone(),
            Duration::from_secs(config.cache_ttl_seconds),
        ));

        let analyzer = Arc::new(AlignmentClient::new(
            config.analysis_url.clone(),
            config.analysis_api_key.clone(),
            timeout,
        )?);

        Ok(Self {
            cache,
            service,
            analyzer,
        })
    }
}
