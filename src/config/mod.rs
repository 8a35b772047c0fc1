//! Configuration module for the shadowread server
//!
//! Configuration comes from environment variables (with `.env` support via
//! dotenvy). The split mirrors the rest of the codebase: `env` loads raw
//! values, `validation` rejects inconsistent combinations.

mod env;
mod validation;

/// Server configuration
///
/// Contains everything needed to run the engine:
/// - Server settings (host, port)
/// - Content provider endpoints and API keys (primary + fallback)
/// - Speech synthesis and analysis provider settings
/// - Voice identity and PCM sample rate
/// - Challenge cache TTL and provider timeouts
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Content provider chain
    pub primary_content_url: String,
    pub primary_content_api_key: String,
    pub fallback_content_url: String,
    pub fallback_content_api_key: String,

    // Speech synthesis provider (single, no fallback)
    pub speech_url: String,
    pub speech_api_key: String,

    // Alignment analysis provider
    pub analysis_url: String,
    pub analysis_api_key: String,

    // Synthesis output contract
    pub voice_id: String,
    pub sample_rate: u32,

    // Engine tuning
    pub cache_ttl_seconds: u64,
    pub provider_timeout_seconds: u64,
}

impl ServerConfig {
    /// Get the server address as a string in "host:port" form.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(super) fn test_config() -> ServerConfig {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3001,
            primary_content_url: "http://localhost:9001/generate".to_string(),
            primary_content_api_key: "test-primary".to_string(),
            fallback_content_url: "http://localhost:9002/generate".to_string(),
            fallback_content_api_key: "test-fallback".to_string(),
            speech_url: "http://localhost:9003/synthesize".to_string(),
            speech_api_key: "test-speech".to_string(),
            analysis_url: "http://localhost:9004/analyze".to_string(),
            analysis_api_key: "test-analysis".to_string(),
            voice_id: "reference-voice".to_string(),
            sample_rate: 24000,
            cache_ttl_seconds: 300,
            provider_timeout_seconds: 30,
        }
    }

    #[test]
    fn test_address_format() {
        let config = test_config();
        assert_eq!(config.address(), "0.0.0.0:3001");
    }
}
