use std::env;

use super::ServerConfig;
use super::validation::{validate_provider_endpoints, validate_sample_rate};

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads configuration from environment variables, with sensible
    /// defaults. Also loads from a `.env` file if present using dotenvy.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Numeric variables are malformed
    /// - A provider endpoint or API key is missing
    /// - The sample rate is not one the synthesis provider supports
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        // Server configuration
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid port number: {e}"))?;

        // Content provider chain
        let primary_content_url = require_var("PRIMARY_CONTENT_URL")?;
        let primary_content_api_key = require_var("PRIMARY_CONTENT_API_KEY")?;
        let fallback_content_url = require_var("FALLBACK_CONTENT_URL")?;
        let fallback_content_api_key = require_var("FALLBACK_CONTENT_API_KEY")?;

        // Speech synthesis provider
        let speech_url = require_var("SPEECH_URL")?;
        let speech_api_key = require_var("SPEECH_API_KEY")?;

        // Alignment analysis provider
        let analysis_url = require_var("ANALYSIS_URL")?;
        let analysis_api_key = require_var("ANALYSIS_API_KEY")?;

        // Synthesis output contract
        let voice_id = env::var("VOICE_ID").unwrap_or_else(|_| "reference-voice".to_string());
        let sample_rate = env::var("SAMPLE_RATE")
            .unwrap_or_else(|_| "24000".to_string())
            .parse::<u32>()
            .map_err(|e| format!("Invalid sample rate: {e}"))?;

        // Engine tuning
        let cache_ttl_seconds = env::var("CACHE_TTL_SECONDS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<u64>()
            .map_err(|e| format!("Invalid cache TTL: {e}"))?;
        let provider_timeout_seconds = env::var("PROVIDER_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|e| format!("Invalid provider timeout: {e}"))?;

        let config = Self {
            host,
            port,
            primary_content_url,
            primary_content_api_key,
            fallback_content_url,
            fallback_content_api_key,
            speech_url,
            speech_api_key,
            analysis_url,
            analysis_api_key,
            voice_id,
            sample_rate,
            cache_ttl_seconds,
            provider_timeout_seconds,
        };

        validate_sample_rate(config.sample_rate)?;
        validate_provider_endpoints(&config)?;

        Ok(config)
    }
}

fn require_var(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    env::var(name).map_err(|_| format!("{name} is required").into())
}
