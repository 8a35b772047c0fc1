use super::ServerConfig;

/// PCM sample rates the synthesis provider can deliver.
const SUPPORTED_SAMPLE_RATES: [u32; 4] = [16000, 22050, 24000, 44100];

/// Validate the configured sample rate
///
/// The synthesis provider guarantees 16-bit mono PCM only at specific
/// sample rates; anything else would produce a WAV header that lies
/// about the payload.
pub fn validate_sample_rate(sample_rate: u32) -> Result<(), Box<dyn std::error::Error>> {
    if !SUPPORTED_SAMPLE_RATES.contains(&sample_rate) {
        return Err(format!(
            "SAMPLE_RATE {sample_rate} is not supported (expected one of {SUPPORTED_SAMPLE_RATES:?})"
        )
        .into());
    }
    Ok(())
}

/// Validate provider endpoint URLs
///
/// Catches obviously broken endpoints at startup instead of at the first
/// challenge request.
pub fn validate_provider_endpoints(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    for (name, url) in [
        ("PRIMARY_CONTENT_URL", &config.primary_content_url),
        ("FALLBACK_CONTENT_URL", &config.fallback_content_url),
        ("SPEECH_URL", &config.speech_url),
        ("ANALYSIS_URL", &config.analysis_url),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(format!("{name} must be an http(s) URL, got '{url}'").into());
        }
    }

    if config.provider_timeout_seconds == 0 {
        return Err("PROVIDER_TIMEOUT_SECONDS must be positive".into());
    }
    if config.cache_ttl_seconds == 0 {
        return Err("CACHE_TTL_SECONDS must be positive".into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_sample_rates() {
        assert!(validate_sample_rate(24000).is_ok());
        assert!(validate_sample_rate(44100).is_ok());
        assert!(validate_sample_rate(8000).is_err());
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let mut config = crate::config::tests::test_config();
        config.speech_url = "ftp://nope".to_string();
        assert!(validate_provider_endpoints(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = crate::config::tests::test_config();
        config.provider_timeout_seconds = 0;
        assert!(validate_provider_endpoints(&config).is_err());
    }
}
