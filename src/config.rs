//! Runtime settings.
//!
//! Built by the CLI from flags and environment variables; every field has a
//! default so library users can start from [`Settings::default`].

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::enrich::EnrichPolicy;
use crate::error::{FinderError, Result};
use crate::jikan::JIKAN_API_BASE;
use crate::matching::MatchPolicy;
use crate::saucenao::SAUCENAO_API_URL;
use crate::translate::{DEFAULT_TARGET_LANG, GOOGLE_TRANSLATE_URL};
use std::time::Duration;
use url::Url;

/// Default timeout for a single provider call.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Default budget for a whole `/search` or `/details` request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct Settings {
    /// SauceNAO API key. Checked when a search is made, not at startup.
    pub saucenao_api_key: Option<String>,
    pub saucenao_url: String,
    pub jikan_url: String,
    pub translate_url: String,
    /// Language synopses are translated into.
    pub target_lang: String,
    pub http_timeout: Duration,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub matching: MatchPolicy,
    pub enrich: EnrichPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            saucenao_api_key: None,
            saucenao_url: SAUCENAO_API_URL.to_string(),
            jikan_url: JIKAN_API_BASE.to_string(),
            translate_url: GOOGLE_TRANSLATE_URL.to_string(),
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_ttl: DEFAULT_TTL,
            cache_capacity: DEFAULT_CAPACITY,
            matching: MatchPolicy::default(),
            enrich: EnrichPolicy::default(),
        }
    }
}

impl Settings {
    /// Reject settings that could never work (malformed URLs, zero timeouts).
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("saucenao_url", &self.saucenao_url),
            ("jikan_url", &self.jikan_url),
            ("translate_url", &self.translate_url),
        ] {
            let url = Url::parse(value)
                .map_err(|e| FinderError::Config(format!("Invalid {}: {} ({})", name, value, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(FinderError::Config(format!(
                    "Invalid {}: unsupported scheme {}",
                    name,
                    url.scheme()
                )));
            }
        }

        if self.http_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(FinderError::Config("Timeouts must be non-zero".to_string()));
        }

        if self.target_lang.trim().is_empty() {
            return Err(FinderError::Config("Target language must not be empty".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.cache_ttl, Duration::from_secs(3600));
        assert_eq!(settings.cache_capacity, 100);
        assert_eq!(settings.matching.result_count, 12);
        assert_eq!(settings.saucenao_api_key, None);
    }

    #[test]
    fn test_rejects_bad_url() {
        let settings = Settings {
            jikan_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(FinderError::Config(_))));

        let settings = Settings {
            saucenao_url: "ftp://saucenao.com".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let settings = Settings {
            http_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
