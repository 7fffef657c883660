//! Synopsis translation.
//!
//! Uses the keyless Google Translate `gtx` endpoint. Translation is best
//! effort: [`localize_synopsis`] falls back to the original text on any failure.

use crate::config::Settings;
use crate::error::{FinderError, Result};
use crate::provider::Translator;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Google Translate endpoint
pub const GOOGLE_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Fixed target language of localized synopses.
pub const DEFAULT_TARGET_LANG: &str = "es";

pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mangafinder/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| FinderError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.translate_url.clone(), settings.http_timeout)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        debug!(chars = text.len(), target = target_lang, "Translating");

        // Text goes in the form body; synopses can exceed URL length limits.
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("client", "gtx"), ("sl", "auto"), ("tl", target_lang), ("dt", "t")])
            .form(&[("q", text)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FinderError::Api {
                code: status.as_u16() as i32,
                message: format!("Translation API error: {}", status),
            });
        }

        let body: Value = response.json().await?;
        parse_translation(&body)
    }
}

/// Join the translated segments of a `gtx` response (`[[["seg", "src", ...], ...], ...]`).
fn parse_translation(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| FinderError::Translation("Unexpected response shape".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(FinderError::Translation("Empty translation".to_string()));
    }
    Ok(translated)
}

/// Original and localized synopsis, always returned together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalizedSynopsis {
    pub original: Option<String>,
    pub localized: Option<String>,
}

/// Translate a synopsis, falling back to the original text when translation fails.
pub async fn localize_synopsis(
    translator: &dyn Translator,
    synopsis: Option<&str>,
    target_lang: &str,
) -> LocalizedSynopsis {
    let Some(original) = synopsis.filter(|s| !s.trim().is_empty()) else {
        return LocalizedSynopsis::default();
    };

    let localized = match translator.translate(original, target_lang).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!(target = target_lang, "Empty translation, keeping original synopsis");
            original.to_string()
        }
        Err(e) => {
            warn!(target = target_lang, error = %e, "Translation failed, keeping original synopsis");
            original.to_string()
        }
    };

    LocalizedSynopsis {
        original: Some(original.to_string()),
        localized: Some(localized),
    }
}
