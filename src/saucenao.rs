//! SauceNAO reverse-image-search client.
//!
//! Uploads the image to `search.php` with JSON output and normalizes each hit
//! into a [`MatchCandidate`]. SauceNAO's `data` object is a grab bag whose keys
//! depend on the source index, and several values arrive either as strings,
//! numbers or arrays, so normalization is field-by-field.

use crate::config::Settings;
use crate::error::{FinderError, Result};
use crate::provider::{HitFields, ImageSearch, MatchCandidate};
use crate::upload::ImageUpload;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// SauceNAO search endpoint
pub const SAUCENAO_API_URL: &str = "https://saucenao.com/search.php";

/// Search all indices; filtering happens client-side.
const ALL_DATABASES: &str = "999";

/// JSON output
const OUTPUT_TYPE_JSON: &str = "2";

/// `hide` values: 0 shows everything, 3 hides all explicit results.
const HIDE_NONE: &str = "0";
const HIDE_ALL_EXPLICIT: &str = "3";

/// SauceNAO API client
pub struct SauceNaoClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    result_count: u32,
}

impl SauceNaoClient {
    /// Create a new SauceNaoClient
    ///
    /// A missing `api_key` is not an error here: it is reported on the first search,
    /// so the server can still start and answer `/details`.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        result_count: u32,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mangafinder/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| FinderError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            result_count,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.saucenao_url.clone(),
            settings.saucenao_api_key.clone(),
            settings.http_timeout,
            settings.matching.result_count,
        )
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| FinderError::Config("SAUCENAO_API_KEY not configured".to_string()))
    }
}

#[async_trait]
impl ImageSearch for SauceNaoClient {
    async fn search(&self, image: &ImageUpload, include_nsfw: bool) -> Result<Vec<MatchCandidate>> {
        let api_key = self.api_key()?;
        let hide = if include_nsfw { HIDE_NONE } else { HIDE_ALL_EXPLICIT };
        let numres = self.result_count.to_string();

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        let form = Form::new().part("file", part);

        debug!(
            file = %image.file_name,
            bytes = image.bytes.len(),
            hide = hide,
            "Querying SauceNAO"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("db", ALL_DATABASES),
                ("output_type", OUTPUT_TYPE_JSON),
                ("testmode", "1"),
                ("numres", numres.as_str()),
                ("hide", hide),
                ("api_key", api_key),
            ])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), error = %error_text, "SauceNAO API error");
            return Err(FinderError::Api {
                code: status.as_u16() as i32,
                message: format!("SauceNAO API error: {}", status),
            });
        }

        let body = response.text().await?;
        let hits = parse_response(&body)?;
        info!(hits = hits.len(), "SauceNAO search complete");
        Ok(hits)
    }
}

// === SauceNAO API Response Types ===

#[derive(Debug, Deserialize)]
struct SauceNaoResponse {
    #[serde(default)]
    header: Option<ResponseHeader>,
    #[serde(default)]
    results: Option<Vec<RawHit>>,
}

#[derive(Debug, Deserialize)]
struct ResponseHeader {
    #[serde(default)]
    status: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(default)]
    header: HitHeader,
    #[serde(default)]
    data: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct HitHeader {
    #[serde(default)]
    similarity: Option<Value>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    index_id: Option<u32>,
    #[serde(default)]
    index_name: Option<String>,
    #[serde(default)]
    hidden: Option<Value>,
}

/// Parse a SauceNAO JSON body into ordered, normalized hits.
pub fn parse_response(json_str: &str) -> Result<Vec<MatchCandidate>> {
    let response: SauceNaoResponse = serde_json::from_str(json_str)
        .map_err(|e| FinderError::Parse(format!("Failed to parse SauceNAO response: {}", e)))?;

    if let Some(header) = &response.header {
        if let Some(status) = header.status.filter(|s| *s != 0) {
            warn!(
                status = status,
                message = header.message.as_deref().unwrap_or(""),
                "SauceNAO reported a non-zero status"
            );
        }
    }

    Ok(response
        .results
        .unwrap_or_default()
        .into_iter()
        .map(normalize_hit)
        .collect())
}

fn normalize_hit(raw: RawHit) -> MatchCandidate {
    let header = raw.header;
    let data = &raw.data;

    MatchCandidate {
        index_id: header.index_id.unwrap_or_default(),
        index_name: header.index_name.unwrap_or_default(),
        similarity: header.similarity.as_ref().and_then(number).unwrap_or(0.0),
        thumbnail: header.thumbnail.filter(|t| !t.is_empty()),
        hidden: header.hidden.as_ref().map(flag).unwrap_or(false),
        fields: HitFields {
            eng_name: text(data, "eng_name"),
            jp_name: text(data, "jp_name"),
            title: text(data, "title"),
            material: text(data, "material"),
            source: text(data, "source"),
            creator: texts(data, "creator"),
            member_name: text(data, "member_name"),
            artist: text(data, "artist"),
            author: text(data, "author"),
            part: text(data, "part"),
        },
    }
}

/// Scalar rendering of a loosely-typed value. Arrays yield their first element.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(scalar),
        _ => None,
    }
}

fn text(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key).and_then(scalar).filter(|s| !s.trim().is_empty())
}

fn texts(data: &Map<String, Value>, key: &str) -> Vec<String> {
    match data.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        Some(other) => scalar(other)
            .filter(|s| !s.trim().is_empty())
            .into_iter()
            .collect(),
        None => Vec::new(),
    }
}

/// Similarity arrives as `"87.45"`.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-zero / true means hidden.
fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
        _ => false,
    }
}
