//! Per-request orchestration.
//!
//! A search runs image match, then enrichment keyed by the matched title,
//! then the merge and synopsis localization. `/details` enters the same flow
//! after the match stage with a caller-supplied title.

use crate::cache::TtlCache;
use crate::config::Settings;
use crate::enrich::{Enricher, MangaDetails};
use crate::error::{FinderError, Result};
use crate::jikan::JikanClient;
use crate::matching::{MatchOutcome, MatchPolicy};
use crate::merge::merge;
use crate::model::SearchResult;
use crate::provider::{ImageSearch, Translator};
use crate::saucenao::SauceNaoClient;
use crate::translate::{localize_synopsis, GoogleTranslator};
use crate::upload::ImageUpload;
use std::sync::Arc;
use tracing::info;

pub struct Finder {
    images: Arc<dyn ImageSearch>,
    enricher: Enricher,
    translator: Arc<dyn Translator>,
    policy: MatchPolicy,
    target_lang: String,
}

impl Finder {
    pub fn new(
        images: Arc<dyn ImageSearch>,
        enricher: Enricher,
        translator: Arc<dyn Translator>,
        policy: MatchPolicy,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            images,
            enricher,
            translator,
            policy,
            target_lang: target_lang.into(),
        }
    }

    /// Wire the SauceNAO, Jikan and Google Translate adapters from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let cache = TtlCache::<MangaDetails>::new(settings.cache_ttl, settings.cache_capacity);
        let enricher = Enricher::new(
            Arc::new(JikanClient::from_settings(settings)?),
            Arc::new(cache),
            settings.enrich.clone(),
        );

        Ok(Self::new(
            Arc::new(SauceNaoClient::from_settings(settings)?),
            enricher,
            Arc::new(GoogleTranslator::from_settings(settings)?),
            settings.matching.clone(),
            settings.target_lang.clone(),
        ))
    }

    /// Reverse-search an uploaded page. Image-search failures are returned;
    /// enrichment and translation failures only leave fields empty.
    pub async fn search(&self, upload: &ImageUpload, include_nsfw: bool) -> Result<SearchResult> {
        info!(
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            include_nsfw = include_nsfw,
            "Searching image"
        );

        let hits = self.images.search(upload, include_nsfw).await?;
        let hit_count = hits.len();

        let primary = match self.policy.evaluate(hits, include_nsfw) {
            MatchOutcome::Found(primary) => primary,
            outcome => {
                let message = outcome.message().unwrap_or_default();
                info!(hits = hit_count, message = message, "No usable match");
                return Ok(SearchResult::not_found(message));
            }
        };

        info!(
            title = ?primary.title,
            similarity = primary.similarity,
            alternatives = primary.alternatives.len(),
            "Primary match selected"
        );

        let details = match primary.title.as_deref() {
            Some(title) => self.enricher.fetch(title).await,
            None => MangaDetails::default(),
        };

        let result = merge(primary.to_result(), details, primary.author.as_deref());
        Ok(self.localize(result).await)
    }

    /// Look up a known title, skipping the image match.
    pub async fn details(&self, title: &str) -> Result<SearchResult> {
        let title = title.trim();
        if title.is_empty() {
            return Err(FinderError::Validation("Title is required".to_string()));
        }

        info!(title = %title, "Fetching details");
        let details = self.enricher.fetch(title).await;
        let result = merge(SearchResult::for_title(title), details, None);
        Ok(self.localize(result).await)
    }

    async fn localize(&self, mut result: SearchResult) -> SearchResult {
        let synopsis =
            localize_synopsis(self.translator.as_ref(), result.synopsis.as_deref(), &self.target_lang)
                .await;
        result.synopsis_original = synopsis.original;
        result.synopsis_localized = synopsis.localized;
        result
    }
}
