//! Bibliographic enrichment.
//!
//! Looks a title up in the bibliographic provider and assembles a
//! [`MangaDetails`] bundle. After the initial search, the full record, the
//! external links and the first author's portrait and works are fetched
//! concurrently. Any of those sub-fetches may fail; the matching field is then
//! left empty and the rest of the bundle is still returned.

use crate::cache::Cache;
use crate::error::Result;
use crate::fallback::{first_present, prefer};
use crate::model::{Author, ExternalLink, RelatedWork};
use crate::provider::{Bibliography, MangaRecord, RelationGroup};
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Relation kinds surfaced as related manga.
pub const RELATION_KINDS: &[&str] = &[
    "Prequel",
    "Sequel",
    "Spin-Off",
    "Side Story",
    "Parent Story",
    "Alternative Setting",
    "Alternative Version",
];

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichPolicy {
    /// Allowed relation kinds, compared case-insensitively. Output uses these spellings.
    pub relation_kinds: Vec<String>,
    /// Media type a relation entry must have, when the provider reports one.
    pub related_media_type: Option<String>,
    /// How many of the first author's works to fetch.
    pub author_works_limit: usize,
}

impl Default for EnrichPolicy {
    fn default() -> Self {
        Self {
            relation_kinds: RELATION_KINDS.iter().map(|k| k.to_string()).collect(),
            related_media_type: Some("manga".to_string()),
            author_works_limit: 5,
        }
    }
}

impl EnrichPolicy {
    /// Allow-listed spelling of a provider relation kind.
    pub fn canonical_relation(&self, kind: &str) -> Option<&str> {
        let kind = kind.trim();
        self.relation_kinds
            .iter()
            .find(|allowed| allowed.eq_ignore_ascii_case(kind))
            .map(String::as_str)
    }

    fn accepts_media(&self, media_type: Option<&str>) -> bool {
        match (&self.related_media_type, media_type) {
            (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
            _ => true,
        }
    }

    /// Related-manga entries from relation groups, in provider order.
    pub fn related_manga(&self, groups: &[RelationGroup]) -> Vec<RelatedWork> {
        let mut related = Vec::new();
        for group in groups {
            let Some(kind) = self.canonical_relation(&group.kind) else {
                continue;
            };
            related.extend(
                group
                    .entries
                    .iter()
                    .filter(|entry| self.accepts_media(entry.media_type.as_deref()))
                    .map(|entry| RelatedWork {
                        title: entry.name.clone(),
                        image_url: None,
                        url: entry.url.clone(),
                        relation_type: Some(kind.to_string()),
                    }),
            );
        }
        related
    }
}

/// Normalized bibliographic bundle for one title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MangaDetails {
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub authors: Vec<Author>,
    /// Other works by the first author.
    pub author_works: Vec<RelatedWork>,
    pub related_manga: Vec<RelatedWork>,
    pub external_links: Vec<ExternalLink>,
    pub chapters: Option<u32>,
    pub status: Option<String>,
    pub published: Option<String>,
    pub score: Option<f64>,
}

pub struct Enricher {
    provider: Arc<dyn Bibliography>,
    cache: Arc<dyn Cache<MangaDetails>>,
    policy: EnrichPolicy,
}

impl Enricher {
    pub fn new(
        provider: Arc<dyn Bibliography>,
        cache: Arc<dyn Cache<MangaDetails>>,
        policy: EnrichPolicy,
    ) -> Self {
        Self {
            provider,
            cache,
            policy,
        }
    }

    /// Details for `title`, served from cache when possible. Never fails:
    /// provider trouble yields an empty or partial bundle.
    pub async fn fetch(&self, title: &str) -> MangaDetails {
        let key = title.trim();
        if key.is_empty() {
            return MangaDetails::default();
        }
        self.cache.get_or_compute(key, self.lookup(key).boxed()).await
    }

    async fn lookup(&self, title: &str) -> MangaDetails {
        let summary = match self.provider.search_manga(title).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                info!(title = %title, "No bibliographic match");
                return MangaDetails::default();
            }
            Err(e) => {
                warn!(title = %title, error = %e, "Bibliographic search failed");
                return MangaDetails::default();
            }
        };

        let mal_id = summary.mal_id;
        let author_id = summary.authors.first().and_then(|a| a.mal_id);
        let works_limit = self.policy.author_works_limit;

        let (full, external, person, works) = tokio::join!(
            sub_fetch("full record", mal_id, |id| self.provider.manga_full(id)),
            sub_fetch("external links", mal_id, |id| self.provider.manga_external(id)),
            sub_fetch("author", author_id, |id| self.provider.person(id)),
            sub_fetch("author works", author_id, |id| self
                .provider
                .person_works(id, works_limit)),
        );

        let full = full.unwrap_or_default();
        self.assemble(summary, full, external, person.and_then(|p| p.image_url), works)
    }

    fn assemble(
        &self,
        summary: MangaRecord,
        full: MangaRecord,
        external: Vec<ExternalLink>,
        author_image: Option<String>,
        mut works: Vec<RelatedWork>,
    ) -> MangaDetails {
        let mut authors = summary.authors;
        if let Some(first) = authors.first_mut() {
            first.image_url = prefer(author_image, first.image_url.take());
        }
        works.truncate(self.policy.author_works_limit);

        let cover_url = first_present([
            summary.large_image_url,
            summary.image_url,
            full.large_image_url,
            full.image_url,
        ])
        .flatten();

        MangaDetails {
            synopsis: prefer(full.synopsis, summary.synopsis),
            cover_url,
            authors,
            author_works: works,
            related_manga: self.policy.related_manga(&full.relations),
            external_links: prefer(external, full.external),
            chapters: prefer(full.chapters, summary.chapters),
            status: prefer(full.status, summary.status),
            published: prefer(full.published, summary.published),
            score: prefer(full.score, summary.score),
        }
    }
}

/// Run one enrichment sub-fetch. A missing id or a failure yields the default.
async fn sub_fetch<T, F, Fut>(what: &'static str, id: Option<u64>, fetch: F) -> T
where
    T: Default,
    F: FnOnce(u64) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let Some(id) = id else {
        return T::default();
    };
    match fetch(id).await {
        Ok(value) => value,
        Err(e) => {
            warn!(what = what, id = id, error = %e, "Enrichment sub-fetch failed, leaving field empty");
            T::default()
        }
    }
}
