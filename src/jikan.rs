//! Jikan (unofficial MyAnimeList) API client.
//!
//! API Details:
//! - Base: https://api.jikan.moe/v4
//! - Every payload is wrapped in `{"data": ...}`
//! - Search summaries omit relations and external links; those come from
//!   `/manga/{id}/full` and `/manga/{id}/external`
//! - Unknown ids answer 404

use crate::config::Settings;
use crate::error::{FinderError, Result};
use crate::model::{Author, ExternalLink, RelatedWork};
use crate::provider::{Bibliography, MangaRecord, PersonRecord, RelationEntry, RelationGroup};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Jikan API base URL
pub const JIKAN_API_BASE: &str = "https://api.jikan.moe/v4";

/// Jikan API client
pub struct JikanClient {
    client: reqwest::Client,
    base_url: String,
}

impl JikanClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mangafinder/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| FinderError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(settings.jikan_url.clone(), settings.http_timeout)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// GET `path` and unwrap the `data` envelope. 404 maps to `None`.
    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = self.endpoint(path);
        debug!(url = %url, "Querying Jikan");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            warn!(status = status.as_u16(), path = path, "Jikan API error");
            return Err(FinderError::Api {
                code: status.as_u16() as i32,
                message: format!("Jikan API error: {}", status),
            });
        }

        let body = response.text().await?;
        parse_envelope(&body)
    }
}

#[async_trait]
impl Bibliography for JikanClient {
    async fn search_manga(&self, title: &str) -> Result<Option<MangaRecord>> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        let hits: Option<Vec<JikanManga>> = self
            .get_data("manga", &[("q", title.to_string()), ("limit", "1".to_string())])
            .await?;

        Ok(hits.and_then(|h| h.into_iter().next()).map(MangaRecord::from))
    }

    async fn manga_full(&self, mal_id: u64) -> Result<Option<MangaRecord>> {
        let manga: Option<JikanManga> = self.get_data(&format!("manga/{}/full", mal_id), &[]).await?;
        Ok(manga.map(MangaRecord::from))
    }

    async fn manga_external(&self, mal_id: u64) -> Result<Vec<ExternalLink>> {
        let links: Option<Vec<JikanLink>> = self
            .get_data(&format!("manga/{}/external", mal_id), &[])
            .await?;
        Ok(links
            .unwrap_or_default()
            .into_iter()
            .map(ExternalLink::from)
            .collect())
    }

    async fn person(&self, mal_id: u64) -> Result<Option<PersonRecord>> {
        let person: Option<JikanPerson> = self.get_data(&format!("people/{}", mal_id), &[]).await?;
        Ok(person.map(|p| PersonRecord {
            image_url: p.images.and_then(|i| i.jpg).and_then(|j| j.image_url),
        }))
    }

    async fn person_works(&self, mal_id: u64, limit: usize) -> Result<Vec<RelatedWork>> {
        // Jikan ignores `limit` on this resource; truncate client-side as well.
        let works: Option<Vec<JikanPersonWork>> = self
            .get_data(
                &format!("people/{}/manga", mal_id),
                &[("limit", limit.to_string())],
            )
            .await?;

        Ok(works
            .unwrap_or_default()
            .into_iter()
            .filter_map(|w| w.manga)
            .take(limit)
            .map(|entry| RelatedWork {
                title: entry.title,
                image_url: entry.images.and_then(|i| i.jpg).and_then(|j| j.image_url),
                url: entry.url,
                relation_type: None,
            })
            .collect())
    }
}

// === Jikan API Response Types ===

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

fn parse_envelope<T: DeserializeOwned>(json_str: &str) -> Result<Option<T>> {
    let envelope: Envelope<T> = serde_json::from_str(json_str)
        .map_err(|e| FinderError::Parse(format!("Failed to parse Jikan response: {}", e)))?;
    Ok(envelope.data)
}

#[derive(Debug, Deserialize)]
struct JikanManga {
    mal_id: Option<u64>,
    synopsis: Option<String>,
    images: Option<JikanImages>,
    authors: Option<Vec<JikanEntity>>,
    chapters: Option<u32>,
    status: Option<String>,
    published: Option<JikanPublished>,
    score: Option<f64>,
    relations: Option<Vec<JikanRelation>>,
    external: Option<Vec<JikanLink>>,
}

#[derive(Debug, Deserialize)]
struct JikanImages {
    jpg: Option<JikanImageSet>,
}

#[derive(Debug, Deserialize)]
struct JikanImageSet {
    image_url: Option<String>,
    large_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JikanEntity {
    mal_id: Option<u64>,
    #[serde(rename = "type")]
    entity_type: Option<String>,
    name: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JikanPublished {
    string: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JikanRelation {
    relation: Option<String>,
    entry: Option<Vec<JikanEntity>>,
}

#[derive(Debug, Deserialize)]
struct JikanLink {
    name: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JikanPerson {
    images: Option<JikanImages>,
}

#[derive(Debug, Deserialize)]
struct JikanPersonWork {
    manga: Option<JikanWorkEntry>,
}

#[derive(Debug, Deserialize)]
struct JikanWorkEntry {
    title: Option<String>,
    url: Option<String>,
    images: Option<JikanImages>,
}

impl From<JikanLink> for ExternalLink {
    fn from(link: JikanLink) -> Self {
        ExternalLink {
            name: link.name,
            url: link.url,
        }
    }
}

impl From<JikanManga> for MangaRecord {
    fn from(manga: JikanManga) -> Self {
        let jpg = manga.images.and_then(|i| i.jpg);

        let authors = manga
            .authors
            .unwrap_or_default()
            .into_iter()
            .map(|a| Author {
                name: a.name,
                url: a.url,
                mal_id: a.mal_id,
                image_url: None,
            })
            .collect();

        let relations = manga
            .relations
            .unwrap_or_default()
            .into_iter()
            .map(|r| RelationGroup {
                kind: r.relation.unwrap_or_default(),
                entries: r
                    .entry
                    .unwrap_or_default()
                    .into_iter()
                    .map(|e| RelationEntry {
                        media_type: e.entity_type,
                        name: e.name,
                        url: e.url,
                    })
                    .collect(),
            })
            .collect();

        MangaRecord {
            mal_id: manga.mal_id,
            synopsis: manga.synopsis,
            image_url: jpg.as_ref().and_then(|j| j.image_url.clone()),
            large_image_url: jpg.and_then(|j| j.large_image_url),
            authors,
            chapters: manga.chapters,
            status: manga.status,
            published: manga.published.and_then(|p| p.string),
            score: manga.score,
            relations,
            external: manga
                .external
                .unwrap_or_default()
                .into_iter()
                .map(ExternalLink::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: &str = r#"{
        "pagination": {"last_visible_page": 1, "has_next_page": false},
        "data": [{
            "mal_id": 11,
            "url": "https://myanimelist.net/manga/11/Naruto",
            "images": {"jpg": {
                "image_url": "https://cdn.myanimelist.net/images/manga/3/249658.jpg",
                "small_image_url": "https://cdn.myanimelist.net/images/manga/3/249658t.jpg",
                "large_image_url": "https://cdn.myanimelist.net/images/manga/3/249658l.jpg"
            }},
            "title": "Naruto",
            "chapters": 700,
            "status": "Finished",
            "published": {"from": "1999-09-21T00:00:00+00:00", "string": "Sep 21, 1999 to Nov 10, 2014"},
            "score": 8.07,
            "synopsis": "Whenever Naruto Uzumaki proclaims that he will someday become the Hokage...",
            "authors": [{"mal_id": 1879, "type": "people", "name": "Kishimoto, Masashi", "url": "https://myanimelist.net/people/1879/Masashi_Kishimoto"}]
        }]
    }"#;

    const FULL: &str = r#"{"data": {
        "mal_id": 11,
        "title": "Naruto",
        "chapters": 700,
        "status": "Finished",
        "score": 8.08,
        "synopsis": "Full synopsis",
        "images": null,
        "relations": [
            {"relation": "Adaptation", "entry": [{"mal_id": 20, "type": "anime", "name": "Naruto", "url": "https://myanimelist.net/anime/20/Naruto"}]},
            {"relation": "Sequel", "entry": [{"mal_id": 97123, "type": "manga", "name": "Boruto", "url": "https://myanimelist.net/manga/97123/Boruto"}]}
        ],
        "external": [{"name": "Wikipedia", "url": "https://en.wikipedia.org/wiki/Naruto"}]
    }}"#;

    #[test]
    fn test_parse_search_summary() {
        let hits: Option<Vec<JikanManga>> = parse_envelope(SEARCH).unwrap();
        let record = MangaRecord::from(hits.unwrap().into_iter().next().unwrap());

        assert_eq!(record.mal_id, Some(11));
        assert_eq!(record.chapters, Some(700));
        assert_eq!(record.published.as_deref(), Some("Sep 21, 1999 to Nov 10, 2014"));
        assert!(record.large_image_url.as_deref().unwrap().ends_with("249658l.jpg"));
        assert_eq!(record.authors.len(), 1);
        assert_eq!(record.authors[0].mal_id, Some(1879));
        assert!(record.relations.is_empty());
    }

    #[test]
    fn test_parse_full_record() {
        let manga: Option<JikanManga> = parse_envelope(FULL).unwrap();
        let record = MangaRecord::from(manga.unwrap());

        assert_eq!(record.image_url, None);
        assert_eq!(record.relations.len(), 2);
        assert_eq!(record.relations[1].kind, "Sequel");
        assert_eq!(record.relations[1].entries[0].media_type.as_deref(), Some("manga"));
        assert_eq!(record.external[0].name.as_deref(), Some("Wikipedia"));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let err = parse_envelope::<Vec<JikanManga>>("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, FinderError::Parse(_)));
        assert!(err.to_string().starts_with("Parse error: Failed to parse Jikan response"));
    }

    #[test]
    fn test_empty_search() {
        let hits: Option<Vec<JikanManga>> = parse_envelope(r#"{"data": []}"#).unwrap();
        assert!(hits.unwrap().is_empty());
    }

    #[test]
    fn test_parse_person_works() {
        let body = r#"{"data": [
            {"position": "Story & Art", "manga": {"mal_id": 11, "url": "u1", "title": "Naruto",
                "images": {"jpg": {"image_url": "i1"}}}},
            {"position": "Story", "manga": {"mal_id": 12, "url": "u2", "title": "Mario", "images": null}}
        ]}"#;
        let works: Option<Vec<JikanPersonWork>> = parse_envelope(body).unwrap();
        let works = works.unwrap();
        assert_eq!(works.len(), 2);
        assert_eq!(works[0].manga.as_ref().unwrap().title.as_deref(), Some("Naruto"));
    }

    #[test]
    fn test_endpoint_join() {
        let client = JikanClient::new("https://api.jikan.moe/v4/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint("manga/11/full"),
            "https://api.jikan.moe/v4/manga/11/full"
        );
    }
}
