//! Collaborator seams.
//!
//! The pipeline talks to three external services through these traits. The
//! adapters ([`crate::saucenao`], [`crate::jikan`], [`crate::translate`]) turn
//! each provider's loosely-typed JSON into the records defined here, so the
//! matching and merge logic never sees raw payloads.

use crate::error::Result;
use crate::model::{Author, ExternalLink, RelatedWork};
use crate::upload::ImageUpload;
use async_trait::async_trait;

/// Metadata fields of a reverse-image-search hit.
///
/// Which of these are populated depends on the source index the hit came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitFields {
    pub eng_name: Option<String>,
    pub jp_name: Option<String>,
    pub title: Option<String>,
    pub material: Option<String>,
    pub source: Option<String>,
    pub creator: Vec<String>,
    pub member_name: Option<String>,
    pub artist: Option<String>,
    pub author: Option<String>,
    pub part: Option<String>,
}

/// One reverse-image-search hit, normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchCandidate {
    pub index_id: u32,
    pub index_name: String,
    pub similarity: f64,
    pub thumbnail: Option<String>,
    /// Flagged as explicit by the provider.
    pub hidden: bool,
    pub fields: HitFields,
}

/// A group of related entries sharing one relation kind ("Sequel", "Adaptation", ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationGroup {
    pub kind: String,
    pub entries: Vec<RelationEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationEntry {
    /// Media type of the entry ("manga", "anime").
    pub media_type: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Bibliographic record, either the search summary or the full record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MangaRecord {
    pub mal_id: Option<u64>,
    pub synopsis: Option<String>,
    pub image_url: Option<String>,
    pub large_image_url: Option<String>,
    pub authors: Vec<Author>,
    pub chapters: Option<u32>,
    pub status: Option<String>,
    pub published: Option<String>,
    pub score: Option<f64>,
    /// Only populated on full records.
    pub relations: Vec<RelationGroup>,
    /// Only populated on full records.
    pub external: Vec<ExternalLink>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonRecord {
    /// Portrait.
    pub image_url: Option<String>,
}

/// Reverse-image-search provider.
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Ordered hits for `image`. Explicit hits are suppressed provider-side
    /// unless `include_nsfw` is set.
    async fn search(&self, image: &ImageUpload, include_nsfw: bool) -> Result<Vec<MatchCandidate>>;
}

/// Bibliographic database.
#[async_trait]
pub trait Bibliography: Send + Sync {
    /// Best hit for a free-text title query.
    async fn search_manga(&self, title: &str) -> Result<Option<MangaRecord>>;

    /// Full record (relations, external links, extended fields).
    async fn manga_full(&self, mal_id: u64) -> Result<Option<MangaRecord>>;

    async fn manga_external(&self, mal_id: u64) -> Result<Vec<ExternalLink>>;

    async fn person(&self, mal_id: u64) -> Result<Option<PersonRecord>>;

    /// Works by a person, in provider order, at most `limit`.
    async fn person_works(&self, mal_id: u64, limit: usize) -> Result<Vec<RelatedWork>>;
}

/// Text translation provider.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String>;
}
