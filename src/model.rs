//! Output records returned by `/search` and `/details`.
//!
//! Field names on the wire follow the JSON contract the web frontend consumes,
//! hence the `serde(rename)`s.

use serde::{Deserialize, Serialize};

/// Author of a work. Every field is optional, since each source fills a different subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: Option<String>,
    pub url: Option<String>,
    pub mal_id: Option<u64>,
    pub image_url: Option<String>,
}

impl Author {
    /// Author known only by name (image-match fallback).
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Work connected to the primary one: another work by the same author,
/// or a relation such as a sequel (then `relation_type` is set).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedWork {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub url: Option<String>,
    pub relation_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Lower-ranked image match, shown as an alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherMatch {
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    pub similarity: f64,
    #[serde(rename = "portada_url")]
    pub thumbnail_url: Option<String>,
}

/// Unified search record.
///
/// When `found` is false only `message` carries information; use
/// [`SearchResult::not_found`] to build one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub found: bool,
    #[serde(rename = "similarity_confidence")]
    pub similarity: f64,
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    #[serde(rename = "capitulo_estimado")]
    pub estimated_chapter: Option<String>,
    #[serde(rename = "pagina_estimada")]
    pub estimated_page: Option<String>,
    #[serde(rename = "sinopsis")]
    pub synopsis: Option<String>,
    #[serde(rename = "sinopsis_en")]
    pub synopsis_original: Option<String>,
    #[serde(rename = "sinopsis_es")]
    pub synopsis_localized: Option<String>,
    #[serde(rename = "portada_url")]
    pub cover_url: Option<String>,
    pub match_image_url: Option<String>,
    #[serde(rename = "otras_coincidencias")]
    pub other_matches: Vec<OtherMatch>,
    #[serde(rename = "autores")]
    pub authors: Vec<Author>,
    #[serde(rename = "otras_obras")]
    pub author_works: Vec<RelatedWork>,
    pub related_manga: Vec<RelatedWork>,
    pub external_links: Vec<ExternalLink>,
    pub chapters: Option<u32>,
    pub status: Option<String>,
    pub published: Option<String>,
    pub score: Option<f64>,
    pub warning: Option<String>,
    pub message: Option<String>,
}

impl SearchResult {
    /// Negative result: everything empty except the message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            found: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Result for a title the caller already knows (no image match involved).
    pub fn for_title(title: impl Into<String>) -> Self {
        Self {
            found: true,
            title: Some(title.into()),
            ..Default::default()
        }
    }
}
