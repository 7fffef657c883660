//! Merge of the image-match record with bibliographic details.
//!
//! Bibliographic values win whenever they are present. The image match only
//! fills gaps, and its author string is used only when no author list came
//! back at all. The title is never touched: the details were looked up by it.

use crate::enrich::MangaDetails;
use crate::fallback::{prefer, Presence};
use crate::model::{Author, SearchResult};

pub fn merge(base: SearchResult, details: MangaDetails, image_author: Option<&str>) -> SearchResult {
    let mut merged = SearchResult {
        synopsis: prefer(details.synopsis, base.synopsis),
        cover_url: prefer(details.cover_url, base.cover_url),
        authors: prefer(details.authors, base.authors),
        author_works: prefer(details.author_works, base.author_works),
        related_manga: prefer(details.related_manga, base.related_manga),
        external_links: prefer(details.external_links, base.external_links),
        chapters: prefer(details.chapters, base.chapters),
        status: prefer(details.status, base.status),
        published: prefer(details.published, base.published),
        score: prefer(details.score, base.score),
        ..base
    };

    if merged.authors.is_empty() {
        if let Some(name) = image_author.filter(|a| a.is_present()) {
            merged.authors = vec![Author::named(name.trim())];
        }
    }

    merged
}
