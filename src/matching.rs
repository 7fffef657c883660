//! Reverse-image-search hit selection.
//!
//! Turns the provider's ordered hits into a primary match (title, author,
//! similarity) plus a list of alternatives. Everything here is pure.

use crate::fallback::{first_present, Presence};
use crate::model::{OtherMatch, SearchResult};
use crate::provider::MatchCandidate;

/// Message when the provider returned nothing at all.
pub const NO_MATCHES: &str = "No matches found";

/// Message when the provider returned hits, but none from a manga index.
pub const NO_MANGA_MATCHES: &str = "No manga matches found (illustrations excluded)";

/// Warning attached to a primary match below the confidence threshold.
pub const LOW_CONFIDENCE_WARNING: &str = "No se encontró una coincidencia exacta";

/// SauceNAO index ids of manga/doujinshi sources.
///
/// Provider convention, not documented as a set. Kept verbatim.
pub const MANGA_INDEX_IDS: &[u32] = &[3, 18, 27, 37, 38, 44, 51, 52];

/// Decision constants for hit selection.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPolicy {
    /// Index ids that count as manga sources.
    pub manga_index_ids: Vec<u32>,
    /// Alternatives at or below this similarity are dropped.
    pub alternative_floor: f64,
    /// Primary matches below this similarity get a warning.
    pub low_confidence_below: f64,
    /// Number of hits requested from the provider.
    pub result_count: u32,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            manga_index_ids: MANGA_INDEX_IDS.to_vec(),
            alternative_floor: 40.0,
            low_confidence_below: 60.0,
            result_count: 12,
        }
    }
}

/// The best hit, reduced to what the rest of the pipeline needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryMatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub similarity: f64,
    pub thumbnail: Option<String>,
    pub part: Option<String>,
    pub alternatives: Vec<OtherMatch>,
    pub warning: Option<String>,
}

impl PrimaryMatch {
    /// Initial record before enrichment: the matched thumbnail doubles as cover.
    pub fn to_result(&self) -> SearchResult {
        SearchResult {
            found: true,
            similarity: self.similarity,
            title: self.title.clone(),
            estimated_chapter: self.part.clone(),
            estimated_page: None,
            cover_url: self.thumbnail.clone(),
            match_image_url: self.thumbnail.clone(),
            other_matches: self.alternatives.clone(),
            warning: self.warning.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// Provider returned no hits.
    NoHits,
    /// Provider returned hits, all outside the manga indices.
    OnlyIllustrations,
    Found(PrimaryMatch),
}

impl MatchOutcome {
    /// User-facing message for the negative outcomes.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            MatchOutcome::NoHits => Some(NO_MATCHES),
            MatchOutcome::OnlyIllustrations => Some(NO_MANGA_MATCHES),
            MatchOutcome::Found(_) => None,
        }
    }
}

impl MatchPolicy {
    /// Keep only hits from manga indices, preserving order.
    pub fn filter_manga(&self, hits: Vec<MatchCandidate>) -> Vec<MatchCandidate> {
        hits.into_iter()
            .filter(|hit| self.manga_index_ids.contains(&hit.index_id))
            .collect()
    }

    /// Alternatives from the hits after the primary one.
    pub fn rank_alternatives(&self, rest: &[MatchCandidate], include_nsfw: bool) -> Vec<OtherMatch> {
        rest.iter()
            .filter(|hit| include_nsfw || !hit.hidden)
            .filter(|hit| hit.similarity > self.alternative_floor)
            .map(|hit| OtherMatch {
                title: extract_title(hit),
                similarity: hit.similarity,
                thumbnail_url: hit.thumbnail.clone(),
            })
            .collect()
    }

    /// Select the primary match from raw provider hits.
    pub fn evaluate(&self, hits: Vec<MatchCandidate>, include_nsfw: bool) -> MatchOutcome {
        let raw_count = hits.len();
        let manga = self.filter_manga(hits);

        let Some((best, rest)) = manga.split_first() else {
            return if raw_count == 0 {
                MatchOutcome::NoHits
            } else {
                MatchOutcome::OnlyIllustrations
            };
        };

        let warning = (best.similarity < self.low_confidence_below)
            .then(|| LOW_CONFIDENCE_WARNING.to_string());

        MatchOutcome::Found(PrimaryMatch {
            title: extract_title(best),
            author: extract_author(best),
            similarity: best.similarity,
            thumbnail: best.thumbnail.clone(),
            part: best.fields.part.clone().filter(|p| p.is_present()),
            alternatives: self.rank_alternatives(rest, include_nsfw),
            warning,
        })
    }
}

/// Whether a value looks like a link rather than a name.
///
/// Needs a scheme separator or a `www.` host; "HTTP Love" is a title.
pub fn is_url_like(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower.contains("://") || lower.contains("www.")
}

/// Best-guess title of a hit.
///
/// Order: english name, japanese name, title, material (first non-empty; a
/// URL-shaped pick is discarded), then `source` if not URL-shaped, then the
/// index display name up to its first colon.
pub fn extract_title(hit: &MatchCandidate) -> Option<String> {
    let f = &hit.fields;

    let named = first_present(
        [&f.eng_name, &f.jp_name, &f.title, &f.material]
            .into_iter()
            .filter_map(|v| v.as_deref()),
    )
    .filter(|t| !is_url_like(t));

    let source = f
        .source
        .as_deref()
        .filter(|s| s.is_present() && !is_url_like(s));

    // Splitting on ':' would cut a scheme off, so check the whole name.
    let category = Some(hit.index_name.as_str())
        .filter(|name| !is_url_like(name))
        .and_then(|name| name.split(':').next());

    first_present([named, source, category].into_iter().flatten()).map(|t| t.trim().to_string())
}

/// Best-guess author of a hit. Multi-valued creator fields yield their first entry.
pub fn extract_author(hit: &MatchCandidate) -> Option<String> {
    let f = &hit.fields;
    first_present(
        [
            f.creator.first().map(String::as_str),
            f.member_name.as_deref(),
            f.artist.as_deref(),
            f.author.as_deref(),
        ]
        .into_iter()
        .flatten(),
    )
    .map(|a| a.trim().to_string())
}
