//! In-memory providers and fixtures for unit tests.

use crate::error::{FinderError, Result};
use crate::model::{Author, ExternalLink, RelatedWork};
use crate::provider::{
    Bibliography, HitFields, ImageSearch, MangaRecord, MatchCandidate, PersonRecord, RelationEntry,
    RelationGroup, Translator,
};
use crate::upload::ImageUpload;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Hit from a manga index with an english name and a thumbnail.
pub fn candidate(index_id: u32, similarity: f64, title: &str) -> MatchCandidate {
    MatchCandidate {
        index_id,
        index_name: format!("Index #{}: {}.jpg", index_id, title),
        similarity,
        thumbnail: Some(format!("https://img3.saucenao.com/{}.jpg", index_id)),
        hidden: false,
        fields: HitFields {
            eng_name: Some(title.to_string()),
            ..Default::default()
        },
    }
}

enum SearchMode {
    Hits(Vec<MatchCandidate>),
    Api,
    Unconfigured,
}

pub struct FakeImageSearch {
    mode: SearchMode,
    calls: AtomicUsize,
}

impl FakeImageSearch {
    pub fn with_hits(hits: Vec<MatchCandidate>) -> Self {
        Self {
            mode: SearchMode::Hits(hits),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            mode: SearchMode::Api,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            mode: SearchMode::Unconfigured,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageSearch for FakeImageSearch {
    async fn search(&self, _image: &ImageUpload, _include_nsfw: bool) -> Result<Vec<MatchCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            SearchMode::Hits(hits) => Ok(hits.clone()),
            SearchMode::Api => Err(FinderError::Api {
                code: 429,
                message: "Daily search limit exceeded".to_string(),
            }),
            SearchMode::Unconfigured => Err(FinderError::Config(
                "SAUCENAO_API_KEY not configured".to_string(),
            )),
        }
    }
}

/// Bibliography serving one fixed record for every query.
#[derive(Default)]
pub struct FakeBibliography {
    pub summary: Option<MangaRecord>,
    pub full: Option<MangaRecord>,
    pub external: Vec<ExternalLink>,
    pub person: Option<PersonRecord>,
    pub works: Vec<RelatedWork>,
    pub fail_search: bool,
    pub fail_full: bool,
    pub fail_external: bool,
    pub fail_person: bool,
    pub fail_works: bool,
    pub searches: AtomicUsize,
}

fn unavailable() -> FinderError {
    FinderError::Api {
        code: 503,
        message: "Service unavailable".to_string(),
    }
}

impl FakeBibliography {
    pub fn naruto() -> Self {
        Self {
            summary: Some(naruto_summary()),
            full: Some(naruto_full()),
            external: vec![
                ExternalLink {
                    name: Some("Official Site".into()),
                    url: Some("https://www.shonenjump.com/naruto".into()),
                },
                ExternalLink {
                    name: Some("Wikipedia".into()),
                    url: Some("https://en.wikipedia.org/wiki/Naruto".into()),
                },
            ],
            person: Some(PersonRecord {
                image_url: Some("https://cdn.myanimelist.net/images/voiceactors/1/1879.jpg".into()),
            }),
            works: [
                "Naruto",
                "Boruto: Naruto Next Generations",
                "Samurai 8: Hachimaruden",
                "Karakuri",
                "Mario",
                "Naruto: Uzumaki Naruto no Tanjou",
            ]
            .iter()
            .enumerate()
            .map(|(i, title)| RelatedWork {
                title: Some(title.to_string()),
                image_url: Some(format!("https://cdn.myanimelist.net/images/manga/{}.jpg", i)),
                url: Some(format!("https://myanimelist.net/manga/{}", i)),
                relation_type: None,
            })
            .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Bibliography for FakeBibliography {
    async fn search_manga(&self, _title: &str) -> Result<Option<MangaRecord>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(unavailable());
        }
        Ok(self.summary.clone())
    }

    async fn manga_full(&self, _mal_id: u64) -> Result<Option<MangaRecord>> {
        if self.fail_full {
            return Err(unavailable());
        }
        Ok(self.full.clone())
    }

    async fn manga_external(&self, _mal_id: u64) -> Result<Vec<ExternalLink>> {
        if self.fail_external {
            return Err(unavailable());
        }
        Ok(self.external.clone())
    }

    async fn person(&self, _mal_id: u64) -> Result<Option<PersonRecord>> {
        if self.fail_person {
            return Err(unavailable());
        }
        Ok(self.person.clone())
    }

    async fn person_works(&self, _mal_id: u64, limit: usize) -> Result<Vec<RelatedWork>> {
        if self.fail_works {
            return Err(unavailable());
        }
        Ok(self.works.iter().take(limit).cloned().collect())
    }
}

/// Search summary for Naruto: no relations or external links.
pub fn naruto_summary() -> MangaRecord {
    MangaRecord {
        mal_id: Some(11),
        synopsis: Some("Moments prior to Naruto Uzumaki's birth, a huge demon...".into()),
        image_url: Some("https://cdn.myanimelist.net/images/manga/3/249658.jpg".into()),
        large_image_url: Some("https://cdn.myanimelist.net/images/manga/3/249658l.jpg".into()),
        authors: vec![Author {
            name: Some("Kishimoto, Masashi".into()),
            url: Some("https://myanimelist.net/people/1879/Masashi_Kishimoto".into()),
            mal_id: Some(1879),
            image_url: None,
        }],
        chapters: Some(700),
        status: Some("Finished".into()),
        published: Some("Sep 21, 1999 to Nov 10, 2014".into()),
        score: Some(8.07),
        relations: Vec::new(),
        external: Vec::new(),
    }
}

/// Full record for Naruto, with one accepted relation among rejected ones.
pub fn naruto_full() -> MangaRecord {
    let entry = |mal_id: u64, media_type: &str, name: &str| RelationEntry {
        media_type: Some(media_type.to_string()),
        name: Some(name.to_string()),
        url: Some(format!("https://myanimelist.net/{}/{}", media_type, mal_id)),
    };

    MangaRecord {
        synopsis: Some(
            "Moments prior to Naruto Uzumaki's birth, a huge demon known as the Kyuubi \
             attacked Konohagakure. Full record synopsis."
                .into(),
        ),
        score: Some(8.08),
        relations: vec![
            RelationGroup {
                kind: "Adaptation".into(),
                entries: vec![entry(20, "anime", "Naruto")],
            },
            RelationGroup {
                kind: "Sequel".into(),
                entries: vec![entry(97938, "manga", "Boruto: Naruto Next Generations")],
            },
            RelationGroup {
                kind: "Side Story".into(),
                entries: vec![entry(442, "anime", "Naruto Movie 1")],
            },
            RelationGroup {
                kind: "Other".into(),
                entries: vec![entry(3528, "manga", "Naruto: Jump Festa")],
            },
        ],
        external: vec![ExternalLink {
            name: Some("Wikipedia".into()),
            url: Some("https://ja.wikipedia.org/wiki/NARUTO".into()),
        }],
        ..naruto_summary()
    }
}

pub struct FakeTranslator {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeTranslator {
    /// Prefixes the text with the target language tag.
    pub fn working() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FinderError::Translation("Rate limited".to_string()));
        }
        Ok(format!("[{}] {}", target_lang, text))
    }
}
