use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use include_dir::{include_dir, Dir};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::difficulty::{classify, Difficulty};
use super::segmenter::{split_into_passages, SegmentOptions};
use crate::error::{KeystrideError, Result};

static CORPUS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/corpus");
const EMBEDDED_CORPUS: &str = "passages.json";

/// Generic sentences served when a requested tier has nothing to offer
pub const FALLBACK_PASSAGES: [&str; 5] = [
    "Practice makes progress, one keystroke at a time.",
    "Keep your eyes on the text and let your fingers find the keys.",
    "A steady rhythm beats frantic bursts when you are typing for accuracy.",
    "Every expert typist once started out hunting for the home row.",
    "Take a breath, relax your shoulders, and type the next line.",
];

/// A single unit of text the user is asked to type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub length: usize,
    pub difficulty: Difficulty,
}

impl Passage {
    /// Build a passage and classify it from its characters
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let difficulty = classify(&text);
        Self::with_difficulty(text, difficulty)
    }

    pub fn with_difficulty(text: impl Into<String>, difficulty: Difficulty) -> Self {
        let text = text.into();
        Self {
            length: text.chars().count(),
            text,
            difficulty,
        }
    }
}

pub fn fallback_passages() -> Vec<Passage> {
    FALLBACK_PASSAGES.iter().map(|t| Passage::new(*t)).collect()
}

/// On-disk corpus schema: `{"passages": {"easy": [..], "medium": [..], "hard": [..]}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusFile {
    pub passages: TieredPassages,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieredPassages {
    #[serde(default)]
    pub easy: Vec<String>,
    #[serde(default)]
    pub medium: Vec<String>,
    #[serde(default)]
    pub hard: Vec<String>,
}

/// Accepts both the tiered schema and a flat, unclassified list of passages
#[derive(Deserialize)]
#[serde(untagged)]
enum PassageListing {
    Tiered(TieredPassages),
    Flat(Vec<String>),
}

#[derive(Deserialize)]
struct RawCorpusFile {
    passages: PassageListing,
}

/// Segmented and classified corpus, read-only once built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassagePool {
    tiers: BTreeMap<Difficulty, Vec<Passage>>,
}

impl PassagePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify each text and file it under its tier
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pool = Self::new();
        for text in texts {
            pool.insert(Passage::new(text));
        }
        pool
    }

    /// Segment raw text and classify the resulting passages
    pub fn from_raw_text(text: &str, options: SegmentOptions) -> Self {
        Self::from_texts(split_into_passages(text, options))
    }

    pub fn insert(&mut self, passage: Passage) {
        self.tiers
            .entry(passage.difficulty)
            .or_default()
            .push(passage);
    }

    pub fn tier(&self, difficulty: Difficulty) -> &[Passage] {
        self.tiers
            .get(&difficulty)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The corpus compiled into the binary
    pub fn embedded() -> Self {
        let contents = CORPUS_DIR
            .get_file(EMBEDDED_CORPUS)
            .and_then(|file| file.contents_utf8());

        match contents.map(Self::from_json) {
            Some(Ok(pool)) => pool,
            Some(Err(e)) => {
                warn!("embedded corpus is malformed, using an empty pool: {e}");
                Self::new()
            }
            None => {
                warn!("embedded corpus is missing, using an empty pool");
                Self::new()
            }
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let raw: RawCorpusFile = serde_json::from_str(json)?;
        let pool = match raw.passages {
            PassageListing::Tiered(tiers) => {
                let mut pool = Self::new();
                for (difficulty, texts) in [
                    (Difficulty::Easy, tiers.easy),
                    (Difficulty::Medium, tiers.medium),
                    (Difficulty::Hard, tiers.hard),
                ] {
                    for text in texts {
                        pool.insert(Passage::with_difficulty(text, difficulty));
                    }
                }
                pool
            }
            PassageListing::Flat(texts) => Self::from_texts(texts),
        };
        Ok(pool)
    }

    pub fn to_corpus_file(&self) -> CorpusFile {
        let texts = |d: Difficulty| -> Vec<String> {
            self.tier(d).iter().map(|p| p.text.clone()).collect()
        };
        CorpusFile {
            passages: TieredPassages {
                easy: texts(Difficulty::Easy),
                medium: texts(Difficulty::Medium),
                hard: texts(Difficulty::Hard),
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_corpus_file())?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| KeystrideError::CorpusRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| KeystrideError::CorpusParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a corpus file, treating any failure as an empty pool so that
    /// selection falls through to the built-in sentences.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(pool) => {
                info!(
                    "loaded {} passages from {}",
                    pool.len(),
                    path.as_ref().display()
                );
                pool
            }
            Err(e) => {
                warn!("{e}; falling back to built-in passages");
                Self::new()
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let write_err = |source| KeystrideError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, self.to_json()?).map_err(write_err)
    }
}
