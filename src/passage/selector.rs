use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::difficulty::Difficulty;
use super::pool::{fallback_passages, Passage, PassagePool, FALLBACK_PASSAGES};
use crate::analytics::WordFrequency;
use crate::error::Result;

pub const DEFAULT_PASSAGES_PER_TEST: usize = 3;

/// Replace typographic quotes and dashes with their keyboard equivalents
pub fn normalize_typography(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            c => c,
        })
        .collect()
}

/// Passages chosen for one test, ready to be typed
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub passages: Vec<Passage>,
    pub difficulty: Difficulty,
    pub word_frequency: WordFrequency,
    /// Whether the requested tier was empty and built-in sentences were used
    pub used_fallback: bool,
}

impl Selection {
    fn new(chosen: Vec<Passage>, difficulty: Difficulty, used_fallback: bool) -> Self {
        let passages: Vec<Passage> = chosen
            .into_iter()
            .map(|p| Passage::with_difficulty(normalize_typography(&p.text), p.difficulty))
            .collect();

        let mut word_frequency = WordFrequency::default();
        for passage in &passages {
            word_frequency.add_text(&passage.text);
        }

        Self {
            passages,
            difficulty,
            word_frequency,
            used_fallback,
        }
    }

    /// A single caller-supplied passage
    pub fn custom(text: &str) -> Self {
        let passage = Passage::new(text.trim());
        let difficulty = passage.difficulty;
        Self::new(vec![passage], difficulty, false)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

/// Draws passages for a test. The only consumer of randomness in the crate.
#[derive(Debug, Clone)]
pub struct QuoteSelector<R: Rng = StdRng> {
    rng: R,
}

impl QuoteSelector<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible selection, for tests and `--seed`
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> QuoteSelector<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Pick up to `count` distinct passages of the requested tier. Returns
    /// everything available when the tier holds fewer than `count`, and the
    /// built-in sentences when it holds none.
    pub fn select(&mut self, pool: &PassagePool, difficulty: Difficulty, count: usize) -> Selection {
        let tier = pool.tier(difficulty);
        if tier.is_empty() {
            warn!("no {difficulty} passages available, using built-in sentences");
            let fallback = fallback_passages();
            let chosen = fallback
                .choose_multiple(&mut self.rng, count)
                .cloned()
                .collect();
            return Selection::new(chosen, difficulty, true);
        }

        let chosen: Vec<Passage> = tier
            .choose_multiple(&mut self.rng, count)
            .cloned()
            .collect();
        debug!(
            "selected {} of {} {difficulty} passages",
            chosen.len(),
            tier.len()
        );
        Selection::new(chosen, difficulty, false)
    }

    pub fn fallback_sentence(&mut self) -> &'static str {
        FALLBACK_PASSAGES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(FALLBACK_PASSAGES[0])
    }
}

/// Supplier of a single remote quotation.
///
/// This is the seam for a network quote provider. keystride ships no
/// implementation; callers bring their own and go through
/// [`quote_or_fallback`] so a failed fetch never reaches the user.
pub trait QuoteSource {
    fn fetch(&self) -> Result<String>;
}

/// Fetch a quotation, substituting a built-in sentence on any failure
pub fn quote_or_fallback<S, R>(source: &S, selector: &mut QuoteSelector<R>) -> Selection
where
    S: QuoteSource + ?Sized,
    R: Rng,
{
    match source.fetch() {
        Ok(text) if !text.trim().is_empty() => Selection::custom(&text),
        Ok(_) => {
            warn!("quotation source returned an empty quote, using a built-in sentence");
            Selection::custom(selector.fallback_sentence())
        }
        Err(e) => {
            warn!("{e}; using a built-in sentence");
            Selection::custom(selector.fallback_sentence())
        }
    }
}
