pub mod keyboard;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{KeystrideError, Result};

pub use keyboard::{proximity_map, Heatmap};

/// Number of words kept in the word frequency report
pub const TOP_WORDS: usize = 20;

/// Error counts keyed by the character the user was supposed to type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MistypeHistogram {
    counts: BTreeMap<char, u64>,
}

impl MistypeHistogram {
    pub fn record(&mut self, expected: char) {
        *self.counts.entry(expected).or_insert(0) += 1;
    }

    pub fn count(&self, expected: char) -> u64 {
        self.counts.get(&expected).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }

    /// Most frequently mistyped characters, highest count first
    pub fn top(&self, n: usize) -> Vec<(char, u64)> {
        self.iter()
            .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)))
            .take(n)
            .collect()
    }

    /// Labels and values for the error frequency bar chart
    pub fn bar_chart_data(&self, n: usize) -> (Vec<String>, Vec<u64>) {
        self.top(n)
            .into_iter()
            .map(|(c, count)| (char_label(c), count))
            .unzip()
    }
}

/// Printable label for a character, naming the invisible ones
pub fn char_label(c: char) -> String {
    match c {
        ' ' => "space".to_string(),
        '\t' => "tab".to_string(),
        '\n' => "enter".to_string(),
        c => c.to_string(),
    }
}

/// Lower-cased word counts of the passages selected for a test
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordFrequency {
    counts: HashMap<String, u64>,
}

impl WordFrequency {
    pub fn from_text(text: &str) -> Self {
        let mut freq = Self::default();
        freq.add_text(text);
        freq
    }

    pub fn add_text(&mut self, text: &str) {
        for word in text.split_whitespace() {
            *self.counts.entry(word.to_lowercase()).or_insert(0) += 1;
        }
    }

    pub fn count(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Highest counts first; ties are ordered alphabetically
    pub fn top(&self, n: usize) -> Vec<(String, u64)> {
        self.counts
            .iter()
            .sorted_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)))
            .take(n)
            .map(|(word, count)| (word.clone(), *count))
            .collect()
    }
}

/// Error analysis written once at the end of a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub common_errors: BTreeMap<char, u64>,
    pub proximity_map: BTreeMap<char, Vec<char>>,
    pub common_words: BTreeMap<String, u64>,
}

impl ErrorReport {
    pub fn build(histogram: &MistypeHistogram, words: &WordFrequency) -> Self {
        Self {
            common_errors: histogram.counts.clone(),
            proximity_map: proximity_map(),
            common_words: words.top(TOP_WORDS).into_iter().collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
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
