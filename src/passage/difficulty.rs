use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Difficulty tier of a passage, decided by the characters it contains
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

/// Punctuation allowed in a medium passage on top of letters, digits and whitespace
const MEDIUM_PUNCTUATION: [char; 6] = ['.', ',', '?', '!', '\'', '"'];

fn is_easy_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c.is_whitespace() || c == '.'
}

fn is_medium_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || MEDIUM_PUNCTUATION.contains(&c)
}

/// Ordered decision list: the first tier whose predicate accepts every
/// character wins. Anything that falls through is hard.
const RULES: [(Difficulty, fn(char) -> bool); 2] = [
    (Difficulty::Easy, is_easy_char),
    (Difficulty::Medium, is_medium_char),
];

/// Classify a passage. Total over all inputs; an empty string is easy.
pub fn classify(text: &str) -> Difficulty {
    RULES
        .iter()
        .find(|(_, allowed)| text.chars().all(allowed))
        .map(|(difficulty, _)| *difficulty)
        .unwrap_or(Difficulty::Hard)
}
