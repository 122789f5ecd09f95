pub mod difficulty;
pub mod pool;
pub mod segmenter;
pub mod selector;

// Re-export the main types for convenience
pub use difficulty::{classify, Difficulty};
pub use pool::{fallback_passages, CorpusFile, Passage, PassagePool, FALLBACK_PASSAGES};
pub use segmenter::{split_into_passages, SegmentOptions};
pub use selector::{
    normalize_typography, quote_or_fallback, QuoteSelector, QuoteSource, Selection,
    DEFAULT_PASSAGES_PER_TEST,
};
