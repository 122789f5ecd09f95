use log::debug;

pub const DEFAULT_MAX_LENGTH: usize = 600;
pub const DEFAULT_MIN_LENGTH: usize = 200;

const SENTENCE_DELIMITER: &str = ". ";

/// Length bounds for generated passages, counted in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOptions {
    pub max_length: usize,
    pub min_length: usize,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl SegmentOptions {
    pub fn new(max_length: usize, min_length: usize) -> Self {
        Self {
            max_length,
            min_length,
        }
    }

    fn accepts(&self, len: usize) -> bool {
        len >= self.min_length && len <= self.max_length
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split raw text into typing passages.
///
/// Paragraphs are separated by blank lines. A paragraph that already fits is
/// kept whole (or discarded when too short). Longer paragraphs are packed
/// greedily sentence by sentence. Chunks outside the bounds are dropped, never
/// merged with their neighbours.
pub fn split_into_passages(text: &str, options: SegmentOptions) -> Vec<String> {
    let text = text.replace("\r\n", "\n");
    let mut passages = Vec::new();

    for paragraph in paragraphs(&text) {
        if char_len(&paragraph) <= options.max_length {
            if options.accepts(char_len(&paragraph)) {
                passages.push(paragraph);
            }
        } else {
            pack_sentences(&paragraph, options, &mut passages);
        }
    }

    passages
}

fn paragraphs(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split("\n\n")
        .map(|p| p.trim().replace('\n', " "))
        .filter(|p| !p.is_empty())
}

/// Split on `". "` and give the delimiter back to each fragment it followed.
/// The paragraph's last sentence keeps its own ending untouched, so a closing
/// period never becomes `..` and its packing length is exact.
fn sentences(paragraph: &str) -> Vec<String> {
    let fragments: Vec<&str> = paragraph.split(SENTENCE_DELIMITER).collect();
    let last = fragments.len().saturating_sub(1);
    fragments
        .into_iter()
        .enumerate()
        .map(|(idx, fragment)| {
            if idx < last {
                format!("{fragment}{SENTENCE_DELIMITER}")
            } else {
                fragment.to_string()
            }
        })
        .collect()
}

fn pack_sentences(paragraph: &str, options: SegmentOptions, out: &mut Vec<String>) {
    let mut chunk = String::new();
    let mut chunk_len = 0;

    for sentence in sentences(paragraph) {
        let sentence_len = char_len(&sentence);
        if chunk_len + sentence_len < options.max_length {
            chunk.push_str(&sentence);
            chunk_len += sentence_len;
        } else {
            flush(&chunk, options, out);
            chunk_len = sentence_len;
            chunk = sentence;
        }
    }

    flush(&chunk, options, out);
}

fn flush(chunk: &str, options: SegmentOptions, out: &mut Vec<String>) {
    let trimmed = chunk.trim();
    if trimmed.is_empty() {
        return;
    }

    let len = char_len(trimmed);
    if options.accepts(len) {
        out.push(trimmed.to_string());
    } else {
        debug!(
            "dropping {len}-char chunk outside [{}, {}]",
            options.min_length, options.max_length
        );
    }
}
