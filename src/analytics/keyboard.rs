//! Physical QWERTY model used by the error heatmap and the proximity table.
//!
//! Rows are stored left to right as they appear on an ANSI keyboard. Each row
//! sits half a key to the right of the row above it, so the key below column
//! `c` touches columns `c - 1` and `c` of the next row down.

use std::collections::BTreeMap;

use super::MistypeHistogram;

pub const QWERTY_ROWS: [&str; 4] = ["1234567890-=", "qwertyuiop[]\\", "asdfghjkl;'", "zxcvbnm,./"];
const SHIFTED_ROWS: [&str; 4] = ["!@#$%^&*()_+", "QWERTYUIOP{}|", "ASDFGHJKL:\"", "ZXCVBNM<>?"];

pub const ROW_LABELS: [&str; 4] = ["number", "top", "home", "bottom"];
pub const HEATMAP_COLUMNS: usize = 13;

/// Row and column of the key that produces `c`, shifted or not
pub fn key_position(c: char) -> Option<(usize, usize)> {
    QWERTY_ROWS
        .iter()
        .zip(SHIFTED_ROWS.iter())
        .enumerate()
        .find_map(|(row, (plain, shifted))| {
            plain
                .chars()
                .position(|k| k == c)
                .or_else(|| shifted.chars().position(|k| k == c))
                .map(|col| (row, col))
        })
}

/// Unshifted character printed on the key at `(row, col)`
pub fn key_at(row: usize, col: usize) -> Option<char> {
    QWERTY_ROWS.get(row).and_then(|keys| keys.chars().nth(col))
}

/// Keys touching `c` horizontally, vertically or diagonally
fn adjacent_keys(c: char) -> Vec<char> {
    let Some((row, col)) = key_position(c) else {
        return Vec::new();
    };

    let mut cells = vec![(row, col.wrapping_sub(1)), (row, col + 1)];
    if row > 0 {
        cells.push((row - 1, col));
        cells.push((row - 1, col + 1));
    }
    cells.push((row + 1, col.wrapping_sub(1)));
    cells.push((row + 1, col));

    cells
        .into_iter()
        .filter_map(|(r, c)| key_at(r, c))
        .collect()
}

/// Letters physically adjacent to `letter`, sorted
pub fn neighbours(letter: char) -> Vec<char> {
    let letter = letter.to_ascii_lowercase();
    if !letter.is_ascii_lowercase() {
        return Vec::new();
    }
    let mut keys: Vec<char> = adjacent_keys(letter)
        .into_iter()
        .filter(char::is_ascii_lowercase)
        .collect();
    keys.sort_unstable();
    keys
}

/// Adjacency table for every letter a-z
pub fn proximity_map() -> BTreeMap<char, Vec<char>> {
    ('a'..='z').map(|c| (c, neighbours(c))).collect()
}

/// Mistype counts laid out over the physical key grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heatmap {
    pub matrix: Vec<Vec<u64>>,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// Errors on characters with no key on the grid (space, tab, non-ASCII)
    pub unplaced: u64,
}

impl Heatmap {
    pub fn from_histogram(histogram: &MistypeHistogram) -> Self {
        let mut matrix = vec![vec![0; HEATMAP_COLUMNS]; QWERTY_ROWS.len()];
        let mut unplaced = 0;

        for (c, count) in histogram.iter() {
            match key_position(c) {
                Some((row, col)) => matrix[row][col] += count,
                None => unplaced += count,
            }
        }

        Self {
            matrix,
            row_labels: ROW_LABELS.iter().map(|s| s.to_string()).collect(),
            col_labels: (1..=HEATMAP_COLUMNS).map(|c| c.to_string()).collect(),
            unplaced,
        }
    }

    pub fn max(&self) -> u64 {
        self.matrix.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.matrix
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(0)
    }
}
