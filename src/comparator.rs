use std::time::SystemTime;

use crate::analytics::MistypeHistogram;

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Verdict for one typed character
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharVerdict {
    pub typed: char,
    /// `None` when the character was typed past the end of the target
    pub expected: Option<char>,
    pub outcome: Outcome,
}

impl CharVerdict {
    pub fn is_overtype(&self) -> bool {
        self.expected.is_none()
    }
}

/// Result of comparing one typed snapshot against the target
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Comparison {
    pub verdicts: Vec<CharVerdict>,
    /// Index of the next character to type, absent once the target is covered
    pub cursor: Option<usize>,
    /// Share of the target covered by the typed text, in `[0, 1]`
    pub progress: f64,
    /// Mismatches inside the target
    pub incorrect: usize,
    /// Characters typed past the end of the target
    pub overtype: usize,
}

impl Comparison {
    /// Errors in this snapshot. Recomputed from scratch on every keystroke,
    /// so correcting a mistake removes it from the count.
    pub fn errors(&self) -> usize {
        self.incorrect + self.overtype
    }

    pub fn correct(&self) -> usize {
        self.verdicts.len() - self.errors()
    }
}

/// Compare a typed snapshot against the target text, character by character.
///
/// Pure function of its inputs: no state is carried between snapshots.
pub fn compare(target: &str, typed: &str) -> Comparison {
    let target: Vec<char> = target.chars().collect();
    let typed: Vec<char> = typed.chars().collect();

    let mut comparison = Comparison::default();

    for (idx, &c) in typed.iter().enumerate() {
        let expected = target.get(idx).copied();
        let outcome = match expected {
            Some(e) if e == c => Outcome::Correct,
            Some(_) => {
                comparison.incorrect += 1;
                Outcome::Incorrect
            }
            None => {
                comparison.overtype += 1;
                Outcome::Incorrect
            }
        };
        comparison.verdicts.push(CharVerdict {
            typed: c,
            expected,
            outcome,
        });
    }

    let covered = typed.len().min(target.len());
    comparison.cursor = (typed.len() < target.len()).then_some(typed.len());
    comparison.progress = if target.is_empty() {
        0.0
    } else {
        covered as f64 / target.len() as f64
    };

    comparison
}

/// Number of leading characters two strings share
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    InProgress,
    Completed,
}

/// Typing state for the passage currently on screen
#[derive(Debug, Clone)]
pub struct TypingSession {
    target: String,
    typed: String,
    comparison: Comparison,
    status: SessionStatus,
    started_at: Option<SystemTime>,
    completed_at: Option<SystemTime>,
}

impl TypingSession {
    pub fn new(target: impl Into<String>) -> Self {
        let target = target.into();
        let comparison = compare(&target, "");
        Self {
            target,
            typed: String::new(),
            comparison,
            status: SessionStatus::Idle,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn comparison(&self) -> &Comparison {
        &self.comparison
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<SystemTime> {
        self.completed_at
    }

    pub fn has_started(&self) -> bool {
        self.status != SessionStatus::Idle
    }

    pub fn has_finished(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Live error count of the latest snapshot
    pub fn cursor_error_count(&self) -> usize {
        self.comparison.errors()
    }

    /// Apply a full snapshot of the typed text.
    ///
    /// Characters that differ from the previous snapshot are new keystrokes;
    /// the mismatched ones among them are charged to `histogram` under the
    /// expected character. Snapshots after completion are ignored.
    pub fn apply_snapshot(
        &mut self,
        typed: &str,
        now: SystemTime,
        histogram: &mut MistypeHistogram,
    ) -> &Comparison {
        if self.has_finished() {
            return &self.comparison;
        }

        if self.status == SessionStatus::Idle && !typed.is_empty() {
            self.status = SessionStatus::InProgress;
            self.started_at = Some(now);
        }

        let comparison = compare(&self.target, typed);
        let unchanged = common_prefix_len(&self.typed, typed);
        for verdict in comparison.verdicts.iter().skip(unchanged) {
            if let (Outcome::Incorrect, Some(expected)) = (verdict.outcome, verdict.expected) {
                histogram.record(expected);
            }
        }

        self.typed = typed.to_string();
        self.comparison = comparison;

        if self.status == SessionStatus::InProgress
            && self.typed.chars().count() >= self.target.chars().count()
        {
            self.complete(now);
        }

        &self.comparison
    }

    /// Force completion, e.g. when the test is ended early
    pub fn complete(&mut self, now: SystemTime) {
        if !self.has_finished() {
            self.status = SessionStatus::Completed;
            self.completed_at = Some(now);
        }
    }

    /// Error tally for the finished passage, re-scanned from the final text
    pub fn final_errors(&self) -> usize {
        compare(&self.target, &self.typed).errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_000 + secs)
    }

    #[test]
    fn test_identical_text_is_all_correct() {
        let comparison = compare("The quick fox. ", "The quick fox. ");
        assert_eq!(comparison.errors(), 0);
        assert_eq!(comparison.correct(), 15);
        assert_eq!(comparison.progress, 1.0);
        assert_eq!(comparison.cursor, None);
    }

    #[test]
    fn test_strict_prefix_has_no_errors() {
        let comparison = compare("hello", "hel");
        assert_eq!(comparison.errors(), 0);
        assert_eq!(comparison.progress, 3.0 / 5.0);
        assert_eq!(comparison.cursor, Some(3));
        assert!(comparison
            .verdicts
            .iter()
            .all(|v| v.outcome == Outcome::Correct));
    }

    #[test]
    fn test_mismatch_is_incorrect() {
        let comparison = compare("cat", "cag");
        assert_eq!(comparison.incorrect, 1);
        assert_eq!(comparison.overtype, 0);
        assert_eq!(comparison.verdicts[2].outcome, Outcome::Incorrect);
        assert_eq!(comparison.verdicts[2].expected, Some('t'));
        assert_eq!(comparison.progress, 1.0);
    }

    #[test]
    fn test_overtype_counts_as_errors() {
        let comparison = compare("hi", "hiya");
        assert_eq!(comparison.incorrect, 0);
        assert_eq!(comparison.overtype, 2);
        assert_eq!(comparison.errors(), 2);
        assert_eq!(comparison.progress, 1.0);
        assert!(comparison.verdicts[3].is_overtype());
    }

    #[test]
    fn test_empty_target_has_zero_progress() {
        let comparison = compare("", "");
        assert_eq!(comparison.progress, 0.0);
        assert_eq!(comparison.cursor, None);

        let comparison = compare("", "x");
        assert_eq!(comparison.progress, 0.0);
        assert_eq!(comparison.overtype, 1);
    }

    #[test]
    fn test_untyped_tail_is_not_scored() {
        let comparison = compare("abcdef", "abx");
        assert_eq!(comparison.verdicts.len(), 3);
        assert_eq!(comparison.errors(), 1);
    }

    #[test]
    fn test_multibyte_characters_compare_by_char() {
        let comparison = compare("café", "cafe");
        assert_eq!(comparison.incorrect, 1);
        assert_eq!(comparison.verdicts[3].expected, Some('é'));
        assert_eq!(comparison.progress, 1.0);
    }

    #[test]
    fn test_compare_is_idempotent() {
        assert_eq!(compare("abc", "axc"), compare("abc", "axc"));
    }

    #[test]
    fn test_session_starts_on_first_non_empty_snapshot() {
        let mut histogram = MistypeHistogram::default();
        let mut session = TypingSession::new("abc");
        assert_eq!(session.status(), SessionStatus::Idle);

        session.apply_snapshot("", at(0), &mut histogram);
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.started_at(), None);

        session.apply_snapshot("a", at(1), &mut histogram);
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.started_at(), Some(at(1)));

        session.apply_snapshot("ab", at(2), &mut histogram);
        assert_eq!(session.started_at(), Some(at(1)));
    }

    #[test]
    fn test_session_completes_when_lengths_meet() {
        let mut histogram = MistypeHistogram::default();
        let mut session = TypingSession::new("cat");

        session.apply_snapshot("c", at(0), &mut histogram);
        session.apply_snapshot("ca", at(1), &mut histogram);
        session.apply_snapshot("cag", at(2), &mut histogram);

        assert!(session.has_finished());
        assert_eq!(session.completed_at(), Some(at(2)));
        assert_eq!(session.final_errors(), 1);
        assert_eq!(histogram.count('t'), 1);
        assert_eq!(histogram.total(), 1);
    }

    #[test]
    fn test_snapshots_after_completion_are_ignored() {
        let mut histogram = MistypeHistogram::default();
        let mut session = TypingSession::new("ab");
        session.apply_snapshot("ab", at(0), &mut histogram);
        session.apply_snapshot("abzz", at(1), &mut histogram);

        assert_eq!(session.typed(), "ab");
        assert_eq!(session.final_errors(), 0);
    }

    #[test]
    fn test_live_error_count_drops_after_backspace() {
        let mut histogram = MistypeHistogram::default();
        let mut session = TypingSession::new("hello");

        session.apply_snapshot("h", at(0), &mut histogram);
        session.apply_snapshot("hx", at(1), &mut histogram);
        assert_eq!(session.cursor_error_count(), 1);

        session.apply_snapshot("h", at(2), &mut histogram);
        assert_eq!(session.cursor_error_count(), 0);

        session.apply_snapshot("he", at(3), &mut histogram);
        assert_eq!(session.cursor_error_count(), 0);
        assert_eq!(session.comparison().cursor, Some(2));
    }

    #[test]
    fn test_histogram_charges_each_mistake_once() {
        let mut histogram = MistypeHistogram::default();
        let mut session = TypingSession::new("hello");

        session.apply_snapshot("x", at(0), &mut histogram);
        session.apply_snapshot("xe", at(1), &mut histogram);
        session.apply_snapshot("xel", at(2), &mut histogram);
        assert_eq!(histogram.count('h'), 1);

        // Backspacing to the mistake and repeating it is a second mistake
        session.apply_snapshot("", at(3), &mut histogram);
        session.apply_snapshot("x", at(4), &mut histogram);
        assert_eq!(histogram.count('h'), 2);
    }

    #[test]
    fn test_pasted_snapshot_charges_every_new_mistake() {
        let mut histogram = MistypeHistogram::default();
        let mut session = TypingSession::new("abcd");
        session.apply_snapshot("xbyd", at(0), &mut histogram);

        assert_eq!(histogram.count('a'), 1);
        assert_eq!(histogram.count('c'), 1);
        assert!(session.has_finished());
    }

    #[test]
    fn test_forced_completion() {
        let mut histogram = MistypeHistogram::default();
        let mut session = TypingSession::new("hello");
        session.apply_snapshot("he", at(0), &mut histogram);

        session.complete(at(5));
        assert!(session.has_finished());
        assert_eq!(session.completed_at(), Some(at(5)));

        session.complete(at(9));
        assert_eq!(session.completed_at(), Some(at(5)));
    }
}
