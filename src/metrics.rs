use std::time::SystemTime;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::comparator::TypingSession;

const SECONDS_PER_MINUTE: f64 = 60.0;

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes between `start` and `now`. An unset start counts as one minute so
/// that speed stays well defined; a clock that went backwards counts as zero.
pub fn elapsed_minutes(start: Option<SystemTime>, now: SystemTime) -> f64 {
    match start {
        None => 1.0,
        Some(start) => now
            .duration_since(start)
            .map(|d| d.as_secs_f64() / SECONDS_PER_MINUTE)
            .unwrap_or(0.0),
    }
}

/// Always finite and non-negative; zero when no time has elapsed
pub fn words_per_minute(words: usize, minutes: f64) -> f64 {
    if minutes.is_finite() && minutes > 0.0 {
        words as f64 / minutes
    } else {
        0.0
    }
}

/// Percentage of typed characters that matched, zero when nothing was typed
pub fn accuracy(total_chars: usize, total_errors: usize) -> f64 {
    if total_chars == 0 {
        return 0.0;
    }
    let correct = total_chars - total_errors.min(total_chars);
    correct as f64 / total_chars as f64 * 100.0
}

/// How the speed history is fed
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SpeedSampling {
    /// One sample per completed passage
    PerPassage,
    /// One sample per elapsed second while typing
    #[default]
    PerSecond,
}

/// Figures for one completed passage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassageResult {
    pub chars: usize,
    pub words: usize,
    pub errors: usize,
    pub elapsed_minutes: f64,
}

impl PassageResult {
    /// A passage cut short only earns the words actually typed
    pub fn from_session(session: &TypingSession, now: SystemTime) -> Self {
        let finished_at = session.completed_at().unwrap_or(now);
        let chars = session.typed().chars().count();
        let words = if chars < session.target().chars().count() {
            word_count(session.typed())
        } else {
            word_count(session.target())
        };
        Self {
            chars,
            words,
            errors: session.final_errors(),
            elapsed_minutes: elapsed_minutes(session.started_at(), finished_at),
        }
    }

    pub fn wpm(&self) -> f64 {
        words_per_minute(self.words, self.elapsed_minutes)
    }

    pub fn accuracy(&self) -> f64 {
        accuracy(self.chars, self.errors)
    }
}

/// Running totals over the passages of one test
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionAggregate {
    pub total_errors: usize,
    pub total_chars: usize,
    pub total_words: usize,
    pub passages: usize,
}

impl SessionAggregate {
    pub fn record(&mut self, result: &PassageResult) {
        self.total_errors += result.errors;
        self.total_chars += result.chars;
        self.total_words += result.words;
        self.passages += 1;
    }

    pub fn accuracy(&self) -> f64 {
        accuracy(self.total_chars, self.total_errors)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedSample {
    /// Seconds since the test started
    pub t: f64,
    pub wpm: f64,
}

impl From<SpeedSample> for (f64, f64) {
    fn from(s: SpeedSample) -> Self {
        (s.t, s.wpm)
    }
}

/// Append-only record of speed samples for the current test
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeedHistory {
    samples: Vec<SpeedSample>,
}

impl SpeedHistory {
    pub fn push(&mut self, t: f64, wpm: f64) {
        self.samples.push(SpeedSample { t, wpm });
    }

    pub fn samples(&self) -> &[SpeedSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn highest(&self) -> f64 {
        self.samples.iter().map(|s| s.wpm).fold(0.0, f64::max)
    }

    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|s| s.wpm).sum::<f64>() / self.samples.len() as f64
    }

    /// Standard deviation of the samples; lower is steadier
    pub fn consistency(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mean = self.average();
        let variance = self
            .samples
            .iter()
            .map(|s| (s.wpm - mean).powi(2))
            .sum::<f64>()
            / self.samples.len() as f64;
        variance.sqrt()
    }
}

/// Final figures for a finished test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestSummary {
    pub wpm: f64,
    pub accuracy: f64,
    pub highest_speed: f64,
    pub average_speed: f64,
    pub consistency: f64,
    pub total_words: usize,
    pub total_chars: usize,
    pub total_errors: usize,
    pub elapsed_minutes: f64,
}

impl TestSummary {
    pub fn new(aggregate: &SessionAggregate, history: &SpeedHistory, elapsed_minutes: f64) -> Self {
        Self {
            wpm: words_per_minute(aggregate.total_words, elapsed_minutes),
            accuracy: aggregate.accuracy(),
            highest_speed: history.highest(),
            average_speed: history.average(),
            consistency: history.consistency(),
            total_words: aggregate.total_words,
            total_chars: aggregate.total_chars,
            total_errors: aggregate.total_errors,
            elapsed_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::MistypeHistogram;
    use std::time::Duration;

    fn at(secs: f64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_000) + Duration::from_secs_f64(secs)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("The quick fox. "), 3);
        assert_eq!(word_count("  spaced   out\twords\n"), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_elapsed_minutes_guards() {
        assert_eq!(elapsed_minutes(None, at(5.0)), 1.0);
        assert!(approx(elapsed_minutes(Some(at(0.0)), at(90.0)), 1.5));
        assert_eq!(elapsed_minutes(Some(at(10.0)), at(0.0)), 0.0);
    }

    #[test]
    fn test_words_per_minute_is_finite() {
        assert_eq!(words_per_minute(10, 0.0), 0.0);
        assert_eq!(words_per_minute(10, -1.0), 0.0);
        assert_eq!(words_per_minute(10, f64::NAN), 0.0);
        assert_eq!(words_per_minute(0, 0.5), 0.0);
        for minutes in [1e-9, 1e-3, 0.5, 10.0] {
            let wpm = words_per_minute(50, minutes);
            assert!(wpm.is_finite() && wpm >= 0.0);
        }
    }

    #[test]
    fn test_accuracy_boundaries() {
        assert_eq!(accuracy(0, 0), 0.0);
        assert_eq!(accuracy(10, 0), 100.0);
        assert!(approx(accuracy(3, 1), 200.0 / 3.0));
        assert_eq!(accuracy(2, 5), 0.0);
    }

    #[test]
    fn test_quick_fox_scenario() {
        let mut histogram = MistypeHistogram::default();
        let mut session = TypingSession::new("The quick fox. ");
        session.apply_snapshot("T", at(0.0), &mut histogram);
        session.apply_snapshot("The quick fox. ", at(6.0), &mut histogram);
        assert!(session.has_finished());

        let result = PassageResult::from_session(&session, at(6.0));
        assert_eq!(result.words, 3);
        assert_eq!(result.chars, 15);
        assert!(approx(result.wpm(), 30.0));
        assert_eq!(result.accuracy(), 100.0);
    }

    #[test]
    fn test_cat_scenario() {
        let mut histogram = MistypeHistogram::default();
        let mut session = TypingSession::new("cat");
        session.apply_snapshot("cag", at(1.0), &mut histogram);

        let result = PassageResult::from_session(&session, at(1.0));
        assert_eq!(result.errors, 1);
        assert_eq!(session.comparison().progress, 1.0);
        assert!((result.accuracy() - 66.7).abs() < 0.05);
        assert_eq!(histogram.count('t'), 1);
    }

    #[test]
    fn test_cut_short_passage_counts_typed_words() {
        let mut histogram = MistypeHistogram::default();
        let mut session = TypingSession::new("word ".repeat(100));
        session.apply_snapshot("w", at(0.0), &mut histogram);
        session.complete(at(6.0));

        let result = PassageResult::from_session(&session, at(6.0));
        assert_eq!(result.words, 1);
        assert_eq!(result.chars, 1);
        assert!(approx(result.wpm(), 10.0));
    }

    #[test]
    fn test_aggregate_accumulates() {
        let mut aggregate = SessionAggregate::default();
        aggregate.record(&PassageResult {
            chars: 10,
            words: 2,
            errors: 1,
            elapsed_minutes: 0.5,
        });
        aggregate.record(&PassageResult {
            chars: 10,
            words: 3,
            errors: 0,
            elapsed_minutes: 0.5,
        });

        assert_eq!(aggregate.total_chars, 20);
        assert_eq!(aggregate.total_words, 5);
        assert_eq!(aggregate.total_errors, 1);
        assert_eq!(aggregate.passages, 2);
        assert_eq!(aggregate.accuracy(), 95.0);
    }

    #[test]
    fn test_speed_history_statistics() {
        let mut history = SpeedHistory::default();
        assert_eq!(history.highest(), 0.0);
        assert_eq!(history.average(), 0.0);
        assert_eq!(history.consistency(), 0.0);

        history.push(1.0, 40.0);
        history.push(2.0, 60.0);
        history.push(3.0, 50.0);

        assert_eq!(history.highest(), 60.0);
        assert_eq!(history.average(), 50.0);
        assert!(approx(history.consistency(), (200.0_f64 / 3.0).sqrt()));

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_summary_from_totals() {
        let mut aggregate = SessionAggregate::default();
        aggregate.record(&PassageResult {
            chars: 15,
            words: 3,
            errors: 0,
            elapsed_minutes: 0.1,
        });
        let mut history = SpeedHistory::default();
        history.push(6.0, 30.0);

        let summary = TestSummary::new(&aggregate, &history, 0.1);
        assert!(approx(summary.wpm, 30.0));
        assert_eq!(summary.accuracy, 100.0);
        assert_eq!(summary.highest_speed, 30.0);
        assert_eq!(summary.average_speed, 30.0);
    }

    #[test]
    fn test_summary_of_empty_test() {
        let summary = TestSummary::new(&SessionAggregate::default(), &SpeedHistory::default(), 0.0);
        assert_eq!(summary.wpm, 0.0);
        assert_eq!(summary.accuracy, 0.0);
    }
}
