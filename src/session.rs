use std::time::{Duration, SystemTime};

use log::{debug, info};

use crate::analytics::{ErrorReport, Heatmap, MistypeHistogram, WordFrequency};
use crate::comparator::{SessionStatus, TypingSession};
use crate::metrics::{
    elapsed_minutes, word_count, words_per_minute, PassageResult, SessionAggregate,
    SpeedHistory, SpeedSampling, TestSummary,
};
use crate::passage::{Passage, Selection, FALLBACK_PASSAGES};

/// Minimum spacing between two polled speed samples
const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Typing,
    PassageComplete,
    TestComplete,
}

/// All mutable state of one test run: the passages, the passage being typed,
/// and everything accumulated across them.
#[derive(Debug, Clone)]
pub struct SessionContext {
    sampling: SpeedSampling,
    selection: Selection,
    current: usize,
    typing: TypingSession,
    aggregate: SessionAggregate,
    results: Vec<PassageResult>,
    histogram: MistypeHistogram,
    speed_history: SpeedHistory,
    full_started_at: Option<SystemTime>,
    finished_at: Option<SystemTime>,
    last_sample_at: Option<SystemTime>,
}

impl SessionContext {
    pub fn new(selection: Selection, sampling: SpeedSampling) -> Self {
        let selection = if selection.is_empty() {
            Selection::custom(FALLBACK_PASSAGES[0])
        } else {
            selection
        };
        let typing = TypingSession::new(selection.passages[0].text.clone());

        info!(
            "starting {} test with {} passage(s)",
            selection.difficulty,
            selection.len()
        );

        Self {
            sampling,
            selection,
            current: 0,
            typing,
            aggregate: SessionAggregate::default(),
            results: Vec::new(),
            histogram: MistypeHistogram::default(),
            speed_history: SpeedHistory::default(),
            full_started_at: None,
            finished_at: None,
            last_sample_at: None,
        }
    }

    /// Start over with new passages, dropping every accumulated statistic
    pub fn restart(&mut self, selection: Selection) {
        *self = Self::new(selection, self.sampling);
    }

    /// Start over with the same passages
    pub fn retry(&mut self) {
        self.restart(self.selection.clone());
    }

    pub fn typing(&self) -> &TypingSession {
        &self.typing
    }

    pub fn current_passage(&self) -> &Passage {
        &self.selection.passages[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn passage_count(&self) -> usize {
        self.selection.len()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn sampling(&self) -> SpeedSampling {
        self.sampling
    }

    pub fn aggregate(&self) -> &SessionAggregate {
        &self.aggregate
    }

    pub fn results(&self) -> &[PassageResult] {
        &self.results
    }

    pub fn histogram(&self) -> &MistypeHistogram {
        &self.histogram
    }

    pub fn speed_history(&self) -> &SpeedHistory {
        &self.speed_history
    }

    pub fn word_frequency(&self) -> &WordFrequency {
        &self.selection.word_frequency
    }

    pub fn has_started(&self) -> bool {
        self.full_started_at.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Feed the full typed text of the current passage
    pub fn on_snapshot(&mut self, typed: &str, now: SystemTime) -> SnapshotOutcome {
        if self.is_finished() {
            return SnapshotOutcome::TestComplete;
        }
        if self.full_started_at.is_none() && !typed.is_empty() {
            self.full_started_at = Some(now);
        }

        self.typing.apply_snapshot(typed, now, &mut self.histogram);
        if !self.typing.has_finished() {
            return SnapshotOutcome::Typing;
        }

        self.record_current(now);
        if self.current + 1 < self.selection.len() {
            self.current += 1;
            self.typing = TypingSession::new(self.current_passage().text.clone());
            self.last_sample_at = None;
            SnapshotOutcome::PassageComplete
        } else {
            self.finish(now);
            SnapshotOutcome::TestComplete
        }
    }

    /// Periodic timer hook. Samples the live speed once per second while a
    /// passage is being typed; does nothing once the test has ended.
    pub fn on_tick(&mut self, now: SystemTime) {
        if self.is_finished()
            || self.sampling != SpeedSampling::PerSecond
            || self.typing.status() != SessionStatus::InProgress
        {
            return;
        }

        let since = self.last_sample_at.or(self.typing.started_at());
        let due = since
            .and_then(|t| now.duration_since(t).ok())
            .is_some_and(|d| d >= SAMPLE_INTERVAL);
        if !due {
            return;
        }

        let minutes = elapsed_minutes(self.typing.started_at(), now);
        let wpm = words_per_minute(word_count(self.typing.typed()), minutes);
        self.speed_history.push(self.seconds_since_start(now), wpm);
        self.last_sample_at = Some(now);
    }

    /// End the test now, whether or not the current passage is complete
    pub fn end_test(&mut self, now: SystemTime) {
        if self.is_finished() {
            return;
        }
        if self.typing.has_started() {
            self.typing.complete(now);
            self.record_current(now);
        }
        self.finish(now);
    }

    pub fn summary(&self, now: SystemTime) -> TestSummary {
        let until = self.finished_at.unwrap_or(now);
        TestSummary::new(
            &self.aggregate,
            &self.speed_history,
            elapsed_minutes(self.full_started_at, until),
        )
    }

    pub fn error_report(&self) -> ErrorReport {
        ErrorReport::build(&self.histogram, &self.selection.word_frequency)
    }

    pub fn heatmap(&self) -> Heatmap {
        Heatmap::from_histogram(&self.histogram)
    }

    fn seconds_since_start(&self, now: SystemTime) -> f64 {
        self.full_started_at
            .and_then(|start| now.duration_since(start).ok())
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    fn record_current(&mut self, now: SystemTime) {
        let result = PassageResult::from_session(&self.typing, now);
        debug!(
            "passage {}/{} done: {} chars, {} errors, {:.1} wpm",
            self.current + 1,
            self.selection.len(),
            result.chars,
            result.errors,
            result.wpm()
        );

        self.aggregate.record(&result);
        if self.sampling == SpeedSampling::PerPassage {
            self.speed_history
                .push(self.seconds_since_start(now), result.wpm());
        }
        self.results.push(result);
    }

    fn finish(&mut self, now: SystemTime) {
        self.finished_at = Some(now);
        let summary = self.summary(now);
        info!(
            "test finished: {:.1} wpm, {:.1}% accuracy over {} passage(s)",
            summary.wpm, summary.accuracy, self.aggregate.passages
        );
    }
}
