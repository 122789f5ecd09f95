//! Single-threaded test loop plumbing.
//!
//! Keystrokes arrive over a channel and the periodic tick is produced from a
//! fixed-rate deadline, so the once-per-second speed sampler keeps running no
//! matter how fast keys come in.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Everything the test loop reacts to
#[derive(Clone, Debug)]
pub enum TestEvent {
    Key(KeyEvent),
    Resize,
    /// The tick deadline passed
    Tick,
}

/// Source of terminal events
pub trait EventSource {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<TestEvent, RecvTimeoutError>;
}

/// Events delivered over an mpsc channel.
///
/// The terminal reader and headless tests both feed one of these.
pub struct ChannelEventSource {
    rx: Receiver<TestEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<TestEvent>) -> Self {
        Self { rx }
    }

    /// Spawn a thread forwarding crossterm key presses and resizes
    pub fn crossterm() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            let forwarded = match event::read() {
                // Windows reports releases too; only presses are keystrokes
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    tx.send(TestEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => tx.send(TestEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TestEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Fixed-rate tick deadlines
#[derive(Clone, Copy, Debug)]
pub struct TickSchedule {
    interval: Duration,
    next: Instant,
}

impl TickSchedule {
    /// First tick falls one interval from now
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now() + interval,
        }
    }

    /// Time left until the next tick, `None` once it is due
    fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next.checked_duration_since(now).filter(|d| !d.is_zero())
    }

    /// Move to the following deadline. A stalled loop skips missed ticks
    /// rather than delivering a burst of them.
    fn advance(&mut self, now: Instant) {
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
    }
}

/// Advances the application one event or tick at a time
pub struct Runner<E: EventSource> {
    events: E,
    schedule: TickSchedule,
}

impl<E: EventSource> Runner<E> {
    pub fn new(events: E, schedule: TickSchedule) -> Self {
        Self { events, schedule }
    }

    /// Next thing for the loop to handle.
    ///
    /// Waits only until the tick deadline. A due tick is delivered before any
    /// queued event so a steady stream of keys cannot starve it.
    pub fn step(&mut self) -> TestEvent {
        let now = Instant::now();
        let Some(wait) = self.schedule.remaining(now) else {
            self.schedule.advance(now);
            return TestEvent::Tick;
        };

        match self.events.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => {
                self.schedule.advance(Instant::now());
                TestEvent::Tick
            }
            Err(RecvTimeoutError::Disconnected) => {
                // Nothing more will arrive; keep ticking at the same pace
                thread::sleep(wait);
                self.schedule.advance(Instant::now());
                TestEvent::Tick
            }
        }
    }
}
