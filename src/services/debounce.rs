//! Debounce scheduler: coalesces buffer changes into a single rebuild.
//!
//! Every change restarts the quiescence window. The scheduler is polled
//! from the main loop (like the editor's other timers); once the window
//! elapses with no further change it issues the next generation.

use crate::model::generation::{Generation, GenerationCounter};
use crate::services::time_source::SharedTimeSource;
use std::time::{Duration, Instant};

pub struct DebounceScheduler {
    window: Duration,
    /// When the pending rebuild fires, if one is pending
    deadline: Option<Instant>,
    /// Changes coalesced into the pending rebuild
    coalesced: usize,
    time_source: SharedTimeSource,
}

impl DebounceScheduler {
    pub fn new(window: Duration, time_source: SharedTimeSource) -> Self {
        Self {
            window,
            deadline: None,
            coalesced: 0,
            time_source,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a buffer change: cancel any pending timer and start a new one
    pub fn notify_change(&mut self) {
        self.deadline = Some(self.time_source.now() + self.window);
        self.coalesced += 1;
    }

    /// Drop the pending rebuild without firing it
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.coalesced = 0;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before the pending rebuild fires
    pub fn time_until_fire(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(self.time_source.now()))
    }

    /// Fire the timer if the quiescence window has elapsed.
    ///
    /// Returns the newly issued generation when it fires; `None` while the
    /// timer is pending or when nothing changed.
    pub fn poll(&mut self, generations: &mut GenerationCounter) -> Option<Generation> {
        let deadline = self.deadline?;
        if self.time_source.now() < deadline {
            return None;
        }

        self.deadline = None;
        let generation = generations.advance();
        tracing::debug!(
            "Debounce fired after {} coalesced change(s): rebuild {}",
            self.coalesced,
            generation
        );
        self.coalesced = 0;
        Some(generation)
    }
}
