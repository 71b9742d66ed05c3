//! Cooperative autosave timer.
//!
//! The timer never writes by itself. The manager polls it and runs the same
//! `save()` every other caller uses, so autosave is serialized with all other
//! slot operations through the manager's `&mut self`.

use crate::config::SaveConfig;
use std::time::{Duration, Instant};

/// Source of the "autosave enabled" setting, polled on every due tick.
pub trait AutosaveSettings {
    fn autosave_enabled(&self) -> bool;
}

impl AutosaveSettings for bool {
    fn autosave_enabled(&self) -> bool {
        *self
    }
}

impl AutosaveSettings for SaveConfig {
    fn autosave_enabled(&self) -> bool {
        self.autosave_enabled
    }
}

/// What a poll of the autosave timer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveOutcome {
    /// Interval has not elapsed (or the timer is stopped).
    NotDue,
    /// Tick fired but autosave is switched off.
    Disabled,
    /// Tick fired with no slot selected.
    NoSelection,
    /// Selected slot was saved.
    Saved(usize),
}

/// Interval timer polled by the owner.
#[derive(Debug, Clone)]
pub struct Autosave {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Autosave {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns `true` once per elapsed interval and re-arms from `now`.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
