//! Update scheduler
//!
//! Decides when a new document is synthesized and applied. It holds no
//! timers of its own: callers pass the current [`Instant`], ask for the
//! next [`UpdateScheduler::deadline`], and call
//! [`UpdateScheduler::take_due`] when it passes.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Quiet period used when none is configured
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// How changes reach the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    /// Every change schedules a debounced update
    Live,
    /// Only an explicit refresh updates the preview
    Manual,
}

impl PreviewMode {
    pub fn from_live(live: bool) -> Self {
        if live { PreviewMode::Live } else { PreviewMode::Manual }
    }
}

#[derive(Debug)]
pub struct UpdateScheduler {
    mode: PreviewMode,
    quiet_period: Duration,
    /// Mount or refresh, due as soon as the caller gets to it
    immediate: Option<Instant>,
    /// Live-mode debounce
    debounce: Option<Instant>,
    last_refresh: u64,
    last_applied: Option<String>,
}

impl UpdateScheduler {
    pub fn new(mode: PreviewMode, quiet_period: Duration) -> Self {
        Self {
            mode,
            quiet_period,
            immediate: None,
            debounce: None,
            last_refresh: 0,
            last_applied: None,
        }
    }

    /// Schedule the initial apply, whatever the mode
    pub fn request_mount(&mut self, now: Instant) {
        self.immediate.get_or_insert(now);
    }

    /// A tracked input changed
    pub fn input_changed(&mut self, now: Instant) {
        if self.mode == PreviewMode::Live {
            // A pending wait is restarted, not queued
            self.debounce = Some(now + self.quiet_period);
        }
    }

    /// The refresh counter moved. Returns whether an update was scheduled.
    pub fn refresh_requested(&mut self, counter: u64, now: Instant) -> bool {
        if counter <= self.last_refresh {
            return false;
        }
        self.last_refresh = counter;

        match self.mode {
            PreviewMode::Manual => {
                self.immediate.get_or_insert(now);
                true
            }
            PreviewMode::Live => false,
        }
    }

    /// Switch modes. Nothing missed while in the other mode is replayed.
    pub fn set_mode(&mut self, mode: PreviewMode, counter: u64) {
        self.last_refresh = self.last_refresh.max(counter);
        if mode == self.mode {
            return;
        }
        if mode == PreviewMode::Manual {
            self.debounce = None;
        }
        log::debug!("preview mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }

    /// Earliest instant an update is due
    pub fn deadline(&self) -> Option<Instant> {
        match (self.immediate, self.debounce) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Whether an update is due at `now`; consumes every pending request
    /// when it is, since one synthesis covers them all.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if deadline <= now => {
                self.cancel();
                true
            }
            _ => false,
        }
    }

    /// Drop every pending request
    pub fn cancel(&mut self) {
        self.immediate = None;
        self.debounce = None;
    }

    /// Whether `html` equals the last applied document
    pub fn is_unchanged(&self, html: &str) -> bool {
        self.last_applied.as_deref() == Some(html)
    }

    pub fn record_applied(&mut self, html: String) {
        self.last_applied = Some(html);
    }

    pub fn mode(&self) -> PreviewMode {
        self.mode
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn last_refresh(&self) -> u64 {
        self.last_refresh
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(PreviewMode::Live, DEFAULT_QUIET_PERIOD)
    }
}
