//! Presentation delays

use std::time::Duration;

use match3_types::{DELAY_AFTER_MATCH_MS, MATCH_ANIM_MS, SWITCH_MS};

/// How long the engine waits at each suspension point of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Matched tiles are shown before they are cleared
    pub match_anim: Duration,
    /// Pause between a committed wave and the next scan
    pub delay_after_match: Duration,
    /// Tile exchange; an illegal swap is reverted after this
    pub switch: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            match_anim: Duration::from_millis(MATCH_ANIM_MS),
            delay_after_match: Duration::from_millis(DELAY_AFTER_MATCH_MS),
            switch: Duration::from_millis(SWITCH_MS),
        }
    }
}

impl Timings {
    /// No delays; a turn resolves as fast as the actor can run it
    pub fn headless() -> Self {
        Self {
            match_anim: Duration::ZERO,
            delay_after_match: Duration::ZERO,
            switch: Duration::ZERO,
        }
    }

    /// Create timings from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            match_anim: env_millis("MATCH3_MATCH_ANIM_MS").unwrap_or(defaults.match_anim),
            delay_after_match: env_millis("MATCH3_DELAY_AFTER_MATCH_MS")
                .unwrap_or(defaults.delay_after_match),
            switch: env_millis("MATCH3_SWITCH_MS").unwrap_or(defaults.switch),
        }
    }

    /// Shortest time a legal single-wave swap can take
    pub fn min_cascade(&self) -> Duration {
        self.switch + self.match_anim + self.delay_after_match
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}
