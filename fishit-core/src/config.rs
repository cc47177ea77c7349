//! Tunables for the home caches and the log buffer.
//!
//! Defaults are sized for constrained TV devices. Loading from files and the
//! environment lives in `fishit-config`.

use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Longest "new" badge window a config may ask for, about ten years.
pub const MAX_NEW_ITEM_WINDOW_DAYS: i64 = 3650;

/// Row caps and the "new" badge window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HomeContentConfig {
    /// Most recent active resume marks joined into Continue Watching.
    pub continue_watching_limit: usize,
    /// Newest canonical items shown in Recently Added.
    pub recently_added_limit: usize,
    /// Cap for each per-source row (Telegram, Xtream live/VOD/series).
    pub catalog_limit: usize,
    /// Items created within this many days get the "new" badge.
    pub new_item_window_days: i64,
}

impl Default for HomeContentConfig {
    fn default() -> Self {
        Self {
            continue_watching_limit: 30,
            recently_added_limit: 60,
            catalog_limit: 120,
            new_item_window_days: 7,
        }
    }
}

impl HomeContentConfig {
    /// The badge window in milliseconds, saturating at the `i64` bounds
    /// when the day count is out of range.
    pub fn new_item_window_ms(&self) -> i64 {
        let days = self.new_item_window_days;
        chrono::TimeDelta::try_days(days)
            .map(|window| window.num_milliseconds())
            .unwrap_or(if days < 0 { i64::MIN } else { i64::MAX })
    }
}

/// Capacity and level of the in-memory log viewer buffer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogBufferConfig {
    pub capacity: usize,
    /// Minimum level captured into the buffer (`error` .. `trace`, or `off`)
    pub level: String,
}

impl Default for LogBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 500,
            level: "debug".to_string(),
        }
    }
}

impl LogBufferConfig {
    /// Parsed `level`, or `None` when it names no level.
    pub fn level_filter(&self) -> Option<LevelFilter> {
        self.level.trim().parse().ok()
    }
}
