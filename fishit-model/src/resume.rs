//! Persisted playback progress.
//!
//! A mark is "active" (shown in Continue Watching) while it has positive
//! progress and is not completed. Completion flips at
//! [`COMPLETION_THRESHOLD_PERCENT`].

use crate::error::{ModelError, Result};
use crate::ids::CanonicalKey;
use crate::source::SourceType;

/// Progress at or above this percentage counts as watched.
pub const COMPLETION_THRESHOLD_PERCENT: f32 = 95.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResumeMark {
    pub canonical_key: CanonicalKey,
    /// 0..=100
    pub position_percent: f32,
    pub position_ms: i64,
    pub duration_ms: i64,
    pub is_completed: bool,
    /// Raw source type string of the backend last used for playback
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_source_type: Option<String>,
    /// Epoch milliseconds of the last progress update
    pub updated_at: i64,
}

impl ResumeMark {
    /// Build a mark from a playback position.
    pub fn from_position(
        canonical_key: CanonicalKey,
        position_ms: i64,
        duration_ms: i64,
        last_source: Option<SourceType>,
        updated_at: i64,
    ) -> Result<Self> {
        if position_ms < 0 {
            return Err(ModelError::InvalidProgress(format!(
                "position must be >= 0, got {position_ms}"
            )));
        }
        if duration_ms <= 0 {
            return Err(ModelError::InvalidProgress(format!(
                "duration must be > 0, got {duration_ms}"
            )));
        }

        let position_ms = position_ms.min(duration_ms);
        let position_percent =
            (position_ms as f64 / duration_ms as f64 * 100.0) as f32;

        Ok(Self {
            canonical_key,
            position_percent,
            position_ms,
            duration_ms,
            is_completed: position_percent >= COMPLETION_THRESHOLD_PERCENT,
            last_source_type: last_source
                .map(|source| source.as_str().to_string()),
            updated_at,
        })
    }

    pub fn is_active(&self) -> bool {
        self.position_percent > 0.0 && !self.is_completed
    }

    /// Progress as a 0.0..=1.0 fraction for progress bars.
    pub fn progress_fraction(&self) -> f32 {
        (self.position_percent / 100.0).clamp(0.0, 1.0)
    }

    pub fn last_source(&self) -> Option<SourceType> {
        self.last_source_type.as_deref().map(SourceType::parse)
    }
}
