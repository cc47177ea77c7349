//! Startup checks for a loaded [`PlayerConfig`].

use fishit_core::config::MAX_NEW_ITEM_WINDOW_DAYS;
use thiserror::Error;

use crate::player::PlayerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("{field} must be greater than zero")]
    ZeroLimit { field: &'static str },

    #[error(
        "home.new_item_window_days must be between 0 and {max}, got {0}",
        max = MAX_NEW_ITEM_WINDOW_DAYS
    )]
    WindowOutOfRange(i64),

    #[error(
        "log_buffer.level {0:?} is not one of off, error, warn, info, debug, trace"
    )]
    UnknownLevel(String),
}

impl PlayerConfig {
    /// Reject configurations the player cannot run with. Every problem is
    /// reported, not just the first.
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        let limits = [
            ("home.continue_watching_limit", self.home.continue_watching_limit),
            ("home.recently_added_limit", self.home.recently_added_limit),
            ("home.catalog_limit", self.home.catalog_limit),
            ("log_buffer.capacity", self.log_buffer.capacity),
        ];
        for (field, value) in limits {
            if value == 0 {
                errors.push(ConfigValidationError::ZeroLimit { field });
            }
        }

        if !(0..=MAX_NEW_ITEM_WINDOW_DAYS)
            .contains(&self.home.new_item_window_days)
        {
            errors.push(ConfigValidationError::WindowOutOfRange(
                self.home.new_item_window_days,
            ));
        }

        if self.log_buffer.level_filter().is_none() {
            errors.push(ConfigValidationError::UnknownLevel(
                self.log_buffer.level.clone(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            for error in &errors {
                log::warn!("Invalid player config: {error}");
            }
            Err(errors)
        }
    }
}
