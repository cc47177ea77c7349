//! Configuration loading for FishIT Player.
//!
//! The tunables themselves live in `fishit-core`; this crate finds them
//! (environment, inline JSON or a config file), parses TOML or JSON, and
//! validates the result before the player starts.
#![allow(missing_docs)]

pub mod player;
pub mod validation;

pub use player::{ConfigSource, PlayerConfig};
pub use validation::ConfigValidationError;
