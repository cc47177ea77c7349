//! # FishIT Core
//!
//! Local caching and aggregation layer behind the FishIT Player home screen.
//!
//! - [`store`]: embedded entity store with keyed boxes, query building and
//!   change subscriptions
//! - [`reactive`]: query-to-stream adapters and combine-latest fan-in
//! - [`home`]: Continue Watching, Recently Added and per-source rows joined
//!   into one [`home::HomeState`] by the [`home::HomeViewModel`]
//! - [`logging`]: a bounded in-memory log buffer that redacts secrets before
//!   storing anything, plus the `log` facade bridge feeding it
//!
//! Rows never surface store errors. A failed query degrades to an empty row
//! and is logged; the next change notification retries it.
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod home;
pub mod logging;
pub mod reactive;
pub mod store;

pub use config::{HomeContentConfig, LogBufferConfig};
pub use error::{StoreError, StoreResult};
pub use home::{HomeContentRepository, HomeState, HomeViewModel};
pub use store::ObjectStore;
