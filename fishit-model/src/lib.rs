//! Core data model definitions shared across FishIT crates.
//!
//! Everything in here is plain data written by the sync pipeline and read by
//! the home/resume caches in `fishit-core`. Timestamps are epoch milliseconds
//! to match what the entity store persists.
#![allow(missing_docs)]

pub mod error;
pub mod ids;
pub mod media;
pub mod resume;
pub mod source;

pub use error::{ModelError, Result as ModelResult};
pub use ids::CanonicalKey;
pub use media::{CanonicalMedia, MediaKind, MediaSourceRef};
pub use resume::{COMPLETION_THRESHOLD_PERCENT, ResumeMark};
pub use source::SourceType;
