//! Reactive plumbing between the entity store and view models.

pub mod combine;
pub mod query_stream;

pub use combine::{combine3, combine4};
pub use query_stream::{find_off_thread, query_first_stream, query_stream};
