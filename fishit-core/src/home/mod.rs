//! Home screen content: row repositories, item mapping and the view model.

pub mod repository;
pub mod types;
pub mod view_model;

pub use repository::{HomeContentRepository, HomeRow, ObjectStoreHomeRepository};
pub use types::{HomeContentPartial, HomeMediaItem, HomeState};
pub use view_model::{HomeViewModel, home_state_stream};
