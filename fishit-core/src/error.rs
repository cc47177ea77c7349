use fishit_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store is closed")]
    Closed,

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Invalid model data: {0}")]
    Model(#[from] ModelError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
