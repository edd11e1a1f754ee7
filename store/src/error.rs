//! Document store error types.

use thiserror::Error;
use uuid::Uuid;

/// Store-related errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document {id} already exists in {collection}")]
    DuplicateId { collection: &'static str, id: Uuid },

    #[error("Document {id} not found in {collection}")]
    NotFound { collection: &'static str, id: Uuid },
}

/// Type alias for store results
pub type StoreResult<T> = Result<T, StoreError>;
