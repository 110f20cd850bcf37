use crate::book::BookId;
use slowcore::storage::StorageError;
use thiserror::Error;

/// Input rejected before anything was touched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("book name is empty")]
    EmptyName,
    #[error("author is empty")]
    EmptyAuthor,
    #[error("target must be a positive number")]
    ZeroTarget,
    #[error("logged amount must be a positive number")]
    ZeroAmount,
}

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("no book with id {0}")]
    NotFound(BookId),
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, ShelfError>;
