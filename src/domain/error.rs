// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Bookmark not found: {0}")]
    BookmarkNotFound(String),

    #[error("Duplicate URL: {0}")]
    DuplicateUrl(String),

    #[error("Repository error: {0}")]
    RepositoryError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
