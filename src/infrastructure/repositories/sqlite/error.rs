// src/infrastructure/repositories/sqlite/error.rs
use diesel::r2d2;
use diesel::result::Error as DieselError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteRepositoryError {
    #[error("database error: {0}")]
    DatabaseError(#[from] DieselError),

    #[error("connection error: {0}")]
    ConnectionError(#[from] diesel::ConnectionError),

    #[error("connection pool error: {0}")]
    ConnectionPoolError(String),

    #[error("migration error: {0}")]
    MigrationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type SqliteResult<T> = Result<T, SqliteRepositoryError>;

impl From<r2d2::Error> for SqliteRepositoryError {
    fn from(err: r2d2::Error) -> Self {
        SqliteRepositoryError::ConnectionPoolError(err.to_string())
    }
}

impl From<SqliteRepositoryError> for crate::domain::error::DomainError {
    fn from(err: SqliteRepositoryError) -> Self {
        match err {
            SqliteRepositoryError::DatabaseError(DieselError::NotFound) => {
                crate::domain::error::DomainError::BookmarkNotFound("not found".to_string())
            }
            SqliteRepositoryError::DatabaseError(DieselError::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                info,
            )) => crate::domain::error::DomainError::DuplicateUrl(info.message().to_string()),
            other => crate::domain::error::DomainError::RepositoryError(other.to_string()),
        }
    }
}
