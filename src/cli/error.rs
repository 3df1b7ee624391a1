// src/cli/error.rs
use crate::domain::error::DomainError;
use crate::parsers::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    CommandFailed(String),
}

pub type CliResult<T> = Result<T, CliError>;
