// src/parsers/mod.rs
//! Extracts `(url, title, add_date)` candidates from a browser export file.
//! Parsers never touch the network and never persist (§4.3); they hand a
//! flat, document-ordered `Vec<ImportCandidate>` to the ingestion
//! coordinator, which owns deduplication, enrichment and storage.

pub mod html;
pub mod json;
pub mod text;

use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;

/// A parsed but not yet persisted bookmark draft.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportCandidate {
    pub url: String,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unsupported import format for {0}")]
    UnsupportedFormat(String),

    #[error("input error: {0}")]
    Input(#[from] std::io::Error),

    #[error("malformed input: {0}")]
    Malformed(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Import format recognised by file-extension sniffing (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Html,
    Json,
    Text,
}

/// Detects the import format from `path`'s extension, case-insensitively.
/// Anything else is `UnsupportedFormat`.
pub fn detect_format(path: &Path) -> ParseResult<ImportFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "html" | "htm" => Ok(ImportFormat::Html),
        "json" => Ok(ImportFormat::Json),
        "txt" => Ok(ImportFormat::Text),
        _ => Err(ParseError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Parses `content` according to `format`, producing candidates in
/// document order. A malformed document (unparsable JSON, for instance)
/// is a fatal `InputError`; a malformed individual record is simply
/// dropped by the underlying parser.
pub fn parse(format: ImportFormat, content: &str) -> ParseResult<Vec<ImportCandidate>> {
    match format {
        ImportFormat::Html => html::parse(content),
        ImportFormat::Json => json::parse(content),
        ImportFormat::Text => Ok(text::parse(content)),
    }
}
