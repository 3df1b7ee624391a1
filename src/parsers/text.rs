// src/parsers/text.rs
//! Plain text parser (§6): one URL per line, blank lines ignored, each
//! candidate given a fixed placeholder title (plain text carries no title).

use super::ImportCandidate;

const PLACEHOLDER_TITLE: &str = "Imported bookmark";

pub fn parse(content: &str) -> Vec<ImportCandidate> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|url| ImportCandidate {
            url: url.to_string(),
            title: PLACEHOLDER_TITLE.to_string(),
            created_at: None,
        })
        .collect()
}
