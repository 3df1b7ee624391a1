// src/fetch/extract.rs
//! HTML metadata extraction rules (§4.2): title, description and
//! keyword tags read out of a fetched page via `select` predicates.

use super::PageContent;
use crate::domain::tag;
use select::document::Document;
use select::predicate::{Attr, Name};

pub fn extract(body: &str) -> PageContent {
    let document = Document::from(body);

    let title = document
        .find(Name("title"))
        .next()
        .map(|n| n.text().trim().to_string())
        .unwrap_or_default();

    let meta_description = document
        .find(Attr("name", "description"))
        .next()
        .and_then(|n| n.attr("content"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let description = meta_description.unwrap_or_else(|| {
        document
            .find(Name("p"))
            .next()
            .map(|n| n.text().trim().to_string())
            .unwrap_or_default()
    });

    let keywords_raw = document
        .find(Attr("name", "keywords"))
        .next()
        .and_then(|n| n.attr("content"))
        .or_else(|| {
            document
                .find(Attr("name", "tags"))
                .next()
                .and_then(|n| n.attr("content"))
        })
        .unwrap_or_default();

    let tags = tag::canonicalize_list(keywords_raw.split(',')).unwrap_or_default();

    PageContent {
        title,
        description,
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_full_page_when_extract_then_all_fields_populated() {
        let body = r#"
            <html>
            <head>
                <title>  Example Page  </title>
                <meta name="description" content="An example page.">
                <meta name="keywords" content="Rust, CLI, rust, ">
            </head>
            <body><p>Fallback paragraph text</p></body>
            </html>
        "#;
        let page = extract(body);
        assert_eq!(page.title, "Example Page");
        assert_eq!(page.description, "An example page.");
        assert_eq!(page.tags, vec!["rust".to_string(), "cli".to_string()]);
    }

    #[test]
    fn given_no_meta_description_when_extract_then_falls_back_to_first_paragraph() {
        let body = r#"<html><head><title>T</title></head><body><p> first paragraph </p><p>second</p></body></html>"#;
        let page = extract(body);
        assert_eq!(page.description, "first paragraph");
    }

    #[test]
    fn given_tags_meta_instead_of_keywords_when_extract_then_used() {
        let body = r#"<html><head><title>T</title><meta name="tags" content="a,b"></head></html>"#;
        let page = extract(body);
        assert_eq!(page.tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn given_empty_document_when_extract_then_defaults() {
        let page = extract("");
        assert_eq!(page, PageContent::default());
    }
}
