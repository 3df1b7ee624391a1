// src/export.rs
//! Netscape Bookmark File writer (§6): the inverse of the HTML parser
//! (`parsers::html`), used by the CLI's `export` command. Thin glue over
//! `domain::bookmark::Bookmark`, out of scope for deep engineering per
//! §1, but still exercised by tests since a broken escaping rule would
//! corrupt re-imported bookmarks.

use crate::domain::bookmark::Bookmark;
use std::fmt::Write as _;

/// Renders `bookmarks` as a Netscape Bookmark File (§6), HTML-escaping
/// `&<>"'` in the URL, title and description of every entry.
pub fn to_netscape_html(bookmarks: &[Bookmark]) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n");
    out.push_str("<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n");
    out.push_str("<TITLE>Bookmarks</TITLE>\n");
    out.push_str("<H1>Bookmarks</H1>\n");
    out.push_str("<DL><p>\n");

    for bookmark in bookmarks {
        let _ = write!(
            out,
            "    <DT><A HREF=\"{}\" ADD_DATE=\"{}\">{}</A>\n",
            escape_html(&bookmark.url),
            bookmark.created_at.timestamp(),
            escape_html(&bookmark.title),
        );
        if !bookmark.description.is_empty() {
            let _ = write!(out, "    <DD>{}\n", escape_html(&bookmark.description));
        }
    }

    out.push_str("</DL><p>\n");
    out
}

/// Escapes the five characters that would otherwise break the Netscape
/// format's minimal HTML (§6). Order matters: `&` must be escaped first,
/// or the entities produced for the other characters would themselves be
/// re-escaped.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_special_characters_when_escape_then_all_five_replaced() {
        assert_eq!(
            escape_html(r#"a&b<c>d"e'f"#),
            "a&amp;b&lt;c&gt;d&quot;e&#39;f"
        );
    }

    #[test]
    fn given_bookmarks_when_export_then_valid_netscape_wrapper() {
        let bookmark = Bookmark::new(
            "https://example.com",
            "Example & Co",
            "A site",
            vec!["rust".to_string()],
        )
        .unwrap();
        let html = to_netscape_html(&[bookmark]);

        assert!(html.starts_with("<!DOCTYPE NETSCAPE-Bookmark-file-1>"));
        assert!(html.contains("<DT><A HREF=\"https://example.com\""));
        assert!(html.contains("Example &amp; Co"));
        assert!(html.contains("<DD>A site"));
        assert!(html.trim_end().ends_with("</DL><p>"));
    }

    #[test]
    fn given_empty_description_when_export_then_no_dd_line() {
        let bookmark = Bookmark::new("https://example.com", "T", "", vec![]).unwrap();
        let html = to_netscape_html(&[bookmark]);
        assert!(!html.contains("<DD>"));
    }
}
