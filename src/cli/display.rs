// src/cli/display.rs
//! Plain-text rendering of bookmarks for the terminal. Deliberately
//! unadorned: this crate's CLI surface is thin glue (§1), not a TUI.

use crate::domain::bookmark::Bookmark;

pub fn print_bookmark(bookmark: &Bookmark) {
    println!(
        "[{}] {}\n    {}\n    tags: {}\n    {}",
        bookmark.id.map_or("-".to_string(), |id| id.to_string()),
        bookmark.title,
        bookmark.url,
        bookmark.formatted_tags(),
        bookmark.description,
    );
}

pub fn print_bookmarks(bookmarks: &[Bookmark]) {
    for bookmark in bookmarks {
        print_bookmark(bookmark);
    }
    println!("{} bookmark(s)", bookmarks.len());
}
