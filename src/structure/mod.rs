//! Chapter and section navigation.
//!
//! Textbooks announce their structure in running text: a chapter opens with
//! a `Chapter 3: Heaps` line and sections with `3.2 Binary Heaps`. This module
//! scans the first lines of every page for such headings and turns them into
//! page ranges.
//!
//! Detection is heuristic. Table-of-contents lines (dot leaders or a trailing
//! page number) are ignored, a page announcing more than one chapter is taken
//! to be a contents page, and a chapter is only registered when its number is
//! higher than the last one seen, which filters running headers and
//! cross-references.

mod chapters;
mod sections;

pub use chapters::{detect_chapter, Chapter, ChapterHeading, ChapterIndex};
pub use sections::{find_sections, scan_sections, SectionHeading};

use lazy_static::lazy_static;
use regex::Regex;

/// Headings are only looked for in the first lines of a page.
pub const HEADER_LINES: usize = 15;

/// Longest line accepted as a heading.
const MAX_HEADING_CHARS: usize = 100;

lazy_static! {
    /// "Introduction ........ 15", "Heaps  231"
    static ref RE_TOC_LINE: Regex = Regex::new(r"(?:\.{2,}|\s)\s*\d+$").unwrap();
}

/// The non-empty, trimmed lines at the top of a page.
pub(crate) fn header_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(HEADER_LINES)
}

/// Whether a heading title looks like a table-of-contents entry.
pub(crate) fn is_toc_title(title: &str) -> bool {
    RE_TOC_LINE.is_match(title)
}

/// Whether a line is short enough to be a heading.
pub(crate) fn is_heading_length(line: &str) -> bool {
    line.chars().count() <= MAX_HEADING_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toc_titles() {
        assert!(is_toc_title("Introduction ........ 15"));
        assert!(is_toc_title("Heaps 231"));
        assert!(!is_toc_title("Heaps and Priority Queues"));
        assert!(!is_toc_title("Sorting in O(n log n)"));
    }

    #[test]
    fn test_header_lines_skip_blanks() {
        let text = "\n\n  Chapter 1  \n\nIntro\n";
        let lines: Vec<&str> = header_lines(text).collect();
        assert_eq!(lines, vec!["Chapter 1", "Intro"]);
    }
}
