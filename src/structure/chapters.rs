//! Chapter headings and the chapter → page-range index.

use super::{header_lines, is_heading_length, is_toc_title};
use crate::error::{Error, Result};
use crate::store::RecordStore;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// "Chapter 3", "CHAPTER THREE - Heaps", "Ch. 3 Heaps", "Chapter IV: Graphs"
    static ref RE_CHAPTER: Regex =
        Regex::new(r"^(?i:chapter|ch\.?)\s+([0-9]+|[A-Za-z]+)\b(.*)$").unwrap();

    /// A line that starts with a section number such as "3.1"
    static ref RE_SECTION_START: Regex = Regex::new(r"^\d+\.\d+").unwrap();
}

const NUMBER_WORDS: [&str; 15] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "thirteen", "fourteen", "fifteen",
];

const ROMAN_NUMERALS: [&str; 15] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV", "XV",
];

/// A chapter heading found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterHeading {
    /// Chapter number
    pub number: u32,
    /// Title from the heading line or the line after it
    pub title: Option<String>,
}

/// A detected chapter and the pages it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Chapter number
    pub number: u32,
    /// Chapter title, if one was found
    pub title: Option<String>,
    /// First page of the chapter
    pub start_page: u32,
    /// Last page of the chapter
    pub end_page: u32,
}

impl Chapter {
    /// Number of pages in the chapter.
    pub fn page_count(&self) -> u32 {
        self.end_page - self.start_page + 1
    }

    /// Whether page `n` belongs to this chapter.
    pub fn contains(&self, n: u32) -> bool {
        (self.start_page..=self.end_page).contains(&n)
    }
}

/// Parse "3", "three" or "III" as a chapter number.
fn parse_number(token: &str) -> Option<u32> {
    if token.bytes().all(|b| b.is_ascii_digit()) {
        return token.parse().ok().filter(|&n| n > 0);
    }
    let lower = token.to_ascii_lowercase();
    if let Some(idx) = NUMBER_WORDS.iter().position(|w| *w == lower) {
        return Some(idx as u32 + 1);
    }
    let upper = token.to_ascii_uppercase();
    ROMAN_NUMERALS
        .iter()
        .position(|r| *r == upper)
        .map(|idx| idx as u32 + 1)
}

/// Parse one line as a chapter heading. The title is `None` when the line
/// holds only the number.
fn parse_heading(line: &str) -> Option<ChapterHeading> {
    if !is_heading_length(line) {
        return None;
    }
    let caps = RE_CHAPTER.captures(line)?;
    let number = parse_number(&caps[1])?;
    let rest = caps[2].trim();

    let title = if rest.is_empty() {
        None
    } else if let Some(stripped) = rest.strip_prefix([':', '-', '–', '—', '.']) {
        Some(stripped.trim()).filter(|t| !t.is_empty())
    } else if rest.starts_with(char::is_uppercase) && caps[2].starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        // "Chapter 3 describes ..." is a reference, not a heading
        return None;
    };

    if title.is_some_and(is_toc_title) {
        return None;
    }

    Some(ChapterHeading {
        number,
        title: title.map(str::to_string),
    })
}

/// Detect the chapter heading at the top of a page.
///
/// Returns `None` if no heading is found or if the page announces more than
/// one chapter (a contents page).
pub fn detect_chapter(text: &str) -> Option<ChapterHeading> {
    let lines: Vec<&str> = header_lines(text).collect();
    let mut found: Option<ChapterHeading> = None;

    for (idx, line) in lines.iter().enumerate() {
        let Some(mut heading) = parse_heading(line) else {
            continue;
        };
        match &found {
            Some(first) if first.number != heading.number => return None,
            Some(_) => continue,
            None => {},
        }
        if heading.title.is_none() {
            heading.title = lines
                .get(idx + 1)
                .filter(|next| {
                    is_heading_length(next)
                        && !RE_SECTION_START.is_match(next)
                        && !is_toc_title(next)
                        && parse_heading(next).is_none()
                })
                .map(|next| next.to_string());
        }
        found = Some(heading);
    }

    found
}

/// Chapters of a store in page order.
#[derive(Debug, Clone, Default)]
pub struct ChapterIndex {
    chapters: Vec<Chapter>,
}

impl ChapterIndex {
    /// Scan every page of `store` for chapter headings.
    ///
    /// A heading is registered only if its number is greater than the last
    /// registered chapter; each chapter runs until the page before the next
    /// one, and the last chapter runs to the end of the store.
    pub fn build(store: &RecordStore) -> Self {
        let mut starts: Vec<(ChapterHeading, u32)> = Vec::new();
        let mut last = 0;

        for record in store.iter() {
            if let Some(heading) = detect_chapter(record.text()) {
                if heading.number > last {
                    log::debug!(
                        "Chapter {} starts on page {}",
                        heading.number,
                        record.page_number()
                    );
                    last = heading.number;
                    starts.push((heading, record.page_number()));
                }
            }
        }

        let max_page = store.max_page();
        let ends: Vec<u32> = starts
            .iter()
            .skip(1)
            .map(|(_, start)| start - 1)
            .chain(std::iter::once(max_page))
            .collect();

        let chapters = starts
            .into_iter()
            .zip(ends)
            .map(|((heading, start_page), end_page)| Chapter {
                number: heading.number,
                title: heading.title,
                start_page,
                end_page,
            })
            .collect::<Vec<_>>();

        log::info!("Detected {} chapters", chapters.len());
        Self { chapters }
    }

    /// Chapters in page order.
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Number of chapters detected.
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Whether no chapters were detected.
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// The chapter with this number.
    pub fn get(&self, number: u32) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.number == number)
    }

    /// First and last page of a chapter.
    pub fn range_of(&self, number: u32) -> Result<(u32, u32)> {
        self.get(number)
            .map(|c| (c.start_page, c.end_page))
            .ok_or(Error::ChapterNotFound(number))
    }

    /// The chapter containing page `n`, or `None` before the first chapter.
    pub fn chapter_for_page(&self, n: u32) -> Option<&Chapter> {
        let idx = self.chapters.partition_point(|c| c.start_page <= n);
        let chapter = self.chapters.get(idx.checked_sub(1)?)?;
        chapter.contains(n).then_some(chapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PageRecord;

    #[test]
    fn test_heading_forms() {
        let cases = [
            ("Chapter 1: Introduction", 1, Some("Introduction")),
            ("CHAPTER THREE - Sorting", 3, Some("Sorting")),
            ("Ch. 4 Graph Algorithms", 4, Some("Graph Algorithms")),
            ("Chapter XII", 12, None),
            ("chapter fifteen", 15, None),
        ];
        for (line, number, title) in cases {
            let heading = parse_heading(line).unwrap_or_else(|| panic!("no heading in {line:?}"));
            assert_eq!(heading.number, number, "{line}");
            assert_eq!(heading.title.as_deref(), title, "{line}");
        }
    }

    #[test]
    fn test_non_headings() {
        for line in [
            "Chapter 3 describes heaps in detail",
            "Chapters 1 and 2",
            "Chapter Summary",
            "Chapter 2: Data Structures ........ 45",
            "Chapter 0",
            "In Chapter 3 we saw",
        ] {
            assert!(parse_heading(line).is_none(), "{line:?}");
        }
    }

    #[test]
    fn test_title_from_next_line() {
        let heading = detect_chapter("Chapter 2\nData Structures\n\nBody text.").unwrap();
        assert_eq!(heading.number, 2);
        assert_eq!(heading.title.as_deref(), Some("Data Structures"));

        let heading = detect_chapter("Chapter 2\n2.1 Arrays").unwrap();
        assert_eq!(heading.title, None);
    }

    #[test]
    fn test_contents_page_is_not_a_chapter() {
        let toc = "Contents\nChapter 1: Introduction\nChapter 2: Data Structures\n";
        assert!(detect_chapter(toc).is_none());
    }

    #[test]
    fn test_heading_below_header_lines_ignored() {
        let mut text = "line\n".repeat(20);
        text.push_str("Chapter 5: Late");
        assert!(detect_chapter(&text).is_none());
    }

    fn book() -> RecordStore {
        let pages = [
            "Preface",
            "Contents\nChapter 1: Introduction .... 3\nChapter 2: Heaps .... 5",
            "Chapter 1: Introduction\nWelcome.",
            "More intro. See Chapter 2 for heaps.",
            "Chapter 2\nHeaps\nA heap is...",
            "Chapter 1: Introduction\nA running header from a stray page.",
            "Chapter 3: Graphs\nVertices.",
            "Edges.",
        ];
        RecordStore::from_records(
            pages
                .iter()
                .enumerate()
                .map(|(i, text)| PageRecord::new(i as u32 + 1, *text)),
        )
        .unwrap()
    }

    #[test]
    fn test_index_ranges() {
        let index = ChapterIndex::build(&book());
        assert_eq!(index.len(), 3);

        let ranges: Vec<(u32, u32, u32)> = index
            .chapters()
            .iter()
            .map(|c| (c.number, c.start_page, c.end_page))
            .collect();
        assert_eq!(ranges, vec![(1, 3, 4), (2, 5, 6), (3, 7, 8)]);
        assert_eq!(index.get(2).unwrap().title.as_deref(), Some("Heaps"));
        assert_eq!(index.get(3).unwrap().page_count(), 2);
    }

    #[test]
    fn test_chapter_for_page() {
        let index = ChapterIndex::build(&book());
        assert!(index.chapter_for_page(1).is_none());
        assert!(index.chapter_for_page(2).is_none());
        assert_eq!(index.chapter_for_page(3).unwrap().number, 1);
        assert_eq!(index.chapter_for_page(6).unwrap().number, 2);
        assert_eq!(index.chapter_for_page(8).unwrap().number, 3);
        assert!(index.chapter_for_page(9).is_none());
    }

    #[test]
    fn test_range_of_unknown_chapter() {
        let index = ChapterIndex::build(&book());
        assert_eq!(index.range_of(1).unwrap(), (3, 4));
        assert!(matches!(index.range_of(9), Err(Error::ChapterNotFound(9))));
    }

    #[test]
    fn test_empty_store() {
        let index = ChapterIndex::build(&RecordStore::default());
        assert!(index.is_empty());
        assert!(index.chapter_for_page(1).is_none());
    }
}
