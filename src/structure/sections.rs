//! Numbered section headings.

use super::{header_lines, is_heading_length, is_toc_title};
use crate::store::RecordStore;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    /// "1.2 Pointers", "1.2.3. Advanced Topics", "Section 1.2: Pointers", "§1.2 Pointers"
    static ref RE_SECTION: Regex = Regex::new(
        r"^(?:(?i:section)\s+|§\s*)?((?:\d+\.)+\d+)\.?(?:\s*[:\-–—]\s*|\s+)(.+)$"
    )
    .unwrap();
}

/// Shortest accepted section title.
const MIN_TITLE_CHARS: usize = 3;

/// A numbered section heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeading {
    /// Dotted section number, e.g. "3.2.1"
    pub number: String,
    /// Section title
    pub title: String,
    /// Nesting level: 2 for "3.2", 3 for "3.2.1"
    pub level: usize,
    /// Page the heading is on
    pub page_number: u32,
}

impl SectionHeading {
    /// The chapter number the section belongs to.
    pub fn chapter(&self) -> Option<u32> {
        self.number.split('.').next()?.parse().ok()
    }
}

fn parse_section(line: &str, page_number: u32) -> Option<SectionHeading> {
    if !is_heading_length(line) {
        return None;
    }
    let caps = RE_SECTION.captures(line)?;
    let number = caps[1].to_string();
    let title = caps[2].trim();

    if title.chars().count() < MIN_TITLE_CHARS
        || !title.starts_with(char::is_uppercase)
        || is_toc_title(title)
    {
        return None;
    }

    Some(SectionHeading {
        level: number.matches('.').count() + 1,
        number,
        title: title.to_string(),
        page_number,
    })
}

/// Section headings at the top of one page.
pub fn find_sections(text: &str, page_number: u32) -> Vec<SectionHeading> {
    header_lines(text)
        .filter_map(|line| parse_section(line, page_number))
        .collect()
}

/// The first occurrence of every section in the store, in page order.
pub fn scan_sections(store: &RecordStore) -> Vec<SectionHeading> {
    let mut seen = HashSet::new();
    store
        .iter()
        .flat_map(|record| find_sections(record.text(), record.page_number()))
        .filter(|section| seen.insert(section.number.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PageRecord;

    #[test]
    fn test_section_forms() {
        let cases = [
            ("1.2 Pointers and References", "1.2", "Pointers and References", 2),
            ("1.2.3. Advanced Topics", "1.2.3", "Advanced Topics", 3),
            ("Section 4.1: Merge Sort", "4.1", "Merge Sort", 2),
            ("§25.5 Shortest Paths", "25.5", "Shortest Paths", 2),
        ];
        for (line, number, title, level) in cases {
            let section = parse_section(line, 7).unwrap_or_else(|| panic!("no section in {line:?}"));
            assert_eq!(section.number, number);
            assert_eq!(section.title, title);
            assert_eq!(section.level, level);
            assert_eq!(section.page_number, 7);
        }
    }

    #[test]
    fn test_non_sections() {
        for line in [
            "2.5 times faster than before",
            "3.14",
            "1.2 Pointers ......... 12",
            "1.2 Ab",
            "12 Angry Men",
        ] {
            assert!(parse_section(line, 1).is_none(), "{line:?}");
        }
    }

    #[test]
    fn test_chapter_of_section() {
        let section = parse_section("14.3 Merge Sort", 1).unwrap();
        assert_eq!(section.chapter(), Some(14));
    }

    #[test]
    fn test_scan_keeps_first_occurrence() {
        let store = RecordStore::from_records(vec![
            PageRecord::new(1, "1.1 Arrays\nText"),
            PageRecord::new(2, "1.1 Arrays\nRunning header"),
            PageRecord::new(3, "Body\n1.2 Lists\n1.2.1 Linked Lists"),
        ])
        .unwrap();
        let sections = scan_sections(&store);
        let found: Vec<(&str, u32)> = sections
            .iter()
            .map(|s| (s.number.as_str(), s.page_number))
            .collect();
        assert_eq!(found, vec![("1.1", 1), ("1.2", 3), ("1.2.1", 3)]);
    }
}
