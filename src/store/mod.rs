//! The record store: one JSON line per page.
//!
//! A store file is written once by conversion and read many times by queries.
//! Loading builds an immutable, page-indexed [`RecordStore`] that is handed to
//! the query engine explicitly.
//!
//! ## Malformed lines
//!
//! A line is malformed when it is not a JSON page record, when its
//! `page_number` is 0 or repeats an earlier line, or when `text_length`
//! disagrees with the text. By default such lines are logged, counted and
//! skipped, so one bad line does not make the rest of the store unreadable.
//! With [`StoreConfig::strict`] the first malformed line aborts the load.

mod reader;
mod record;
mod writer;

pub use reader::{parse_line, RecordReader};
pub use record::PageRecord;
pub use writer::RecordWriter;
pub(crate) use writer::write_atomic;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A line that was skipped while loading leniently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    /// Why the line was rejected
    pub reason: String,
}

/// Problems found by [`RecordStore::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Gaps in `1..=max_page` as inclusive `(first, last)` ranges, ascending
    pub missing_pages: Vec<(u32, u32)>,
    /// Lines skipped during loading
    pub skipped_lines: usize,
}

impl ValidationReport {
    /// Whether the store has pages 1..N with nothing skipped.
    pub fn is_clean(&self) -> bool {
        self.missing_pages.is_empty() && self.skipped_lines == 0
    }

    /// Total number of missing pages across all gaps.
    pub fn missing_count(&self) -> u64 {
        self.missing_pages
            .iter()
            .map(|&(first, last)| u64::from(last - first) + 1)
            .sum()
    }
}

/// Loaded page records indexed by page number.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    pages: BTreeMap<u32, PageRecord>,
    skipped: Vec<SkippedLine>,
}

impl RecordStore {
    /// Load a store file.
    pub fn open(path: impl AsRef<Path>, config: &StoreConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let store = Self::from_reader(BufReader::new(file), config)?;
        log::info!(
            "Loaded {} pages from {} ({} lines skipped)",
            store.len(),
            path.display(),
            store.skipped.len()
        );
        Ok(store)
    }

    /// Load records from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R, config: &StoreConfig) -> Result<Self> {
        let mut store = Self::default();
        let mut records = RecordReader::new(reader);

        while let Some(item) = records.next() {
            let line = records.line_number();
            let outcome = item.and_then(|record| store.insert(line, record));
            match outcome {
                Ok(()) => {},
                Err(Error::MalformedRecord { line, reason }) if !config.strict => {
                    log::warn!("Skipping malformed record at line {}: {}", line, reason);
                    store.skipped.push(SkippedLine { line, reason });
                },
                Err(e) => return Err(e),
            }
        }

        Ok(store)
    }

    /// Build a store from records already in memory.
    pub fn from_records(records: impl IntoIterator<Item = PageRecord>) -> Result<Self> {
        let mut store = Self::default();
        for (idx, record) in records.into_iter().enumerate() {
            record
                .check()
                .map_err(|reason| Error::malformed(idx + 1, reason))?;
            store.insert(idx + 1, record)?;
        }
        Ok(store)
    }

    fn insert(&mut self, line: usize, record: PageRecord) -> Result<()> {
        let page = record.page_number();
        if self.pages.contains_key(&page) {
            return Err(Error::malformed(line, format!("duplicate page_number {}", page)));
        }
        self.pages.insert(page, record);
        Ok(())
    }

    /// The record for a page, if present.
    pub fn get(&self, page: u32) -> Option<&PageRecord> {
        self.pages.get(&page)
    }

    /// Number of records loaded.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no records were loaded.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Highest page number, or 0 for an empty store.
    pub fn max_page(&self) -> u32 {
        self.pages.keys().next_back().copied().unwrap_or(0)
    }

    /// Records in ascending page order.
    pub fn iter(&self) -> impl Iterator<Item = &PageRecord> + '_ {
        self.pages.values()
    }

    /// Records for pages `start..=end` that are present.
    pub fn range(&self, start: u32, end: u32) -> impl Iterator<Item = &PageRecord> + '_ {
        self.pages.range(start..=end).map(|(_, record)| record)
    }

    /// Lines skipped while loading.
    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    /// Check numbering and report skipped lines.
    ///
    /// Gaps are found between consecutive page numbers, so the report grows
    /// with the number of records, not with the highest page number.
    pub fn validate(&self) -> ValidationReport {
        let mut missing_pages = Vec::new();
        let mut prev = 0u32;
        for &page in self.pages.keys() {
            if page > prev + 1 {
                missing_pages.push((prev + 1, page - 1));
            }
            prev = page;
        }
        ValidationReport {
            missing_pages,
            skipped_lines: self.skipped.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn jsonl(pages: &[(u32, &str)]) -> String {
        pages
            .iter()
            .map(|(n, text)| serde_json::to_string(&PageRecord::new(*n, *text)).unwrap() + "\n")
            .collect()
    }

    #[test]
    fn test_load_and_index() {
        let data = jsonl(&[(1, "one"), (2, "two"), (3, "three")]);
        let store = RecordStore::from_reader(Cursor::new(data), &StoreConfig::new()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.max_page(), 3);
        assert_eq!(store.get(2).unwrap().text(), "two");
        assert!(store.get(4).is_none());
        assert!(store.validate().is_clean());
    }

    #[test]
    fn test_lenient_load_skips_bad_lines() {
        let mut data = jsonl(&[(1, "one")]);
        data.push_str("{broken\n");
        data.push_str(&jsonl(&[(1, "again"), (3, "three")]));

        let store = RecordStore::from_reader(Cursor::new(data), &StoreConfig::new()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.skipped().len(), 2);
        assert_eq!(store.skipped()[0].line, 2);
        assert!(store.skipped()[1].reason.contains("duplicate"));
        assert_eq!(store.get(1).unwrap().text(), "one");

        let report = store.validate();
        assert_eq!(report.missing_pages, vec![(2, 2)]);
        assert_eq!(report.missing_count(), 1);
        assert_eq!(report.skipped_lines, 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_strict_load_aborts() {
        let mut data = jsonl(&[(1, "one")]);
        data.push_str(r#"{"page_number":2,"text":"abc","text_length":1}"#);
        data.push('\n');

        let err = RecordStore::from_reader(Cursor::new(data), &StoreConfig::new().with_strict(true))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn test_empty_store() {
        let store = RecordStore::from_reader(Cursor::new(""), &StoreConfig::new()).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.max_page(), 0);
        assert!(store.validate().is_clean());
    }

    #[test]
    fn test_from_records_rejects_duplicates() {
        let err = RecordStore::from_records(vec![PageRecord::new(1, "a"), PageRecord::new(1, "b")])
            .unwrap_err();
        assert!(err.to_string().contains("duplicate page_number 1"));
    }

    #[test]
    fn test_validate_sparse_high_page_numbers() {
        let data = jsonl(&[(1, "one"), (20_000_000, "far"), (u32::MAX, "last")]);
        let store = RecordStore::from_reader(Cursor::new(data), &StoreConfig::new()).unwrap();
        assert_eq!(store.len(), 3);

        let report = store.validate();
        assert_eq!(
            report.missing_pages,
            vec![(2, 19_999_999), (20_000_001, u32::MAX - 1)]
        );
        assert_eq!(report.missing_count(), u64::from(u32::MAX) - 3);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_validate_leading_gap() {
        let store = RecordStore::from_records(vec![PageRecord::new(4, "four"), PageRecord::new(5, "five")])
            .unwrap();
        assert_eq!(store.validate().missing_pages, vec![(1, 3)]);
    }

    #[test]
    fn test_range_iterates_in_order() {
        let store = RecordStore::from_records(
            (1..=10).rev().map(|n| PageRecord::new(n, format!("page {n}"))),
        )
        .unwrap();
        let pages: Vec<u32> = store.range(4, 6).map(|r| r.page_number()).collect();
        assert_eq!(pages, vec![4, 5, 6]);
        let all: Vec<u32> = store.iter().map(|r| r.page_number()).collect();
        assert_eq!(all, (1..=10).collect::<Vec<_>>());
    }
}
