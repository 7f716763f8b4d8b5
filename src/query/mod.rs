//! Read-only queries over a loaded record store.
//!
//! [`QueryEngine`] borrows a [`RecordStore`]; every operation is a
//! stateless read, so any number of engines can share one store.

use crate::error::{Error, Result};
use crate::search::{self, Matches, SearchOptions};
use crate::store::{PageRecord, RecordStore};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Default preview length for [`QueryEngine::preview`].
pub const DEFAULT_PREVIEW_CHARS: usize = 500;

/// Aggregate statistics over every page of a store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    /// Number of page records
    pub total_pages: usize,
    /// Sum of `text_length` over all pages
    pub total_characters: usize,
    /// `total_characters / total_pages`, or 0 for an empty store
    pub average_chars_per_page: f64,
    /// Whitespace-separated words over all pages
    pub total_words: usize,
    /// Pages whose text is empty or whitespace
    pub empty_pages: usize,
}

/// The start of a page's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview<'a> {
    /// The page being previewed
    pub record: &'a PageRecord,
    /// At most the requested number of characters
    pub text: &'a str,
    /// Whether the page continues past `text`
    pub truncated: bool,
}

/// Queries over an explicit store handle.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'a> {
    store: &'a RecordStore,
}

impl<'a> QueryEngine<'a> {
    /// Query `store`.
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// The store being queried.
    pub fn store(&self) -> &'a RecordStore {
        self.store
    }

    /// The record for page `n`.
    pub fn get_page(&self, n: u32) -> Result<&'a PageRecord> {
        self.store.get(n).ok_or(Error::NotFound {
            page: n,
            max_page: self.store.max_page(),
        })
    }

    /// Records for pages `start..=end`, in order.
    ///
    /// Fails with `InvalidRange` if the range is reversed or leaves
    /// `[1, max_page]`, and with `NotFound` for the first page in range that
    /// has no record.
    pub fn get_range(&self, start: u32, end: u32) -> Result<Vec<&'a PageRecord>> {
        let max_page = self.store.max_page();
        if start > end {
            return Err(Error::invalid_range(start, end, "start is after end"));
        }
        if start < 1 || end > max_page {
            return Err(Error::invalid_range(
                start,
                end,
                format!("pages must be within 1-{}", max_page),
            ));
        }
        (start..=end).map(|n| self.get_page(n)).collect()
    }

    /// The first `max_chars` characters of page `n`.
    pub fn preview(&self, n: u32, max_chars: usize) -> Result<Preview<'a>> {
        let record = self.get_page(n)?;
        let text = record.text();
        let cut = text
            .char_indices()
            .nth(max_chars)
            .map_or(text.len(), |(i, _)| i);
        Ok(Preview {
            record,
            text: &text[..cut],
            truncated: cut < text.len(),
        })
    }

    /// Text of pages `start..=end`, each preceded by a `--- Page n ---` line.
    pub fn range_text(&self, start: u32, end: u32) -> Result<String> {
        let records = self.get_range(start, end)?;
        let mut out = String::new();
        for record in records {
            // Writing to a String cannot fail.
            let _ = writeln!(out, "--- Page {} ---", record.page_number());
            out.push_str(record.text());
            out.push('\n');
        }
        Ok(out)
    }

    /// Write the text of pages `start..=end` to `path`.
    ///
    /// The range is validated before the file is touched, so a failed call
    /// never leaves partial output behind. Returns the number of pages written.
    pub fn extract(&self, start: u32, end: u32, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let text = self.range_text(start, end)?;
        fs::write(path, text).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
        let pages = (end - start + 1) as usize;
        log::info!("Extracted pages {}-{} to {}", start, end, path.display());
        Ok(pages)
    }

    /// Statistics computed by a full scan.
    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            total_pages: 0,
            total_characters: 0,
            average_chars_per_page: 0.0,
            total_words: 0,
            empty_pages: 0,
        };
        for record in self.store.iter() {
            stats.total_pages += 1;
            stats.total_characters += record.text_length();
            stats.total_words += record.word_count();
            if record.text().trim().is_empty() {
                stats.empty_pages += 1;
            }
        }
        if stats.total_pages > 0 {
            stats.average_chars_per_page = stats.total_characters as f64 / stats.total_pages as f64;
        }
        stats
    }

    /// Lazily search every page for `keyword`.
    pub fn search(&self, keyword: &str, options: &SearchOptions) -> Result<Matches<'a>> {
        search::search(self.store.iter(), keyword, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(n: u32) -> RecordStore {
        RecordStore::from_records((1..=n).map(|i| PageRecord::new(i, format!("text of page {i}"))))
            .unwrap()
    }

    #[test]
    fn test_get_page() {
        let store = store(3);
        let engine = QueryEngine::new(&store);
        assert_eq!(engine.get_page(2).unwrap().text(), "text of page 2");

        let err = engine.get_page(0).unwrap_err();
        assert_eq!(err.to_string(), "Page 0 not found (valid pages: 1-3)");
        assert!(matches!(engine.get_page(4), Err(Error::NotFound { page: 4, max_page: 3 })));
    }

    #[test]
    fn test_get_range_bounds() {
        let store = store(10);
        let engine = QueryEngine::new(&store);

        let pages: Vec<u32> = engine
            .get_range(3, 5)
            .unwrap()
            .iter()
            .map(|r| r.page_number())
            .collect();
        assert_eq!(pages, vec![3, 4, 5]);
        assert_eq!(engine.get_range(7, 7).unwrap().len(), 1);

        assert!(matches!(engine.get_range(5, 3), Err(Error::InvalidRange { .. })));
        assert!(matches!(engine.get_range(0, 3), Err(Error::InvalidRange { .. })));
        assert!(matches!(engine.get_range(8, 11), Err(Error::InvalidRange { .. })));
    }

    #[test]
    fn test_get_range_with_gap() {
        let store = RecordStore::from_records(vec![
            PageRecord::new(1, "a"),
            PageRecord::new(2, "b"),
            PageRecord::new(4, "d"),
        ])
        .unwrap();
        let engine = QueryEngine::new(&store);
        assert!(matches!(engine.get_range(1, 4), Err(Error::NotFound { page: 3, .. })));
        assert_eq!(engine.get_range(1, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_preview() {
        let store = RecordStore::from_records(vec![PageRecord::new(1, "héllo world")]).unwrap();
        let engine = QueryEngine::new(&store);

        let short = engine.preview(1, 5).unwrap();
        assert_eq!(short.text, "héllo");
        assert!(short.truncated);

        let full = engine.preview(1, DEFAULT_PREVIEW_CHARS).unwrap();
        assert_eq!(full.text, "héllo world");
        assert!(!full.truncated);
    }

    #[test]
    fn test_range_text_headers() {
        let store = store(3);
        let engine = QueryEngine::new(&store);
        assert_eq!(
            engine.range_text(2, 3).unwrap(),
            "--- Page 2 ---\ntext of page 2\n--- Page 3 ---\ntext of page 3\n"
        );
    }

    #[test]
    fn test_stats() {
        let store = RecordStore::from_records(vec![
            PageRecord::new(1, "two words"),
            PageRecord::new(2, ""),
            PageRecord::new(3, "x"),
        ])
        .unwrap();
        let stats = QueryEngine::new(&store).stats();
        assert_eq!(stats.total_pages, 3);
        assert_eq!(stats.total_characters, 10);
        assert!((stats.average_chars_per_page - 10.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.total_words, 3);
        assert_eq!(stats.empty_pages, 1);
    }

    #[test]
    fn test_stats_empty_store() {
        let store = RecordStore::default();
        let stats = QueryEngine::new(&store).stats();
        assert_eq!(stats.total_pages, 0);
        assert_eq!(stats.average_chars_per_page, 0.0);
    }

    #[test]
    fn test_search_through_engine() {
        let store = store(12);
        let engine = QueryEngine::new(&store);
        let pages: Vec<u32> = engine
            .search("page 1", &SearchOptions::new())
            .unwrap()
            .map(|m| m.page_number)
            .collect();
        assert_eq!(pages, vec![1, 10, 11, 12]);
    }
}
