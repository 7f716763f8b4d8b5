//! Page extractors: where page text comes from.
//!
//! A [`PageSource`] yields the text of every page of a document in reading
//! order. Page numbers are assigned by position (the first page is page 1), so
//! a source must yield empty pages as empty strings rather than dropping them.
//!
//! - [`PdfPages`]: text extraction from a PDF file (feature `pdf`)
//! - [`TextPages`]: a pre-extracted text file with form-feed page breaks
//! - [`InMemoryPages`]: pages already held in memory

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::PdfPages;

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Page break character between pages of extracted text.
pub const PAGE_BREAK: char = '\x0c';

/// A document that can be split into page texts.
pub trait PageSource {
    /// Extract the text of every page, in page order.
    fn pages(&mut self) -> Result<Vec<String>>;
}

/// Split extracted text on form feeds.
///
/// Each page is trimmed of surrounding whitespace. The empty segment after a
/// final form feed is not a page; empty pages elsewhere are kept so numbering
/// matches the source. Text with no form feed is a single page, and empty
/// text has no pages.
pub fn split_pages(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut pages: Vec<String> = text
        .split(PAGE_BREAK)
        .map(|page| page.trim().to_string())
        .collect();
    if text.trim_end_matches(|c: char| c.is_whitespace() && c != PAGE_BREAK).ends_with(PAGE_BREAK)
    {
        pages.pop();
    }
    pages
}

/// A UTF-8 text file whose pages are separated by form feeds.
///
/// This is what `pdftotext` writes by default.
#[derive(Debug, Clone)]
pub struct TextPages {
    path: PathBuf,
}

impl TextPages {
    /// Read pages from `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PageSource for TextPages {
    fn pages(&mut self) -> Result<Vec<String>> {
        let text = fs::read_to_string(&self.path)?;
        let pages = split_pages(&text);
        log::debug!("Read {} pages from {}", pages.len(), self.path.display());
        Ok(pages)
    }
}

/// Pages supplied directly.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPages {
    pages: Vec<String>,
}

impl InMemoryPages {
    /// Use these page texts as-is.
    pub fn new<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }
}

impl PageSource for InMemoryPages {
    fn pages(&mut self) -> Result<Vec<String>> {
        Ok(self.pages.clone())
    }
}

/// Pick a source for `path` by extension: `.pdf` is a PDF, anything else
/// is form-feed separated text.
pub fn source_for_path(path: impl AsRef<Path>) -> Result<Box<dyn PageSource>> {
    let path = path.as_ref();
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        #[cfg(feature = "pdf")]
        {
            return Ok(Box::new(PdfPages::new(path)));
        }
        #[cfg(not(feature = "pdf"))]
        {
            return Err(crate::error::Error::Extraction(format!(
                "{} is a PDF but PDF support is not enabled (build with feature `pdf`)",
                path.display()
            )));
        }
    }
    Ok(Box::new(TextPages::new(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_on_form_feed() {
        assert_eq!(split_pages("one\x0ctwo\x0cthree"), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_trailing_form_feed_is_not_a_page() {
        assert_eq!(split_pages("one\x0ctwo\x0c"), vec!["one", "two"]);
        assert_eq!(split_pages("one\x0ctwo\x0c\n"), vec!["one", "two"]);
    }

    #[test]
    fn test_empty_pages_keep_numbering() {
        assert_eq!(split_pages("one\x0c\x0cthree"), vec!["one", "", "three"]);
        assert_eq!(split_pages("\x0ctwo"), vec!["", "two"]);
    }

    #[test]
    fn test_no_break_is_single_page() {
        assert_eq!(split_pages("  just one page\n"), vec!["just one page"]);
        assert!(split_pages("").is_empty());
        assert!(split_pages(" \n ").is_empty());
    }

    #[test]
    fn test_text_pages_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first\x0csecond\x0c").unwrap();

        let pages = TextPages::new(file.path()).pages().unwrap();
        assert_eq!(pages, vec!["first", "second"]);
    }

    #[test]
    fn test_text_pages_missing_file() {
        let err = TextPages::new("/nonexistent/book.txt").pages().unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }

    #[test]
    fn test_in_memory_pages() {
        let mut source = InMemoryPages::new(["a", "", "c"]);
        assert_eq!(source.pages().unwrap(), vec!["a", "", "c"]);
        assert_eq!(source.pages().unwrap().len(), 3);
    }

    #[test]
    fn test_source_for_text_path() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "only page").unwrap();
        let mut source = source_for_path(file.path()).unwrap();
        assert_eq!(source.pages().unwrap(), vec!["only page"]);
    }
}
