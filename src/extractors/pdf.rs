//! PDF page extraction backed by `pdf-extract`.

use super::{split_pages, PageSource};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Pages of a PDF file.
///
/// `pdf-extract` returns the whole document as one string with a form feed
/// between pages, which is split with [`split_pages`].
#[derive(Debug, Clone)]
pub struct PdfPages {
    path: PathBuf,
}

impl PdfPages {
    /// Extract pages from the PDF at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PageSource for PdfPages {
    fn pages(&mut self) -> Result<Vec<String>> {
        let bytes = fs::read(&self.path)?;
        let text = pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| Error::Extraction(format!("{}: {}", self.path.display(), e)))?;

        if text.trim().is_empty() {
            log::warn!(
                "No text extracted from {}; it may be a scanned document",
                self.path.display()
            );
        }

        let pages = split_pages(&text);
        log::debug!("Extracted {} pages from {}", pages.len(), self.path.display());
        Ok(pages)
    }
}
