//! Conversion pipeline: page extractor → spacing restorer → record store.
//!
//! ```text
//! PageSource (PDF or form-feed text)
//!     ↓
//! Vec<String> (one entry per page, in order)
//!     ↓
//! [SpacingRestorer] (per page, independent)
//!     ↓
//! PageRecord 1..N
//!     ↓
//! [RecordWriter] (one JSON line per page)
//! ```
//!
//! Pages are numbered by their position in the extractor output. Nothing is
//! written until every page has been extracted and restored, and
//! [`ConversionPipeline::convert_to_path`] swaps the finished file into place
//! so a failed run never leaves a partial store behind. With the
//! `parallel` feature the restoration step runs on the rayon thread pool;
//! records are still written in page order.

mod history;

pub use history::{document_title, ConversionLog, ConversionLogEntry};

use crate::error::Result;
use crate::extractors::PageSource;
use crate::store::{write_atomic, PageRecord, RecordWriter};
use crate::text::{Restoration, RuleCounts, SpacingRestorer};
use std::io::Write;
use std::path::Path;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How many pages [`ConversionReport::busiest_pages`] lists.
const BUSIEST_PAGES: usize = 5;

/// Summary of one conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    /// Pages written
    pub pages: usize,
    /// Characters written, summed over all pages
    pub characters: usize,
    /// Whitespace-separated words written
    pub words: usize,
    /// Spaces inserted, per rule
    pub counts: RuleCounts,
    /// Pages with the most insertions as `(page_number, insertions)`, most first
    pub busiest_pages: Vec<(u32, usize)>,
}

/// Converts a document into a record store.
pub struct ConversionPipeline {
    restorer: SpacingRestorer,
    restore: bool,
}

impl ConversionPipeline {
    /// Create a pipeline that restores spacing with `restorer`.
    pub fn new(restorer: SpacingRestorer) -> Self {
        Self {
            restorer,
            restore: true,
        }
    }

    /// Turn spacing restoration on or off. Off writes extracted text verbatim.
    pub fn with_restoration(mut self, restore: bool) -> Self {
        self.restore = restore;
        self
    }

    /// Extract every page from `source` and write it to `writer`.
    ///
    /// Extraction and restoration finish before the first record is written,
    /// so an extraction failure leaves `writer` untouched.
    pub fn run<S, W>(&self, source: &mut S, writer: &mut RecordWriter<W>) -> Result<ConversionReport>
    where
        S: PageSource + ?Sized,
        W: Write,
    {
        let restored = self.prepare(source)?;
        self.write_pages(restored, writer)
    }

    /// Convert `source` into the store file at `path`.
    ///
    /// Records go to a temporary file next to `path`, which replaces `path`
    /// only once every record has been written and flushed. On any failure
    /// an existing store at `path` is left as it was.
    pub fn convert_to_path<S>(&self, source: &mut S, path: impl AsRef<Path>) -> Result<ConversionReport>
    where
        S: PageSource + ?Sized,
    {
        let path = path.as_ref();
        let restored = self.prepare(source)?;

        let report = write_atomic(path, |out| {
            let mut writer = RecordWriter::new(out);
            let report = self.write_pages(restored, &mut writer)?;
            writer.finish()?;
            Ok(report)
        })?;

        log::debug!("Replaced {}", path.display());
        Ok(report)
    }

    fn prepare<S>(&self, source: &mut S) -> Result<Vec<Restoration>>
    where
        S: PageSource + ?Sized,
    {
        let pages = source.pages()?;
        log::info!("Converting {} pages", pages.len());
        Ok(self.restore_pages(pages))
    }

    fn write_pages<W: Write>(
        &self,
        restored: Vec<Restoration>,
        writer: &mut RecordWriter<W>,
    ) -> Result<ConversionReport> {
        let mut report = ConversionReport::default();
        let mut per_page = Vec::with_capacity(restored.len());

        for (idx, restoration) in restored.into_iter().enumerate() {
            let page_number = idx as u32 + 1;
            let record = PageRecord::new(page_number, restoration.text);
            writer.write(&record)?;

            log::debug!(
                "Page {}: {} characters, {} spacing fixes",
                page_number,
                record.text_length(),
                restoration.issues_found
            );

            report.pages += 1;
            report.characters += record.text_length();
            report.words += record.word_count();
            report.counts.merge(&restoration.counts);
            if restoration.issues_found > 0 {
                per_page.push((page_number, restoration.issues_found));
            }
        }

        per_page.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        per_page.truncate(BUSIEST_PAGES);
        report.busiest_pages = per_page;

        log::info!(
            "Converted {} pages ({} characters, {} spacing fixes)",
            report.pages,
            report.characters,
            report.counts.total()
        );
        Ok(report)
    }

    fn restore_pages(&self, pages: Vec<String>) -> Vec<Restoration> {
        if !self.restore {
            return pages.into_iter().map(Restoration::unchanged).collect();
        }

        #[cfg(feature = "parallel")]
        {
            pages
                .par_iter()
                .map(|page| self.restorer.restore(page))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            pages.iter().map(|page| self.restorer.restore(page)).collect()
        }
    }
}
