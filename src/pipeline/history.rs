//! Conversion log: one JSON line per source document.
//!
//! Records which documents have been converted, where their store went and
//! how large it was. Entries are keyed by document title, the source file
//! name without its extension.

use crate::error::{Error, Result};
use crate::pipeline::ConversionReport;
use crate::store::write_atomic;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One logged document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionLogEntry {
    /// Source file name without extension
    pub document_title: String,
    /// UUID v5 of the source path
    pub document_id: String,
    /// Source path as given
    pub document_file: String,
    /// Whether conversion completed
    pub converted: bool,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub page_count: Option<usize>,
    #[serde(default)]
    pub word_count: Option<usize>,
    #[serde(default)]
    pub question_count: Option<usize>,
}

impl ConversionLogEntry {
    /// A not-yet-converted entry for the document at `path`.
    pub fn for_document(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file = path.display().to_string();
        Self {
            document_title: document_title(path),
            document_id: Uuid::new_v5(&Uuid::NAMESPACE_URL, file.as_bytes()).to_string(),
            document_file: file,
            converted: false,
            output_path: None,
            page_count: None,
            word_count: None,
            question_count: None,
        }
    }
}

/// Title a document is logged under.
pub fn document_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A conversion log file.
#[derive(Debug, Clone)]
pub struct ConversionLog {
    path: PathBuf,
}

impl ConversionLog {
    /// Open the log at `path`, creating it and its directory if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let write_error = |source| Error::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(write_error)?;
        Ok(Self { path })
    }

    /// Log file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every entry in file order. Lines that do not parse are skipped.
    pub fn entries(&self) -> Result<Vec<ConversionLogEntry>> {
        let text = fs::read_to_string(&self.path)?;
        let entries = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(idx, line)| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping conversion log line {}: {}", idx + 1, e);
                    None
                },
            })
            .collect();
        Ok(entries)
    }

    /// The entry for a document title.
    pub fn get(&self, title: &str) -> Result<Option<ConversionLogEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .find(|entry| entry.document_title == title))
    }

    /// Append `entry` unless its title is already logged. Returns whether it
    /// was added.
    pub fn add(&self, entry: &ConversionLogEntry) -> Result<bool> {
        if self.get(&entry.document_title)?.is_some() {
            return Ok(false);
        }
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|source| Error::Write {
                path: self.path.clone(),
                source,
            })?;
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(true)
    }

    /// Apply `update` to the first entry matching `pred` and rewrite the log.
    /// Returns whether an entry matched.
    fn update_where<P, F>(&self, pred: P, update: F) -> Result<bool>
    where
        P: Fn(&ConversionLogEntry) -> bool,
        F: FnOnce(&mut ConversionLogEntry),
    {
        let mut entries = self.entries()?;
        let Some(entry) = entries.iter_mut().find(|entry| pred(entry)) else {
            return Ok(false);
        };
        update(entry);
        self.write_all(&entries)?;
        Ok(true)
    }

    /// Apply `update` to the entry for `title`. Returns whether it exists.
    pub fn update<F>(&self, title: &str, update: F) -> Result<bool>
    where
        F: FnOnce(&mut ConversionLogEntry),
    {
        self.update_where(|entry| entry.document_title == title, update)
    }

    /// Mark a document converted with the store's size.
    pub fn mark_converted(
        &self,
        title: &str,
        output: &Path,
        page_count: usize,
        word_count: usize,
    ) -> Result<bool> {
        self.update(title, |entry| {
            entry.converted = true;
            entry.output_path = Some(output.display().to_string());
            entry.page_count = Some(page_count);
            entry.word_count = Some(word_count);
        })
    }

    /// Log a finished conversion of `input` into `output`, adding the entry
    /// first if the document is new.
    pub fn record_conversion(
        &self,
        input: &Path,
        output: &Path,
        report: &ConversionReport,
    ) -> Result<()> {
        let entry = ConversionLogEntry::for_document(input);
        if self.add(&entry)? {
            log::info!("Logged new document {}", entry.document_title);
        }
        self.mark_converted(&entry.document_title, output, report.pages, report.words)?;
        Ok(())
    }

    /// Store the question count on the entry whose store is `output`.
    pub fn set_question_count(&self, output: &Path, count: usize) -> Result<bool> {
        let output = output.display().to_string();
        self.update_where(
            |entry| entry.output_path.as_deref() == Some(output.as_str()),
            |entry| entry.question_count = Some(count),
        )
    }

    /// Whether `title` is logged as converted.
    pub fn is_converted(&self, title: &str) -> Result<bool> {
        Ok(self.get(title)?.is_some_and(|entry| entry.converted))
    }

    /// Entries logged as converted.
    pub fn converted(&self) -> Result<Vec<ConversionLogEntry>> {
        Ok(self.entries()?.into_iter().filter(|e| e.converted).collect())
    }

    /// Entries not yet converted.
    pub fn unconverted(&self) -> Result<Vec<ConversionLogEntry>> {
        Ok(self.entries()?.into_iter().filter(|e| !e.converted).collect())
    }

    /// Remove the entry for `title`. Returns whether it existed.
    pub fn remove(&self, title: &str) -> Result<bool> {
        let mut entries = self.entries()?;
        let before = entries.len();
        entries.retain(|entry| entry.document_title != title);
        if entries.len() == before {
            return Ok(false);
        }
        self.write_all(&entries)?;
        Ok(true)
    }

    fn write_all(&self, entries: &[ConversionLogEntry]) -> Result<()> {
        write_atomic(&self.path, |out| {
            for entry in entries {
                serde_json::to_writer(&mut *out, entry)?;
                out.write_all(b"\n")?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn log_in(dir: &TempDir) -> ConversionLog {
        ConversionLog::open(dir.path().join("logs").join("conversions.jsonl")).unwrap()
    }

    #[test]
    fn test_open_creates_empty_log() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        assert!(log.path().exists());
        assert!(log.entries().unwrap().is_empty());
    }

    #[test]
    fn test_entry_for_document() {
        let entry = ConversionLogEntry::for_document("pdfs/eecs_281.pdf");
        assert_eq!(entry.document_title, "eecs_281");
        assert_eq!(entry.document_file, "pdfs/eecs_281.pdf");
        assert!(!entry.converted);
        assert_eq!(
            entry.document_id,
            ConversionLogEntry::for_document("pdfs/eecs_281.pdf").document_id
        );
    }

    #[test]
    fn test_add_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        let entry = ConversionLogEntry::for_document("book.pdf");
        assert!(log.add(&entry).unwrap());
        assert!(!log.add(&entry).unwrap());
        assert_eq!(log.entries().unwrap().len(), 1);
        assert!(!log.is_converted("book").unwrap());
    }

    #[test]
    fn test_record_conversion_and_queries() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        log.add(&ConversionLogEntry::for_document("other.pdf")).unwrap();

        let report = ConversionReport {
            pages: 1083,
            words: 350_000,
            ..ConversionReport::default()
        };
        log.record_conversion(Path::new("book.pdf"), Path::new("out/book.jsonl"), &report)
            .unwrap();

        let entry = log.get("book").unwrap().unwrap();
        assert!(entry.converted);
        assert_eq!(entry.page_count, Some(1083));
        assert_eq!(entry.word_count, Some(350_000));
        assert_eq!(entry.output_path.as_deref(), Some("out/book.jsonl"));

        assert!(log.set_question_count(Path::new("out/book.jsonl"), 42).unwrap());
        assert!(!log.set_question_count(Path::new("elsewhere.jsonl"), 1).unwrap());
        assert_eq!(log.get("book").unwrap().unwrap().question_count, Some(42));

        assert_eq!(log.converted().unwrap().len(), 1);
        assert_eq!(log.unconverted().unwrap()[0].document_title, "other");
    }

    #[test]
    fn test_update_and_remove_missing_title() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        assert!(!log.update("ghost", |e| e.converted = true).unwrap());
        assert!(!log.remove("ghost").unwrap());

        log.add(&ConversionLogEntry::for_document("book.pdf")).unwrap();
        assert!(log.remove("book").unwrap());
        assert!(log.get("book").unwrap().is_none());
    }

    #[test]
    fn test_bad_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        log.add(&ConversionLogEntry::for_document("book.pdf")).unwrap();
        let mut text = fs::read_to_string(log.path()).unwrap();
        text.push_str("not json\n\n");
        fs::write(log.path(), text).unwrap();

        assert_eq!(log.entries().unwrap().len(), 1);
    }
}
