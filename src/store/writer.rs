//! Writing a store file.

use crate::error::{Error, Result};
use crate::store::record::PageRecord;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `path` through a temporary file in the same directory.
///
/// `path` is replaced only after `write` succeeds and the output is flushed.
/// On failure the temporary file is removed and `path` is left untouched.
pub(crate) fn write_atomic<T, F>(path: &Path, write: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<NamedTempFile>) -> Result<T>,
{
    let write_error = |source: io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    let mut out = BufWriter::new(tmp);
    let value = write(&mut out)?;
    let tmp = out.into_inner().map_err(|e| write_error(e.into_error()))?;
    tmp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(value)
}

/// Writes page records as JSON lines.
///
/// Pages must arrive numbered 1, 2, 3, ... so every store written here has
/// exactly one line per page in ascending order.
pub struct RecordWriter<W: Write> {
    out: W,
    next_page: u32,
}

impl RecordWriter<BufWriter<File>> {
    /// Create (or truncate) a store file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RecordWriter<W> {
    /// Wrap any writer.
    pub fn new(out: W) -> Self {
        Self { out, next_page: 1 }
    }

    /// Append one record.
    pub fn write(&mut self, record: &PageRecord) -> Result<()> {
        let line = self.next_page as usize;
        if record.page_number() != self.next_page {
            return Err(Error::malformed(
                line,
                format!("expected page {}, got page {}", self.next_page, record.page_number()),
            ));
        }
        record.check().map_err(|reason| Error::malformed(line, reason))?;

        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.next_page += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        (self.next_page - 1) as usize
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
