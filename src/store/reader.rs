//! Line-by-line reading of a store file.

use crate::error::{Error, Result};
use crate::store::record::PageRecord;
use std::io::BufRead;

/// Lazily parses page records from JSON lines.
///
/// Blank lines are skipped. Every other line yields either a record or an
/// error; a `MalformedRecord` does not stop the iterator, so callers decide
/// whether to skip it or abort.
pub struct RecordReader<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> RecordReader<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// 1-based number of the line most recently read.
    pub fn line_number(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<PageRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    let line = self.buf.trim_end_matches(['\n', '\r']);
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(parse_line(self.line, line));
                },
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    self.line += 1;
                    return Some(Err(Error::malformed(self.line, "line is not valid UTF-8")));
                },
                Err(e) => return Some(Err(Error::Io(e))),
            }
        }
    }
}

/// Parse and check one store line.
pub fn parse_line(line: usize, text: &str) -> Result<PageRecord> {
    let record: PageRecord =
        serde_json::from_str(text).map_err(|e| Error::malformed(line, e.to_string()))?;
    record.check().map_err(|reason| Error::malformed(line, reason))?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_records_and_skips_blank_lines() {
        let data = concat!(
            r#"{"page_number":1,"text":"a","text_length":1}"#,
            "\n\n",
            r#"{"page_number":2,"text":"bc","text_length":2}"#,
            "\r\n",
        );
        let mut reader = RecordReader::new(Cursor::new(data));

        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.page_number(), 1);
        assert_eq!(reader.line_number(), 1);

        let second = reader.next().unwrap().unwrap();
        assert_eq!(second.text(), "bc");
        assert_eq!(reader.line_number(), 3);

        assert!(reader.next().is_none());
    }

    #[test]
    fn test_malformed_lines_do_not_stop_iteration() {
        let data = concat!(
            "not json\n",
            r#"{"page_number":1,"text":"abc","text_length":9}"#,
            "\n",
            r#"{"page_number":2,"text":"ok","text_length":2}"#,
            "\n",
        );
        let results: Vec<_> = RecordReader::new(Cursor::new(data)).collect();
        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], Err(Error::MalformedRecord { line: 1, .. })));
        assert!(matches!(results[1], Err(Error::MalformedRecord { line: 2, .. })));
        assert_eq!(results[2].as_ref().unwrap().page_number(), 2);
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let err = parse_line(7, r#"{"page_number":1,"text":"abc"}"#).unwrap_err();
        match err {
            Error::MalformedRecord { line, reason } => {
                assert_eq!(line, 7);
                assert!(reason.contains("text_length"));
            },
            other => panic!("unexpected error: {other}"),
        }
    }
}
