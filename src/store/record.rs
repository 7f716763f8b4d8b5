//! The page record: one line of the store.

use serde::{Deserialize, Serialize};

/// Text of one page of the source document.
///
/// Serialised as `{"page_number": 1, "text": "...", "text_length": 3}`.
/// `text_length` is the number of characters (not bytes) in `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    page_number: u32,
    text: String,
    text_length: usize,
}

impl PageRecord {
    /// Create a record, computing `text_length` from the text.
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            page_number,
            text_length: text.chars().count(),
            text,
        }
    }

    /// 1-based page number.
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Page text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters in the text.
    pub fn text_length(&self) -> usize {
        self.text_length
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Check the record invariants, returning the violated one.
    pub fn check(&self) -> std::result::Result<(), String> {
        if self.page_number == 0 {
            return Err("page_number must be at least 1".to_string());
        }
        let actual = self.text.chars().count();
        if actual != self.text_length {
            return Err(format!(
                "text_length {} does not match text ({} characters)",
                self.text_length, actual
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let record = PageRecord::new(1, "naïve café");
        assert_eq!(record.text_length(), 10);
        assert!(record.text().len() > 10);
        assert!(record.check().is_ok());
    }

    #[test]
    fn test_serialised_shape() {
        let json = serde_json::to_string(&PageRecord::new(3, "abc")).unwrap();
        assert_eq!(json, r#"{"page_number":3,"text":"abc","text_length":3}"#);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let record: PageRecord = serde_json::from_str(
            r#"{"page_number":2,"text":"hi","text_length":2,"word_count":1}"#,
        )
        .unwrap();
        assert_eq!(record, PageRecord::new(2, "hi"));
    }

    #[test]
    fn test_check_rejects_bad_records() {
        let zero: PageRecord =
            serde_json::from_str(r#"{"page_number":0,"text":"","text_length":0}"#).unwrap();
        assert!(zero.check().unwrap_err().contains("page_number"));

        let wrong: PageRecord =
            serde_json::from_str(r#"{"page_number":1,"text":"abc","text_length":4}"#).unwrap();
        assert!(wrong.check().unwrap_err().contains("text_length 4"));
    }

    #[test]
    fn test_word_count() {
        assert_eq!(PageRecord::new(1, "one two\nthree  four").word_count(), 4);
        assert_eq!(PageRecord::new(1, "").word_count(), 0);
    }
}
