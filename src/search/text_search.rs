//! Literal keyword matching with context snippets.

use crate::error::{Error, Result};
use crate::store::PageRecord;
use regex::{Regex, RegexBuilder};

/// Default number of characters of context on each side of a match.
pub const DEFAULT_CONTEXT_CHARS: usize = 80;

/// One keyword occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    /// Page the match is on
    pub page_number: u32,
    /// Character (not byte) offset of the match in the page text
    pub char_offset: usize,
    /// The matched text as it appears on the page
    pub matched: String,
    /// Context around the match with line breaks flattened to spaces
    pub snippet: String,
}

/// Options for keyword search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Case insensitive search
    pub case_insensitive: bool,
    /// Match whole words only
    pub whole_word: bool,
    /// Characters of context on each side of a match
    pub context_chars: usize,
    /// Maximum number of results (0 = unlimited)
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            whole_word: false,
            context_chars: DEFAULT_CONTEXT_CHARS,
            max_results: 0,
        }
    }
}

impl SearchOptions {
    /// Create new default search options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable case-insensitive search.
    pub fn case_insensitive() -> Self {
        Self {
            case_insensitive: true,
            ..Default::default()
        }
    }

    /// Set case sensitivity.
    pub fn with_case_insensitive(mut self, value: bool) -> Self {
        self.case_insensitive = value;
        self
    }

    /// Match whole words only.
    pub fn with_whole_word(mut self, value: bool) -> Self {
        self.whole_word = value;
        self
    }

    /// Set the context width around each match.
    pub fn with_context_chars(mut self, chars: usize) -> Self {
        self.context_chars = chars;
        self
    }

    /// Limit the number of results.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

/// Search `records` for `keyword`.
///
/// The keyword is matched literally. Fails with [`Error::InvalidQuery`] if
/// the keyword is empty or only whitespace.
pub fn search<'a, I>(records: I, keyword: &str, options: &SearchOptions) -> Result<Matches<'a>>
where
    I: IntoIterator<Item = &'a PageRecord>,
    I::IntoIter: 'a,
{
    let regex = build_regex(keyword, options)?;
    Ok(Matches {
        regex,
        records: Box::new(records.into_iter()),
        current: None,
        context_chars: options.context_chars,
        remaining: (options.max_results > 0).then_some(options.max_results),
    })
}

fn build_regex(keyword: &str, options: &SearchOptions) -> Result<Regex> {
    if keyword.trim().is_empty() {
        return Err(Error::InvalidQuery("search keyword is empty".to_string()));
    }

    let escaped = regex::escape(keyword);
    let pattern = if options.whole_word {
        format!(r"\b{}\b", escaped)
    } else {
        escaped
    };

    RegexBuilder::new(&pattern)
        .case_insensitive(options.case_insensitive)
        .build()
        .map_err(|e| Error::InvalidQuery(format!("cannot search for {:?}: {}", keyword, e)))
}

/// Lazy iterator over search matches in page order.
pub struct Matches<'a> {
    regex: Regex,
    records: Box<dyn Iterator<Item = &'a PageRecord> + 'a>,
    /// Page being scanned and the byte position to resume from
    current: Option<(&'a PageRecord, usize)>,
    context_chars: usize,
    remaining: Option<usize>,
}

impl<'a> Iterator for Matches<'a> {
    type Item = SearchMatch;

    fn next(&mut self) -> Option<SearchMatch> {
        if self.remaining == Some(0) {
            return None;
        }

        loop {
            if let Some((record, pos)) = self.current {
                let text = record.text();
                if let Some(m) = self.regex.find_at(text, pos) {
                    self.current = Some((record, m.end()));
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining -= 1;
                    }
                    return Some(SearchMatch {
                        page_number: record.page_number(),
                        char_offset: text[..m.start()].chars().count(),
                        matched: m.as_str().to_string(),
                        snippet: snippet(text, m.start(), m.end(), self.context_chars),
                    });
                }
            }
            let record = self.records.next()?;
            self.current = Some((record, 0));
        }
    }
}

/// Up to `context` characters either side of `text[start..end]`, on one line.
fn snippet(text: &str, start: usize, end: usize, context: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(context)
        .last()
        .map_or(start, |(i, _)| i);
    let to = text[end..]
        .char_indices()
        .nth(context)
        .map_or(text.len(), |(i, _)| end + i);

    text[from..to]
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> Vec<PageRecord> {
        vec![
            PageRecord::new(1, "A heap is a tree.\nThe heap property holds."),
            PageRecord::new(2, "Nothing here."),
            PageRecord::new(3, "Heapsort uses a HEAP."),
        ]
    }

    #[test]
    fn test_case_sensitive_by_default() {
        let records = pages();
        let hits: Vec<_> = search(&records, "heap", &SearchOptions::new()).unwrap().collect();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.page_number == 1));
        assert_eq!(hits[0].char_offset, 2);
        assert_eq!(hits[1].char_offset, 22);
    }

    #[test]
    fn test_case_insensitive() {
        let records = pages();
        let hits: Vec<_> = search(&records, "heap", &SearchOptions::case_insensitive())
            .unwrap()
            .collect();
        assert_eq!(hits.len(), 4);
        assert_eq!(hits[2].page_number, 3);
        assert_eq!(hits[2].matched, "Heap");
        assert_eq!(hits[3].matched, "HEAP");
    }

    #[test]
    fn test_whole_word() {
        let records = pages();
        let options = SearchOptions::case_insensitive().with_whole_word(true);
        let hits: Vec<_> = search(&records, "heap", &options).unwrap().collect();
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|h| h.matched.eq_ignore_ascii_case("heap")));
        assert!(!hits.iter().any(|h| h.page_number == 3 && h.char_offset == 0));
    }

    #[test]
    fn test_snippet_flattens_newlines() {
        let records = pages();
        let options = SearchOptions::new().with_context_chars(10);
        let hit = search(&records, "The", &options).unwrap().next().unwrap();
        assert_eq!(hit.snippet, "s a tree. The heap prop");
        assert!(!hit.snippet.contains('\n'));
    }

    #[test]
    fn test_snippet_is_char_safe() {
        let records = vec![PageRecord::new(1, "ééééé clé ééééé")];
        let options = SearchOptions::new().with_context_chars(3);
        let hit = search(&records, "clé", &options).unwrap().next().unwrap();
        assert_eq!(hit.snippet, "éé clé éé");
        assert_eq!(hit.char_offset, 6);
    }

    #[test]
    fn test_keyword_is_literal() {
        let records = vec![PageRecord::new(1, "a.b axb (x)")];
        let hits: Vec<_> = search(&records, "a.b", &SearchOptions::new()).unwrap().collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(search(&records, "(x)", &SearchOptions::new()).unwrap().count(), 1);
    }

    #[test]
    fn test_max_results() {
        let records = pages();
        let options = SearchOptions::case_insensitive().with_max_results(3);
        assert_eq!(search(&records, "heap", &options).unwrap().count(), 3);
    }

    #[test]
    fn test_empty_keyword_rejected() {
        let records = pages();
        let err = search(&records, "  ", &SearchOptions::new()).err().unwrap();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[test]
    fn test_each_search_is_a_fresh_scan() {
        let records = pages();
        let options = SearchOptions::new();
        let first: Vec<_> = search(&records, "heap", &options).unwrap().collect();
        let second: Vec<_> = search(&records, "heap", &options).unwrap().collect();
        assert_eq!(first, second);
    }
}
