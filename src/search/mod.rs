//! Keyword search over a record store.
//!
//! Searching is a single lazy pass over the pages in ascending order. Every
//! call to [`search`] builds a fresh [`Matches`] iterator; nothing is cached
//! between calls.
//!
//! ## Example
//!
//! ```no_run
//! use pdf_pagestore::{QueryEngine, RecordStore, StoreConfig};
//! use pdf_pagestore::search::SearchOptions;
//!
//! let store = RecordStore::open("pages.jsonl", &StoreConfig::new())?;
//! let engine = QueryEngine::new(&store);
//!
//! let options = SearchOptions::case_insensitive().with_context_chars(40);
//! for hit in engine.search("binary heap", &options)?.take(10) {
//!     println!("page {}: ...{}...", hit.page_number, hit.snippet);
//! }
//! # Ok::<(), pdf_pagestore::Error>(())
//! ```

mod text_search;

pub use text_search::{search, Matches, SearchMatch, SearchOptions};
