
//! # PDF Page Store
//!
//! Turns a PDF textbook into a page-indexed JSON-lines store, repairs the
//! word spacing that PDF text extraction loses, and answers queries over the
//! result.
//!
//! ## Core Features
//!
//! - **Conversion**: PDF (or form-feed text) → one JSON record per page
//! - **Spacing Restoration**: ordered, pure pattern rules over character
//!   windows; idempotent, never splits identifiers like `int32_t` or `utf8`
//! - **Record Store**: lenient or strict loading with per-line diagnostics
//! - **Queries**: page lookup, ranges, previews, extraction to a file,
//!   statistics and lazy keyword search
//! - **Navigation**: chapter and section detection with page ranges
//! - **Exercises**: practice questions paired with their solutions by
//!   chapter and number
//! - **Conversion log**: which documents were converted, and how large they were
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_pagestore::{QueryEngine, RecordStore, StoreConfig};
//!
//! let store = RecordStore::open("pages.jsonl", &StoreConfig::new())?;
//! let engine = QueryEngine::new(&store);
//!
//! let page = engine.get_page(42)?;
//! println!("{}", page.text());
//!
//! let stats = engine.stats();
//! println!("{} pages, {} characters", stats.total_pages, stats.total_characters);
//! # Ok::<(), pdf_pagestore::Error>(())
//! ```
//!
//! Restoring spacing on its own:
//!
//! ```
//! use pdf_pagestore::SpacingRestorer;
//!
//! let restorer = SpacingRestorer::new();
//! let fixed = restorer.restore("See problem42 for int32_t values.");
//! assert_eq!(fixed.text, "See problem 42 for int32_t values.");
//! assert_eq!(fixed.issues_found, 1);
//! ```
//!
//! ## Features
//!
//! - `pdf` (default): PDF extraction through `pdf-extract`
//! - `parallel`: restore pages on the rayon thread pool during conversion

pub mod config;
pub mod error;
pub mod extractors;
pub mod pipeline;
pub mod qa;
pub mod query;
pub mod search;
pub mod store;
pub mod structure;
pub mod text;

pub use config::{SpacingConfig, StoreConfig};
pub use error::{Error, Result};
pub use extractors::{InMemoryPages, PageSource, TextPages};
#[cfg(feature = "pdf")]
pub use extractors::PdfPages;
pub use pipeline::{ConversionLog, ConversionLogEntry, ConversionPipeline, ConversionReport};
pub use qa::{AnswerRecord, QaExtraction, QuestionRecord};
pub use query::{Preview, QueryEngine, StoreStats};
pub use search::{SearchMatch, SearchOptions};
pub use store::{PageRecord, RecordReader, RecordStore, RecordWriter};
pub use structure::{Chapter, ChapterIndex, SectionHeading};
pub use text::{Restoration, RuleCounts, RuleKind, SpacingRestorer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
