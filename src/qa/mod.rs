//! Question and answer extraction.
//!
//! Textbook chapters often end with a "Practice Exercises" section of
//! numbered questions, answered later in an "Exercise Solutions" section as
//! `12. The correct answer is (B). ...` blocks. This module pulls both out of
//! a page store and pairs them.
//!
//! Question numbers restart in every chapter, so a pair is keyed by
//! [`ProblemKey`]: the chapter the block's first page falls in (from the
//! [`ChapterIndex`]) plus the printed number. Each pair gets a `qa_id` that is
//! a UUID v5 of the book id and the key, so reruns over the same store assign
//! the same ids.

mod blocks;

pub use blocks::{
    classify_page, extract_answers, extract_questions, AnswerBlock, ExerciseSection,
    QuestionBlock,
};

use crate::error::{Error, Result};
use crate::store::{write_atomic, RecordStore};
use crate::structure::ChapterIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Chapter plus problem number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProblemKey {
    /// Chapter containing the block, `None` before the first detected chapter
    pub chapter: Option<u32>,
    /// Number printed before the block
    pub number: u32,
}

impl ProblemKey {
    /// Key for a block starting on `page`.
    pub fn for_page(chapters: &ChapterIndex, page: u32, number: u32) -> Self {
        Self {
            chapter: chapters.chapter_for_page(page).map(|c| c.number),
            number,
        }
    }

    /// Deterministic pair id for this key within `book_id`.
    pub fn qa_id(&self, book_id: &str) -> String {
        let chapter = match self.chapter {
            Some(n) => format!("Chapter {}", n),
            None => "Chapter ?".to_string(),
        };
        let name = format!("{}|{}|{}", book_id, chapter, self.number);
        Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string()
    }
}

impl fmt::Display for ProblemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chapter {
            Some(n) => write!(f, "Chapter {}#{}", n, self.number),
            None => write!(f, "Chapter ?#{}", self.number),
        }
    }
}

/// An extracted question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Pair id shared with the matching answer
    pub qa_id: String,
    /// Book the question belongs to
    pub book_id: String,
    /// Display form of the [`ProblemKey`], e.g. "Chapter 3#12"
    pub problem_key: String,
    /// Chapter number, if the question is inside a detected chapter
    pub chapter: Option<u32>,
    /// Number printed before the question
    pub question_number: u32,
    /// Full question text
    pub question_text: String,
    /// Pages the question spans
    pub pages: Vec<u32>,
}

/// An extracted answer paired with a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Pair id shared with the matching question
    pub qa_id: String,
    /// Book the answer belongs to
    pub book_id: String,
    /// Display form of the [`ProblemKey`]
    pub problem_key: String,
    /// Chapter number, if the answer is inside a detected chapter
    pub chapter: Option<u32>,
    /// Number of the question answered
    pub answer_number: u32,
    /// Letter of the correct choice
    pub answer_choice: char,
    /// Explanation following the choice
    pub explanation: String,
    /// Full answer block text
    pub answer_text: String,
    /// Pages the answer spans
    pub pages: Vec<u32>,
}

/// Counts of distinct problem keys on each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QaSummary {
    pub questions: usize,
    pub answers: usize,
    pub matched: usize,
    pub unmatched_questions: usize,
    pub unmatched_answers: usize,
}

/// Questions and the answers that matched them.
#[derive(Debug, Clone, Default)]
pub struct QaExtraction {
    /// Every question, in page order
    pub questions: Vec<QuestionRecord>,
    /// Answers for questions that have one, in question order
    pub answers: Vec<AnswerRecord>,
    pub summary: QaSummary,
}

impl QaExtraction {
    /// Extract and pair every question and answer in `store`.
    pub fn from_store(store: &RecordStore, chapters: &ChapterIndex, book_id: &str) -> Self {
        let questions = extract_questions(store);
        let answers = extract_answers(store);
        match_questions_and_answers(&questions, &answers, chapters, book_id)
    }

    /// Write `<dir>/questions/<stem>_questions.jsonl` and
    /// `<dir>/answers/<stem>_answers.jsonl`, one record per line.
    pub fn save(&self, dir: impl AsRef<Path>, stem: &str) -> Result<(PathBuf, PathBuf)> {
        let dir = dir.as_ref();
        let questions_path = dir.join("questions").join(format!("{}_questions.jsonl", stem));
        let answers_path = dir.join("answers").join(format!("{}_answers.jsonl", stem));

        write_jsonl(&questions_path, &self.questions)?;
        write_jsonl(&answers_path, &self.answers)?;

        log::info!(
            "Saved {} questions to {} and {} answers to {}",
            self.questions.len(),
            questions_path.display(),
            self.answers.len(),
            answers_path.display()
        );
        Ok((questions_path, answers_path))
    }
}

fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_atomic(path, |out| {
        for record in records {
            serde_json::to_writer(&mut *out, record)?;
            out.write_all(b"\n")?;
        }
        Ok(())
    })
}

/// Pair question and answer blocks by [`ProblemKey`].
///
/// When several answers share a key the last one wins. Every question is
/// kept; only questions with an answer produce an [`AnswerRecord`].
pub fn match_questions_and_answers(
    questions: &[QuestionBlock],
    answers: &[AnswerBlock],
    chapters: &ChapterIndex,
    book_id: &str,
) -> QaExtraction {
    let key_of = |pages: &[u32], number| {
        ProblemKey::for_page(chapters, pages.first().copied().unwrap_or(0), number)
    };

    let by_key: BTreeMap<ProblemKey, &AnswerBlock> = answers
        .iter()
        .map(|a| (key_of(&a.pages[..], a.number), a))
        .collect();

    let mut out = QaExtraction::default();
    let mut question_keys = BTreeSet::new();

    for question in questions {
        let key = key_of(&question.pages[..], question.number);
        let qa_id = key.qa_id(book_id);
        question_keys.insert(key);

        out.questions.push(QuestionRecord {
            qa_id: qa_id.clone(),
            book_id: book_id.to_string(),
            problem_key: key.to_string(),
            chapter: key.chapter,
            question_number: question.number,
            question_text: question.text.clone(),
            pages: question.pages.clone(),
        });

        if let Some(answer) = by_key.get(&key) {
            out.answers.push(AnswerRecord {
                qa_id,
                book_id: book_id.to_string(),
                problem_key: key.to_string(),
                chapter: key.chapter,
                answer_number: answer.number,
                answer_choice: answer.choice,
                explanation: answer.explanation.clone(),
                answer_text: answer.text.clone(),
                pages: answer.pages.clone(),
            });
        }
    }

    let matched = question_keys.iter().filter(|k| by_key.contains_key(k)).count();
    out.summary = QaSummary {
        questions: question_keys.len(),
        answers: by_key.len(),
        matched,
        unmatched_questions: question_keys.len() - matched,
        unmatched_answers: by_key.len() - matched,
    };

    log::info!(
        "Questions: {}, answers: {}, matched: {}",
        out.summary.questions,
        out.summary.answers,
        out.summary.matched
    );
    out
}
