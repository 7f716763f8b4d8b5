//! Numbered question and answer blocks.

use crate::store::RecordStore;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Start of a numbered block: "12. "
    static ref RE_QUESTION_SPLIT: Regex = Regex::new(r"(?m)^[ \t]*\d+\.\s").unwrap();
    static ref RE_QUESTION_START: Regex = Regex::new(r"(?s)^\s*(\d+)\.\s*(.*)").unwrap();

    /// Start of an answer block: "12. The correct answer is"
    static ref RE_ANSWER_SPLIT: Regex =
        Regex::new(r"(?m)^[ \t]*\d+\.\s+The correct answer is").unwrap();
    /// "12. The correct answer is (B). Because ..."
    static ref RE_ANSWER_START: Regex =
        Regex::new(r"(?s)^\s*(\d+)\.\s+The correct answer is\s*\(([A-Z])\)\.\s*(.*)").unwrap();
}

/// Which exercise section a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseSection {
    /// "Practice Exercises": numbered questions
    Practice,
    /// "Exercise Solutions": numbered "The correct answer is (X)." blocks
    Solutions,
}

/// Classify a page by the section marker it mentions.
///
/// A page mentioning both markers counts as practice.
pub fn classify_page(text: &str) -> Option<ExerciseSection> {
    let lower = text.to_lowercase();
    if lower.contains("practice exercises") {
        Some(ExerciseSection::Practice)
    } else if lower.contains("solutions") {
        Some(ExerciseSection::Solutions)
    } else {
        None
    }
}

/// A numbered question, possibly continued across pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBlock {
    /// Question number as printed
    pub number: u32,
    /// Full block text, number included
    pub text: String,
    /// Pages the block spans, in order
    pub pages: Vec<u32>,
}

/// A numbered answer, possibly continued across pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerBlock {
    /// Number of the question answered
    pub number: u32,
    /// Letter of the correct choice
    pub choice: char,
    /// Text after "The correct answer is (X)."
    pub explanation: String,
    /// Full block text, number included
    pub text: String,
    /// Pages the block spans, in order
    pub pages: Vec<u32>,
}

/// Split page text at every line matching `start`.
///
/// Returns the text before the first block (a continuation of the previous
/// page's last block) and the blocks themselves, all trimmed, empty parts
/// dropped.
pub(crate) fn split_blocks<'t>(text: &'t str, start: &Regex) -> (Option<&'t str>, Vec<&'t str>) {
    let starts: Vec<usize> = start.find_iter(text).map(|m| m.start()).collect();
    let first = starts.first().copied().unwrap_or(text.len());

    let lead = Some(text[..first].trim()).filter(|lead| !lead.is_empty());
    let blocks = starts
        .iter()
        .zip(starts.iter().skip(1).chain(std::iter::once(&text.len())))
        .map(|(&from, &to)| text[from..to].trim())
        .filter(|block| !block.is_empty())
        .collect();

    (lead, blocks)
}

/// Drop section marker lines ("Practice Exercises", "Solutions") from a
/// continuation so running headers do not end up in the previous block.
fn continuation(lead: &str) -> String {
    lead.lines()
        .filter(|line| classify_page(line).is_none())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn append(text: &mut String, pages: &mut Vec<u32>, lead: &str, page: u32) {
    let extra = continuation(lead);
    if extra.is_empty() {
        return;
    }
    text.push('\n');
    text.push_str(&extra);
    if pages.last() != Some(&page) {
        pages.push(page);
    }
}

/// Numbered questions on practice pages, in page order.
///
/// Text at the top of a page before its first numbered block continues the
/// last question seen.
pub fn extract_questions(store: &RecordStore) -> Vec<QuestionBlock> {
    let mut questions: Vec<QuestionBlock> = Vec::new();

    for record in store.iter() {
        if classify_page(record.text()) != Some(ExerciseSection::Practice) {
            continue;
        }
        let page = record.page_number();
        let (lead, blocks) = split_blocks(record.text(), &RE_QUESTION_SPLIT);

        if let (Some(lead), Some(last)) = (lead, questions.last_mut()) {
            append(&mut last.text, &mut last.pages, lead, page);
        }

        for block in blocks {
            let Some(caps) = RE_QUESTION_START.captures(block) else {
                continue;
            };
            let Ok(number) = caps[1].parse() else {
                continue;
            };
            questions.push(QuestionBlock {
                number,
                text: block.to_string(),
                pages: vec![page],
            });
        }
    }

    log::debug!("Found {} question blocks", questions.len());
    questions
}

/// "The correct answer is (X)." blocks on solution pages, in page order.
pub fn extract_answers(store: &RecordStore) -> Vec<AnswerBlock> {
    let mut answers: Vec<AnswerBlock> = Vec::new();

    for record in store.iter() {
        if classify_page(record.text()) != Some(ExerciseSection::Solutions) {
            continue;
        }
        let page = record.page_number();
        let (lead, blocks) = split_blocks(record.text(), &RE_ANSWER_SPLIT);

        if let (Some(lead), Some(last)) = (lead, answers.last_mut()) {
            append(&mut last.text, &mut last.pages, lead, page);
        }

        for block in blocks {
            let Some(caps) = RE_ANSWER_START.captures(block) else {
                continue;
            };
            let Ok(number) = caps[1].parse() else {
                continue;
            };
            let Some(choice) = caps[2].chars().next() else {
                continue;
            };
            answers.push(AnswerBlock {
                number,
                choice,
                explanation: caps[3].trim().to_string(),
                text: block.to_string(),
                pages: vec![page],
            });
        }
    }

    log::debug!("Found {} answer blocks", answers.len());
    answers
}
