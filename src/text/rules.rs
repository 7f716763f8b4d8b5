//! Pattern rules for spaces lost during PDF text extraction.
//!
//! Text extractors glue neighbouring tokens together whenever the glyph gap on
//! the page is too narrow to be read as a space. The damage is local and leaves
//! recognisable seams:
//!
//! - `functionName`: a lowercase letter running into a capitalised word
//! - `problem42` / `3times`: letters and digits running into each other
//! - `call(x)then`: brackets glued to the words around them
//! - `Chapter 1.Introduction` / `end).The`: sentence punctuation glued to the
//!   next sentence
//!
//! Each [`Rule`] pairs a [`RuleKind`] with a pure predicate over a [`Window`],
//! the boundary between two adjacent characters. A rule that matches always
//! means "insert one space at this boundary". Rules never look across pages
//! and never depend on what other rules decided.

use crate::config::SpacingConfig;
use std::fmt;

/// Kind of spacing issue a rule detects, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
    /// `functionName` → `function Name`
    CamelCase,
    /// `problem42` → `problem 42`
    LetterDigit,
    /// `3times` → `3 times`
    DigitLetter,
    /// `call(x)` → `call (x)`
    OpenBracket,
    /// `(x)then` → `(x) then`
    CloseBracket,
    /// `1.Introduction` → `1. Introduction`
    PeriodLetter,
    /// `end).The` → `end). The`
    PunctuationCapital,
}

impl RuleKind {
    /// Number of rule kinds.
    pub const COUNT: usize = 7;

    /// All rule kinds in priority order.
    pub const ALL: [RuleKind; RuleKind::COUNT] = [
        RuleKind::CamelCase,
        RuleKind::LetterDigit,
        RuleKind::DigitLetter,
        RuleKind::OpenBracket,
        RuleKind::CloseBracket,
        RuleKind::PeriodLetter,
        RuleKind::PunctuationCapital,
    ];

    /// Position of this kind in [`RuleKind::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short kebab-case name used in reports and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::CamelCase => "camel-case",
            RuleKind::LetterDigit => "letter-digit",
            RuleKind::DigitLetter => "digit-letter",
            RuleKind::OpenBracket => "open-bracket",
            RuleKind::CloseBracket => "close-bracket",
            RuleKind::PeriodLetter => "period-letter",
            RuleKind::PunctuationCapital => "punctuation-capital",
        }
    }

    /// Look a kind up by its [`name`](RuleKind::name).
    pub fn from_name(name: &str) -> Option<RuleKind> {
        RuleKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The boundary between `chars[at - 1]` and `chars[at]`, with read access to
/// the surrounding characters.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    chars: &'a [char],
    at: usize,
}

impl<'a> Window<'a> {
    /// Create a window. Returns `None` unless there is a character on both sides.
    pub fn new(chars: &'a [char], at: usize) -> Option<Self> {
        if at == 0 || at >= chars.len() {
            None
        } else {
            Some(Self { chars, at })
        }
    }

    /// Character just before the boundary.
    pub fn prev(&self) -> char {
        self.chars[self.at - 1]
    }

    /// Character just after the boundary.
    pub fn next(&self) -> char {
        self.chars[self.at]
    }

    /// Character at `offset` relative to the boundary: `-1` is [`prev`](Self::prev),
    /// `0` is [`next`](Self::next).
    pub fn peek(&self, offset: isize) -> Option<char> {
        let idx = self.at as isize + offset;
        if idx < 0 {
            None
        } else {
            self.chars.get(idx as usize).copied()
        }
    }

    /// Length of the run of characters satisfying `pred` that ends `skip`
    /// characters before the boundary.
    pub fn run_back(&self, skip: usize, pred: impl Fn(char) -> bool) -> usize {
        let end = self.at.saturating_sub(skip);
        self.chars[..end]
            .iter()
            .rev()
            .take_while(|&&c| pred(c))
            .count()
    }

    /// Length of the run satisfying `pred` that ends at [`prev`](Self::prev).
    pub fn run_before(&self, pred: impl Fn(char) -> bool) -> usize {
        self.run_back(0, pred)
    }

    /// Length of the run satisfying `pred` that starts at [`next`](Self::next).
    pub fn run_after(&self, pred: impl Fn(char) -> bool) -> usize {
        self.chars[self.at..]
            .iter()
            .take_while(|&&c| pred(c))
            .count()
    }

    /// The `len` characters ending `skip` characters before the boundary.
    pub fn slice_back(&self, skip: usize, len: usize) -> &'a [char] {
        let end = self.at.saturating_sub(skip);
        &self.chars[end.saturating_sub(len)..end]
    }

    /// The first `len` characters after the boundary.
    pub fn slice_after(&self, len: usize) -> &'a [char] {
        let end = (self.at + len).min(self.chars.len());
        &self.chars[self.at..end]
    }
}

/// Predicate deciding whether a space belongs at a boundary.
pub type Matcher = fn(&Window<'_>, &SpacingConfig) -> bool;

/// One spacing rule: a kind and its matcher.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// What the rule detects
    pub kind: RuleKind,
    matcher: Matcher,
}

impl Rule {
    /// Whether a space should be inserted at this boundary.
    pub fn matches(&self, window: &Window<'_>, config: &SpacingConfig) -> bool {
        (self.matcher)(window, config)
    }
}

/// The full rule set in priority order.
pub const RULES: [Rule; RuleKind::COUNT] = [
    Rule {
        kind: RuleKind::CamelCase,
        matcher: camel_case,
    },
    Rule {
        kind: RuleKind::LetterDigit,
        matcher: letter_digit,
    },
    Rule {
        kind: RuleKind::DigitLetter,
        matcher: digit_letter,
    },
    Rule {
        kind: RuleKind::OpenBracket,
        matcher: open_bracket,
    },
    Rule {
        kind: RuleKind::CloseBracket,
        matcher: close_bracket,
    },
    Rule {
        kind: RuleKind::PeriodLetter,
        matcher: period_letter,
    },
    Rule {
        kind: RuleKind::PunctuationCapital,
        matcher: punctuation_capital,
    },
];

/// The rule for one kind.
pub fn rule(kind: RuleKind) -> Rule {
    RULES[kind.index()]
}

/// Letters, digits and underscore: the characters of an identifier run.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Units and ordinal suffixes that legitimately follow a number.
const NUMBER_SUFFIXES: &[&str] = &[
    "st", "nd", "rd", "th", "px", "pt", "em", "ms", "ns", "us", "kb", "mb", "gb", "tb", "hz",
    "khz", "mhz", "ghz", "bit", "bits", "dpi", "fps", "bpp", "kbps", "mbps", "gbps", "am", "pm",
];

/// Words whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "st", "vs", "fig", "figs", "eq", "eqs", "no", "vol", "pp",
    "ch", "sec", "approx", "ca", "cf",
];

/// Punctuation that closes a clause or sentence.
const CLOSING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']'];

fn camel_case(w: &Window<'_>, _config: &SpacingConfig) -> bool {
    if !w.prev().is_lowercase() || !w.next().is_uppercase() {
        return false;
    }
    // "iPhone", "McDonald": one lowercase letter is a prefix, not a word
    if w.run_before(char::is_lowercase) < 2 {
        return false;
    }
    // acronym run: "parseHTML", "myID"
    !w.peek(1).is_some_and(char::is_uppercase)
}

fn letter_digit(w: &Window<'_>, config: &SpacingConfig) -> bool {
    if !w.prev().is_alphabetic() || !w.next().is_ascii_digit() {
        return false;
    }
    let len = w.run_before(char::is_alphabetic);
    if len < config.min_word_len {
        return false;
    }
    // all-caps prefixes are codes: "EECS281", "SHA256"
    w.slice_back(0, len).iter().any(|c| c.is_lowercase())
}

fn digit_letter(w: &Window<'_>, config: &SpacingConfig) -> bool {
    if !w.prev().is_ascii_digit() {
        return false;
    }
    let next = w.next();
    if next.is_lowercase() {
        let len = w.run_after(char::is_lowercase);
        if len < config.min_fragment_len {
            return false;
        }
        let fragment: String = w.slice_after(len).iter().collect();
        return is_plausible_fragment(&fragment);
    }
    if next.is_uppercase() {
        // a capitalised word ("3Binary"), not "3D" or "2Gb"
        let word = w.slice_after(w.run_after(char::is_alphabetic));
        return word.len() >= 3 && word[1..].iter().all(|c| c.is_lowercase());
    }
    false
}

fn is_plausible_fragment(fragment: &str) -> bool {
    fragment.chars().any(|c| "aeiouy".contains(c)) && !NUMBER_SUFFIXES.contains(&fragment)
}

fn open_bracket(w: &Window<'_>, _config: &SpacingConfig) -> bool {
    is_word_char(w.prev()) && matches!(w.next(), '(' | '[')
}

fn close_bracket(w: &Window<'_>, _config: &SpacingConfig) -> bool {
    matches!(w.prev(), ')' | ']') && w.next().is_alphanumeric()
}

fn period_letter(w: &Window<'_>, _config: &SpacingConfig) -> bool {
    if w.prev() != '.' || !w.next().is_alphabetic() {
        return false;
    }
    let Some(before) = w.peek(-2) else {
        return false;
    };

    if before.is_ascii_digit() {
        // "Chapter 1.Introduction", but not "1.x"
        return w.run_after(char::is_alphabetic) >= 2;
    }

    if before.is_lowercase() {
        let len = w.run_back(1, char::is_alphabetic);
        if len < 2 {
            return false;
        }
        // dotted tokens: "e.g.", "i.e.", "os.Path"
        if w.peek(-(len as isize) - 2) == Some('.') {
            return false;
        }
        let word: String = w.slice_back(1, len).iter().collect::<String>().to_lowercase();
        if ABBREVIATIONS.contains(&word.as_str()) {
            return false;
        }
        return w.next().is_uppercase() && w.peek(1).is_some_and(char::is_lowercase);
    }

    false
}

fn punctuation_capital(w: &Window<'_>, _config: &SpacingConfig) -> bool {
    let prev = w.prev();
    if !CLOSING_PUNCTUATION.contains(&prev) || !w.next().is_uppercase() {
        return false;
    }
    let run = w.run_before(|c| CLOSING_PUNCTUATION.contains(&c));
    let punctuation = w.slice_back(0, run);
    // scope operator: "std::String"
    if punctuation.windows(2).any(|p| p[0] == ':' && p[1] == ':') {
        return false;
    }
    // a lone period is the period rule's business ("U.S.A")
    !(run == 1 && prev == '.')
}
