//! Tokens that look like spacing damage but must never be split.
//!
//! Two kinds of protection are applied before any rule runs:
//!
//! - **Identifier runs** (maximal runs of letters, digits and `_`) that match the
//!   preserved token set: C type names such as `int32_t`, anything else with an
//!   underscore, hexadecimal literals, and a list of digit-bearing names like
//!   `utf8` or `sha256`.
//! - **Links**: whitespace-delimited tokens that look like URLs or e-mail
//!   addresses (`https://example.com/a1b2`, `user@example.com`).
//!
//! Protection is expressed as a boundary mask: `mask[i]` is true when no space
//! may be inserted between `chars[i - 1]` and `chars[i]`.

use crate::config::SpacingConfig;
use crate::text::rules::is_word_char;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    /// Hexadecimal literal: 0x1F, 0XdeadBEEF
    static ref RE_HEX: Regex = Regex::new(r"^0[xX][0-9A-Fa-f]+$").unwrap();

    /// URL with a scheme, or a bare www. host
    static ref RE_URL: Regex = Regex::new(r"(?i)^(?:[a-z][a-z0-9+.\-]*://|www\.)\S+$").unwrap();

    /// E-mail address, optionally wrapped in punctuation
    static ref RE_EMAIL: Regex =
        Regex::new(r"(?i)^\W*[a-z0-9._%+\-]+@[a-z0-9\-]+(?:\.[a-z0-9\-]+)+\W*$").unwrap();
}

/// Digit-bearing names that are words in their own right (matched case-insensitively).
const BUILTIN_TOKENS: &[&str] = &[
    "utf8", "utf16", "utf32", "sha1", "sha224", "sha256", "sha384", "sha512", "md5", "base32",
    "base64", "ipv4", "ipv6", "x86", "x64", "arm64", "amd64", "i386", "win32", "win64", "mp3",
    "mp4", "h264", "h265", "log2", "log10", "int8", "int16", "int32", "int64", "uint8", "uint16",
    "uint32", "uint64", "float32", "float64", "char16", "char32",
];

/// The preserved token set.
#[derive(Debug, Clone, Default)]
pub struct PreservedTokens {
    /// Extra tokens, lowercased
    extra: HashSet<String>,
}

impl PreservedTokens {
    /// Create the built-in set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in set plus the extra tokens from a configuration.
    pub fn from_config(config: &SpacingConfig) -> Self {
        Self::new().with_extra(config.extra_preserved.iter().map(String::as_str))
    }

    /// Add tokens to the set.
    pub fn with_extra<'a>(mut self, tokens: impl IntoIterator<Item = &'a str>) -> Self {
        self.extra
            .extend(tokens.into_iter().map(|token| token.trim().to_lowercase()));
        self
    }

    /// Whether an identifier run must be kept whole.
    pub fn is_preserved(&self, token: &str) -> bool {
        if token.contains('_') || RE_HEX.is_match(token) {
            return true;
        }
        let lower = token.to_lowercase();
        BUILTIN_TOKENS.contains(&lower.as_str()) || self.extra.contains(&lower)
    }

    /// Whether a whitespace-delimited token is a URL or e-mail address.
    pub fn is_link(token: &str) -> bool {
        RE_URL.is_match(token) || RE_EMAIL.is_match(token)
    }

    /// Boundary protection mask for `chars` (same length as `chars`).
    pub fn protection_mask(&self, chars: &[char], protect_links: bool) -> Vec<bool> {
        let mut mask = vec![false; chars.len()];

        for (start, end) in runs(chars, is_word_char) {
            let token: String = chars[start..end].iter().collect();
            if self.is_preserved(&token) {
                mask[start + 1..end].iter_mut().for_each(|m| *m = true);
            }
        }

        if protect_links {
            for (start, end) in runs(chars, |c| !c.is_whitespace()) {
                let token: String = chars[start..end].iter().collect();
                if Self::is_link(&token) {
                    mask[start + 1..end].iter_mut().for_each(|m| *m = true);
                }
            }
        }

        mask
    }
}

/// Maximal runs of characters satisfying `pred`, as `(start, end)` pairs.
fn runs(chars: &[char], pred: impl Fn(char) -> bool) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if !pred(chars[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && pred(chars[i]) {
            i += 1;
        }
        spans.push((start, i));
    }
    spans
}
