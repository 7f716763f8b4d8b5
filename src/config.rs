//! Configuration for spacing restoration and store loading.
//!
//! Search options live with the search code in [`crate::search::SearchOptions`].

use crate::text::RuleKind;

/// Spacing restoration configuration.
#[derive(Debug, Clone)]
pub struct SpacingConfig {
    /// Which rules run, indexed by [`RuleKind::index`].
    enabled: [bool; RuleKind::COUNT],

    /// Minimum letters before a digit for the letter→digit rule.
    pub min_word_len: usize,

    /// Minimum lowercase letters after a digit for the digit→letter rule.
    pub min_fragment_len: usize,

    /// Additional tokens that must never be split (matched case-insensitively).
    pub extra_preserved: Vec<String>,

    /// Leave URLs and e-mail addresses untouched.
    pub protect_links: bool,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SpacingConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            enabled: [true; RuleKind::COUNT],
            min_word_len: 3,
            min_fragment_len: 3,
            extra_preserved: Vec::new(),
            protect_links: true,
        }
    }

    /// Enable or disable one rule.
    pub fn with_rule(mut self, kind: RuleKind, enable: bool) -> Self {
        self.enabled[kind.index()] = enable;
        self
    }

    /// Set the minimum word length for the letter→digit rule.
    pub fn with_min_word_len(mut self, len: usize) -> Self {
        self.min_word_len = len.max(1);
        self
    }

    /// Set the minimum fragment length for the digit→letter rule.
    pub fn with_min_fragment_len(mut self, len: usize) -> Self {
        self.min_fragment_len = len.max(1);
        self
    }

    /// Add a token that must never be split.
    pub fn with_preserved_token(mut self, token: impl Into<String>) -> Self {
        self.extra_preserved.push(token.into());
        self
    }

    /// Enable URL and e-mail protection.
    pub fn with_protect_links(mut self, enable: bool) -> Self {
        self.protect_links = enable;
        self
    }

    /// Whether a rule runs.
    pub fn is_enabled(&self, kind: RuleKind) -> bool {
        self.enabled[kind.index()]
    }
}

/// Record store loading configuration.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Abort the whole load on the first malformed line instead of skipping it.
    pub strict: bool,
}

impl StoreConfig {
    /// Create new configuration with defaults (lenient).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable strict loading.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
