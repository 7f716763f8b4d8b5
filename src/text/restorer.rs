//! Spacing restoration driver.
//!
//! Applies the ordered rule set to one page of text and counts every space it
//! inserts. Pages are independent: the restorer holds only configuration, so the
//! same input always produces the same output no matter what was restored
//! before it.
//!
//! # Passes and rounds
//!
//! Each rule is one left-to-right pass. The boundaries where the rule fires are
//! collected against the text as it stands when the pass starts, then a single
//! space is inserted at each of them. A boundary is only considered when both
//! neighbours are non-whitespace and it is not protected by the
//! [`PreservedTokens`] mask, so no pass can ever produce a double space.
//!
//! A round runs every enabled rule once. Rounds repeat until one inserts
//! nothing. Every productive round removes at least one adjacent
//! non-whitespace pair, so the loop terminates, and the result is a fixpoint of
//! a full round: restoring it again changes nothing.

use crate::config::SpacingConfig;
use crate::text::preserved::PreservedTokens;
use crate::text::rules::{Rule, RuleKind, Window, RULES};
use serde::Serialize;

/// Number of spaces inserted, per rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RuleCounts {
    counts: [usize; RuleKind::COUNT],
}

impl RuleCounts {
    /// Insertions made by one rule.
    pub fn get(&self, kind: RuleKind) -> usize {
        self.counts[kind.index()]
    }

    /// Insertions made by all rules.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Whether no rule fired.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Record `n` insertions for a rule.
    pub fn add(&mut self, kind: RuleKind, n: usize) {
        self.counts[kind.index()] += n;
    }

    /// Fold another set of counts into this one.
    pub fn merge(&mut self, other: &RuleCounts) {
        for kind in RuleKind::ALL {
            self.add(kind, other.get(kind));
        }
    }

    /// Per-rule counts in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleKind, usize)> + '_ {
        RuleKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

/// Result of restoring one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restoration {
    /// Corrected text
    pub text: String,
    /// Number of spaces inserted
    pub issues_found: usize,
    /// Insertions broken down by rule
    pub counts: RuleCounts,
}

impl Restoration {
    /// Text passed through with no insertions.
    pub fn unchanged(text: String) -> Self {
        Self {
            text,
            issues_found: 0,
            counts: RuleCounts::default(),
        }
    }
}

/// Restores word spacing in extracted page text.
#[derive(Debug, Clone)]
pub struct SpacingRestorer {
    config: SpacingConfig,
    preserved: PreservedTokens,
    rules: Vec<Rule>,
}

impl Default for SpacingRestorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpacingRestorer {
    /// Create a restorer with every rule enabled.
    pub fn new() -> Self {
        Self::with_config(SpacingConfig::default())
    }

    /// Create a restorer from a configuration.
    pub fn with_config(config: SpacingConfig) -> Self {
        let rules = RULES
            .iter()
            .filter(|rule| config.is_enabled(rule.kind))
            .copied()
            .collect();
        Self {
            preserved: PreservedTokens::from_config(&config),
            config,
            rules,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SpacingConfig {
        &self.config
    }

    /// Restore spacing in one page of text.
    ///
    /// Never fails: text the rules cannot classify passes through unchanged.
    pub fn restore(&self, text: &str) -> Restoration {
        let mut chars: Vec<char> = text.chars().collect();
        let mut counts = RuleCounts::default();

        loop {
            let mut inserted = 0;
            for rule in &self.rules {
                let n = self.apply(rule, &mut chars);
                counts.add(rule.kind, n);
                inserted += n;
            }
            if inserted == 0 {
                break;
            }
        }

        let issues_found = counts.total();
        let text = if issues_found == 0 {
            text.to_string()
        } else {
            chars.into_iter().collect()
        };

        Restoration {
            text,
            issues_found,
            counts,
        }
    }

    /// Count what [`restore`](Self::restore) would change, discarding the text.
    pub fn scan(&self, text: &str) -> RuleCounts {
        self.restore(text).counts
    }

    /// One left-to-right pass of a single rule. Returns the number of spaces inserted.
    fn apply(&self, rule: &Rule, chars: &mut Vec<char>) -> usize {
        let text: &[char] = chars;
        if text.len() < 2 {
            return 0;
        }

        let mask = self
            .preserved
            .protection_mask(text, self.config.protect_links);

        let hits: Vec<usize> = (1..text.len())
            .filter(|&at| !mask[at])
            .filter(|&at| !text[at - 1].is_whitespace() && !text[at].is_whitespace())
            .filter(|&at| {
                Window::new(text, at).is_some_and(|window| rule.matches(&window, &self.config))
            })
            .collect();

        if hits.is_empty() {
            return 0;
        }

        let mut out = Vec::with_capacity(text.len() + hits.len());
        let mut last = 0;
        for &at in &hits {
            out.extend_from_slice(&text[last..at]);
            out.push(' ');
            last = at;
        }
        out.extend_from_slice(&text[last..]);
        *chars = out;

        hits.len()
    }
}
