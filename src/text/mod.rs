//! Word-spacing restoration for extracted page text.
//!
//! - [`rules`]: the ordered pattern rule set
//! - [`preserved`]: tokens and links that are never split
//! - [`restorer`]: the driver that applies the rules and counts insertions

pub mod preserved;
pub mod restorer;
pub mod rules;

pub use preserved::PreservedTokens;
pub use restorer::{Restoration, RuleCounts, SpacingRestorer};
pub use rules::{Rule, RuleKind, Window, RULES};
