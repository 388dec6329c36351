mod table;
mod trie;

use std::fmt;
use std::str::FromStr;

pub use table::TableMatcher;
pub use trie::TrieMatcher;

use crate::error::MatchError;
use crate::types::{Rule, RuleId, RuleKind, NO_MATCH};

/// Longest-match classifier over exact and prefix rules.
///
/// `lookup` returns the id of the longest registered pattern that applies to
/// the input. An exact rule applies only when its pattern equals the whole
/// input; a prefix rule applies to its pattern and every input that starts
/// with it. When the input itself carries both, the exact id wins.
///
/// Patterns and inputs must be made of `A-Z`/`a-z` only. Anything else is a
/// contract violation and panics, as does an empty pattern on `add_*`.
/// Implementations hold no locks; share them behind external
/// synchronization such as [`crate::Classifier`].
pub trait StringMatcher {
    /// Register (or overwrite) the exact-match id for `pattern`.
    fn add_exact_match(&mut self, pattern: &str, id: RuleId);

    /// Register (or overwrite) the prefix-match id for `pattern`.
    fn add_prefix_match(&mut self, pattern: &str, id: RuleId);

    /// Classify `input`. Never mutates the matcher.
    fn lookup(&self, input: &str) -> Option<RuleId>;

    /// Clear the exact-match id for `pattern`. Returns whether one was set.
    fn delete_exact_match(&mut self, pattern: &str) -> bool;

    /// Clear the prefix-match id for `pattern`. Returns whether one was set.
    fn delete_prefix_match(&mut self, pattern: &str) -> bool;

    /// Release storage left behind by deletions.
    ///
    /// Returns true if the matcher holds nothing afterwards. Never changes
    /// the result of `lookup`.
    fn compact(&mut self) -> bool;

    /// Number of ids currently set (exact and prefix counted separately).
    fn rule_count(&self) -> usize;

    /// All registered rules, ordered by pattern with exact before prefix.
    fn rules(&self) -> Vec<Rule>;

    fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }

    fn add_rule(&mut self, rule: &Rule) {
        match rule.kind {
            RuleKind::Exact => self.add_exact_match(&rule.pattern, rule.id),
            RuleKind::Prefix => self.add_prefix_match(&rule.pattern, rule.id),
        }
    }

    fn delete_rule(&mut self, pattern: &str, kind: RuleKind) -> bool {
        match kind {
            RuleKind::Exact => self.delete_exact_match(pattern),
            RuleKind::Prefix => self.delete_prefix_match(pattern),
        }
    }

    /// Like [`lookup`](Self::lookup) but returns [`NO_MATCH`] instead of `None`.
    fn lookup_raw(&self, input: &str) -> i64 {
        self.lookup(input).map_or(NO_MATCH, RuleId::get)
    }
}

/// Which engine backs a [`Matcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineKind {
    /// 52-ary trie with explicit compaction
    #[default]
    Trie,
    /// Sorted array searched by binary search
    Table,
}

impl FromStr for EngineKind {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trie" => Ok(EngineKind::Trie),
            "table" => Ok(EngineKind::Table),
            _ => Err(MatchError::UnknownEngine(s.to_string())),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Trie => f.write_str("trie"),
            EngineKind::Table => f.write_str("table"),
        }
    }
}

/// Enum wrapper for both engines
#[derive(Debug, Clone)]
pub enum Matcher {
    Trie(TrieMatcher),
    Table(TableMatcher),
}

impl Matcher {
    /// Create an empty matcher backed by `kind`.
    pub fn new(kind: EngineKind) -> Self {
        match kind {
            EngineKind::Trie => Matcher::Trie(TrieMatcher::new()),
            EngineKind::Table => Matcher::Table(TableMatcher::new()),
        }
    }

    pub fn kind(&self) -> EngineKind {
        match self {
            Matcher::Trie(_) => EngineKind::Trie,
            Matcher::Table(_) => EngineKind::Table,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(EngineKind::default())
    }
}

impl StringMatcher for Matcher {
    fn add_exact_match(&mut self, pattern: &str, id: RuleId) {
        match self {
            Matcher::Trie(m) => m.add_exact_match(pattern, id),
            Matcher::Table(m) => m.add_exact_match(pattern, id),
        }
    }

    fn add_prefix_match(&mut self, pattern: &str, id: RuleId) {
        match self {
            Matcher::Trie(m) => m.add_prefix_match(pattern, id),
            Matcher::Table(m) => m.add_prefix_match(pattern, id),
        }
    }

    fn lookup(&self, input: &str) -> Option<RuleId> {
        match self {
            Matcher::Trie(m) => m.lookup(input),
            Matcher::Table(m) => m.lookup(input),
        }
    }

    fn delete_exact_match(&mut self, pattern: &str) -> bool {
        match self {
            Matcher::Trie(m) => m.delete_exact_match(pattern),
            Matcher::Table(m) => m.delete_exact_match(pattern),
        }
    }

    fn delete_prefix_match(&mut self, pattern: &str) -> bool {
        match self {
            Matcher::Trie(m) => m.delete_prefix_match(pattern),
            Matcher::Table(m) => m.delete_prefix_match(pattern),
        }
    }

    fn compact(&mut self) -> bool {
        match self {
            Matcher::Trie(m) => m.compact(),
            Matcher::Table(m) => m.compact(),
        }
    }

    fn rule_count(&self) -> usize {
        match self {
            Matcher::Trie(m) => m.rule_count(),
            Matcher::Table(m) => m.rule_count(),
        }
    }

    fn rules(&self) -> Vec<Rule> {
        match self {
            Matcher::Trie(m) => m.rules(),
            Matcher::Table(m) => m.rules(),
        }
    }
}
