use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Raw sentinel returned by [`StringMatcher::lookup_raw`](crate::StringMatcher::lookup_raw)
/// when nothing matches. Never a valid [`RuleId`].
pub const NO_MATCH: i64 = -1;

/// Identifier attached to a registered rule.
///
/// Always positive: zero and negative values are reserved for "no rule"
/// and cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RuleId(NonZeroU32);

impl RuleId {
    /// Create an id from a raw integer. Returns `None` for values that are
    /// not positive or do not fit in 32 bits.
    pub fn new(raw: i64) -> Option<Self> {
        u32::try_from(raw).ok().and_then(NonZeroU32::new).map(Self)
    }

    /// Raw integer value.
    pub fn get(self) -> i64 {
        self.0.get() as i64
    }
}

impl TryFrom<i64> for RuleId {
    type Error = MatchError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| MatchError::InvalidId(raw.to_string()))
    }
}

impl From<RuleId> for i64 {
    fn from(id: RuleId) -> Self {
        id.get()
    }
}

impl FromStr for RuleId {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s
            .trim()
            .parse()
            .map_err(|_| MatchError::InvalidId(s.to_string()))?;
        Self::try_from(raw)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a registered pattern is compared against an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Fires only when the input equals the pattern
    Exact,
    /// Fires for the pattern and any input that starts with it
    Prefix,
}

impl FromStr for RuleKind {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(RuleKind::Exact),
            "prefix" => Ok(RuleKind::Prefix),
            _ => Err(MatchError::UnknownKind(s.to_string())),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Exact => f.write_str("exact"),
            RuleKind::Prefix => f.write_str("prefix"),
        }
    }
}

/// A validated rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub pattern: String,
    pub kind: RuleKind,
}

impl Rule {
    pub fn new(kind: RuleKind, pattern: impl Into<String>, id: RuleId) -> Self {
        Self {
            id,
            pattern: pattern.into(),
            kind,
        }
    }

    pub fn exact(pattern: impl Into<String>, id: RuleId) -> Self {
        Self::new(RuleKind::Exact, pattern, id)
    }

    pub fn prefix(pattern: impl Into<String>, id: RuleId) -> Self {
        Self::new(RuleKind::Prefix, pattern, id)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.kind, self.pattern, self.id)
    }
}

/// Parsed text rule before validation
#[derive(Debug, Clone)]
pub struct TextRule {
    /// Rule kind as written (`exact` or `prefix`)
    pub kind: String,
    /// Pattern as written
    pub pattern: String,
    /// Id as written
    pub id: String,
    /// Line number in the rule text (for error reporting)
    pub line_num: usize,
}
