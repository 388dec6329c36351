use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

use crate::alphabet;
use crate::error::{MatchError, Result};
use crate::types::{Rule, TextRule};

/// One rule per line: `kind(pattern, id)`, e.g. `prefix(img, 3)`
static RULE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\w\-]+)\s*\(([^,]*),([^,]*)\)$")
        .expect("RULE_PATTERN: hardcoded regex is invalid")
});

/// How many `file:` lines may be chained before loading gives up.
const MAX_INCLUDE_DEPTH: usize = 10;

/// Parse a rule list.
///
/// Each non-blank line is either a rule, `exact(pattern, id)` or
/// `prefix(pattern, id)`, or a `file: <path>` line that splices in another
/// rule list at that point. Everything after `#` is ignored. The returned
/// rules are unvalidated; see [`crate::compile::validate_rule`].
pub fn parse_rules(text: &str) -> Result<Vec<TextRule>> {
    parse_rules_inner(text, 0)
}

fn parse_rules_inner(text: &str, depth: usize) -> Result<Vec<TextRule>> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(MatchError::ParseError(format!(
            "file include depth exceeds maximum ({MAX_INCLUDE_DEPTH}), possible circular include"
        )));
    }

    let mut rules = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split_once('#').map_or(raw, |(rule, _)| rule).trim();
        if line.is_empty() {
            continue;
        }

        match line.strip_prefix("file:") {
            Some(path) => rules.extend(parse_rules_from_file_inner(path.trim(), depth + 1)?),
            None => rules.push(parse_single_rule(line, index + 1)?),
        }
    }

    Ok(rules)
}

/// Parse a rule list file. Included paths are taken as written, relative
/// ones against the working directory.
pub fn parse_rules_from_file(path: impl AsRef<Path>) -> Result<Vec<TextRule>> {
    parse_rules_from_file_inner(path.as_ref(), 0)
}

fn parse_rules_from_file_inner(path: impl AsRef<Path>, depth: usize) -> Result<Vec<TextRule>> {
    let text = read_file(path.as_ref(), "rules")?;
    parse_rules_inner(&text, depth)
}

fn read_file(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        MatchError::ParseError(format!(
            "Failed to read {what} file '{}': {e}",
            path.display()
        ))
    })
}

fn parse_single_rule(line: &str, line_num: usize) -> Result<TextRule> {
    let captures = RULE_PATTERN
        .captures(line)
        .ok_or_else(|| MatchError::ParseErrorAtLine {
            line: line_num,
            message: format!("Invalid rule format: {}", line),
        })?;

    let field = |i: usize| captures.get(i).map_or("", |m| m.as_str().trim());

    let pattern = field(2);
    if pattern.is_empty() {
        return Err(MatchError::ParseErrorAtLine {
            line: line_num,
            message: "Empty pattern".to_string(),
        });
    }
    let id = field(3);
    if id.is_empty() {
        return Err(MatchError::ParseErrorAtLine {
            line: line_num,
            message: "Empty rule id".to_string(),
        });
    }

    Ok(TextRule {
        kind: field(1).to_string(),
        pattern: pattern.to_string(),
        id: id.to_string(),
        line_num,
    })
}

/// Parse a JSON array of rules.
///
/// Ids are checked while deserializing; patterns are checked against the
/// alphabet afterwards.
pub fn parse_rules_json(text: &str) -> Result<Vec<Rule>> {
    let rules: Vec<Rule> = serde_json::from_str(text)?;
    for rule in &rules {
        alphabet::validate_pattern(&rule.pattern)?;
    }
    Ok(rules)
}

/// Parse a JSON rule file.
pub fn parse_rules_json_from_file(path: impl AsRef<Path>) -> Result<Vec<Rule>> {
    let text = read_file(path.as_ref(), "JSON rules")?;
    parse_rules_json(&text)
}

/// Extract matchable words from free text such as a dictionary file.
///
/// Each whitespace-separated token is cut at its first non-letter byte
/// ("don't" becomes "don"); tokens that end up empty are dropped.
pub fn parse_word_list(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|token| {
            let end = alphabet::first_invalid(token).map_or(token.len(), |(pos, _)| pos);
            (end > 0).then(|| token[..end].to_string())
        })
        .collect()
}

/// Read a word list file, see [`parse_word_list`].
pub fn parse_word_list_from_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let text = read_file(path.as_ref(), "word list")?;
    Ok(parse_word_list(&text))
}
