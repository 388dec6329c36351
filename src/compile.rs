use crate::alphabet;
use crate::error::{MatchError, Result};
use crate::matcher::{EngineKind, Matcher, StringMatcher};
use crate::types::{Rule, RuleId, RuleKind, TextRule};

/// Validate a single parsed rule.
///
/// Failures are reported with the rule's line number.
pub fn validate_rule(rule: &TextRule) -> Result<Rule> {
    let at_line = |e: MatchError| MatchError::ParseErrorAtLine {
        line: rule.line_num,
        message: e.to_string(),
    };

    let kind: RuleKind = rule.kind.parse().map_err(at_line)?;
    let id: RuleId = rule.id.parse().map_err(at_line)?;
    alphabet::validate_pattern(&rule.pattern).map_err(at_line)?;

    Ok(Rule::new(kind, rule.pattern.as_str(), id))
}

/// Validate a pattern from outside the parser (API callers, word lists).
pub fn validate_pattern(pattern: &str) -> Result<()> {
    alphabet::validate_pattern(pattern)
}

/// Compile text rules into a fresh matcher backed by `engine`.
///
/// Later rules for the same pattern and kind overwrite earlier ones.
pub fn compile(rules: &[TextRule], engine: EngineKind) -> Result<Matcher> {
    let mut matcher = Matcher::new(engine);
    compile_into(&mut matcher, rules)?;
    Ok(matcher)
}

/// Validate every rule, then register them all into `matcher`.
///
/// Nothing is registered if any rule fails validation. Returns the number of
/// rules registered.
pub fn compile_into<M: StringMatcher + ?Sized>(
    matcher: &mut M,
    rules: &[TextRule],
) -> Result<usize> {
    let validated = rules
        .iter()
        .map(validate_rule)
        .collect::<Result<Vec<_>>>()?;

    for rule in &validated {
        matcher.add_rule(rule);
    }

    Ok(validated.len())
}

/// Register every word of a word list under one kind and id.
pub fn compile_words(
    words: &[String],
    kind: RuleKind,
    id: RuleId,
    engine: EngineKind,
) -> Result<Matcher> {
    for word in words {
        validate_pattern(word)?;
    }

    let mut matcher = Matcher::new(engine);
    for word in words {
        matcher.add_rule(&Rule::new(kind, word.as_str(), id));
    }
    Ok(matcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_rules, parse_word_list};

    fn id(raw: i64) -> RuleId {
        RuleId::new(raw).unwrap()
    }

    #[test]
    fn test_compile_simple_rules() {
        let text = r#"
exact(contactus, 1)
prefix(contactus, 2)
prefix(img, 3)
"#;
        let rules = parse_rules(text).unwrap();

        for engine in [EngineKind::Trie, EngineKind::Table] {
            let matcher = compile(&rules, engine).unwrap();
            assert_eq!(matcher.kind(), engine);
            assert_eq!(matcher.rule_count(), 3);
            assert_eq!(matcher.lookup("contactus"), Some(id(1)));
            assert_eq!(matcher.lookup("contactusplease"), Some(id(2)));
            assert_eq!(matcher.lookup("imgcutepuppy"), Some(id(3)));
            assert_eq!(matcher.lookup("htmlcutepuppy"), None);
        }
    }

    #[test]
    fn test_compile_last_rule_wins() {
        let rules = parse_rules("exact(contactus, 3)\nexact(contactus, 1)").unwrap();
        let matcher = compile(&rules, EngineKind::Trie).unwrap();
        assert_eq!(matcher.rule_count(), 1);
        assert_eq!(matcher.lookup("contactus"), Some(id(1)));
    }

    #[test]
    fn test_compile_unknown_kind() {
        let rules = parse_rules("exact(a, 1)\nsuffix(img, 2)").unwrap();
        match compile(&rules, EngineKind::Trie) {
            Err(MatchError::ParseErrorAtLine { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("suffix"), "got: {}", message);
            }
            other => panic!("expected ParseErrorAtLine, got {:?}", other.map(|m| m.kind())),
        }
    }

    #[test]
    fn test_compile_rejects_non_positive_id() {
        for text in ["exact(a, 0)", "exact(a, -1)", "exact(a, one)"] {
            let rules = parse_rules(text).unwrap();
            assert!(compile(&rules, EngineKind::Table).is_err(), "{text}");
        }
    }

    #[test]
    fn test_compile_rejects_non_letter_pattern() {
        let rules = parse_rules("prefix(img2, 1)").unwrap();
        let err = compile(&rules, EngineKind::Trie).unwrap_err();
        assert!(err.to_string().contains("position 3"), "got: {}", err);
    }

    #[test]
    fn test_compile_into_is_all_or_nothing() {
        let rules = parse_rules("prefix(img, 1)\nprefix(bad_pattern, 2)").unwrap();
        let mut matcher = Matcher::new(EngineKind::Trie);
        assert!(compile_into(&mut matcher, &rules).is_err());
        assert!(matcher.is_empty());
    }

    #[test]
    fn test_compile_into_existing_matcher() {
        let mut matcher = Matcher::new(EngineKind::Table);
        matcher.add_prefix_match("img", id(1));

        let rules = parse_rules("prefix(imghd, 2)").unwrap();
        assert_eq!(compile_into(&mut matcher, &rules).unwrap(), 1);
        assert_eq!(matcher.lookup("imgx"), Some(id(1)));
        assert_eq!(matcher.lookup("imghdx"), Some(id(2)));
    }

    #[test]
    fn test_compile_words() {
        let words = parse_word_list("test testing tested, it's");
        let matcher = compile_words(&words, RuleKind::Prefix, id(2), EngineKind::Trie).unwrap();
        assert_eq!(matcher.lookup("testingisfun"), Some(id(2)));
        assert_eq!(matcher.lookup("itself"), Some(id(2)));
        assert_eq!(matcher.lookup("tes"), None);
    }

    #[test]
    fn test_compile_words_rejects_invalid() {
        let words = vec!["ok".to_string(), "not ok".to_string()];
        assert!(compile_words(&words, RuleKind::Exact, id(1), EngineKind::Table).is_err());
    }
}
