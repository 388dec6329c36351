//! Classifier module.
//!
//! Shares one matcher between threads and memoizes lookups for the hot
//! classification path.

use std::num::NonZeroUsize;
use std::path::Path;

use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, trace};

use crate::alphabet;
use crate::compile::compile;
use crate::error::Result;
use crate::matcher::{EngineKind, Matcher, StringMatcher};
use crate::parser::{parse_rules, parse_rules_from_file, parse_rules_json};
use crate::types::{Rule, RuleId, RuleKind, NO_MATCH};

/// Default LRU cache size
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// Classifier builder options.
#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    /// LRU cache size for lookup results
    pub cache_size: usize,
    /// Engine backing the classifier
    pub engine: EngineKind,
    /// Compact automatically after this many successful deletions
    pub compact_after: Option<NonZeroUsize>,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            engine: EngineKind::default(),
            compact_after: None,
        }
    }
}

impl ClassifierOptions {
    /// Create new classifier options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cache size.
    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    /// Set the engine.
    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    /// Compact after every `deletes` successful deletions. Zero disables it.
    pub fn with_compact_after(mut self, deletes: usize) -> Self {
        self.compact_after = NonZeroUsize::new(deletes);
        self
    }
}

struct State {
    matcher: Matcher,
    deletes_since_compact: usize,
}

/// Thread-safe classifier over a [`Matcher`].
///
/// Lookups run under a read lock and are memoized in an LRU cache; every
/// mutation takes the write lock and then clears the cache. The engines
/// themselves have no synchronization, this type is what makes sharing
/// them sound.
///
/// `classify` holds the cache mutex for the whole call, including the
/// engine lookup on a miss, so concurrent classifications are serialized.
/// The read lock only lets them overlap with [`rules`](Self::rules), [`rule_count`](Self::rule_count) and
/// the other read-only queries.
pub struct Classifier {
    state: RwLock<State>,
    cache: Mutex<LruCache<String, Option<RuleId>>>,
    compact_after: Option<NonZeroUsize>,
}

impl Classifier {
    /// Create a classifier from a rule list string.
    pub fn new(rules: &str, options: ClassifierOptions) -> Result<Self> {
        let text_rules = parse_rules(rules)?;
        let matcher = compile(&text_rules, options.engine)?;
        info!(
            rules = text_rules.len(),
            engine = %options.engine,
            "loaded rule list"
        );
        Ok(Self::with_matcher(matcher, options))
    }

    /// Create a classifier from a rule list file.
    pub fn from_file(path: impl AsRef<Path>, options: ClassifierOptions) -> Result<Self> {
        let path = path.as_ref();
        let text_rules = parse_rules_from_file(path)?;
        let matcher = compile(&text_rules, options.engine)?;
        info!(
            path = %path.display(),
            rules = text_rules.len(),
            engine = %options.engine,
            "loaded rule file"
        );
        Ok(Self::with_matcher(matcher, options))
    }

    /// Create a classifier from a JSON rule array.
    pub fn from_json(json: &str, options: ClassifierOptions) -> Result<Self> {
        let rules = parse_rules_json(json)?;
        Ok(Self::from_rules(&rules, options))
    }

    /// Create a classifier from already validated rules.
    ///
    /// Panics if a rule pattern contains anything but ASCII letters.
    pub fn from_rules(rules: &[Rule], options: ClassifierOptions) -> Self {
        let mut matcher = Matcher::new(options.engine);
        for rule in rules {
            matcher.add_rule(rule);
        }
        info!(rules = rules.len(), engine = %options.engine, "loaded rules");
        Self::with_matcher(matcher, options)
    }

    /// Wrap an existing matcher. `options.engine` is ignored.
    pub fn with_matcher(matcher: Matcher, options: ClassifierOptions) -> Self {
        let cache_size = NonZeroUsize::new(options.cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: RwLock::new(State {
                matcher,
                deletes_since_compact: 0,
            }),
            cache: Mutex::new(LruCache::new(cache_size)),
            compact_after: options.compact_after,
        }
    }

    /// Classify an input string.
    ///
    /// Panics if `input` contains anything but ASCII letters.
    pub fn classify(&self, input: &str) -> Option<RuleId> {
        alphabet::assert_letters(input);

        let mut cache = self.cache.lock();

        if let Some(cached) = cache.get(input) {
            trace!(input, "classification cache hit");
            return *cached;
        }

        // Cache miss: compute while holding the cache lock. Mutations never
        // wait on the cache while holding the write lock.
        let result = self.state.read().matcher.lookup(input);
        cache.put(input.to_string(), result);

        result
    }

    /// Like [`classify`](Self::classify) but returns [`NO_MATCH`] instead of `None`.
    pub fn classify_raw(&self, input: &str) -> i64 {
        self.classify(input).map_or(NO_MATCH, RuleId::get)
    }

    /// Register (or overwrite) a rule.
    pub fn add_rule(&self, rule: &Rule) {
        self.state.write().matcher.add_rule(rule);
        debug!(
            pattern = %rule.pattern,
            kind = %rule.kind,
            id = %rule.id,
            "registered rule"
        );
        self.clear_cache();
    }

    /// Remove a rule. Returns whether anything was removed.
    pub fn remove_rule(&self, pattern: &str, kind: RuleKind) -> bool {
        let removed = {
            let mut state = self.state.write();
            let removed = state.matcher.delete_rule(pattern, kind);
            if removed {
                state.deletes_since_compact += 1;
                if let Some(limit) = self.compact_after {
                    if state.deletes_since_compact >= limit.get() {
                        Self::compact_state(&mut state);
                    }
                }
            }
            removed
        };

        if removed {
            debug!(pattern, %kind, "removed rule");
            self.clear_cache();
        }
        removed
    }

    /// Compact the underlying matcher. Returns true if it is now empty.
    pub fn compact(&self) -> bool {
        let mut state = self.state.write();
        Self::compact_state(&mut state)
    }

    fn compact_state(state: &mut State) -> bool {
        let empty = state.matcher.compact();
        debug!(
            deletes = state.deletes_since_compact,
            empty, "compacted matcher"
        );
        state.deletes_since_compact = 0;
        empty
    }

    /// Clear the lookup cache
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        cache.clear();
    }

    /// Number of ids currently registered
    pub fn rule_count(&self) -> usize {
        self.state.read().matcher.rule_count()
    }

    /// Snapshot of the registered rules
    pub fn rules(&self) -> Vec<Rule> {
        self.state.read().matcher.rules()
    }

    pub fn engine_kind(&self) -> EngineKind {
        self.state.read().matcher.kind()
    }

    /// Allocated trie nodes, or `None` for the table engine.
    pub fn node_count(&self) -> Option<usize> {
        match &self.state.read().matcher {
            Matcher::Trie(trie) => Some(trie.node_count()),
            Matcher::Table(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: i64) -> RuleId {
        RuleId::new(raw).unwrap()
    }

    #[test]
    fn test_classifier_new() {
        let rules = r#"
            exact(contactus, 1)
            prefix(contactus, 2)
            prefix(img, 3)
        "#;

        for engine in [EngineKind::Trie, EngineKind::Table] {
            let classifier =
                Classifier::new(rules, ClassifierOptions::new().with_engine(engine)).unwrap();
            assert_eq!(classifier.engine_kind(), engine);
            assert_eq!(classifier.rule_count(), 3);
            assert_eq!(classifier.classify("contactus"), Some(id(1)));
            assert_eq!(classifier.classify("contactusplease"), Some(id(2)));
            assert_eq!(classifier.classify_raw("html"), NO_MATCH);
        }
    }

    #[test]
    fn test_classifier_rejects_bad_rules() {
        assert!(Classifier::new("exact(contact-us, 1)", ClassifierOptions::new()).is_err());
        assert!(Classifier::new("exact(contactus, 0)", ClassifierOptions::new()).is_err());
    }

    #[test]
    fn test_cache_invalidated_on_mutation() {
        let classifier = Classifier::new("prefix(img, 1)", ClassifierOptions::new()).unwrap();

        assert_eq!(classifier.classify("imghdpuppy"), Some(id(1)));

        classifier.add_rule(&Rule::prefix("imghd", id(2)));
        assert_eq!(classifier.classify("imghdpuppy"), Some(id(2)));

        assert!(classifier.remove_rule("imghd", RuleKind::Prefix));
        assert_eq!(classifier.classify("imghdpuppy"), Some(id(1)));

        assert!(!classifier.remove_rule("imghd", RuleKind::Prefix));
    }

    #[test]
    fn test_cache_none_result() {
        let classifier = Classifier::new("exact(abc, 1)", ClassifierOptions::new()).unwrap();
        assert_eq!(classifier.classify("xyz"), None);
        assert_eq!(classifier.classify("xyz"), None);
        assert_eq!(classifier.classify(""), None);
    }

    #[test]
    fn test_zero_cache_size() {
        let classifier = Classifier::new(
            "prefix(a, 1)\nprefix(b, 2)",
            ClassifierOptions::new().with_cache_size(0),
        )
        .unwrap();
        assert_eq!(classifier.classify("ax"), Some(id(1)));
        assert_eq!(classifier.classify("bx"), Some(id(2)));
        assert_eq!(classifier.classify("ax"), Some(id(1)));
    }

    #[test]
    fn test_auto_compaction() {
        let classifier = Classifier::new(
            "prefix(abc, 1)\nprefix(xyz, 2)",
            ClassifierOptions::new().with_compact_after(2),
        )
        .unwrap();
        assert_eq!(classifier.node_count(), Some(6));

        assert!(classifier.remove_rule("abc", RuleKind::Prefix));
        assert_eq!(classifier.node_count(), Some(6));

        assert!(classifier.remove_rule("xyz", RuleKind::Prefix));
        assert_eq!(classifier.node_count(), Some(0));
    }

    #[test]
    fn test_manual_compaction() {
        let classifier = Classifier::new("exact(abc, 1)", ClassifierOptions::new()).unwrap();
        assert!(!classifier.compact());
        assert!(classifier.remove_rule("abc", RuleKind::Exact));
        assert_eq!(classifier.node_count(), Some(3));
        assert!(classifier.compact());
        assert_eq!(classifier.node_count(), Some(0));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[{"id": 5, "pattern": "img", "kind": "prefix"}]"#;
        let classifier =
            Classifier::from_json(json, ClassifierOptions::new().with_engine(EngineKind::Table))
                .unwrap();
        assert_eq!(classifier.classify("imgs"), Some(id(5)));
        assert_eq!(classifier.node_count(), None);
        assert_eq!(classifier.rules(), vec![Rule::prefix("img", id(5))]);
    }

    #[test]
    #[should_panic(expected = "unexpected character")]
    fn test_classify_rejects_non_letter() {
        let classifier = Classifier::new("prefix(a, 1)", ClassifierOptions::new()).unwrap();
        classifier.classify("a1");
    }
}
