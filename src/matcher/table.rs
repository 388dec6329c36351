//! Sorted-array matcher.
//!
//! Records are kept in strictly ascending byte order, which for the 52-letter
//! alphabet is also the trie's child order. A record is dropped by the delete
//! that clears its last id, so there is nothing to compact.

use std::cmp::Ordering;

use super::StringMatcher;
use crate::alphabet;
use crate::types::{Rule, RuleId, RuleKind};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Record {
    word: String,
    prefix_id: Option<RuleId>,
    exact_id: Option<RuleId>,
}

impl Record {
    fn new(word: &str) -> Self {
        Self {
            word: word.to_string(),
            prefix_id: None,
            exact_id: None,
        }
    }

    fn has_ids(&self) -> bool {
        self.prefix_id.is_some() || self.exact_id.is_some()
    }

    fn id_slot(&mut self, kind: RuleKind) -> &mut Option<RuleId> {
        match kind {
            RuleKind::Exact => &mut self.exact_id,
            RuleKind::Prefix => &mut self.prefix_id,
        }
    }
}

/// Sorted-table [`StringMatcher`].
///
/// Lookup binary-searches the input, then repeatedly narrows the key to its
/// common prefix with the preceding record. Any registered proper prefix of
/// the key sorts between that prefix and the key, so the narrowed key never
/// skips past it; results are identical to [`TrieMatcher`](super::TrieMatcher).
///
/// Inserts and deletes shift the tail of the array, so this engine suits
/// rule sets that are loaded once and queried often.
#[derive(Debug, Clone, Default)]
pub struct TableMatcher {
    records: Vec<Record>,
}

impl TableMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Number of distinct patterns stored.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn search(&self, key: &str) -> Result<usize, usize> {
        self.records
            .binary_search_by(|r| r.word.as_str().cmp(key))
    }

    fn upsert(&mut self, pattern: &str, kind: RuleKind, id: RuleId) {
        alphabet::assert_pattern(pattern);
        let i = match self.search(pattern) {
            Ok(i) => i,
            Err(i) => {
                self.records.insert(i, Record::new(pattern));
                i
            }
        };
        *self.records[i].id_slot(kind) = Some(id);
    }

    fn remove(&mut self, pattern: &str, kind: RuleKind) -> bool {
        alphabet::assert_letters(pattern);
        let Ok(i) = self.search(pattern) else {
            return false;
        };

        let record = &mut self.records[i];
        if record.id_slot(kind).take().is_none() {
            return false;
        }
        if !record.has_ids() {
            self.records.remove(i);
        }
        true
    }
}

/// Length of the longest common prefix of two ASCII strings.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

impl StringMatcher for TableMatcher {
    fn add_exact_match(&mut self, pattern: &str, id: RuleId) {
        self.upsert(pattern, RuleKind::Exact, id);
    }

    fn add_prefix_match(&mut self, pattern: &str, id: RuleId) {
        self.upsert(pattern, RuleKind::Prefix, id);
    }

    fn lookup(&self, input: &str) -> Option<RuleId> {
        alphabet::assert_letters(input);

        let mut key = input;
        let mut whole_input = true;

        while !key.is_empty() {
            let pos = match self.search(key) {
                Ok(i) => {
                    let record = &self.records[i];
                    if whole_input && record.exact_id.is_some() {
                        return record.exact_id;
                    }
                    if record.prefix_id.is_some() {
                        return record.prefix_id;
                    }
                    i
                }
                Err(i) => i,
            };

            // Greatest word strictly below the key
            let pred = &self.records[pos.checked_sub(1)?];
            debug_assert_eq!(pred.word.as_str().cmp(key), Ordering::Less);

            key = &key[..common_prefix_len(key, &pred.word)];
            whole_input = false;
        }

        None
    }

    fn delete_exact_match(&mut self, pattern: &str) -> bool {
        self.remove(pattern, RuleKind::Exact)
    }

    fn delete_prefix_match(&mut self, pattern: &str) -> bool {
        self.remove(pattern, RuleKind::Prefix)
    }

    fn compact(&mut self) -> bool {
        self.records.shrink_to_fit();
        self.records.is_empty()
    }

    fn rule_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| usize::from(r.prefix_id.is_some()) + usize::from(r.exact_id.is_some()))
            .sum()
    }

    fn rules(&self) -> Vec<Rule> {
        let mut out = Vec::with_capacity(self.records.len());
        for record in &self.records {
            if let Some(id) = record.exact_id {
                out.push(Rule::exact(record.word.clone(), id));
            }
            if let Some(id) = record.prefix_id {
                out.push(Rule::prefix(record.word.clone(), id));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: i64) -> RuleId {
        RuleId::new(raw).unwrap()
    }

    fn words(m: &TableMatcher) -> Vec<&str> {
        m.records.iter().map(|r| r.word.as_str()).collect()
    }

    #[test]
    fn test_records_stay_sorted() {
        let mut m = TableMatcher::new();
        for (i, w) in ["pear", "Apple", "peach", "apple", "p", "zebra", "Zulu"]
            .iter()
            .enumerate()
        {
            m.add_exact_match(w, id(i as i64 + 1));
        }
        assert_eq!(
            words(&m),
            vec!["Apple", "Zulu", "apple", "p", "peach", "pear", "zebra"]
        );
    }

    #[test]
    fn test_overwrite_does_not_duplicate() {
        let mut m = TableMatcher::new();
        m.add_prefix_match("img", id(1));
        m.add_prefix_match("img", id(2));
        m.add_exact_match("img", id(3));
        assert_eq!(m.len(), 1);
        assert_eq!(m.rule_count(), 2);
        assert_eq!(m.lookup("imgs"), Some(id(2)));
        assert_eq!(m.lookup("img"), Some(id(3)));
    }

    #[test]
    fn test_delete_removes_record_eagerly() {
        let mut m = TableMatcher::new();
        m.add_exact_match("contactus", id(1));
        m.add_prefix_match("contactus", id(2));

        assert!(m.delete_prefix_match("contactus"));
        assert_eq!(m.len(), 1);
        assert!(m.delete_exact_match("contactus"));
        assert_eq!(m.len(), 0);
        assert!(m.is_empty());
        assert!(!m.delete_exact_match("contactus"));
        assert!(m.compact());
    }

    #[test]
    fn test_narrowing_skips_unrelated_neighbours() {
        let mut m = TableMatcher::new();
        m.add_prefix_match("ab", id(1));
        m.add_exact_match("abca", id(2));
        m.add_exact_match("abcb", id(3));
        m.add_prefix_match("abd", id(4));

        // Predecessor of "abcc" is "abcb", common prefix "abc" is not a rule,
        // predecessor of "abc" is "ab" which is.
        assert_eq!(m.lookup("abcc"), Some(id(1)));
        assert_eq!(m.lookup("abdz"), Some(id(4)));
        assert_eq!(m.lookup("abca"), Some(id(2)));
        assert_eq!(m.lookup("abcaz"), Some(id(1)));
        assert_eq!(m.lookup("aa"), None);
    }

    #[test]
    fn test_exact_record_hit_on_narrowed_key_is_ignored() {
        let mut m = TableMatcher::new();
        m.add_exact_match("abc", id(1));
        m.add_exact_match("abd", id(2));
        m.add_prefix_match("a", id(3));

        // Narrowing "abe" lands on exact-only records, which must not fire.
        assert_eq!(m.lookup("abe"), Some(id(3)));
        assert_eq!(m.lookup("abcd"), Some(id(3)));
    }

    #[test]
    fn test_input_before_every_record() {
        let mut m = TableMatcher::new();
        m.add_prefix_match("m", id(1));
        assert_eq!(m.lookup("a"), None);
        assert_eq!(m.lookup("Zed"), None);
        assert_eq!(m.lookup("mz"), Some(id(1)));
        assert_eq!(m.lookup("z"), None);
    }

    #[test]
    fn test_common_prefix_len() {
        assert_eq!(common_prefix_len("abc", "abd"), 2);
        assert_eq!(common_prefix_len("abc", "ab"), 2);
        assert_eq!(common_prefix_len("", "ab"), 0);
        assert_eq!(common_prefix_len("x", "y"), 0);
    }

    #[test]
    #[should_panic(expected = "unexpected character")]
    fn test_delete_rejects_non_letter() {
        let mut m = TableMatcher::new();
        m.delete_exact_match("a.b");
    }
}
