//! 52-ary trie matcher.
//!
//! Every node may carry a prefix id and an exact id. Deleting a rule only
//! clears the id; the now-dead nodes stay allocated until [`TrieMatcher::compact`]
//! prunes them. Callers that churn registrations should compact periodically.

use std::fmt;

use super::StringMatcher;
use crate::alphabet::{self, ALPHABET_SIZE};
use crate::types::{Rule, RuleId, RuleKind};

struct Node {
    /// Slot `alphabet::index_of(c)` holds the child reached by letter `c`
    children: [Option<Box<Node>>; ALPHABET_SIZE],
    prefix_id: Option<RuleId>,
    exact_id: Option<RuleId>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            children: std::array::from_fn(|_| None),
            prefix_id: None,
            exact_id: None,
        }
    }
}

// Tree depth equals pattern length, so nothing below may recurse per level:
// teardown, copying, counting and compaction all walk with an explicit stack.

impl Drop for Node {
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node>> = self.children.iter_mut().filter_map(Option::take).collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.children.iter_mut().filter_map(Option::take));
        }
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        let order = self.breadth_first();
        let mut copies: Vec<Box<Node>> = order
            .iter()
            .map(|&(_, _, node)| Box::new(node.shallow_clone()))
            .collect();

        let mut root = self.shallow_clone();
        while let Some(copy) = copies.pop() {
            let (parent, slot, _) = order[copies.len()];
            let parent = match parent {
                Some(i) => &mut *copies[i],
                None => &mut root,
            };
            parent.children[slot] = Some(copy);
        }
        root
    }
}

impl Node {
    fn has_ids(&self) -> bool {
        self.prefix_id.is_some() || self.exact_id.is_some()
    }

    fn has_children(&self) -> bool {
        self.children.iter().any(Option::is_some)
    }

    fn id_count(&self) -> usize {
        usize::from(self.prefix_id.is_some()) + usize::from(self.exact_id.is_some())
    }

    fn id_slot(&mut self, kind: RuleKind) -> &mut Option<RuleId> {
        match kind {
            RuleKind::Exact => &mut self.exact_id,
            RuleKind::Prefix => &mut self.prefix_id,
        }
    }

    fn shallow_clone(&self) -> Node {
        Node {
            children: std::array::from_fn(|_| None),
            prefix_id: self.prefix_id,
            exact_id: self.exact_id,
        }
    }

    /// Every descendant as `(parent, slot, node)`, parents before children.
    /// `parent` indexes into the returned list; `None` is `self`.
    fn breadth_first(&self) -> Vec<(Option<usize>, usize, &Node)> {
        fn push_children<'a>(
            order: &mut Vec<(Option<usize>, usize, &'a Node)>,
            parent: Option<usize>,
            node: &'a Node,
        ) {
            for (slot, child) in node.children.iter().enumerate() {
                if let Some(child) = child.as_deref() {
                    order.push((parent, slot, child));
                }
            }
        }

        let mut order = Vec::new();
        push_children(&mut order, None, self);
        let mut i = 0;
        while i < order.len() {
            let node = order[i].2;
            push_children(&mut order, Some(i), node);
            i += 1;
        }
        order
    }

    /// Prune dead descendants. Returns true if this node holds nothing at all.
    ///
    /// Detaches the whole subtree breadth first, then reattaches it bottom
    /// up, so every child is settled before its parent is judged.
    fn compact(&mut self) -> bool {
        let mut detached: Vec<(Option<usize>, usize, Box<Node>)> = self
            .children
            .iter_mut()
            .enumerate()
            .filter_map(|(slot, child)| child.take().map(|child| (None, slot, child)))
            .collect();

        let mut i = 0;
        while i < detached.len() {
            let grandchildren: Vec<_> = detached[i]
                .2
                .children
                .iter_mut()
                .enumerate()
                .filter_map(|(slot, child)| child.take().map(|child| (Some(i), slot, child)))
                .collect();
            detached.extend(grandchildren);
            i += 1;
        }

        while let Some((parent, slot, node)) = detached.pop() {
            if !node.has_ids() && !node.has_children() {
                continue;
            }
            let parent = match parent {
                Some(i) => &mut *detached[i].2,
                None => &mut *self,
            };
            parent.children[slot] = Some(node);
        }

        !self.has_ids() && !self.has_children()
    }

    /// `(nodes, ids)` below this node.
    fn count(&self) -> (usize, usize) {
        let mut nodes = 0;
        let mut ids = 0;
        let mut stack: Vec<&Node> = self.children.iter().filter_map(Option::as_deref).collect();
        while let Some(node) = stack.pop() {
            nodes += 1;
            ids += node.id_count();
            stack.extend(node.children.iter().filter_map(Option::as_deref));
        }
        (nodes, ids)
    }

    /// Rules below this node in pattern order, exact before prefix.
    fn collect(&self) -> Vec<Rule> {
        fn push_children<'a>(stack: &mut Vec<(usize, u8, &'a Node)>, node: &'a Node, depth: usize) {
            for (i, child) in node.children.iter().enumerate().rev() {
                if let Some(child) = child.as_deref() {
                    stack.push((depth, alphabet::letter_at(i), child));
                }
            }
        }

        let mut out = Vec::new();
        let mut path = Vec::new();
        let mut stack = Vec::new();
        push_children(&mut stack, self, 0);

        while let Some((depth, letter, node)) = stack.pop() {
            path.truncate(depth);
            path.push(letter);
            if node.has_ids() {
                // Paths are built from alphabet letters only
                let pattern = String::from_utf8_lossy(&path).into_owned();
                if let Some(id) = node.exact_id {
                    out.push(Rule::exact(pattern.clone(), id));
                }
                if let Some(id) = node.prefix_id {
                    out.push(Rule::prefix(pattern, id));
                }
            }
            push_children(&mut stack, node, depth + 1);
        }
        out
    }
}

/// Trie-backed [`StringMatcher`].
///
/// Lookup walks at most `input.len()` nodes. Memory is one node per distinct
/// pattern prefix, reclaimed only by [`compact`](Self::compact).
///
/// ```
/// use prefix_matcher::{RuleId, StringMatcher, TrieMatcher};
///
/// let id = |n| RuleId::new(n).unwrap();
/// let mut m = TrieMatcher::new();
/// m.add_prefix_match("img", id(1));
/// m.add_prefix_match("imghd", id(2));
///
/// assert_eq!(m.lookup("imgcutepuppy"), Some(id(1)));
/// assert_eq!(m.lookup("imghdcutepuppy"), Some(id(2)));
/// assert_eq!(m.lookup("html"), None);
/// ```
#[derive(Clone, Default)]
pub struct TrieMatcher {
    root: Node,
}

impl fmt::Debug for TrieMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (nodes, rules) = self.root.count();
        f.debug_struct("TrieMatcher")
            .field("nodes", &nodes)
            .field("rules", &rules)
            .finish()
    }
}

impl TrieMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of allocated nodes below the root, dead ones included.
    pub fn node_count(&self) -> usize {
        self.root.count().0
    }

    /// Walk to the node for `pattern`, creating missing nodes.
    fn node_mut_or_insert(&mut self, pattern: &str) -> &mut Node {
        let mut node = &mut self.root;
        for b in pattern.bytes() {
            node = &mut **node.children[slot(b)].get_or_insert_with(Box::default);
        }
        node
    }

    fn node_mut(&mut self, pattern: &str) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for b in pattern.bytes() {
            node = node.children[slot(b)].as_deref_mut()?;
        }
        Some(node)
    }

    fn insert(&mut self, pattern: &str, kind: RuleKind, id: RuleId) {
        alphabet::assert_pattern(pattern);
        *self.node_mut_or_insert(pattern).id_slot(kind) = Some(id);
    }

    fn remove(&mut self, pattern: &str, kind: RuleKind) -> bool {
        alphabet::assert_letters(pattern);
        if pattern.is_empty() {
            return false;
        }
        self.node_mut(pattern)
            .and_then(|node| node.id_slot(kind).take())
            .is_some()
    }
}

#[inline]
#[track_caller]
fn slot(byte: u8) -> usize {
    match alphabet::index_of(byte) {
        Some(i) => i,
        None => panic!("unexpected character {byte:#04x}: only A-Z and a-z are allowed"),
    }
}

impl StringMatcher for TrieMatcher {
    fn add_exact_match(&mut self, pattern: &str, id: RuleId) {
        self.insert(pattern, RuleKind::Exact, id);
    }

    fn add_prefix_match(&mut self, pattern: &str, id: RuleId) {
        self.insert(pattern, RuleKind::Prefix, id);
    }

    fn lookup(&self, input: &str) -> Option<RuleId> {
        alphabet::assert_letters(input);

        let mut node = &self.root;
        let mut longest_prefix = None;
        let mut depth = 0;

        for b in input.bytes() {
            match node.children[slot(b)].as_deref() {
                Some(child) => {
                    node = child;
                    depth += 1;
                    if node.prefix_id.is_some() {
                        longest_prefix = node.prefix_id;
                    }
                }
                None => break,
            }
        }

        if depth > 0 && depth == input.len() {
            if let Some(exact) = node.exact_id {
                return Some(exact);
            }
        }
        longest_prefix
    }

    fn delete_exact_match(&mut self, pattern: &str) -> bool {
        self.remove(pattern, RuleKind::Exact)
    }

    fn delete_prefix_match(&mut self, pattern: &str) -> bool {
        self.remove(pattern, RuleKind::Prefix)
    }

    fn compact(&mut self) -> bool {
        self.root.compact()
    }

    fn rule_count(&self) -> usize {
        self.root.count().1
    }

    fn rules(&self) -> Vec<Rule> {
        self.root.collect()
    }
}
