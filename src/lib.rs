//! Prefix Matcher - longest-match string classification for Rust
//!
//! Registers strings as **exact** or **prefix** rules, each with a positive
//! id, and classifies inputs by the longest registered match:
//! - Exact rules fire only when the pattern equals the whole input
//! - Prefix rules fire for the pattern and anything that starts with it
//! - At equal length, an exact rule beats a prefix rule
//! - Two interchangeable engines: a 52-ary trie and a sorted table
//! - Thread-safe, LRU-cached front end for shared use
//!
//! # Example
//!
//! ```rust
//! use prefix_matcher::{Classifier, ClassifierOptions, RuleId};
//!
//! let rules_text = "
//! exact(contactus, 1)    # landing page
//! prefix(contactus, 2)   # anything below it
//! prefix(img, 3)
//! prefix(imghd, 4)
//! ";
//!
//! let classifier = Classifier::new(rules_text, ClassifierOptions::new()).unwrap();
//!
//! let id = |n| RuleId::new(n).unwrap();
//! assert_eq!(classifier.classify("contactus"), Some(id(1)));
//! assert_eq!(classifier.classify("contactusplease"), Some(id(2)));
//! assert_eq!(classifier.classify("imghdcutepuppy"), Some(id(4)));
//! assert_eq!(classifier.classify("htmlcutepuppy"), None);
//! ```
//!
//! # Rule Syntax
//!
//! ```text
//! kind(pattern, id)
//! ```
//!
//! | Kind | Example | Matches |
//! |------|---------|---------|
//! | Exact | `exact(contactus, 1)` | `contactus` only |
//! | Prefix | `prefix(img, 2)` | `img`, `imgs`, `imghd`, ... |
//!
//! Patterns and inputs use the letters `A-Z` and `a-z` only; matching is
//! case-sensitive. `#` starts a comment and `file: <path>` includes another
//! rule file.
//!
//! # Contract violations
//!
//! The engines panic on non-letter input and on empty patterns. Rule files
//! and JSON rule lists are validated up front and report a [`MatchError`]
//! instead.

pub mod alphabet;
pub mod classifier;
pub mod compile;
pub mod error;
pub mod matcher;
pub mod parser;
pub mod types;

// Re-export commonly used items
pub use classifier::{Classifier, ClassifierOptions, DEFAULT_CACHE_SIZE};
pub use compile::{compile, compile_into, compile_words, validate_pattern, validate_rule};
pub use error::{MatchError, Result};
pub use matcher::{EngineKind, Matcher, StringMatcher, TableMatcher, TrieMatcher};
pub use parser::{
    parse_rules, parse_rules_from_file, parse_rules_json, parse_rules_json_from_file,
    parse_word_list, parse_word_list_from_file,
};
pub use types::{Rule, RuleId, RuleKind, TextRule, NO_MATCH};
