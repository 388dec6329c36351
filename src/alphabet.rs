//! The 52-letter alphabet shared by both engines.
//!
//! Patterns and inputs are restricted to `A-Z` and `a-z`. Uppercase letters
//! map to slots `0..26`, lowercase to `26..52`, which is also their relative
//! byte order, so the trie's child order and the table's sort order agree.
//!
//! Passing any other byte to an engine is a caller bug. The `assert_*`
//! functions panic on it instead of letting the engine misclassify.

use crate::error::{MatchError, Result};

/// Number of distinct symbols (and trie fan-out).
pub const ALPHABET_SIZE: usize = 52;

/// Map a letter to its slot, or `None` for anything outside `A-Z`/`a-z`.
#[inline]
pub fn index_of(byte: u8) -> Option<usize> {
    match byte {
        b'A'..=b'Z' => Some((byte - b'A') as usize),
        b'a'..=b'z' => Some((byte - b'a') as usize + 26),
        _ => None,
    }
}

/// Inverse of [`index_of`].
#[inline]
pub fn letter_at(index: usize) -> u8 {
    assert!(index < ALPHABET_SIZE, "alphabet index {index} out of range");
    if index < 26 {
        b'A' + index as u8
    } else {
        b'a' + (index - 26) as u8
    }
}

/// Find the first byte that is not a letter.
pub fn first_invalid(s: &str) -> Option<(usize, u8)> {
    s.bytes().enumerate().find(|&(_, b)| !b.is_ascii_alphabetic())
}

/// Validate a pattern for configuration input, returning an error instead of
/// panicking.
pub fn validate_pattern(pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        return Err(MatchError::EmptyPattern);
    }
    if let Some((position, byte)) = first_invalid(pattern) {
        return Err(MatchError::InvalidPattern {
            pattern: pattern.to_string(),
            byte,
            position,
        });
    }
    Ok(())
}

/// Panic unless every byte of `s` is a letter. Empty strings pass.
#[track_caller]
pub fn assert_letters(s: &str) {
    if let Some((position, byte)) = first_invalid(s) {
        panic!("unexpected character {byte:#04x} at position {position} in {s:?}: only A-Z and a-z are allowed");
    }
}

/// Panic unless `pattern` is non-empty and made of letters only.
#[track_caller]
pub fn assert_pattern(pattern: &str) {
    assert!(!pattern.is_empty(), "pattern must not be empty");
    assert_letters(pattern);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_of_ranges() {
        assert_eq!(index_of(b'A'), Some(0));
        assert_eq!(index_of(b'Z'), Some(25));
        assert_eq!(index_of(b'a'), Some(26));
        assert_eq!(index_of(b'z'), Some(51));
        assert_eq!(index_of(b'0'), None);
        assert_eq!(index_of(b'-'), None);
        assert_eq!(index_of(b'['), None);
        assert_eq!(index_of(0xc3), None);
    }

    #[test]
    fn test_letter_at_is_inverse() {
        for i in 0..ALPHABET_SIZE {
            assert_eq!(index_of(letter_at(i)), Some(i));
        }
    }

    #[test]
    fn test_index_order_matches_byte_order() {
        let mut letters: Vec<u8> = (0..ALPHABET_SIZE).map(letter_at).collect();
        let by_index = letters.clone();
        letters.sort_unstable();
        assert_eq!(letters, by_index);
    }

    #[test]
    fn test_validate_pattern() {
        assert!(validate_pattern("contactUs").is_ok());
        assert!(matches!(validate_pattern(""), Err(MatchError::EmptyPattern)));
        match validate_pattern("img hd") {
            Err(MatchError::InvalidPattern { byte, position, .. }) => {
                assert_eq!(byte, b' ');
                assert_eq!(position, 3);
            }
            other => panic!("expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn test_assert_letters_accepts_empty() {
        assert_letters("");
        assert_letters("abcXYZ");
    }

    #[test]
    #[should_panic(expected = "unexpected character")]
    fn test_assert_letters_rejects_digit() {
        assert_letters("abc1");
    }

    #[test]
    #[should_panic(expected = "pattern must not be empty")]
    fn test_assert_pattern_rejects_empty() {
        assert_pattern("");
    }

    #[test]
    #[should_panic(expected = "unexpected character")]
    fn test_assert_pattern_rejects_multibyte() {
        assert_pattern("café");
    }
}
