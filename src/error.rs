use thiserror::Error;

/// Prefix matcher error types.
///
/// These cover configuration-time failures only: reading and validating rule
/// lists. Misuse of the engine API itself (non-letter input, empty pattern)
/// panics instead, see [`crate::alphabet`].
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Parse error at line {line}: {message}")]
    ParseErrorAtLine { line: usize, message: String },

    #[error("Unknown rule kind: {0}")]
    UnknownKind(String),

    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    #[error("Invalid rule id: {0}")]
    InvalidId(String),

    #[error("Invalid pattern '{pattern}': byte {byte:#04x} at position {position} is not an ASCII letter")]
    InvalidPattern {
        pattern: String,
        byte: u8,
        position: usize,
    },

    #[error("Empty pattern")]
    EmptyPattern,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MatchError>;
