//! Error taxonomy shared by every state module.
//!
//! Each module keeps its own error enum; `kind()` on those enums maps them
//! onto the three classes the transport layer cares about.

use std::fmt;

/// Broad class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input: unsupported grid size, coordinate off the board.
    Validation,
    /// The request conflicts with the current state of a match.
    StateConflict,
    /// Unknown match or player id.
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::StateConflict => "state_conflict",
            Self::NotFound => "not_found",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::Validation.to_string(), "validation");
        assert_eq!(ErrorKind::StateConflict.to_string(), "state_conflict");
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }
}
