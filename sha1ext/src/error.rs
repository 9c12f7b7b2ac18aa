use std::fmt;

/// Digest text that cannot be turned back into hash state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedDigestError {
    WrongLength { expected: usize, actual: usize },
    NonHex { index: usize, found: char },
}

impl fmt::Display for MalformedDigestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLength { expected, actual } => {
                write!(f, "digest must be {expected} hex characters, got {actual}")
            }
            Self::NonHex { index, found } => {
                write!(f, "non-hex character {found:?} at position {index} in digest")
            }
        }
    }
}

impl std::error::Error for MalformedDigestError {}

#[test]
fn test_display() {
    let err = MalformedDigestError::WrongLength { expected: 40, actual: 39 };
    assert_eq!(err.to_string(), "digest must be 40 hex characters, got 39");

    let err = MalformedDigestError::NonHex { index: 7, found: 'x' };
    assert_eq!(err.to_string(), "non-hex character 'x' at position 7 in digest");
}
