use thiserror::Error;

/// A version string that could not be turned into a [`Version`](super::parse::Version).
///
/// Every variant carries the original input so callers can report it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid version: {0:?}")]
    Invalid(String),

    #[error("Wildcard not allowed in version: {0:?}")]
    WildcardNotAllowed(String),

    #[error("Version part out of range: {0:?}")]
    OutOfRange(String),
}

impl ParseError {
    /// The text that failed to parse
    pub fn input(&self) -> &str {
        match self {
            ParseError::Invalid(s) | ParseError::WildcardNotAllowed(s) | ParseError::OutOfRange(s) => {
                s
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompatibilityError {
    #[error("No compatibility data for {app}")]
    Missing { app: String },

    #[error("Invalid compatibility range: {0}")]
    Parse(#[from] ParseError),
}
