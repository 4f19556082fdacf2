//! Error types for annowindow.
//!
//! Layout problems caused by the input (bad or conflicting annotations,
//! boundary pages, missing scroll measurements) are never errors: they
//! degrade locally and surface as [`Diagnostic`](crate::Diagnostic)s. The
//! [`Error`] type covers caller mistakes in configuration and color input.

use std::fmt;

/// Result type alias for annowindow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for annowindow operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A configuration value is out of its valid range.
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
    /// Invalid color format (e.g., malformed hex string).
    InvalidColor(String),
    /// A span whose start lies after its end.
    InvalidSpan { start: usize, end: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid configuration: {field} {reason}")
            }
            Self::InvalidColor(s) => write!(f, "invalid color format: {s}"),
            Self::InvalidSpan { start, end } => {
                write!(f, "invalid span: start {start} is after end {end}")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidColor("not-a-color".to_string());
        assert!(err.to_string().contains("invalid color format"));

        let err = Error::InvalidConfig {
            field: "page_size",
            reason: "must be greater than zero",
        };
        assert_eq!(
            err.to_string(),
            "invalid configuration: page_size must be greater than zero"
        );

        let err = Error::InvalidSpan { start: 9, end: 3 };
        assert!(err.to_string().contains("start 9"));
    }

    #[test]
    fn test_error_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&Error::InvalidSpan { start: 1, end: 0 });
    }
}
