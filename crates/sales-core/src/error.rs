//! Listing error types.

use thiserror::Error;

/// Errors that can occur while loading or parsing listings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SalesError {
    /// A filter or sort parameter had an unusable value.
    #[error("Invalid value for {field}: {value:?}")]
    Validation { field: &'static str, value: String },

    /// The sale store could not be reached or answered with an error.
    #[error("Sale store unavailable: {0}")]
    Fetch(String),

    /// A record could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SalesError {
    pub(crate) fn validation(field: &'static str, value: impl Into<String>) -> Self {
        SalesError::Validation {
            field,
            value: value.into(),
        }
    }
}

impl From<serde_json::Error> for SalesError {
    fn from(e: serde_json::Error) -> Self {
        SalesError::Serialization(e.to_string())
    }
}
