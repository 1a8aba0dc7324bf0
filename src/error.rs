use thiserror::Error;

use crate::registry::ResourceKey;

/// Failure of a single GET against the reference API.
///
/// Cloneable so that one in-flight request can hand the same outcome to every
/// caller that was coalesced onto it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// A list endpoint answered with JSON that is neither an array nor a known wrapper.
    #[error("unexpected list response shape for {0}")]
    Shape(String),

    /// The body did not match the expected entity layout.
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Message suitable for showing to a user, in the wording of the API layer.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(msg) => format!("Network error: {msg}"),
            Self::Server { status, message } => format!("Server error: {status} - {message}"),
            Self::Shape(_) => "Unexpected list response shape".to_string(),
            Self::Decode { .. } | Self::InvalidUrl(_) => "An unknown error occurred".to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Invalid resource: '{0}'")]
    InvalidResourceKey(String),

    #[error("no definition registered for '{0}'")]
    NotRegistered(ResourceKey),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("field '{field}' is not part of the {resource} form")]
    UnknownField { resource: ResourceKey, field: String },

    #[error("field '{field}' is required for {resource}")]
    MissingField { resource: ResourceKey, field: &'static str },

    #[error("field '{field}' expects a number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("a submission is already in progress")]
    Busy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_keeps_status_code() {
        let err = FetchError::Server { status: 404, message: "Not Found".into() };
        assert_eq!(err.user_message(), "Server error: 404 - Not Found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn network_errors_have_no_status() {
        let err = FetchError::Network("connection refused".into());
        assert_eq!(err.status(), None);
        assert!(err.user_message().starts_with("Network error:"));
    }
}
