//! Error types for the API runtime core.
//!
//! Every fallible operation in this crate returns [`Result<T>`], whose error
//! side is the unified [`ApiError`] enum. Variants map onto the failure
//! classes a generated SDK has to distinguish:
//!
//! - [`ApiError::Configuration`]: missing HTTP client, base-URI executor or
//!   global configuration. Fatal and never retried.
//! - [`ApiError::InvalidArgument`]: missing required parameters, unknown auth
//!   participants and invalid pagination pointers.
//! - [`ApiError::AuthValidation`]: the attached authentication tree failed
//!   validation before the request was dispatched.
//! - [`ApiError::ApiStatus`]: a response matched a declared [`ErrorCase`].
//! - [`ApiError::Transport`] / [`ApiError::Network`]: errors raised by the
//!   transport, propagated unchanged.
//!
//! # Example
//!
//! ```rust
//! use apimatic_core::ApiError;
//!
//! let error = ApiError::invalid_argument("Auth key is invalid.");
//! assert_eq!(error.to_string(), "Auth key is invalid.");
//! ```
//!
//! [`ErrorCase`]: crate::response::ErrorCase

use thiserror::Error;

use crate::clients::HttpResponse;

/// Error raised when a response matches a locally or globally declared error case.
///
/// `kind` is the type tag of the declared error case, so callers can
/// dispatch on it without inspecting the message.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiStatusError {
    /// The declared error kind (for example `"NotFoundError"`).
    pub kind: String,
    /// The rendered error description.
    pub message: String,
    /// The full response that triggered the error.
    pub response: Box<HttpResponse>,
}

impl ApiStatusError {
    /// Returns the status code of the offending response.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.response.status_code
    }
}

/// Unified error type for the request/response pipeline.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required collaborator or configuration entry is missing.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the missing configuration.
        message: String,
    },

    /// An argument supplied to the core was invalid.
    #[error("{message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Authentication failed validation.
    #[error("{message}")]
    AuthValidation {
        /// The joined error message of the auth tree.
        message: String,
    },

    /// The response status matched a declared error case.
    #[error(transparent)]
    ApiStatus(#[from] ApiStatusError),

    /// A URL could not be processed.
    #[error("Invalid Url format: {url}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },

    /// A request body could not be serialized.
    #[error("Failed to serialize request body: {message}")]
    Serialization {
        /// Description of the failure.
        message: String,
    },

    /// A response body could not be deserialized.
    #[error("Failed to deserialize response: {message}")]
    Deserialization {
        /// Description of the failure.
        message: String,
    },

    /// JSON encoding or decoding failed.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The injected transport failed.
    #[error("Transport error: {message}")]
    Transport {
        /// Description supplied by the transport.
        message: String,
    },

    /// The built-in reqwest transport failed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an auth validation error.
    pub fn auth_validation(message: impl Into<String>) -> Self {
        Self::AuthValidation {
            message: message.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization {
            message: message.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Returns the declared error kind when this is an [`ApiError::ApiStatus`].
    #[must_use]
    pub fn status_kind(&self) -> Option<&str> {
        match self {
            Self::ApiStatus(error) => Some(error.kind.as_str()),
            _ => None,
        }
    }
}

/// Result type alias for the API runtime core.
pub type Result<T> = std::result::Result<T, ApiError>;
