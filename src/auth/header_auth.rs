//! Header-based credentials.

use std::collections::HashMap;

use base64::prelude::*;

use crate::auth::{params_are_valid, AuthManager};
use crate::clients::HttpRequest;
use crate::error::Result;

const DEFAULT_ERROR_MESSAGE: &str = "HeaderAuth: one or more auth header values are undefined.";

/// Adds a fixed set of headers to each request.
///
/// Valid iff there is at least one header and no value is missing or blank.
///
/// # Example
///
/// ```rust
/// use apimatic_core::auth::{AuthManager, HeaderAuth};
///
/// let auth = HeaderAuth::basic(Some("user"), Some("pass"));
/// assert!(auth.is_valid());
///
/// let auth = HeaderAuth::bearer(None);
/// assert!(!auth.is_valid());
/// assert_eq!(auth.error_message(), "BearerAuth: access_token is undefined.");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderAuth {
    params: HashMap<String, Option<String>>,
    error_message: String,
}

impl HeaderAuth {
    /// Creates a header credential.
    #[must_use]
    pub fn new(params: HashMap<String, Option<String>>) -> Self {
        Self {
            params,
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }

    /// Overrides the message reported when the credential is incomplete.
    #[must_use]
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// HTTP basic authentication.
    #[must_use]
    pub fn basic(username: Option<&str>, password: Option<&str>) -> Self {
        let value = match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() => Some(format!(
                "Basic {}",
                BASE64_STANDARD.encode(format!("{username}:{password}"))
            )),
            _ => None,
        };
        Self::single_header("Authorization", value)
            .with_error_message("BasicAuth: username or password is undefined.")
    }

    /// Bearer token authentication.
    #[must_use]
    pub fn bearer(access_token: Option<&str>) -> Self {
        let value = access_token
            .filter(|token| !token.trim().is_empty())
            .map(|token| format!("Bearer {token}"));
        Self::single_header("Authorization", value)
            .with_error_message("BearerAuth: access_token is undefined.")
    }

    fn single_header(name: &str, value: Option<String>) -> Self {
        let mut params = HashMap::new();
        params.insert(name.to_string(), value);
        Self::new(params)
    }

    /// Returns the configured headers.
    #[must_use]
    pub const fn params(&self) -> &HashMap<String, Option<String>> {
        &self.params
    }
}

impl AuthManager for HeaderAuth {
    fn is_valid(&self) -> bool {
        params_are_valid(&self.params)
    }

    fn error_message(&self) -> String {
        self.error_message.clone()
    }

    fn apply(&self, request: &mut HttpRequest) -> Result<()> {
        for (name, value) in &self.params {
            if let Some(value) = value {
                request.add_header(name.clone(), value.clone());
            }
        }
        Ok(())
    }
}
