//! Query-parameter credentials.

use std::collections::HashMap;

use serde_json::Value;

use crate::auth::{params_are_valid, AuthManager};
use crate::clients::HttpRequest;
use crate::error::Result;

const DEFAULT_ERROR_MESSAGE: &str =
    "QueryAuth: one or more auth query parameter values are undefined.";

/// Appends a fixed set of query parameters to each request.
///
/// Parameters go through the request's own query appender, so they follow
/// the request's array serialization format and URL cleaning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryAuth {
    params: HashMap<String, Option<String>>,
    error_message: String,
}

impl QueryAuth {
    /// Creates a query credential.
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

    /// Returns the configured parameters.
    #[must_use]
    pub const fn params(&self) -> &HashMap<String, Option<String>> {
        &self.params
    }
}

impl AuthManager for QueryAuth {
    fn is_valid(&self) -> bool {
        params_are_valid(&self.params)
    }

    fn error_message(&self) -> String {
        self.error_message.clone()
    }

    fn apply(&self, request: &mut HttpRequest) -> Result<()> {
        let mut names: Vec<&String> = self.params.keys().collect();
        names.sort();
        for name in names {
            if let Some(Some(value)) = self.params.get(name) {
                request.add_query_parameter(name.clone(), Value::String(value.clone()))?;
            }
        }
        Ok(())
    }
}
