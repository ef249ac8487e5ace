//! Configuration shared by every call of one SDK client.
//!
//! # Overview
//!
//! - [`GlobalConfiguration`]: base URIs, global headers and errors, auth
//!   managers and the client collaborators
//! - [`ClientConfiguration`]: the transport, HTTP callback and logger
//!
//! A `GlobalConfiguration` is built once per client and shared behind an
//! `Arc` by every [`ApiCall`](crate::ApiCall). It is read-only after
//! construction. [`GlobalConfiguration::clone_with_http_callback`] is the one
//! copy operation the runtime performs, for pagination.
//!
//! # Example
//!
//! ```rust
//! use apimatic_core::config::GlobalConfiguration;
//! use apimatic_core::response::ErrorCase;
//! use std::collections::HashMap;
//!
//! let config = GlobalConfiguration::new()
//!     .with_base_uri_executor(|server| match server {
//!         "auth" => "https://auth.example.com".to_string(),
//!         _ => "https://api.example.com".to_string(),
//!     })
//!     .with_global_header("accept", "application/json")
//!     .with_global_error("default", ErrorCase::new("HTTP response not OK.", "ApiError"))
//!     .with_user_agent("example-sdk/{version} ({language}; {os-info})", HashMap::from([
//!         ("version".to_string(), "1.2.0".to_string()),
//!     ]));
//!
//! assert_eq!(config.base_uri("auth")?, "https://auth.example.com");
//! assert!(config.global_headers()["user-agent"].starts_with("example-sdk/1.2.0 (Rust; "));
//! # Ok::<(), apimatic_core::ApiError>(())
//! ```

mod client;

pub use client::ClientConfiguration;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::auth::{AuthManager, AuthManagers};
use crate::clients::HttpCallback;
use crate::error::{ApiError, Result};
use crate::response::ErrorCase;

/// Resolves a server identifier to a base URI.
pub type BaseUriExecutor = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Client-wide configuration.
#[derive(Clone, Default)]
pub struct GlobalConfiguration {
    client_configuration: ClientConfiguration,
    global_errors: HashMap<String, ErrorCase>,
    global_headers: HashMap<String, String>,
    additional_headers: HashMap<String, String>,
    auth_managers: AuthManagers,
    base_uri_executor: Option<BaseUriExecutor>,
}

// Verify GlobalConfiguration is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GlobalConfiguration>();
};

impl fmt::Debug for GlobalConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut auth_names: Vec<&String> = self.auth_managers.keys().collect();
        auth_names.sort();
        f.debug_struct("GlobalConfiguration")
            .field("client_configuration", &self.client_configuration)
            .field("global_errors", &self.global_errors)
            .field("global_headers", &self.global_headers)
            .field("additional_headers", &self.additional_headers)
            .field("auth_managers", &auth_names)
            .field("has_base_uri_executor", &self.base_uri_executor.is_some())
            .finish()
    }
}

impl GlobalConfiguration {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the client collaborators.
    #[must_use]
    pub fn with_client_configuration(mut self, client_configuration: ClientConfiguration) -> Self {
        self.client_configuration = client_configuration;
        self
    }

    /// Replaces the global error cases.
    #[must_use]
    pub fn with_global_errors(mut self, global_errors: HashMap<String, ErrorCase>) -> Self {
        self.global_errors = global_errors;
        self
    }

    /// Adds a global error case for a status code or `"default"`.
    #[must_use]
    pub fn with_global_error(mut self, status_code: impl Into<String>, error_case: ErrorCase) -> Self {
        self.global_errors.insert(status_code.into(), error_case);
        self
    }

    /// Replaces the global headers.
    #[must_use]
    pub fn with_global_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.global_headers = headers;
        self
    }

    /// Adds a global header.
    #[must_use]
    pub fn with_global_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.global_headers.insert(name.into(), value.into());
        self
    }

    /// Replaces the additional headers, which override global headers.
    #[must_use]
    pub fn with_additional_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.additional_headers = headers;
        self
    }

    /// Adds an additional header.
    #[must_use]
    pub fn with_additional_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.additional_headers.insert(name.into(), value.into());
        self
    }

    /// Replaces the auth managers.
    #[must_use]
    pub fn with_auth_managers(mut self, auth_managers: AuthManagers) -> Self {
        self.auth_managers = auth_managers;
        self
    }

    /// Registers one auth manager.
    #[must_use]
    pub fn with_auth_manager(
        mut self,
        name: impl Into<String>,
        auth_manager: Arc<dyn AuthManager>,
    ) -> Self {
        self.auth_managers.insert(name.into(), Some(auth_manager));
        self
    }

    /// Sets the base-URI executor.
    #[must_use]
    pub fn with_base_uri_executor<F>(mut self, executor: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.base_uri_executor = Some(Arc::new(executor));
        self
    }

    /// Renders a user agent and stores it as the global `user-agent` header.
    ///
    /// `{language}`, `{engine}`, `{engine-version}` and `{os-info}` are filled
    /// in automatically. Entries of `parameters` replace `{key}` and take
    /// precedence over the automatic values.
    #[must_use]
    pub fn with_user_agent(
        mut self,
        template: impl Into<String>,
        parameters: HashMap<String, String>,
    ) -> Self {
        let mut user_agent = template.into();
        for (key, value) in &parameters {
            let placeholder = if key.starts_with('{') {
                key.clone()
            } else {
                format!("{{{key}}}")
            };
            user_agent = user_agent.replace(&placeholder, value);
        }
        let defaults = [
            ("{language}", "Rust"),
            ("{engine}", "rustc"),
            ("{engine-version}", env!("CARGO_PKG_RUST_VERSION")),
            ("{os-info}", std::env::consts::OS),
        ];
        for (placeholder, value) in defaults {
            user_agent = user_agent.replace(placeholder, value);
        }
        self.global_headers
            .insert("user-agent".to_string(), user_agent);
        self
    }

    /// Returns the client collaborators.
    #[must_use]
    pub const fn client_configuration(&self) -> &ClientConfiguration {
        &self.client_configuration
    }

    /// Returns the global error cases.
    #[must_use]
    pub const fn global_errors(&self) -> &HashMap<String, ErrorCase> {
        &self.global_errors
    }

    /// Returns the global headers.
    #[must_use]
    pub const fn global_headers(&self) -> &HashMap<String, String> {
        &self.global_headers
    }

    /// Returns the additional headers.
    #[must_use]
    pub const fn additional_headers(&self) -> &HashMap<String, String> {
        &self.additional_headers
    }

    /// Returns the auth managers.
    #[must_use]
    pub const fn auth_managers(&self) -> &AuthManagers {
        &self.auth_managers
    }

    /// Resolves the base URI for `server`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if no base-URI executor is set.
    pub fn base_uri(&self, server: &str) -> Result<String> {
        let executor = self.base_uri_executor.as_ref().ok_or_else(|| {
            ApiError::configuration("A base URI executor is required to build a request.")
        })?;
        Ok(executor(server))
    }

    /// Returns a copy of this configuration with `http_callback` installed.
    ///
    /// Every other setting is shared with the original.
    #[must_use]
    pub fn clone_with_http_callback(&self, http_callback: Arc<dyn HttpCallback>) -> Self {
        let mut configuration = self.clone();
        configuration.client_configuration = configuration
            .client_configuration
            .with_http_callback(http_callback);
        configuration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpCallContext;

    #[test]
    fn test_base_uri_requires_executor() {
        let error = GlobalConfiguration::new().base_uri("default").unwrap_err();
        assert!(matches!(error, ApiError::Configuration { .. }));
    }

    #[test]
    fn test_user_agent_template() {
        let mut parameters = HashMap::new();
        parameters.insert("{version}".to_string(), "2.0.1".to_string());
        parameters.insert("engine".to_string(), "custom".to_string());
        let config =
            GlobalConfiguration::new().with_user_agent("sdk/{version} {language} {engine}", parameters);

        assert_eq!(
            config.global_headers().get("user-agent").map(String::as_str),
            Some("sdk/2.0.1 Rust custom")
        );
    }

    #[test]
    fn test_clone_with_http_callback_leaves_original_untouched() {
        let original = GlobalConfiguration::new().with_global_header("a", "1");
        let cloned = original.clone_with_http_callback(Arc::new(HttpCallContext::new()));

        assert!(original.client_configuration().http_callback().is_none());
        assert!(cloned.client_configuration().http_callback().is_some());
        assert_eq!(cloned.global_headers(), original.global_headers());
    }

    #[test]
    fn test_default_logger_is_present() {
        let config = GlobalConfiguration::new();
        assert!(config.client_configuration().http_client().is_none());
        let _ = config.client_configuration().logger();
    }
}
