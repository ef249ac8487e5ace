//! Per-client collaborators: transport, callback and logger.

use std::fmt;
use std::sync::Arc;

use crate::clients::{HttpCallback, HttpClient};
use crate::logger::{ApiLogger, NilLogger};

/// The collaborators an [`ApiCall`](crate::ApiCall) needs to reach the network.
///
/// The logger defaults to [`NilLogger`]; the transport and callback default
/// to `None`.
#[derive(Clone)]
pub struct ClientConfiguration {
    http_client: Option<Arc<dyn HttpClient>>,
    http_callback: Option<Arc<dyn HttpCallback>>,
    logger: Arc<dyn ApiLogger>,
}

impl Default for ClientConfiguration {
    fn default() -> Self {
        Self {
            http_client: None,
            http_callback: None,
            logger: Arc::new(NilLogger),
        }
    }
}

impl fmt::Debug for ClientConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfiguration")
            .field("has_http_client", &self.http_client.is_some())
            .field("has_http_callback", &self.http_callback.is_some())
            .finish_non_exhaustive()
    }
}

impl ClientConfiguration {
    /// Creates a configuration without a transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transport.
    #[must_use]
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Sets the callback notified around each transport call.
    #[must_use]
    pub fn with_http_callback(mut self, http_callback: Arc<dyn HttpCallback>) -> Self {
        self.http_callback = Some(http_callback);
        self
    }

    /// Sets the request/response logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn ApiLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Returns the transport, if configured.
    #[must_use]
    pub const fn http_client(&self) -> Option<&Arc<dyn HttpClient>> {
        self.http_client.as_ref()
    }

    /// Returns the callback, if configured.
    #[must_use]
    pub const fn http_callback(&self) -> Option<&Arc<dyn HttpCallback>> {
        self.http_callback.as_ref()
    }

    /// Returns the logger.
    #[must_use]
    pub const fn logger(&self) -> &Arc<dyn ApiLogger> {
        &self.logger
    }
}
