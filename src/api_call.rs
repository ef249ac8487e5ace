//! One endpoint invocation: build, send, handle.
//!
//! An [`ApiCall`] ties a [`RequestBuilder`] and a [`ResponseHandler`] to the
//! shared [`GlobalConfiguration`] and drives one request/response round trip
//! through the configured [`HttpClient`](crate::clients::HttpClient).
//!
//! # Example
//!
//! ```rust,no_run
//! use apimatic_core::clients::{HttpMethod, ReqwestHttpClient};
//! use apimatic_core::config::{ClientConfiguration, GlobalConfiguration};
//! use apimatic_core::request::{Parameter, RequestBuilder};
//! use apimatic_core::response::{json_deserializer, ResponseHandler};
//! use apimatic_core::ApiCall;
//! use std::sync::Arc;
//!
//! let config = Arc::new(
//!     GlobalConfiguration::new()
//!         .with_base_uri_executor(|_| "https://api.example.com".to_string())
//!         .with_client_configuration(
//!             ClientConfiguration::new().with_http_client(Arc::new(ReqwestHttpClient::new()?)),
//!         ),
//! );
//!
//! let item = ApiCall::<serde_json::Value>::new(config)
//!     .request(
//!         RequestBuilder::new()
//!             .path("/items/{id}")
//!             .http_method(HttpMethod::Get)
//!             .template_param(Parameter::new().key("id").value(42)),
//!     )
//!     .response(ResponseHandler::new().deserializer(json_deserializer()))
//!     .endpoint_context("endpoint_name", "get_item")
//!     .execute()?;
//! # let _ = item;
//! # Ok::<(), apimatic_core::ApiError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::GlobalConfiguration;
use crate::error::{ApiError, Result};
use crate::pagination::{ItemsConverter, PaginatedData, PaginationStrategy};
use crate::request::RequestBuilder;
use crate::response::{ResponseHandler, ResponseValue};

/// A configured endpoint call.
pub struct ApiCall<T> {
    global_configuration: Arc<GlobalConfiguration>,
    request_builder: RequestBuilder,
    response_handler: Arc<ResponseHandler<T>>,
    endpoint_context: HashMap<String, Value>,
}

impl<T> Clone for ApiCall<T> {
    fn clone(&self) -> Self {
        Self {
            global_configuration: Arc::clone(&self.global_configuration),
            request_builder: self.request_builder.clone(),
            response_handler: Arc::clone(&self.response_handler),
            endpoint_context: self.endpoint_context.clone(),
        }
    }
}

impl<T> fmt::Debug for ApiCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCall")
            .field("global_configuration", &self.global_configuration)
            .field("request_builder", &self.request_builder)
            .field("response_handler", &self.response_handler)
            .field("endpoint_context", &self.endpoint_context)
            .finish()
    }
}

impl<T> ApiCall<T> {
    /// Creates a call with an empty request and a default handler.
    #[must_use]
    pub fn new(global_configuration: Arc<GlobalConfiguration>) -> Self {
        Self {
            global_configuration,
            request_builder: RequestBuilder::new(),
            response_handler: Arc::new(ResponseHandler::new()),
            endpoint_context: HashMap::new(),
        }
    }

    /// Sets the request builder.
    #[must_use]
    pub fn request(mut self, request_builder: RequestBuilder) -> Self {
        self.request_builder = request_builder;
        self
    }

    /// Sets the response handler.
    #[must_use]
    pub fn response(mut self, response_handler: ResponseHandler<T>) -> Self {
        self.response_handler = Arc::new(response_handler);
        self
    }

    /// Adds an endpoint context entry, handed to the built request.
    #[must_use]
    pub fn endpoint_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.endpoint_context.insert(key.into(), value.into());
        self
    }

    /// Returns the global configuration.
    #[must_use]
    pub const fn global_configuration(&self) -> &Arc<GlobalConfiguration> {
        &self.global_configuration
    }

    /// Returns the request builder.
    #[must_use]
    pub const fn request_builder(&self) -> &RequestBuilder {
        &self.request_builder
    }

    /// Returns the response handler.
    #[must_use]
    pub fn response_handler(&self) -> &ResponseHandler<T> {
        &self.response_handler
    }

    /// Returns the endpoint context.
    #[must_use]
    pub const fn context(&self) -> &HashMap<String, Value> {
        &self.endpoint_context
    }

    /// Returns a copy with the configuration and/or request builder replaced.
    #[must_use]
    pub fn clone_with(
        &self,
        global_configuration: Option<Arc<GlobalConfiguration>>,
        request_builder: Option<RequestBuilder>,
    ) -> Self {
        let mut call = self.clone();
        if let Some(configuration) = global_configuration {
            call.global_configuration = configuration;
        }
        if let Some(builder) = request_builder {
            call.request_builder = builder;
        }
        call
    }

    fn endpoint_name(&self) -> &str {
        self.endpoint_context
            .get("endpoint_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Builds the request, sends it and handles the response.
    ///
    /// The HTTP callback and logger, when configured, see the request before
    /// it is sent and the response before it is handled.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Configuration`] if no HTTP client is configured.
    /// - Any error from [`RequestBuilder::build_with_configuration`].
    /// - Transport errors, unchanged.
    /// - Any error from [`ResponseHandler::handle`].
    pub fn execute(&self) -> Result<ResponseValue<T>> {
        let endpoint = self.endpoint_name();
        let client_configuration = self.global_configuration.client_configuration();
        let http_client = client_configuration.http_client().ok_or_else(|| {
            ApiError::configuration("An HTTP client instance is required to execute an Api call.")
        })?;

        let request = self
            .request_builder
            .build_with_configuration(&self.global_configuration, self.endpoint_context.clone())?;

        tracing::debug!(
            endpoint_name = endpoint,
            method = %request.http_method,
            url = %request.query_url,
            "Sending API request"
        );

        if let Some(callback) = client_configuration.http_callback() {
            callback.on_before_request(&request);
        }
        client_configuration.logger().log_request(&request);

        let response = http_client.execute(&request).map_err(|error| {
            tracing::error!(endpoint_name = endpoint, error = %error, "API request failed");
            error
        })?;

        client_configuration.logger().log_response(&response);
        if let Some(callback) = client_configuration.http_callback() {
            callback.on_after_response(&response);
        }

        tracing::debug!(
            endpoint_name = endpoint,
            status = response.status_code,
            "Received API response"
        );

        self.response_handler
            .handle(&response, self.global_configuration.global_errors())
    }

    /// Starts a paginated traversal of this call.
    ///
    /// `converter` extracts the items of one page; `strategies` are tried in
    /// order until one proves applicable.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] if `strategies` is empty.
    pub fn paginate<I, F>(
        &self,
        converter: F,
        strategies: Vec<PaginationStrategy>,
    ) -> Result<PaginatedData<T, I>>
    where
        F: Fn(&T) -> Option<Vec<I>> + Send + Sync + 'static,
    {
        let converter: ItemsConverter<T, I> = Arc::new(converter);
        PaginatedData::new(self.clone(), converter, strategies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{HttpCallback, HttpClient, HttpRequest, HttpResponse};
    use crate::config::ClientConfiguration;
    use crate::logger::ApiLogger;
    use crate::response::{json_deserializer, ErrorCase};
    use serde_json::json;
    use std::sync::Mutex;

    struct StaticClient {
        status: u16,
        body: &'static str,
    }

    impl HttpClient for StaticClient {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
            Ok(HttpResponse::new(
                self.status,
                "",
                HashMap::new(),
                self.body,
                request.clone(),
            ))
        }
    }

    struct FailingClient;

    impl HttpClient for FailingClient {
        fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse> {
            Err(ApiError::transport("connection reset"))
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl HttpCallback for Recorder {
        fn on_before_request(&self, request: &HttpRequest) {
            self.events
                .lock()
                .unwrap()
                .push(format!("before {}", request.query_url));
        }

        fn on_after_response(&self, response: &HttpResponse) {
            self.events
                .lock()
                .unwrap()
                .push(format!("after {}", response.status_code));
        }
    }

    impl ApiLogger for Recorder {
        fn log_request(&self, _request: &HttpRequest) {
            self.events.lock().unwrap().push("log request".to_string());
        }

        fn log_response(&self, _response: &HttpResponse) {
            self.events.lock().unwrap().push("log response".to_string());
        }
    }

    fn config(client: Option<Arc<dyn HttpClient>>) -> GlobalConfiguration {
        let mut client_configuration = ClientConfiguration::new();
        if let Some(client) = client {
            client_configuration = client_configuration.with_http_client(client);
        }
        GlobalConfiguration::new()
            .with_base_uri_executor(|_| "https://example.com".to_string())
            .with_client_configuration(client_configuration)
    }

    #[test]
    fn test_execute_requires_http_client() {
        let error = ApiCall::<Value>::new(Arc::new(config(None)))
            .execute()
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "An HTTP client instance is required to execute an Api call."
        );
    }

    #[test]
    fn test_execute_deserializes_body() {
        let client = Arc::new(StaticClient {
            status: 200,
            body: r#"{"id":7}"#,
        });
        let value = ApiCall::new(Arc::new(config(Some(client))))
            .request(RequestBuilder::new().path("/items"))
            .response(ResponseHandler::new().deserializer(json_deserializer()))
            .execute()
            .unwrap();
        assert_eq!(value.into_data(), Some(json!({"id": 7})));
    }

    #[test]
    fn test_callback_and_logger_order() {
        let recorder = Arc::new(Recorder::default());
        let client = Arc::new(StaticClient { status: 204, body: "" });
        let configuration = config(None).with_client_configuration(
            ClientConfiguration::new()
                .with_http_client(client)
                .with_http_callback(recorder.clone())
                .with_logger(recorder.clone()),
        );

        ApiCall::<Value>::new(Arc::new(configuration))
            .request(RequestBuilder::new().path("/ping"))
            .execute()
            .unwrap();

        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![
                "before https://example.com/ping".to_string(),
                "log request".to_string(),
                "log response".to_string(),
                "after 204".to_string(),
            ]
        );
    }

    #[test]
    fn test_transport_errors_propagate() {
        let error = ApiCall::<Value>::new(Arc::new(config(Some(Arc::new(FailingClient)))))
            .execute()
            .unwrap_err();
        assert!(matches!(error, ApiError::Transport { .. }));
    }

    #[test]
    fn test_global_errors_are_applied() {
        let client = Arc::new(StaticClient { status: 500, body: "" });
        let configuration = config(Some(client))
            .with_global_error("default", ErrorCase::new("Server failed", "ServerError"));
        let error = ApiCall::<Value>::new(Arc::new(configuration))
            .execute()
            .unwrap_err();
        assert_eq!(error.status_kind(), Some("ServerError"));
    }

    #[test]
    fn test_endpoint_context_reaches_request() {
        struct ContextEcho;

        impl HttpClient for ContextEcho {
            fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
                let body = serde_json::to_string(&request.context)?;
                Ok(HttpResponse::new(200, "", HashMap::new(), body, request.clone()))
            }
        }

        let value = ApiCall::new(Arc::new(config(Some(Arc::new(ContextEcho)))))
            .response(ResponseHandler::new().deserializer(json_deserializer()))
            .endpoint_context("endpoint_name", "list_items")
            .execute()
            .unwrap();
        assert_eq!(value.into_data(), Some(json!({"endpoint_name": "list_items"})));
    }

    #[test]
    fn test_clone_with_replaces_request_builder() {
        let call = ApiCall::<Value>::new(Arc::new(config(None)))
            .request(RequestBuilder::new().path("/a"));
        let cloned = call.clone_with(None, Some(RequestBuilder::new().path("/b")));

        assert_eq!(call.request_builder().path_template(), "/a");
        assert_eq!(cloned.request_builder().path_template(), "/b");
        assert!(Arc::ptr_eq(call.global_configuration(), cloned.global_configuration()));
    }

    #[test]
    fn test_paginate_requires_a_strategy() {
        let error = ApiCall::<Value>::new(Arc::new(config(None)))
            .paginate(|_: &Value| None::<Vec<Value>>, Vec::new())
            .unwrap_err();
        assert!(matches!(error, ApiError::InvalidArgument { .. }));
    }
}
