//! Request and response logging.
//!
//! [`ApiCall`](crate::ApiCall) hands every request and response to the
//! configured [`ApiLogger`]. [`NilLogger`] discards everything;
//! [`SdkLogger`] writes `tracing` events at a configurable level, masking
//! credential-bearing headers.
//!
//! # Example
//!
//! ```rust
//! use apimatic_core::logger::{HttpLoggingConfiguration, LoggingConfiguration, SdkLogger};
//!
//! let logger = SdkLogger::new(
//!     LoggingConfiguration::new()
//!         .level(tracing::Level::DEBUG)
//!         .request(HttpLoggingConfiguration::new().log_headers(true))
//!         .response(HttpLoggingConfiguration::new().log_body(true)),
//! );
//! # let _ = logger;
//! ```

use std::collections::{BTreeMap, HashMap};

use tracing::Level;

use crate::clients::{HttpRequest, HttpResponse, RequestBody};

/// Placeholder written instead of masked header values.
pub const REDACTED: &str = "**Redacted**";

/// Headers masked unless explicitly unmasked.
pub const SENSITIVE_HEADERS: [&str; 4] = [
    "authorization",
    "www-authenticate",
    "proxy-authorization",
    "set-cookie",
];

/// Receives every request sent and response received.
pub trait ApiLogger: Send + Sync {
    /// Logs an outgoing request.
    fn log_request(&self, request: &HttpRequest);

    /// Logs an incoming response.
    fn log_response(&self, response: &HttpResponse);
}

/// A logger that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NilLogger;

impl ApiLogger for NilLogger {
    fn log_request(&self, _request: &HttpRequest) {}

    fn log_response(&self, _response: &HttpResponse) {}
}

/// What to log for one direction of the exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpLoggingConfiguration {
    log_body: bool,
    log_headers: bool,
    headers_to_include: Vec<String>,
    headers_to_exclude: Vec<String>,
    headers_to_unmask: Vec<String>,
}

impl HttpLoggingConfiguration {
    /// Logs neither headers nor bodies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables body logging.
    #[must_use]
    pub const fn log_body(mut self, enabled: bool) -> Self {
        self.log_body = enabled;
        self
    }

    /// Enables header logging.
    #[must_use]
    pub const fn log_headers(mut self, enabled: bool) -> Self {
        self.log_headers = enabled;
        self
    }

    /// Logs only these headers. Takes precedence over exclusions.
    #[must_use]
    pub fn headers_to_include(mut self, headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.headers_to_include = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Never logs these headers.
    #[must_use]
    pub fn headers_to_exclude(mut self, headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.headers_to_exclude = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Logs these sensitive headers unmasked.
    #[must_use]
    pub fn headers_to_unmask(mut self, headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.headers_to_unmask = headers.into_iter().map(Into::into).collect();
        self
    }

    fn contains(list: &[String], name: &str) -> bool {
        list.iter().any(|entry| entry.eq_ignore_ascii_case(name))
    }

    fn render_headers(&self, headers: &HashMap<String, String>, mask_sensitive: bool) -> String {
        let filtered: BTreeMap<String, &str> = headers
            .iter()
            .filter(|(name, _)| {
                if self.headers_to_include.is_empty() {
                    !Self::contains(&self.headers_to_exclude, name)
                } else {
                    Self::contains(&self.headers_to_include, name)
                }
            })
            .map(|(name, value)| {
                let masked = mask_sensitive
                    && SENSITIVE_HEADERS
                        .iter()
                        .any(|sensitive| sensitive.eq_ignore_ascii_case(name))
                    && !Self::contains(&self.headers_to_unmask, name);
                (name.to_lowercase(), if masked { REDACTED } else { value.as_str() })
            })
            .collect();

        filtered
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Settings for [`SdkLogger`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfiguration {
    level: Level,
    mask_sensitive_headers: bool,
    include_query_in_path: bool,
    request: HttpLoggingConfiguration,
    response: HttpLoggingConfiguration,
}

impl Default for LoggingConfiguration {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            mask_sensitive_headers: true,
            include_query_in_path: false,
            request: HttpLoggingConfiguration::default(),
            response: HttpLoggingConfiguration::default(),
        }
    }
}

impl LoggingConfiguration {
    /// `INFO` level, masked headers, no bodies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the event level.
    #[must_use]
    pub const fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Controls masking of sensitive headers. Enabled by default.
    #[must_use]
    pub const fn mask_sensitive_headers(mut self, enabled: bool) -> Self {
        self.mask_sensitive_headers = enabled;
        self
    }

    /// Includes the query string in logged URLs.
    #[must_use]
    pub const fn include_query_in_path(mut self, enabled: bool) -> Self {
        self.include_query_in_path = enabled;
        self
    }

    /// Sets the request settings.
    #[must_use]
    pub fn request(mut self, request: HttpLoggingConfiguration) -> Self {
        self.request = request;
        self
    }

    /// Sets the response settings.
    #[must_use]
    pub fn response(mut self, response: HttpLoggingConfiguration) -> Self {
        self.response = response;
        self
    }
}

/// Emits a `tracing` event at a level chosen at runtime.
macro_rules! event_at {
    ($level:expr, $($event:tt)+) => {{
        let level = $level;
        if level == Level::ERROR {
            tracing::error!($($event)+);
        } else if level == Level::WARN {
            tracing::warn!($($event)+);
        } else if level == Level::INFO {
            tracing::info!($($event)+);
        } else if level == Level::DEBUG {
            tracing::debug!($($event)+);
        } else {
            tracing::trace!($($event)+);
        }
    }};
}

/// Logs requests and responses through `tracing`.
///
/// Events carry `method`, `url` and `content_type` fields for requests and
/// `status`, `content_length` and `content_type` fields for responses.
/// Headers and bodies, when enabled, are emitted as separate events with a
/// `headers` or `body` field.
#[derive(Clone, Debug, Default)]
pub struct SdkLogger {
    configuration: LoggingConfiguration,
}

impl SdkLogger {
    /// Creates a logger.
    #[must_use]
    pub const fn new(configuration: LoggingConfiguration) -> Self {
        Self { configuration }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn configuration(&self) -> &LoggingConfiguration {
        &self.configuration
    }

    /// Returns the request URL as logged, without the query string unless
    /// [`LoggingConfiguration::include_query_in_path`] is set.
    #[must_use]
    pub fn logged_url<'a>(&self, request: &'a HttpRequest) -> &'a str {
        let url = request.query_url.as_str();
        if self.configuration.include_query_in_path {
            url
        } else {
            url.split_once('?').map_or(url, |(path, _)| path)
        }
    }

    /// Formats headers with filtering and masking applied.
    #[must_use]
    pub fn format_request_headers(&self, request: &HttpRequest) -> String {
        self.configuration
            .request
            .render_headers(&request.headers, self.configuration.mask_sensitive_headers)
    }

    /// Formats headers with filtering and masking applied.
    #[must_use]
    pub fn format_response_headers(&self, response: &HttpResponse) -> String {
        self.configuration
            .response
            .render_headers(&response.headers, self.configuration.mask_sensitive_headers)
    }
}

fn render_body(body: &RequestBody) -> String {
    match body {
        RequestBody::Text(text) => text.clone(),
        RequestBody::Json(value) => value.to_string(),
        RequestBody::Form(fields) => fields
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&"),
        RequestBody::Multipart(parts) => format!("[multipart: {} parts]", parts.len()),
        RequestBody::Binary(file) => format!("[binary: {} bytes]", file.len()),
    }
}

impl ApiLogger for SdkLogger {
    fn log_request(&self, request: &HttpRequest) {
        let level = self.configuration.level;
        let method = request.http_method.as_str();
        let url = self.logged_url(request);
        event_at!(
            level,
            method,
            url,
            content_type = request.header("content-type").unwrap_or_default(),
            "Request"
        );

        let settings = &self.configuration.request;
        if settings.log_headers {
            let headers = self.format_request_headers(request);
            event_at!(level, method, url, headers = %headers, "Request headers");
        }
        if settings.log_body {
            if let Some(body) = &request.parameters {
                let body = render_body(body);
                event_at!(level, method, url, body = %body, "Request body");
            }
        }
    }

    fn log_response(&self, response: &HttpResponse) {
        let level = self.configuration.level;
        let status = response.status_code;
        event_at!(
            level,
            status,
            content_length = response.header("content-length").unwrap_or_default(),
            content_type = response.content_type().unwrap_or_default(),
            "Response"
        );

        let settings = &self.configuration.response;
        if settings.log_headers {
            let headers = self.format_response_headers(response);
            event_at!(level, status, headers = %headers, "Response headers");
        }
        if settings.log_body && !response.raw_body.is_empty() {
            event_at!(level, status, body = %response.raw_body, "Response body");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpMethod;
    use tracing_test::traced_test;

    fn request() -> HttpRequest {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer secret".to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("X-Trace".to_string(), "t-1".to_string());
        HttpRequest::new(
            HttpMethod::Post,
            "https://example.com/items?api_key=secret",
            headers,
            Some(RequestBody::Json(serde_json::json!({"a": 1}))),
            HashMap::new(),
        )
    }

    #[test]
    fn test_logged_url_hides_query_by_default() {
        let request = request();
        let logger = SdkLogger::default();
        assert_eq!(logger.logged_url(&request), "https://example.com/items");

        let logger = SdkLogger::new(LoggingConfiguration::new().include_query_in_path(true));
        assert_eq!(
            logger.logged_url(&request),
            "https://example.com/items?api_key=secret"
        );
    }

    #[test]
    #[traced_test]
    fn test_events_carry_structured_fields() {
        let logger = SdkLogger::new(
            LoggingConfiguration::new()
                .level(Level::INFO)
                .request(HttpLoggingConfiguration::new().log_headers(true))
                .response(HttpLoggingConfiguration::new().log_body(true)),
        );
        logger.log_request(&request());
        logger.log_response(&HttpResponse::new(
            201,
            "Created",
            HashMap::new(),
            "{}",
            request(),
        ));

        assert!(logs_contain("method=\"POST\""));
        assert!(logs_contain("url=\"https://example.com/items\""));
        assert!(logs_contain("content_type=\"application/json\""));
        assert!(logs_contain("headers=authorization: **Redacted**"));
        assert!(logs_contain("status=201"));
        assert!(logs_contain("body={}"));
        assert!(!logs_contain("api_key=secret"));
    }

    #[test]
    fn test_sensitive_headers_are_masked() {
        let logger = SdkLogger::default();
        assert_eq!(
            logger.format_request_headers(&request()),
            "authorization: **Redacted**, content-type: application/json, x-trace: t-1"
        );
    }

    #[test]
    fn test_unmask_and_disable_masking() {
        let logger = SdkLogger::new(
            LoggingConfiguration::new()
                .request(HttpLoggingConfiguration::new().headers_to_unmask(["authorization"])),
        );
        assert!(logger
            .format_request_headers(&request())
            .contains("authorization: Bearer secret"));

        let logger = SdkLogger::new(LoggingConfiguration::new().mask_sensitive_headers(false));
        assert!(logger
            .format_request_headers(&request())
            .contains("authorization: Bearer secret"));
    }

    #[test]
    fn test_include_and_exclude_filters() {
        let logger = SdkLogger::new(
            LoggingConfiguration::new()
                .request(HttpLoggingConfiguration::new().headers_to_include(["x-trace"])),
        );
        assert_eq!(logger.format_request_headers(&request()), "x-trace: t-1");

        let logger = SdkLogger::new(LoggingConfiguration::new().request(
            HttpLoggingConfiguration::new().headers_to_exclude(["x-trace", "authorization"]),
        ));
        assert_eq!(
            logger.format_request_headers(&request()),
            "content-type: application/json"
        );
    }

    #[test]
    fn test_render_body_variants() {
        assert_eq!(
            render_body(&RequestBody::Form(vec![("a".to_string(), "1".to_string())])),
            "a=1"
        );
        assert_eq!(
            render_body(&RequestBody::Binary(crate::clients::FileWrapper::new(vec![1, 2]))),
            "[binary: 2 bytes]"
        );
    }

    #[test]
    fn test_logging_at_every_level() {
        let logger = SdkLogger::new(
            LoggingConfiguration::new()
                .level(Level::DEBUG)
                .request(HttpLoggingConfiguration::new().log_body(true).log_headers(true)),
        );
        logger.log_request(&request());
        NilLogger.log_request(&request());

        let mut headers = HashMap::new();
        headers.insert("content-length".to_string(), "2".to_string());
        let response = HttpResponse::new(200, "OK", headers, "{}", request());
        for level in [Level::ERROR, Level::WARN, Level::INFO, Level::TRACE] {
            let logger = SdkLogger::new(
                LoggingConfiguration::new()
                    .level(level)
                    .response(HttpLoggingConfiguration::new().log_body(true).log_headers(true)),
            );
            logger.log_response(&response);
        }
    }
}
