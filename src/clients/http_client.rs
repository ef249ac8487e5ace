//! Transport abstraction and the built-in reqwest adapter.
//!
//! The runtime core never talks to the network directly. Every request goes
//! through an injected [`HttpClient`], which makes the whole pipeline testable
//! with scripted transports. [`ReqwestHttpClient`] is the default
//! implementation, backed by `reqwest::blocking`.
//!
//! # Example
//!
//! ```rust,no_run
//! use apimatic_core::clients::{HttpClient, HttpMethod, HttpRequest, ReqwestHttpClient};
//! use std::collections::HashMap;
//! use std::time::Duration;
//!
//! let client = ReqwestHttpClient::builder()
//!     .timeout(Duration::from_secs(30))
//!     .build()?;
//!
//! let request = HttpRequest::new(
//!     HttpMethod::Get,
//!     "https://api.example.com/items",
//!     HashMap::new(),
//!     None,
//!     HashMap::new(),
//! );
//! let response = client.execute(&request)?;
//! println!("{}", response.status_code);
//! # Ok::<(), apimatic_core::ApiError>(())
//! ```

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};

use crate::clients::http_request::{MultipartPart, MultipartValue, RequestBody};
use crate::clients::{HttpMethod, HttpRequest, HttpResponse};
use crate::error::{ApiError, Result};

/// Executes built requests.
///
/// Implementations must be safe to share across threads. Errors returned by
/// the transport are propagated to the caller unchanged.
pub trait HttpClient: Send + Sync {
    /// Sends `request` and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be sent or the response
    /// could not be read. Non-2xx statuses are not errors at this level.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// [`HttpClient`] backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::blocking::Client,
    default_headers: HashMap<String, String>,
}

// Verify ReqwestHttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestHttpClient>();
};

impl ReqwestHttpClient {
    /// Creates a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Returns a builder for a customized client.
    #[must_use]
    pub fn builder() -> ReqwestHttpClientBuilder {
        ReqwestHttpClientBuilder::default()
    }

    /// Returns the headers added to every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }

    fn multipart_form(parts: &[MultipartPart]) -> Result<Form> {
        let mut form = Form::new();
        for part in parts {
            let mut body = match &part.value {
                MultipartValue::Text(text) => Part::text(text.clone()),
                MultipartValue::File(file) => {
                    let mut body = Part::bytes(file.bytes().to_vec());
                    if let Some(file_name) = file.file_name() {
                        body = body.file_name(file_name.to_string());
                    }
                    body
                }
            };
            if let Some(content_type) = &part.content_type {
                body = body.mime_str(content_type)?;
            }
            form = form.part(part.name.clone(), body);
        }
        Ok(form)
    }

    /// Lower-cases header names and joins repeated values with `", "`.
    fn parse_response_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
        let mut result: HashMap<String, String> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default();
            result
                .entry(key)
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        result
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(Self::method(request.http_method), &request.query_url);

        for (key, value) in &self.default_headers {
            if request.header(key).is_none() {
                builder = builder.header(key, value);
            }
        }
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        builder = match &request.parameters {
            None => builder,
            Some(RequestBody::Text(text)) => builder.body(text.clone()),
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            Some(RequestBody::Multipart(parts)) => builder.multipart(Self::multipart_form(parts)?),
            Some(RequestBody::Binary(file)) => builder.body(file.bytes().to_vec()),
        };

        let res = builder.send()?;

        let status = res.status();
        let reason_phrase = status.canonical_reason().unwrap_or_default().to_string();
        let headers = Self::parse_response_headers(res.headers());
        let raw_body = res.text()?;

        tracing::trace!(
            status = status.as_u16(),
            url = %request.query_url,
            "transport call completed"
        );

        Ok(HttpResponse::new(
            status.as_u16(),
            reason_phrase,
            headers,
            raw_body,
            request.clone(),
        ))
    }
}

/// Builder for [`ReqwestHttpClient`].
#[derive(Debug, Default)]
pub struct ReqwestHttpClientBuilder {
    timeout: Option<Duration>,
    default_headers: HashMap<String, String>,
}

impl ReqwestHttpClientBuilder {
    /// Sets the total request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a header sent with every request unless the request sets it.
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the TLS backend cannot be initialized.
    pub fn build(self) -> Result<ReqwestHttpClient> {
        let mut builder = reqwest::blocking::Client::builder().use_rustls_tls();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ApiError::from)?;

        Ok(ReqwestHttpClient {
            client,
            default_headers: self.default_headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_mapping() {
        assert_eq!(ReqwestHttpClient::method(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(ReqwestHttpClient::method(HttpMethod::Patch), reqwest::Method::PATCH);
        assert_eq!(ReqwestHttpClient::method(HttpMethod::Head), reqwest::Method::HEAD);
    }

    #[test]
    fn test_parse_response_headers_joins_duplicates() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.append("Set-Cookie", "a=1".parse().unwrap());
        headers.append("Set-Cookie", "b=2".parse().unwrap());
        headers.insert("Content-Type", "application/json".parse().unwrap());

        let parsed = ReqwestHttpClient::parse_response_headers(&headers);
        assert_eq!(parsed.get("set-cookie").map(String::as_str), Some("a=1, b=2"));
        assert_eq!(
            parsed.get("content-type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_builder_keeps_default_headers() {
        let client = ReqwestHttpClient::builder()
            .default_header("Accept", "application/json")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(
            client.default_headers().get("Accept").map(String::as_str),
            Some("application/json")
        );
    }
}
