//! HTTP response types returned by the transport.
//!
//! [`HttpResponse`] is an immutable value object. Besides plain accessors it
//! supports pointer-based extraction from the JSON body or the headers, which
//! the pagination strategies use to find cursors and next links.

use std::collections::HashMap;

use serde_json::Value;

use crate::clients::HttpRequest;
use crate::request::json_pointer::resolve_response_pointer;

/// An HTTP response produced by an [`HttpClient`](crate::clients::HttpClient).
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status_code: u16,
    /// The reason phrase sent with the status line.
    pub reason_phrase: String,
    /// Response headers. Repeated headers are joined with `", "`.
    pub headers: HashMap<String, String>,
    /// The raw, undecoded response body.
    pub raw_body: String,
    /// The request that produced this response.
    pub request: HttpRequest,
}

impl HttpResponse {
    /// Creates a new response.
    #[must_use]
    pub fn new(
        status_code: u16,
        reason_phrase: impl Into<String>,
        headers: HashMap<String, String>,
        raw_body: impl Into<String>,
        request: HttpRequest,
    ) -> Self {
        Self {
            status_code,
            reason_phrase: reason_phrase.into(),
            headers,
            raw_body: raw_body.into(),
            request,
        }
    }

    /// Returns `true` if the status code is in the `200..=208` success range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code <= 208
    }

    /// Returns a header value, matching the name case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the `Content-Type` header, if present.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Parses the raw body as JSON.
    ///
    /// Returns `None` for empty or non-JSON bodies.
    #[must_use]
    pub fn json_body(&self) -> Option<Value> {
        if self.raw_body.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.raw_body).ok()
    }

    /// Resolves a `$response.body` or `$response.headers` pointer.
    ///
    /// Returns `None` when the pointer cannot be resolved or resolves to `null`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use apimatic_core::clients::{HttpMethod, HttpRequest, HttpResponse};
    /// use std::collections::HashMap;
    /// use serde_json::json;
    ///
    /// let request = HttpRequest::new(
    ///     HttpMethod::Get, "https://example.com", HashMap::new(), None, HashMap::new(),
    /// );
    /// let response = HttpResponse::new(
    ///     200, "OK", HashMap::new(), r#"{"meta":{"cursor":"abc"}}"#, request,
    /// );
    ///
    /// assert_eq!(response.resolve_pointer("$response.body#/meta/cursor"), Some(json!("abc")));
    /// ```
    #[must_use]
    pub fn resolve_pointer(&self, pointer: &str) -> Option<Value> {
        resolve_response_pointer(pointer, &self.raw_body, &self.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpMethod;
    use serde_json::json;

    fn response(code: u16, headers: HashMap<String, String>, body: &str) -> HttpResponse {
        let request = HttpRequest::new(
            HttpMethod::Get,
            "https://example.com",
            HashMap::new(),
            None,
            HashMap::new(),
        );
        HttpResponse::new(code, "", headers, body, request)
    }

    #[test]
    fn test_is_success_covers_200_to_208() {
        for code in 200..=208 {
            assert!(response(code, HashMap::new(), "").is_success());
        }
        assert!(!response(226, HashMap::new(), "").is_success());
        assert!(!response(404, HashMap::new(), "").is_success());
        assert!(!response(500, HashMap::new(), "").is_success());
    }

    #[test]
    fn test_json_body_handles_empty_and_invalid_bodies() {
        assert!(response(200, HashMap::new(), "").json_body().is_none());
        assert!(response(200, HashMap::new(), "not json").json_body().is_none());
        assert_eq!(
            response(200, HashMap::new(), r#"{"a":1}"#).json_body(),
            Some(json!({"a": 1}))
        );
    }

    #[test]
    fn test_resolve_pointer_reads_headers() {
        let mut headers = HashMap::new();
        headers.insert("X-Next-Page".to_string(), "3".to_string());
        let response = response(200, headers, "{}");

        assert_eq!(
            response.resolve_pointer("$response.headers#/x-next-page"),
            Some(json!("3"))
        );
        assert_eq!(response.content_type(), None);
    }

    #[test]
    fn test_resolve_pointer_ignores_null_values() {
        let response = response(200, HashMap::new(), r#"{"next":null}"#);
        assert!(response.resolve_pointer("$response.body#/next").is_none());
    }
}
