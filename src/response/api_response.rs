//! Uniform response envelope.

use std::collections::HashMap;

use serde_json::Value;

use crate::clients::{HttpRequest, HttpResponse};

/// A deserialized response together with its HTTP metadata.
///
/// `errors` holds the entries of a top-level `errors` key in the JSON body,
/// if present.
#[derive(Clone, Debug)]
pub struct ApiResponse<T> {
    /// The HTTP status code.
    pub status_code: u16,
    /// The reason phrase.
    pub reason_phrase: String,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// The raw body.
    pub raw_body: String,
    /// The request that produced the response.
    pub request: HttpRequest,
    /// The deserialized body.
    pub data: Option<T>,
    /// Errors reported in the body.
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    /// Wraps `response` and its deserialized body.
    #[must_use]
    pub fn new(response: &HttpResponse, data: Option<T>) -> Self {
        Self {
            status_code: response.status_code,
            reason_phrase: response.reason_phrase.clone(),
            headers: response.headers.clone(),
            raw_body: response.raw_body.clone(),
            request: response.request.clone(),
            data,
            errors: extract_errors(response),
        }
    }

    /// Returns `true` for status codes in `200..=208`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code >= 200 && self.status_code <= 208
    }

    /// Returns `true` for status codes outside the success range.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// Maps the deserialized body, keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            status_code: self.status_code,
            reason_phrase: self.reason_phrase,
            headers: self.headers,
            raw_body: self.raw_body,
            request: self.request,
            data: self.data.map(f),
            errors: self.errors,
        }
    }
}

fn extract_errors(response: &HttpResponse) -> Option<Vec<String>> {
    let body = response.json_body()?;
    let errors = body.get("errors")?;
    let text = |value: &Value| match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    match errors {
        Value::Null => None,
        Value::Array(items) => Some(items.iter().map(text).collect()),
        other => Some(vec![text(other)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpMethod;

    fn response(code: u16, body: &str) -> HttpResponse {
        let request = HttpRequest::new(
            HttpMethod::Get,
            "https://example.com",
            HashMap::new(),
            None,
            HashMap::new(),
        );
        HttpResponse::new(code, "", HashMap::new(), body, request)
    }

    #[test]
    fn test_envelope_extracts_errors() {
        let envelope: ApiResponse<i32> =
            ApiResponse::new(&response(400, r#"{"errors":["a",{"b":1}]}"#), None);
        assert!(envelope.is_error());
        assert_eq!(
            envelope.errors,
            Some(vec!["a".to_string(), r#"{"b":1}"#.to_string()])
        );
    }

    #[test]
    fn test_envelope_without_errors() {
        let envelope = ApiResponse::new(&response(200, r#"{"id":1}"#), Some(1));
        assert!(envelope.is_success());
        assert!(envelope.errors.is_none());
        assert_eq!(envelope.map(|n| n + 1).data, Some(2));
    }
}
