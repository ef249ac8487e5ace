//! Declared error cases and their message templates.

use crate::clients::HttpResponse;
use crate::error::{ApiError, ApiStatusError};

/// Maps an expected status code to a raised error.
///
/// Template descriptions may reference the response:
///
/// | Placeholder | Replaced with |
/// |---|---|
/// | `{$statusCode}` | the status code |
/// | `{$response.body}` | the raw body |
/// | `{$response.body#/pointer}` | a value from the JSON body |
/// | `{$response.header.name}` | a response header |
///
/// Unresolvable placeholders render as an empty string.
///
/// # Example
///
/// ```rust
/// use apimatic_core::response::ErrorCase;
///
/// let case = ErrorCase::template("Failed with {$statusCode}", "ServerError");
/// assert_eq!(case.kind(), "ServerError");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorCase {
    description: String,
    kind: String,
    is_template: bool,
}

impl ErrorCase {
    /// Creates an error case with a fixed description.
    #[must_use]
    pub fn new(description: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            kind: kind.into(),
            is_template: false,
        }
    }

    /// Creates an error case whose description is a template.
    #[must_use]
    pub fn template(description: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            kind: kind.into(),
            is_template: true,
        }
    }

    /// Returns the error kind tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Renders the description for `response`.
    #[must_use]
    pub fn description(&self, response: &HttpResponse) -> String {
        if self.is_template {
            render_template(&self.description, response)
        } else {
            self.description.clone()
        }
    }

    /// Builds the error raised for `response`.
    #[must_use]
    pub fn to_error(&self, response: &HttpResponse) -> ApiError {
        ApiError::ApiStatus(ApiStatusError {
            kind: self.kind.clone(),
            message: self.description(response),
            response: Box::new(response.clone()),
        })
    }
}

fn resolve_placeholder(placeholder: &str, response: &HttpResponse) -> Option<String> {
    if placeholder == "$statusCode" {
        return Some(response.status_code.to_string());
    }
    if placeholder == "$response.body" {
        return Some(response.raw_body.clone());
    }
    if let Some(name) = placeholder.strip_prefix("$response.header.") {
        return response.header(name).map(str::to_string);
    }
    if placeholder.starts_with("$response.body#") {
        return response.resolve_pointer(placeholder).map(|value| match value {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        });
    }
    None
}

fn render_template(template: &str, response: &HttpResponse) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{$") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            output.push_str(&rest[start..]);
            return output;
        };
        let placeholder = &after[..end];
        output.push_str(&resolve_placeholder(placeholder, response).unwrap_or_default());
        rest = &after[end + 1..];
    }
    output.push_str(rest);
    output
}
