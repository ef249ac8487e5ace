//! HTTP request types exchanged with the transport.
//!
//! This module provides the wire-level [`HttpRequest`] produced by
//! [`RequestBuilder::build`](crate::request::RequestBuilder::build), together
//! with the [`HttpMethod`] and [`RequestBody`] types it carries.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::request::url::{append_url_with_query_parameters, clean_url};
use crate::request::ArraySerializationFormat;

/// HTTP methods supported by the runtime core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    #[default]
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method for replacing resources.
    Put,
    /// HTTP PATCH method for partial updates.
    Patch,
    /// HTTP DELETE method for removing resources.
    Delete,
    /// HTTP HEAD method.
    Head,
}

impl HttpMethod {
    /// Returns the upper-case method name used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file-like payload used for binary bodies and multipart parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileWrapper {
    bytes: Vec<u8>,
    content_type: Option<String>,
    file_name: Option<String>,
}

impl FileWrapper {
    /// Wraps raw bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
            file_name: None,
        }
    }

    /// Sets the content type of the file.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the file name sent with multipart uploads.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the content type, if set.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the file name, if set.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Value of a single multipart part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MultipartValue {
    /// A plain text field.
    Text(String),
    /// A file upload.
    File(FileWrapper),
}

/// A named part of a multipart body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultipartPart {
    /// The form field name.
    pub name: String,
    /// The part payload.
    pub value: MultipartValue,
    /// Content type sent for the part, if any.
    pub content_type: Option<String>,
}

/// The body payload of an [`HttpRequest`].
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// A body already encoded by a body or XML serializer.
    Text(String),
    /// An unserialized JSON value, left for the transport to encode.
    Json(Value),
    /// URL-encoded form fields, already flattened.
    Form(Vec<(String, String)>),
    /// Multipart form data.
    Multipart(Vec<MultipartPart>),
    /// A raw binary payload.
    Binary(FileWrapper),
}

/// A fully built request, ready to be handed to an
/// [`HttpClient`](crate::clients::HttpClient).
///
/// The header and query appenders are only meant to be used while the
/// request is being assembled (by the builder and by auth appliers); once it
/// reaches the transport it is treated as immutable.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method.
    pub http_method: HttpMethod,
    /// The absolute URL including the query string.
    pub query_url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// The body payload, if any.
    pub parameters: Option<RequestBody>,
    /// Endpoint context supplied by the caller.
    pub context: HashMap<String, Value>,
    /// Format used when query parameters are appended to this request.
    pub array_serialization_format: ArraySerializationFormat,
}

impl HttpRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(
        http_method: HttpMethod,
        query_url: impl Into<String>,
        headers: HashMap<String, String>,
        parameters: Option<RequestBody>,
        context: HashMap<String, Value>,
    ) -> Self {
        Self {
            http_method,
            query_url: query_url.into(),
            headers,
            parameters,
            context,
            array_serialization_format: ArraySerializationFormat::default(),
        }
    }

    /// Sets the array serialization format used by [`add_query_parameter`](Self::add_query_parameter).
    #[must_use]
    pub const fn with_array_serialization_format(mut self, format: ArraySerializationFormat) -> Self {
        self.array_serialization_format = format;
        self
    }

    /// Adds or replaces a header.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Appends a query parameter to the URL.
    ///
    /// The value is serialized with the request's array serialization format
    /// and the resulting URL is cleaned.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`](crate::ApiError::InvalidUrl) if the
    /// resulting URL is not absolute.
    pub fn add_query_parameter(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let mut parameters = Map::new();
        parameters.insert(name.into(), value);
        let url = append_url_with_query_parameters(
            &self.query_url,
            &parameters,
            self.array_serialization_format,
        );
        self.query_url = clean_url(&url)?;
        Ok(())
    }

    /// Returns a header value, matching the name case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
