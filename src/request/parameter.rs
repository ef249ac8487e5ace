//! Declarative parameter descriptions consumed by [`RequestBuilder`](super::RequestBuilder).

use serde_json::Value;

use crate::clients::FileWrapper;
use crate::error::{ApiError, Result};

/// The value carried by a [`Parameter`].
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterValue {
    /// Any JSON-representable value.
    Json(Value),
    /// A file-like payload.
    File(FileWrapper),
}

impl Default for ParameterValue {
    fn default() -> Self {
        Self::Json(Value::Null)
    }
}

impl ParameterValue {
    /// Returns `true` for a JSON `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }

    /// Returns the JSON value, if this is not a file.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::File(_) => None,
        }
    }
}

impl From<Value> for ParameterValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<FileWrapper> for ParameterValue {
    fn from(file: FileWrapper) -> Self {
        Self::File(file)
    }
}

/// A single named parameter for a request.
///
/// # Example
///
/// ```rust
/// use apimatic_core::request::Parameter;
/// use serde_json::json;
///
/// let parameter = Parameter::new()
///     .key("limit")
///     .value(json!(10))
///     .required(true);
///
/// assert!(parameter.validate().is_ok());
/// assert_eq!(parameter.name(), Some("limit"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    key: Option<String>,
    value: ParameterValue,
    is_required: bool,
    should_encode: bool,
    default_content_type: Option<String>,
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            key: None,
            value: ParameterValue::default(),
            is_required: false,
            should_encode: true,
            default_content_type: None,
        }
    }
}

impl Parameter {
    /// Creates an empty, optional parameter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parameter name.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets a JSON value.
    #[must_use]
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = ParameterValue::Json(value.into());
        self
    }

    /// Sets a file value.
    #[must_use]
    pub fn file(mut self, file: FileWrapper) -> Self {
        self.value = ParameterValue::File(file);
        self
    }

    /// Marks the parameter as required.
    #[must_use]
    pub const fn required(mut self, is_required: bool) -> Self {
        self.is_required = is_required;
        self
    }

    /// Controls percent-encoding of template parameters. Defaults to `true`.
    #[must_use]
    pub const fn encode(mut self, should_encode: bool) -> Self {
        self.should_encode = should_encode;
        self
    }

    /// Sets the content type used for multipart parts.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = Some(content_type.into());
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the parameter value.
    #[must_use]
    pub const fn parameter_value(&self) -> &ParameterValue {
        &self.value
    }

    pub(crate) fn into_value(self) -> ParameterValue {
        self.value
    }

    /// Returns `true` if the parameter is required.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.is_required
    }

    /// Returns `true` if the value should be percent-encoded.
    #[must_use]
    pub const fn should_encode(&self) -> bool {
        self.should_encode
    }

    /// Returns the multipart content type, if any.
    #[must_use]
    pub fn default_content_type(&self) -> Option<&str> {
        self.default_content_type.as_deref()
    }

    /// Validates the parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] if the parameter is required and
    /// its value is `null`.
    pub fn validate(&self) -> Result<()> {
        if self.is_required && self.value.is_null() {
            let key = self.key.as_deref().unwrap_or_default();
            return Err(ApiError::invalid_argument(format!(
                "Required parameter {key} cannot be nil."
            )));
        }
        Ok(())
    }
}
