//! Response validation and deserialization.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::clients::HttpResponse;
use crate::error::Result;
use crate::response::api_response::ApiResponse;
use crate::response::deserializer::{
    DateTimeFormat, DeserializeOptions, Deserializer, XmlDeserializeOptions, XmlDeserializer,
};
use crate::response::error_case::ErrorCase;

/// Post-processes a handled response.
pub type Convertor<T> = Arc<dyn Fn(ResponseValue<T>) -> Result<ResponseValue<T>> + Send + Sync>;

/// The outcome of handling a response.
#[derive(Clone, Debug)]
pub enum ResponseValue<T> {
    /// No body: a void endpoint, an empty body or a nullified 404.
    Empty,
    /// The deserialized body.
    Data(T),
    /// The body wrapped in an [`ApiResponse`] envelope.
    ApiResponse(ApiResponse<T>),
}

impl<T> ResponseValue<T> {
    /// Returns the deserialized body, looking through the envelope.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Empty => None,
            Self::Data(data) => Some(data),
            Self::ApiResponse(response) => response.data.as_ref(),
        }
    }

    /// Consumes the value and returns the deserialized body.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Empty => None,
            Self::Data(data) => Some(data),
            Self::ApiResponse(response) => response.data,
        }
    }

    /// Returns the envelope, if the handler produced one.
    #[must_use]
    pub const fn api_response(&self) -> Option<&ApiResponse<T>> {
        match self {
            Self::ApiResponse(response) => Some(response),
            _ => None,
        }
    }

    /// Returns `true` for [`ResponseValue::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

struct XmlConfig<T> {
    options: XmlDeserializeOptions,
    deserializer: XmlDeserializer<T>,
}

impl<T> Clone for XmlConfig<T> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            deserializer: Arc::clone(&self.deserializer),
        }
    }
}

/// Validates a response against declared error cases and deserializes it.
///
/// # Example
///
/// ```rust
/// use apimatic_core::response::{json_deserializer, ErrorCase, ResponseHandler};
///
/// let handler = ResponseHandler::<serde_json::Value>::new()
///     .deserializer(json_deserializer())
///     .local_error("404", ErrorCase::new("Item not found", "NotFoundError"))
///     .is_api_response(true);
/// # let _ = handler;
/// ```
pub struct ResponseHandler<T> {
    deserializer: Option<Deserializer<T>>,
    xml: Option<XmlConfig<T>>,
    convertor: Option<Convertor<T>>,
    local_errors: HashMap<String, ErrorCase>,
    datetime_format: Option<DateTimeFormat>,
    is_nullify404: bool,
    is_response_void: bool,
    is_api_response: bool,
    is_primitive_response: bool,
    is_response_array: bool,
    is_date_response: bool,
}

impl<T> Default for ResponseHandler<T> {
    fn default() -> Self {
        Self {
            deserializer: None,
            xml: None,
            convertor: None,
            local_errors: HashMap::new(),
            datetime_format: None,
            is_nullify404: false,
            is_response_void: false,
            is_api_response: false,
            is_primitive_response: false,
            is_response_array: false,
            is_date_response: false,
        }
    }
}

impl<T> Clone for ResponseHandler<T> {
    fn clone(&self) -> Self {
        Self {
            deserializer: self.deserializer.clone(),
            xml: self.xml.clone(),
            convertor: self.convertor.clone(),
            local_errors: self.local_errors.clone(),
            datetime_format: self.datetime_format,
            is_nullify404: self.is_nullify404,
            is_response_void: self.is_response_void,
            is_api_response: self.is_api_response,
            is_primitive_response: self.is_primitive_response,
            is_response_array: self.is_response_array,
            is_date_response: self.is_date_response,
        }
    }
}

impl<T> fmt::Debug for ResponseHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseHandler")
            .field("has_deserializer", &self.deserializer.is_some())
            .field("has_xml_deserializer", &self.xml.is_some())
            .field("has_convertor", &self.convertor.is_some())
            .field("local_errors", &self.local_errors)
            .field("datetime_format", &self.datetime_format)
            .field("is_nullify404", &self.is_nullify404)
            .field("is_response_void", &self.is_response_void)
            .field("is_api_response", &self.is_api_response)
            .finish_non_exhaustive()
    }
}

impl<T> ResponseHandler<T> {
    /// Creates a handler with no deserializer and no error cases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the body deserializer.
    #[must_use]
    pub fn deserializer(mut self, deserializer: Deserializer<T>) -> Self {
        self.deserializer = Some(deserializer);
        self
    }

    /// Sets an XML deserializer. It takes precedence over [`deserializer`](Self::deserializer).
    #[must_use]
    pub fn xml_deserializer(
        mut self,
        root_element_name: impl Into<String>,
        array_item_name: Option<String>,
        deserializer: XmlDeserializer<T>,
    ) -> Self {
        self.xml = Some(XmlConfig {
            options: XmlDeserializeOptions {
                root_element_name: root_element_name.into(),
                array_item_name,
                datetime_format: None,
            },
            deserializer,
        });
        self
    }

    /// Sets a convertor applied to every handled value.
    #[must_use]
    pub fn convertor<F>(mut self, convertor: F) -> Self
    where
        F: Fn(ResponseValue<T>) -> Result<ResponseValue<T>> + Send + Sync + 'static,
    {
        self.convertor = Some(Arc::new(convertor));
        self
    }

    /// Declares an error case for a status code, or `"default"` for any
    /// unsuccessful status.
    #[must_use]
    pub fn local_error(mut self, status_code: impl Into<String>, error_case: ErrorCase) -> Self {
        self.local_errors.insert(status_code.into(), error_case);
        self
    }

    /// Sets the date-time format for date responses.
    #[must_use]
    pub const fn datetime_format(mut self, format: DateTimeFormat) -> Self {
        self.datetime_format = Some(format);
        self
    }

    /// Returns [`ResponseValue::Empty`] for 404 responses.
    #[must_use]
    pub const fn is_nullify404(mut self, value: bool) -> Self {
        self.is_nullify404 = value;
        self
    }

    /// Skips deserialization.
    #[must_use]
    pub const fn is_response_void(mut self, value: bool) -> Self {
        self.is_response_void = value;
        self
    }

    /// Wraps results in an [`ApiResponse`] envelope.
    #[must_use]
    pub const fn is_api_response(mut self, value: bool) -> Self {
        self.is_api_response = value;
        self
    }

    /// Marks the body as a bare primitive.
    #[must_use]
    pub const fn is_primitive_response(mut self, value: bool) -> Self {
        self.is_primitive_response = value;
        self
    }

    /// Marks the body as an array.
    #[must_use]
    pub const fn is_response_array(mut self, value: bool) -> Self {
        self.is_response_array = value;
        self
    }

    /// Marks the body as a date-time.
    #[must_use]
    pub const fn is_date_response(mut self, value: bool) -> Self {
        self.is_date_response = value;
        self
    }

    /// Handles `response`.
    ///
    /// Local error cases are checked before `global_errors`, first by exact
    /// status code and then, for statuses outside `200..=208`, by the
    /// `"default"` entry. Statuses without a matching case are deserialized
    /// like successes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ApiStatus`](crate::ApiError::ApiStatus) for a
    /// matched error case, and deserializer or convertor errors unchanged.
    pub fn handle(
        &self,
        response: &HttpResponse,
        global_errors: &HashMap<String, ErrorCase>,
    ) -> Result<ResponseValue<T>> {
        if self.is_nullify404 && response.status_code == 404 {
            return Ok(ResponseValue::Empty);
        }

        self.validate(response, global_errors)?;

        let data = if self.is_response_void {
            None
        } else {
            self.deserialize(response)?
        };

        let value = if self.is_api_response {
            ResponseValue::ApiResponse(ApiResponse::new(response, data))
        } else {
            data.map_or(ResponseValue::Empty, ResponseValue::Data)
        };

        match &self.convertor {
            Some(convertor) => convertor(value),
            None => Ok(value),
        }
    }

    fn validate(
        &self,
        response: &HttpResponse,
        global_errors: &HashMap<String, ErrorCase>,
    ) -> Result<()> {
        let status_code = response.status_code.to_string();
        if let Some(error_case) = self
            .local_errors
            .get(&status_code)
            .or_else(|| global_errors.get(&status_code))
        {
            return Err(error_case.to_error(response));
        }

        if !response.is_success() {
            if let Some(error_case) = self
                .local_errors
                .get("default")
                .or_else(|| global_errors.get("default"))
            {
                return Err(error_case.to_error(response));
            }
        }
        Ok(())
    }

    fn deserialize(&self, response: &HttpResponse) -> Result<Option<T>> {
        if response.raw_body.trim().is_empty() {
            return Ok(None);
        }

        if let Some(xml) = &self.xml {
            let options = XmlDeserializeOptions {
                datetime_format: self.datetime_format,
                ..xml.options.clone()
            };
            return (xml.deserializer)(&response.raw_body, &options).map(Some);
        }

        let Some(deserializer) = &self.deserializer else {
            return Ok(None);
        };
        let options = DeserializeOptions {
            datetime_format: if self.is_date_response {
                Some(self.datetime_format.unwrap_or_default())
            } else {
                self.datetime_format
            },
            is_primitive: self.is_primitive_response,
            is_array: self.is_response_array,
        };
        deserializer(&response.raw_body, &options).map(Some)
    }
}
