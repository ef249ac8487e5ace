//! Injected body deserializers.
//!
//! A [`ResponseHandler`](super::ResponseHandler) does not know how to decode
//! models itself. It calls a [`Deserializer`] with the raw body and the
//! [`DeserializeOptions`] configured on the handler. Ready-made deserializers
//! cover JSON models, primitives, raw text and date-times.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, Result};

/// Wire format of date-time responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DateTimeFormat {
    /// RFC 3339, e.g. `2024-01-31T10:00:00Z`.
    #[default]
    Rfc3339,
    /// HTTP date (RFC 1123), e.g. `Wed, 31 Jan 2024 10:00:00 GMT`.
    Http,
    /// Seconds since the Unix epoch.
    UnixTimestamp,
}

/// Options forwarded to a [`Deserializer`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeserializeOptions {
    /// Date-time format for date responses.
    pub datetime_format: Option<DateTimeFormat>,
    /// The body is a bare primitive rather than a model.
    pub is_primitive: bool,
    /// The body is an array.
    pub is_array: bool,
}

/// Options forwarded to an [`XmlDeserializer`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlDeserializeOptions {
    /// Name of the root element.
    pub root_element_name: String,
    /// Name of array items, for array responses.
    pub array_item_name: Option<String>,
    /// Date-time format for date responses.
    pub datetime_format: Option<DateTimeFormat>,
}

/// Decodes a raw body into `T`.
pub type Deserializer<T> = Arc<dyn Fn(&str, &DeserializeOptions) -> Result<T> + Send + Sync>;

/// Decodes a raw XML body into `T`.
pub type XmlDeserializer<T> =
    Arc<dyn Fn(&str, &XmlDeserializeOptions) -> Result<T> + Send + Sync>;

/// Deserializes JSON bodies with serde.
///
/// For primitive responses a body that is not valid JSON is read as a bare
/// string, so `text/plain` bodies decode into `String`.
#[must_use]
pub fn json_deserializer<T>() -> Deserializer<T>
where
    T: DeserializeOwned + 'static,
{
    Arc::new(|body: &str, options: &DeserializeOptions| {
        match serde_json::from_str::<T>(body) {
            Ok(value) => Ok(value),
            Err(_) if options.is_primitive => {
                serde_json::from_value(Value::String(body.to_string())).map_err(ApiError::from)
            }
            Err(error) => Err(ApiError::deserialization(error.to_string())),
        }
    })
}

/// Returns the raw body unchanged.
#[must_use]
pub fn raw_deserializer() -> Deserializer<String> {
    Arc::new(|body: &str, _: &DeserializeOptions| Ok(body.to_string()))
}

/// Parses date-time bodies using the configured [`DateTimeFormat`].
#[must_use]
pub fn datetime_deserializer() -> Deserializer<DateTime<Utc>> {
    Arc::new(|body: &str, options: &DeserializeOptions| {
        parse_datetime(body, options.datetime_format.unwrap_or_default())
    })
}

/// Parses arrays of date-times using the configured [`DateTimeFormat`].
#[must_use]
pub fn datetime_array_deserializer() -> Deserializer<Vec<DateTime<Utc>>> {
    Arc::new(|body: &str, options: &DeserializeOptions| {
        let format = options.datetime_format.unwrap_or_default();
        let items: Vec<Value> = serde_json::from_str(body)?;
        items
            .iter()
            .map(|item| match item {
                Value::String(text) => parse_datetime(text, format),
                other => parse_datetime(&other.to_string(), format),
            })
            .collect()
    })
}

/// Parses a single date-time.
///
/// Surrounding whitespace and JSON quotes are ignored.
///
/// # Errors
///
/// Returns [`ApiError::Deserialization`] if `text` does not match `format`.
///
/// # Example
///
/// ```rust
/// use apimatic_core::response::{parse_datetime, DateTimeFormat};
///
/// let parsed = parse_datetime("1700000000", DateTimeFormat::UnixTimestamp)?;
/// assert_eq!(parsed.timestamp(), 1_700_000_000);
/// # Ok::<(), apimatic_core::ApiError>(())
/// ```
pub fn parse_datetime(text: &str, format: DateTimeFormat) -> Result<DateTime<Utc>> {
    let text = text.trim().trim_matches('"');
    let invalid = || ApiError::deserialization(format!("Invalid {format:?} date-time: {text}"));

    match format {
        DateTimeFormat::Rfc3339 => DateTime::parse_from_rfc3339(text)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| invalid()),
        DateTimeFormat::Http => DateTime::parse_from_rfc2822(text)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| invalid()),
        DateTimeFormat::UnixTimestamp => {
            let seconds: i64 = text.parse().map_err(|_| invalid())?;
            Utc.timestamp_opt(seconds, 0).single().ok_or_else(invalid)
        }
    }
}
