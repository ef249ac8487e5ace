//! URL and form encoding helpers.
//!
//! Nested parameter values are flattened into `name[key]` pairs. Arrays are
//! encoded according to the configured [`ArraySerializationFormat`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{ApiError, Result};

/// How multi-valued parameters are flattened onto the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArraySerializationFormat {
    /// `key[0]=a&key[1]=b`
    #[default]
    Indexed,
    /// `key=a&key=b`
    Plain,
    /// `key=a,b`
    Csv,
    /// `key=a\tb`
    Tsv,
    /// `key=a|b`
    Psv,
    /// `key[]=a&key[]=b`
    UnIndexed,
}

impl ArraySerializationFormat {
    const fn is_delimited(self) -> bool {
        matches!(self, Self::Csv | Self::Tsv | Self::Psv)
    }

    /// Delimiter used in query strings, where values are already encoded.
    const fn query_delimiter(self) -> &'static str {
        match self {
            Self::Tsv => "%09",
            Self::Psv => "%7C",
            _ => ",",
        }
    }

    /// Delimiter used in form bodies, which the transport encodes.
    const fn form_delimiter(self) -> &'static str {
        match self {
            Self::Tsv => "\t",
            Self::Psv => "|",
            _ => ",",
        }
    }
}

/// A path template parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateParameter {
    /// The value substituted into the template.
    pub value: Value,
    /// Whether the value is percent-encoded before substitution.
    pub encode: bool,
}

/// A flattened parameter. More than one value means a delimited array.
type FlatPair = (String, Vec<String>);

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

const fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_) | Value::Null)
}

fn flatten_value(
    name: String,
    value: &Value,
    format: ArraySerializationFormat,
    out: &mut Vec<FlatPair>,
) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, item) in map {
                flatten_value(format!("{name}[{key}]"), item, format, out);
            }
        }
        Value::Array(items) => {
            if format.is_delimited() && !items.is_empty() && items.iter().all(is_scalar) {
                out.push((name, items.iter().map(scalar_to_string).collect()));
                return;
            }
            for (index, item) in items.iter().enumerate() {
                let key = match format {
                    _ if !is_scalar(item) => format!("{name}[{index}]"),
                    ArraySerializationFormat::Indexed => format!("{name}[{index}]"),
                    ArraySerializationFormat::UnIndexed => format!("{name}[]"),
                    _ => name.clone(),
                };
                flatten_value(key, item, format, out);
            }
        }
        scalar => out.push((name, vec![scalar_to_string(scalar)])),
    }
}

fn flatten(parameters: &Map<String, Value>, format: ArraySerializationFormat) -> Vec<FlatPair> {
    let mut out = Vec::new();
    for (name, value) in parameters {
        flatten_value(name.clone(), value, format, &mut out);
    }
    out
}

/// Flattens form parameters into `(name, value)` pairs ready for URL encoding.
#[must_use]
pub fn form_encode_parameters(
    parameters: &Map<String, Value>,
    format: ArraySerializationFormat,
) -> Vec<(String, String)> {
    flatten(parameters, format)
        .into_iter()
        .map(|(name, values)| (name, values.join(format.form_delimiter())))
        .collect()
}

/// Encodes parameters as a query string (without the leading `?`).
#[must_use]
pub fn encode_query_string(
    parameters: &Map<String, Value>,
    format: ArraySerializationFormat,
) -> String {
    flatten(parameters, format)
        .into_iter()
        .map(|(name, values)| {
            let encoded: Vec<String> = values
                .iter()
                .map(|value| urlencoding::encode(value).into_owned())
                .collect();
            format!("{name}={}", encoded.join(format.query_delimiter()))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Replaces `{name}` placeholders in `url` with template parameter values.
///
/// Array values are joined with `/`. `null` substitutes an empty string.
/// Placeholders without a parameter are kept. Substituted values are never
/// scanned again.
#[must_use]
pub fn append_url_with_template_parameters(
    url: &str,
    parameters: &BTreeMap<String, TemplateParameter>,
) -> String {
    let encode = |value: String, should_encode: bool| {
        if should_encode {
            urlencoding::encode(&value).into_owned()
        } else {
            value
        }
    };
    let render = |parameter: &TemplateParameter| match &parameter.value {
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(|item| encode(scalar_to_string(item), parameter.encode))
            .collect::<Vec<_>>()
            .join("/"),
        other => encode(scalar_to_string(other), parameter.encode),
    };

    let mut result = String::with_capacity(url.len());
    let mut rest = url;
    while let Some(start) = rest.find('{') {
        let Some(length) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + length];
        result.push_str(&rest[..start]);
        match parameters.get(name) {
            Some(parameter) => result.push_str(&render(parameter)),
            None => result.push_str(&rest[start..=start + length]),
        }
        rest = &rest[start + length + 1..];
    }
    result.push_str(rest);
    result
}

/// Appends parameters to `url` as a query string.
#[must_use]
pub fn append_url_with_query_parameters(
    url: &str,
    parameters: &Map<String, Value>,
    format: ArraySerializationFormat,
) -> String {
    let query = encode_query_string(parameters, format);
    if query.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

/// Normalizes an absolute URL.
///
/// Repeated slashes in the path are collapsed, duplicate `?`/`&` separators
/// and empty query segments are removed, and trailing separators dropped.
///
/// # Errors
///
/// Returns [`ApiError::InvalidUrl`] if `url` is not an absolute `http(s)` URL.
pub fn clean_url(url: &str) -> Result<String> {
    let (scheme, rest) = url
        .split_once("://")
        .ok_or_else(|| ApiError::invalid_url(url))?;
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return Err(ApiError::invalid_url(url));
    }

    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
    if path.is_empty() || path.starts_with('/') {
        return Err(ApiError::invalid_url(url));
    }

    let mut cleaned_path = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch == '/' && cleaned_path.ends_with('/') {
            continue;
        }
        cleaned_path.push(ch);
    }

    let query = query
        .split(['&', '?'])
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        Ok(format!("{scheme}://{cleaned_path}"))
    } else {
        Ok(format!("{scheme}://{cleaned_path}?{query}"))
    }
}

fn decode_component(component: &str) -> String {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced).map_or_else(|_| spaced.clone(), std::borrow::Cow::into_owned)
}

/// Extracts the query parameters of `url`.
///
/// Values are decoded strings. A key that repeats becomes an array.
///
/// # Example
///
/// ```rust
/// use apimatic_core::request::url::get_query_parameters;
/// use serde_json::json;
///
/// let params = get_query_parameters("/items?page=2&size=5");
/// assert_eq!(params.get("page"), Some(&json!("2")));
/// assert_eq!(params.get("size"), Some(&json!("5")));
/// ```
#[must_use]
pub fn get_query_parameters(url: &str) -> Map<String, Value> {
    let mut result = Map::new();
    let Some((_, query)) = url.split_once('?') else {
        return result;
    };
    let query = query.split_once('#').map_or(query, |(query, _)| query);

    for segment in query.split('&').filter(|segment| !segment.is_empty()) {
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        let key = decode_component(key);
        let value = Value::String(decode_component(value));

        match result.get_mut(&key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                result.insert(key, value);
            }
        }
    }
    result
}
