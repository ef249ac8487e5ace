//! Location-scoped JSON pointers.
//!
//! A pointer such as `$request.query#/page` or `$response.body/meta/cursor`
//! is made of a location prefix and an RFC 6901 field pointer. The `#`
//! separator is optional.
//!
//! # Example
//!
//! ```rust
//! use apimatic_core::request::json_pointer::{split_into_parts, PointerLocation};
//!
//! let (location, field) = split_into_parts("$request.query#/page");
//! assert_eq!(PointerLocation::parse(location), Some(PointerLocation::RequestQuery));
//! assert_eq!(field, "/page");
//! ```

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

/// The structure a pointer addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerLocation {
    /// `$request.path`: template parameters.
    RequestPath,
    /// `$request.query`: query parameters.
    RequestQuery,
    /// `$request.headers`: header parameters.
    RequestHeaders,
    /// `$request.body`: body parameters, or form parameters when no body is set.
    RequestBody,
    /// `$response.body`: the JSON response body.
    ResponseBody,
    /// `$response.headers`: the response headers.
    ResponseHeaders,
}

impl PointerLocation {
    /// Parses a location prefix.
    #[must_use]
    pub fn parse(prefix: &str) -> Option<Self> {
        match prefix {
            "$request.path" => Some(Self::RequestPath),
            "$request.query" => Some(Self::RequestQuery),
            "$request.headers" => Some(Self::RequestHeaders),
            "$request.body" => Some(Self::RequestBody),
            "$response.body" => Some(Self::ResponseBody),
            "$response.headers" => Some(Self::ResponseHeaders),
            _ => None,
        }
    }

    /// Returns the prefix string for this location.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RequestPath => "$request.path",
            Self::RequestQuery => "$request.query",
            Self::RequestHeaders => "$request.headers",
            Self::RequestBody => "$request.body",
            Self::ResponseBody => "$response.body",
            Self::ResponseHeaders => "$response.headers",
        }
    }

    /// Returns `true` for the `$request.*` locations.
    #[must_use]
    pub const fn is_request(&self) -> bool {
        matches!(
            self,
            Self::RequestPath | Self::RequestQuery | Self::RequestHeaders | Self::RequestBody
        )
    }

    /// Returns `true` for the `$response.*` locations.
    #[must_use]
    pub const fn is_response(&self) -> bool {
        !self.is_request()
    }
}

impl fmt::Display for PointerLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits a pointer into its location prefix and field pointer.
///
/// The field pointer is returned as written; see [`field_tokens`] for parsing.
#[must_use]
pub fn split_into_parts(pointer: &str) -> (&str, &str) {
    if let Some((location, field)) = pointer.split_once('#') {
        return (location, field);
    }
    if pointer.starts_with('$') {
        return pointer
            .find('/')
            .map_or((pointer, ""), |index| pointer.split_at(index));
    }
    ("", pointer)
}

/// Parses a field pointer into unescaped reference tokens.
///
/// A missing leading `/` is tolerated.
#[must_use]
pub fn field_tokens(field: &str) -> Vec<String> {
    let field = field.strip_prefix('/').unwrap_or(field);
    if field.is_empty() {
        return Vec::new();
    }
    field
        .split('/')
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect()
}

fn normalize(field: &str) -> String {
    if field.is_empty() || field.starts_with('/') {
        field.to_string()
    } else {
        format!("/{field}")
    }
}

/// Reads the value addressed by `field` inside `value`.
#[must_use]
pub fn get_value_by_pointer<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    value.pointer(&normalize(field))
}

/// Reads the value addressed by `field` inside a parameter map.
///
/// Returns `None` for absent and `null` values. An empty pointer returns the
/// whole map.
#[must_use]
pub fn get_value_in_map(map: &Map<String, Value>, field: &str) -> Option<Value> {
    let tokens = field_tokens(field);
    let Some((first, rest)) = tokens.split_first() else {
        return Some(Value::Object(map.clone()));
    };

    let mut current = map.get(first)?;
    for token in rest {
        current = match current {
            Value::Object(object) => object.get(token)?,
            Value::Array(items) => items.get(token.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!current.is_null()).then(|| current.clone())
}

fn array_index(token: &str, len: usize) -> Option<usize> {
    if token == "-" {
        Some(len)
    } else {
        token.parse().ok()
    }
}

/// Returns the child addressed by `token`, creating it when absent.
///
/// Scalars on the path are replaced by objects.
fn child_mut<'a>(value: &'a mut Value, token: &str) -> &'a mut Value {
    let index = match value {
        Value::Array(items) => array_index(token, items.len()),
        _ => None,
    };
    if index.is_none() && !value.is_object() {
        *value = Value::Object(Map::new());
    }

    match (value, index) {
        (Value::Array(items), Some(index)) => {
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        (Value::Object(map), _) => map.entry(token.to_string()).or_insert(Value::Null),
        (other, _) => other,
    }
}

/// Writes `new_value` at the location addressed by `field`, creating
/// intermediate objects as needed. An empty pointer replaces `target`.
pub fn set_value_by_pointer(target: &mut Value, field: &str, new_value: Value) {
    let mut current = target;
    for token in field_tokens(field) {
        current = child_mut(current, &token);
    }
    *current = new_value;
}

/// Writes `new_value` into a parameter map at the location addressed by `field`.
///
/// An empty pointer replaces the whole map when `new_value` is an object and
/// is ignored otherwise.
pub fn set_value_in_map(map: &mut Map<String, Value>, field: &str, new_value: Value) {
    let tokens = field_tokens(field);
    let Some((first, rest)) = tokens.split_first() else {
        if let Value::Object(object) = new_value {
            *map = object;
        }
        return;
    };

    let mut current = map.entry(first.clone()).or_insert(Value::Null);
    for token in rest {
        current = child_mut(current, token);
    }
    *current = new_value;
}

/// Resolves a `$response.body` or `$response.headers` pointer.
///
/// Header names match case-insensitively. `null` results are reported as
/// `None`.
#[must_use]
pub fn resolve_response_pointer(
    pointer: &str,
    raw_body: &str,
    headers: &HashMap<String, String>,
) -> Option<Value> {
    let (location, field) = split_into_parts(pointer);
    match PointerLocation::parse(location)? {
        PointerLocation::ResponseBody => {
            let body: Value = serde_json::from_str(raw_body).ok()?;
            get_value_by_pointer(&body, field)
                .filter(|value| !value.is_null())
                .cloned()
        }
        PointerLocation::ResponseHeaders => {
            let tokens = field_tokens(field);
            let name = tokens.first()?;
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| Value::String(value.clone()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_into_parts_accepts_both_dialects() {
        assert_eq!(split_into_parts("$request.query#/page"), ("$request.query", "/page"));
        assert_eq!(split_into_parts("$request.query/page"), ("$request.query", "/page"));
        assert_eq!(
            split_into_parts("$response.body/meta/next"),
            ("$response.body", "/meta/next")
        );
        assert_eq!(split_into_parts("$request.body"), ("$request.body", ""));
    }

    #[test]
    fn test_location_parse_and_classification() {
        assert_eq!(
            PointerLocation::parse("$response.headers"),
            Some(PointerLocation::ResponseHeaders)
        );
        assert!(PointerLocation::parse("$request.cookies").is_none());
        assert!(PointerLocation::RequestPath.is_request());
        assert!(PointerLocation::ResponseBody.is_response());
    }

    #[test]
    fn test_field_tokens_unescape() {
        assert_eq!(field_tokens("/a~1b/c~0d"), vec!["a/b", "c~d"]);
        assert_eq!(field_tokens("page"), vec!["page"]);
        assert!(field_tokens("").is_empty());
    }

    #[test]
    fn test_get_value_in_map() {
        let map = json!({"filter": {"ids": [1, 2]}, "empty": null})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(get_value_in_map(&map, "/filter/ids/1"), Some(json!(2)));
        assert_eq!(get_value_in_map(&map, "/empty"), None);
        assert_eq!(get_value_in_map(&map, "/missing/x"), None);
    }

    #[test]
    fn test_set_value_creates_intermediates() {
        let mut value = json!({"a": 1});
        set_value_by_pointer(&mut value, "/b/c", json!("x"));
        set_value_by_pointer(&mut value, "/list/0", json!(true));
        set_value_by_pointer(&mut value, "/a/nested", json!(5));
        assert_eq!(
            value,
            json!({"a": {"nested": 5}, "b": {"c": "x"}, "list": {"0": true}})
        );

        let mut array = json!([1]);
        set_value_by_pointer(&mut array, "/-", json!(2));
        set_value_by_pointer(&mut array, "/0", json!(0));
        assert_eq!(array, json!([0, 2]));
    }

    #[test]
    fn test_set_value_in_map() {
        let mut map = Map::new();
        set_value_in_map(&mut map, "/cursor", json!("abc"));
        set_value_in_map(&mut map, "/page/number", json!(2));
        assert_eq!(
            Value::Object(map.clone()),
            json!({"cursor": "abc", "page": {"number": 2}})
        );

        set_value_in_map(&mut map, "", json!(3));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_resolve_response_pointer() {
        let mut headers = HashMap::new();
        headers.insert("Link".to_string(), "<next>".to_string());
        let body = r#"{"links":{"next":"/x?page=2"},"cursor":null}"#;

        assert_eq!(
            resolve_response_pointer("$response.body#/links/next", body, &headers),
            Some(json!("/x?page=2"))
        );
        assert_eq!(resolve_response_pointer("$response.body#/cursor", body, &headers), None);
        assert_eq!(
            resolve_response_pointer("$response.headers#/link", body, &headers),
            Some(json!("<next>"))
        );
        assert_eq!(resolve_response_pointer("$request.query#/page", body, &headers), None);
        assert_eq!(resolve_response_pointer("$response.body#/x", "oops", &headers), None);
    }
}
