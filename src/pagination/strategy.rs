//! Pagination strategies.
//!
//! Each strategy knows how to derive the request for the next page from the
//! request used for the previous one and the response it produced.

use serde_json::Value;

use crate::clients::HttpResponse;
use crate::error::{ApiError, Result};
use crate::pagination::PageMeta;
use crate::request::json_pointer::{split_into_parts, PointerLocation};
use crate::request::url::get_query_parameters;
use crate::request::{ParameterUpdate, RequestBuilder};

/// The last page fetched during a traversal.
#[derive(Clone, Debug)]
pub struct PageState {
    /// The raw response of the page.
    pub response: HttpResponse,
    /// How many items the page converted to.
    pub item_count: usize,
}

fn validate_pointer(pointer: String, request_side: bool, role: &str) -> Result<String> {
    let (location, field) = split_into_parts(&pointer);
    let location_matches = PointerLocation::parse(location)
        .is_some_and(|location| location.is_request() == request_side);
    let field_present = !field.trim_start_matches('/').trim().is_empty();

    if location_matches && field_present {
        Ok(pointer)
    } else {
        let side = if request_side { "$request" } else { "$response" };
        Err(ApiError::invalid_argument(format!(
            "Invalid {role} pointer '{pointer}': expected a {side} pointer with a field path."
        )))
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Reads the integer the request currently carries at `pointer`.
fn read_integer(builder: &RequestBuilder, pointer: &str) -> Option<i64> {
    builder
        .get_parameter_value_by_json_pointer(pointer)
        .as_ref()
        .and_then(as_integer)
}

// ============================================================================
// Cursor
// ============================================================================

/// Reads a cursor from each response and sends it with the next request.
#[derive(Clone, Debug, PartialEq)]
pub struct CursorPagination {
    output: String,
    input: String,
    cursor: Option<Value>,
}

impl CursorPagination {
    /// Creates a cursor strategy.
    ///
    /// `output` addresses the next cursor in the response; `input` addresses
    /// the request parameter receiving it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] unless `output` is a `$response`
    /// pointer and `input` a `$request` pointer, both with a field path.
    pub fn new(output: impl Into<String>, input: impl Into<String>) -> Result<Self> {
        Ok(Self {
            output: validate_pointer(output.into(), false, "output")?,
            input: validate_pointer(input.into(), true, "input")?,
            cursor: None,
        })
    }

    fn is_applicable(&self, response: Option<&HttpResponse>) -> bool {
        response.map_or(true, |response| response.resolve_pointer(&self.output).is_some())
    }

    fn apply(&mut self, builder: &RequestBuilder, last: Option<&PageState>) -> Option<RequestBuilder> {
        let Some(last) = last else {
            self.cursor = builder.get_parameter_value_by_json_pointer(&self.input);
            return Some(builder.clone());
        };

        let cursor = last.response.resolve_pointer(&self.output)?;
        self.cursor = Some(cursor.clone());
        Some(builder.get_updated_request_by_json_pointer(&self.input, cursor))
    }
}

// ============================================================================
// Offset
// ============================================================================

/// Advances a numeric offset by the size of each page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffsetPagination {
    input: String,
    offset: i64,
}

impl OffsetPagination {
    /// Creates an offset strategy writing to the `input` request pointer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] unless `input` is a `$request`
    /// pointer with a field path.
    pub fn new(input: impl Into<String>) -> Result<Self> {
        Ok(Self {
            input: validate_pointer(input.into(), true, "input")?,
            offset: 0,
        })
    }

    fn apply(&mut self, builder: &RequestBuilder, last: Option<&PageState>) -> RequestBuilder {
        let current = read_integer(builder, &self.input);
        let Some(last) = last else {
            self.offset = current.unwrap_or(0);
            return builder.clone();
        };

        let page_size = i64::try_from(last.item_count).unwrap_or(i64::MAX);
        self.offset = current.unwrap_or(self.offset).saturating_add(page_size);
        builder.get_updated_request_by_json_pointer(&self.input, Value::from(self.offset))
    }
}

// ============================================================================
// Page number
// ============================================================================

/// Requests consecutive page numbers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagePagination {
    input: String,
    page_number: i64,
}

impl PagePagination {
    /// Creates a page-number strategy writing to the `input` request pointer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] unless `input` is a `$request`
    /// pointer with a field path.
    pub fn new(input: impl Into<String>) -> Result<Self> {
        Ok(Self {
            input: validate_pointer(input.into(), true, "input")?,
            page_number: 1,
        })
    }

    fn apply(&mut self, builder: &RequestBuilder, last: Option<&PageState>) -> Option<RequestBuilder> {
        let current = read_integer(builder, &self.input);
        let Some(last) = last else {
            self.page_number = current.unwrap_or(1);
            return Some(builder.clone());
        };

        if last.item_count == 0 {
            return None;
        }
        self.page_number = current.unwrap_or(self.page_number).saturating_add(1);
        Some(builder.get_updated_request_by_json_pointer(&self.input, Value::from(self.page_number)))
    }
}

// ============================================================================
// Link
// ============================================================================

/// Follows a next-page link found in each response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkPagination {
    next: String,
    next_link: Option<String>,
}

impl LinkPagination {
    /// Creates a link strategy reading the next link from the `next`
    /// response pointer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] unless `next` is a `$response`
    /// pointer with a field path.
    pub fn new(next: impl Into<String>) -> Result<Self> {
        Ok(Self {
            next: validate_pointer(next.into(), false, "next link")?,
            next_link: None,
        })
    }

    fn resolve_link(&self, response: &HttpResponse) -> Option<String> {
        match response.resolve_pointer(&self.next)? {
            Value::String(link) if !link.is_empty() => Some(link),
            Value::String(_) => None,
            other => Some(other.to_string()),
        }
    }

    fn is_applicable(&self, response: Option<&HttpResponse>) -> bool {
        response.map_or(true, |response| self.resolve_link(response).is_some())
    }

    fn apply(&mut self, builder: &RequestBuilder, last: Option<&PageState>) -> Option<RequestBuilder> {
        let Some(last) = last else {
            self.next_link = None;
            return Some(builder.clone());
        };

        let link = self.resolve_link(&last.response)?;
        let mut query = builder.query_params().clone();
        for (key, value) in get_query_parameters(&link) {
            query.insert(key, value);
        }
        self.next_link = Some(link);
        Some(builder.clone_with(ParameterUpdate::QueryParams(query)))
    }
}

// ============================================================================
// Strategy
// ============================================================================

/// A pagination strategy.
///
/// # Example
///
/// ```rust
/// use apimatic_core::pagination::PaginationStrategy;
///
/// let strategies = vec![
///     PaginationStrategy::link("$response.body#/links/next")?,
///     PaginationStrategy::cursor("$response.body#/meta/cursor", "$request.query#/cursor")?,
/// ];
/// # let _ = strategies;
/// # Ok::<(), apimatic_core::ApiError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum PaginationStrategy {
    /// Cursor-based pagination.
    Cursor(CursorPagination),
    /// Offset-based pagination.
    Offset(OffsetPagination),
    /// Page-number pagination.
    Page(PagePagination),
    /// Next-link pagination.
    Link(LinkPagination),
}

impl PaginationStrategy {
    /// See [`CursorPagination::new`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] for an invalid pointer.
    pub fn cursor(output: impl Into<String>, input: impl Into<String>) -> Result<Self> {
        CursorPagination::new(output, input).map(Self::Cursor)
    }

    /// See [`OffsetPagination::new`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] for an invalid pointer.
    pub fn offset(input: impl Into<String>) -> Result<Self> {
        OffsetPagination::new(input).map(Self::Offset)
    }

    /// See [`PagePagination::new`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] for an invalid pointer.
    pub fn page(input: impl Into<String>) -> Result<Self> {
        PagePagination::new(input).map(Self::Page)
    }

    /// See [`LinkPagination::new`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] for an invalid pointer.
    pub fn link(next: impl Into<String>) -> Result<Self> {
        LinkPagination::new(next).map(Self::Link)
    }

    /// Returns `true` if this strategy can continue from `response`.
    ///
    /// Every strategy is applicable before the first response.
    #[must_use]
    pub fn is_applicable(&self, response: Option<&HttpResponse>) -> bool {
        match self {
            Self::Cursor(cursor) => cursor.is_applicable(response),
            Self::Offset(_) | Self::Page(_) => true,
            Self::Link(link) => link.is_applicable(response),
        }
    }

    /// Produces the request for the next page, or `None` when this strategy
    /// has nothing more to fetch.
    ///
    /// `last` is `None` for the first page, in which case the strategy seeds
    /// its state from `builder` and returns it unchanged.
    pub fn apply(&mut self, builder: &RequestBuilder, last: Option<&PageState>) -> Option<RequestBuilder> {
        match self {
            Self::Cursor(cursor) => cursor.apply(builder, last),
            Self::Offset(offset) => Some(offset.apply(builder, last)),
            Self::Page(page) => page.apply(builder, last),
            Self::Link(link) => link.apply(builder, last),
        }
    }

    /// Returns the metadata describing the last request produced.
    #[must_use]
    pub fn meta(&self) -> PageMeta {
        match self {
            Self::Cursor(cursor) => PageMeta::Cursor {
                cursor: cursor.cursor.clone(),
            },
            Self::Offset(offset) => PageMeta::Offset {
                offset: offset.offset,
            },
            Self::Page(page) => PageMeta::Page {
                page_number: page.page_number,
            },
            Self::Link(link) => PageMeta::Link {
                next_link: link.next_link.clone(),
            },
        }
    }
}
