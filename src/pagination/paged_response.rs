//! Page wrapper returned by [`PaginatedData::pages`](crate::pagination::PaginatedData::pages).

use std::ops::Deref;

use serde_json::Value;

use crate::response::ResponseValue;

/// The strategy state that produced a page.
#[derive(Clone, Debug, PartialEq)]
pub enum PageMeta {
    /// The cursor sent with the request.
    Cursor {
        /// `None` when the first request carried no cursor.
        cursor: Option<Value>,
    },
    /// The offset sent with the request.
    Offset {
        /// Running offset.
        offset: i64,
    },
    /// The page number sent with the request.
    Page {
        /// Page number, starting from the seeded value.
        page_number: i64,
    },
    /// The link followed to fetch the page.
    Link {
        /// `None` for the first page.
        next_link: Option<String>,
    },
}

/// One fetched page together with its items and strategy metadata.
///
/// Derefs to the handled [`ResponseValue`].
#[derive(Clone, Debug)]
pub struct PagedResponse<T, I> {
    value: ResponseValue<T>,
    items: Vec<I>,
    meta: PageMeta,
}

impl<T, I> PagedResponse<T, I> {
    pub(crate) const fn new(value: ResponseValue<T>, items: Vec<I>, meta: PageMeta) -> Self {
        Self { value, items, meta }
    }

    /// Returns the handled response value.
    #[must_use]
    pub const fn value(&self) -> &ResponseValue<T> {
        &self.value
    }

    /// Returns the items extracted from this page.
    #[must_use]
    pub fn items(&self) -> &[I] {
        &self.items
    }

    /// Returns the strategy metadata.
    #[must_use]
    pub const fn meta(&self) -> &PageMeta {
        &self.meta
    }

    /// Returns the cursor, for cursor-paginated pages.
    #[must_use]
    pub const fn cursor(&self) -> Option<&Value> {
        match &self.meta {
            PageMeta::Cursor { cursor } => cursor.as_ref(),
            _ => None,
        }
    }

    /// Returns the offset, for offset-paginated pages.
    #[must_use]
    pub const fn offset(&self) -> Option<i64> {
        match self.meta {
            PageMeta::Offset { offset } => Some(offset),
            _ => None,
        }
    }

    /// Returns the page number, for page-number-paginated pages.
    #[must_use]
    pub const fn page_number(&self) -> Option<i64> {
        match self.meta {
            PageMeta::Page { page_number } => Some(page_number),
            _ => None,
        }
    }

    /// Returns the followed link, for link-paginated pages.
    #[must_use]
    pub fn next_link(&self) -> Option<&str> {
        match &self.meta {
            PageMeta::Link { next_link } => next_link.as_deref(),
            _ => None,
        }
    }

    /// Consumes the page and returns its items.
    #[must_use]
    pub fn into_items(self) -> Vec<I> {
        self.items
    }
}

impl<T, I> Deref for PagedResponse<T, I> {
    type Target = ResponseValue<T>;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors_follow_meta() {
        let page = PagedResponse::new(
            ResponseValue::Data(json!({"items": [1, 2]})),
            vec![1, 2],
            PageMeta::Offset { offset: 10 },
        );
        assert_eq!(page.offset(), Some(10));
        assert_eq!(page.page_number(), None);
        assert_eq!(page.cursor(), None);
        assert_eq!(page.items(), &[1, 2]);
        assert_eq!(page.data(), Some(&json!({"items": [1, 2]})));
    }

    #[test]
    fn test_link_meta() {
        let page: PagedResponse<Value, i32> = PagedResponse::new(
            ResponseValue::Empty,
            Vec::new(),
            PageMeta::Link {
                next_link: Some("/items?page=2".to_string()),
            },
        );
        assert_eq!(page.next_link(), Some("/items?page=2"));
        assert!(page.into_items().is_empty());
    }
}
