//! Pagination over endpoints returning results in pages.
//!
//! # Overview
//!
//! - [`PaginationStrategy`]: cursor, offset, page-number and next-link
//!   strategies, each addressing request and response values through
//!   location-scoped JSON pointers
//! - [`PaginatedData`]: a lazy iterator over the items of every page, with
//!   [`PaginatedData::pages`] for page-level access
//! - [`PagedResponse`]: one page plus the [`PageMeta`] of the strategy that
//!   fetched it; [`PaginatedData::pages_with`] maps it into a caller-defined
//!   page type
//!
//! Pages are fetched through a clone of the originating
//! [`ApiCall`](crate::ApiCall) whose configuration carries a private
//! [`HttpCallContext`](crate::clients::HttpCallContext), so strategies always
//! see the last response even when the caller installed its own callback.

mod paged_response;
mod paginated_data;
mod strategy;

pub use paged_response::{PageMeta, PagedResponse};
pub use paginated_data::{ItemsConverter, PageWrapper, PaginatedData, Pages, WrappedPages};
pub use strategy::{
    CursorPagination, LinkPagination, OffsetPagination, PagePagination, PageState,
    PaginationStrategy,
};
