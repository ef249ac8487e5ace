//! HTTP transport layer.
//!
//! This module holds the wire-level request and response types together with
//! the seams through which the runtime core reaches the network.
//!
//! # Overview
//!
//! - [`HttpRequest`]: a fully built request (method, URL, headers, body)
//! - [`HttpResponse`]: the raw response plus the request that produced it
//! - [`HttpClient`]: the injected transport trait
//! - [`ReqwestHttpClient`]: default transport backed by `reqwest::blocking`
//! - [`HttpCallback`]: before/after hooks around each transport call
//! - [`HttpCallContext`]: a callback that remembers the last exchange
//!
//! # Example
//!
//! ```rust
//! use apimatic_core::clients::{HttpMethod, HttpRequest};
//! use std::collections::HashMap;
//!
//! let mut request = HttpRequest::new(
//!     HttpMethod::Get,
//!     "https://api.example.com/items",
//!     HashMap::new(),
//!     None,
//!     HashMap::new(),
//! );
//! request.add_header("accept", "application/json");
//! assert_eq!(request.header("Accept"), Some("application/json"));
//! ```

mod http_callback;
mod http_client;
mod http_request;
mod http_response;

pub use http_callback::{HttpCallContext, HttpCallback};
pub use http_client::{HttpClient, ReqwestHttpClient, ReqwestHttpClientBuilder};
pub use http_request::{
    FileWrapper, HttpMethod, HttpRequest, MultipartPart, MultipartValue, RequestBody,
};
pub use http_response::HttpResponse;
