//! # apimatic-core
//!
//! The runtime core shared by generated API client SDKs: everything an
//! endpoint method needs to turn typed arguments into an HTTP request, send
//! it and turn the response into a typed result or a typed error.
//!
//! ## Overview
//!
//! This crate provides:
//! - Request construction via [`request::RequestBuilder`], with path, query,
//!   header, form, multipart and body parameters, array serialization formats
//!   and location-scoped JSON pointers
//! - Composable authentication via [`auth::Authentication`] (single, AND, OR)
//!   over named [`auth::AuthManager`]s such as [`auth::HeaderAuth`] and
//!   [`auth::QueryAuth`]
//! - Response validation and deserialization via
//!   [`response::ResponseHandler`] and declarative [`response::ErrorCase`]s
//! - One-shot execution via [`ApiCall`], with pluggable transport
//!   ([`clients::HttpClient`]), callback and logger
//! - Lazy pagination via [`pagination::PaginatedData`] with cursor, offset,
//!   page-number and next-link strategies
//! - HMAC verification of signed incoming requests via [`signature`]
//!
//! ## Quick Start
//!
//! ```rust
//! use apimatic_core::auth::{Authentication, HeaderAuth};
//! use apimatic_core::clients::HttpMethod;
//! use apimatic_core::config::GlobalConfiguration;
//! use apimatic_core::request::{Parameter, RequestBuilder};
//! use std::sync::Arc;
//!
//! let config = GlobalConfiguration::new()
//!     .with_base_uri_executor(|_| "https://api.example.com/v1".to_string())
//!     .with_auth_manager("bearer", Arc::new(HeaderAuth::bearer(Some("token"))));
//!
//! let request = RequestBuilder::new()
//!     .path("/users/{id}/posts")
//!     .http_method(HttpMethod::Get)
//!     .template_param(Parameter::new().key("id").value(7))
//!     .query_param(Parameter::new().key("limit").value(20))
//!     .auth(Authentication::single("bearer"))
//!     .build_with_configuration(&config, Default::default())?;
//!
//! assert_eq!(request.query_url, "https://api.example.com/v1/users/7/posts?limit=20");
//! assert_eq!(request.header("authorization"), Some("Bearer token"));
//! # Ok::<(), apimatic_core::ApiError>(())
//! ```
//!
//! ## Execution Model
//!
//! Calls are synchronous: [`ApiCall::execute`] blocks on the transport, and
//! pagination fetches pages strictly in sequence. Builders are values; every
//! modification returns a new instance, so independent callers never share
//! mutable state. [`config::GlobalConfiguration`] is shared behind an `Arc`
//! and never mutated after construction.
//!
//! ## Logging
//!
//! The crate emits `tracing` events. Request and response logging is
//! delegated to the configured [`logger::ApiLogger`]; [`logger::SdkLogger`]
//! writes through `tracing` with sensitive headers masked.

pub mod api_call;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod pagination;
pub mod request;
pub mod response;
pub mod signature;

// Re-export the types every generated endpoint touches
pub use api_call::ApiCall;
pub use error::{ApiError, ApiStatusError, Result};
