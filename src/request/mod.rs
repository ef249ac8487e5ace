//! Request construction.
//!
//! # Overview
//!
//! - [`RequestBuilder`]: accumulates parameters and builds an [`HttpRequest`]
//! - [`Parameter`]: a single declarative parameter
//! - [`ArraySerializationFormat`]: how arrays are flattened onto the wire
//! - [`json_pointer`]: location-scoped pointer access into requests and responses
//! - [`url`]: query, form and template encoding helpers
//!
//! [`HttpRequest`]: crate::clients::HttpRequest

pub mod json_pointer;
mod parameter;
mod request_builder;
pub mod url;

pub use parameter::{Parameter, ParameterValue};
pub use request_builder::{
    BodySerializer, ParameterUpdate, RequestBuilder, XmlAttributes, XmlSerializer,
};
pub use url::{ArraySerializationFormat, TemplateParameter};
