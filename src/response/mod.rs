//! Response handling.
//!
//! # Overview
//!
//! - [`ResponseHandler`]: validates status codes and deserializes bodies
//! - [`ErrorCase`]: maps a status code to a raised error kind
//! - [`ApiResponse`]: envelope carrying status, headers, body and errors
//! - [`ResponseValue`]: the result of handling one response
//! - [`Deserializer`] and the ready-made `*_deserializer` functions

mod api_response;
mod deserializer;
mod error_case;
mod response_handler;

pub use api_response::ApiResponse;
pub use deserializer::{
    datetime_array_deserializer, datetime_deserializer, json_deserializer, parse_datetime,
    raw_deserializer, DateTimeFormat, DeserializeOptions, Deserializer, XmlDeserializeOptions,
    XmlDeserializer,
};
pub use error_case::ErrorCase;
pub use response_handler::{Convertor, ResponseHandler, ResponseValue};
