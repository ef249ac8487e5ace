//! Integration tests for end-to-end API calls.
//!
//! These tests drive complete calls (request building, authentication,
//! transport, callbacks, logging and response handling) through a scripted
//! in-memory transport.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use apimatic_core::auth::{Authentication, HeaderAuth, QueryAuth};
use apimatic_core::clients::{HttpCallback, HttpMethod, HttpRequest, HttpResponse, RequestBody};
use apimatic_core::config::ClientConfiguration;
use apimatic_core::logger::{HttpLoggingConfiguration, LoggingConfiguration, SdkLogger};
use apimatic_core::request::{ArraySerializationFormat, Parameter, RequestBuilder};
use apimatic_core::response::{
    datetime_deserializer, json_deserializer, DateTimeFormat, ErrorCase, ResponseHandler,
};
use apimatic_core::{ApiCall, ApiError};
use chrono::{TimeZone, Utc};
use common::{configuration, MockHttpClient, Scripted};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    id: u64,
    name: String,
}

// ============================================================================
// Request construction
// ============================================================================

#[test]
fn test_get_request_reaches_transport_fully_built() {
    let client = MockHttpClient::new([Scripted::json(200, json!({"id": 1, "name": "Ada"}))]);
    let config = Arc::new(
        configuration(client.clone())
            .with_global_header("accept", "application/json")
            .with_auth_manager("bearer", Arc::new(HeaderAuth::bearer(Some("secret")))),
    );

    let user = ApiCall::<User>::new(config)
        .request(
            RequestBuilder::new()
                .path("/users/{id}")
                .http_method(HttpMethod::Get)
                .template_param(Parameter::new().key("id").value(1))
                .query_param(Parameter::new().key("tags").value(json!(["a", "b"])))
                .auth(Authentication::single("bearer")),
        )
        .response(ResponseHandler::new().deserializer(json_deserializer()))
        .execute()
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(user, User { id: 1, name: "Ada".to_string() });

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].query_url,
        "https://api.example.com/users/1?tags[0]=a&tags[1]=b"
    );
    assert_eq!(requests[0].header("authorization"), Some("Bearer secret"));
    assert_eq!(requests[0].header("accept"), Some("application/json"));
}

#[test]
fn test_array_formats_in_query() {
    let cases = [
        (ArraySerializationFormat::UnIndexed, "tags[]=a&tags[]=b"),
        (ArraySerializationFormat::Plain, "tags=a&tags=b"),
        (ArraySerializationFormat::Csv, "tags=a,b"),
        (ArraySerializationFormat::Psv, "tags=a%7Cb"),
    ];

    for (format, expected) in cases {
        let client = MockHttpClient::new([Scripted::text(204, "")]);
        ApiCall::<Value>::new(Arc::new(configuration(client.clone())))
            .request(
                RequestBuilder::new()
                    .path("/search")
                    .array_serialization_format(format)
                    .query_param(Parameter::new().key("tags").value(json!(["a", "b"]))),
            )
            .execute()
            .unwrap();

        assert_eq!(
            client.urls()[0],
            format!("https://api.example.com/search?{expected}"),
            "format {format:?}"
        );
    }
}

#[test]
fn test_post_json_body_with_query_auth() {
    let client = MockHttpClient::new([Scripted::json(201, json!({"id": 9, "name": "New"}))]);
    let mut params = HashMap::new();
    params.insert("api_key".to_string(), Some("k-1".to_string()));
    let config = Arc::new(
        configuration(client.clone()).with_auth_manager("key", Arc::new(QueryAuth::new(params))),
    );

    let created = ApiCall::<User>::new(config)
        .request(
            RequestBuilder::new()
                .path("/users")
                .http_method(HttpMethod::Post)
                .header_param(Parameter::new().key("content-type").value("application/json"))
                .body_param(Parameter::new().key("name").value("New"))
                .auth("key"),
        )
        .response(ResponseHandler::new().deserializer(json_deserializer()))
        .execute()
        .unwrap();

    assert_eq!(created.data().map(|user| user.id), Some(9));
    let request = &client.requests()[0];
    assert_eq!(request.query_url, "https://api.example.com/users?api_key=k-1");
    assert_eq!(request.parameters, Some(RequestBody::Json(json!({"name": "New"}))));
}

// ============================================================================
// Authentication failures
// ============================================================================

#[test]
fn test_invalid_auth_never_reaches_transport() {
    let client = MockHttpClient::new([Scripted::text(200, "")]);
    let config = Arc::new(
        configuration(client.clone())
            .with_auth_manager("basic", Arc::new(HeaderAuth::basic(Some("user"), None)))
            .with_auth_manager("bearer", Arc::new(HeaderAuth::bearer(None))),
    );

    let error = ApiCall::<Value>::new(config)
        .request(
            RequestBuilder::new()
                .path("/secure")
                .auth(Authentication::or(["basic", "bearer"])),
        )
        .execute()
        .unwrap_err();

    assert!(matches!(error, ApiError::AuthValidation { .. }));
    assert_eq!(
        error.to_string(),
        "[BasicAuth: username or password is undefined.] or [BearerAuth: access_token is undefined.]"
    );
    assert!(client.requests().is_empty());
}

#[test]
fn test_unknown_auth_participant() {
    let client = MockHttpClient::new([]);
    let error = ApiCall::<Value>::new(Arc::new(configuration(client)))
        .request(RequestBuilder::new().path("/secure").auth("missing"))
        .execute()
        .unwrap_err();
    assert_eq!(error.to_string(), "Auth key is invalid.");
}

// ============================================================================
// Response handling
// ============================================================================

#[test]
fn test_templated_local_error_case() {
    let client = MockHttpClient::new([Scripted::json(
        404,
        json!({"error": {"message": "no such user"}}),
    )]);

    let error = ApiCall::<User>::new(Arc::new(configuration(client)))
        .request(RequestBuilder::new().path("/users/404"))
        .response(
            ResponseHandler::new()
                .deserializer(json_deserializer())
                .local_error(
                    "404",
                    ErrorCase::template(
                        "Lookup failed ({$statusCode}): {$response.body#/error/message}",
                        "NotFoundError",
                    ),
                ),
        )
        .execute()
        .unwrap_err();

    assert_eq!(error.status_kind(), Some("NotFoundError"));
    assert_eq!(error.to_string(), "Lookup failed (404): no such user");
    match error {
        ApiError::ApiStatus(status) => assert_eq!(status.status_code(), 404),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_nullify404_returns_empty() {
    let client = MockHttpClient::new([Scripted::json(404, json!({"id": 1, "name": "x"}))]);
    let config = Arc::new(
        configuration(client)
            .with_global_error("default", ErrorCase::new("HTTP response not OK.", "ApiError")),
    );

    let value = ApiCall::<User>::new(config)
        .request(RequestBuilder::new().path("/users/1"))
        .response(
            ResponseHandler::new()
                .deserializer(json_deserializer())
                .is_nullify404(true),
        )
        .execute()
        .unwrap();
    assert!(value.is_empty());
}

#[test]
fn test_api_response_envelope() {
    let mut scripted = Scripted::json(200, json!({"id": 3, "name": "Env", "errors": ["deprecated"]}));
    scripted
        .headers
        .insert("x-request-id".to_string(), "req-77".to_string());
    let client = MockHttpClient::new([scripted]);

    let value = ApiCall::<Value>::new(Arc::new(configuration(client)))
        .request(RequestBuilder::new().path("/users/3"))
        .response(
            ResponseHandler::new()
                .deserializer(json_deserializer())
                .is_api_response(true),
        )
        .execute()
        .unwrap();

    let envelope = value.api_response().unwrap();
    assert!(envelope.is_success());
    assert_eq!(envelope.headers.get("x-request-id").map(String::as_str), Some("req-77"));
    assert_eq!(envelope.errors, Some(vec!["deprecated".to_string()]));
    assert_eq!(envelope.data.as_ref().unwrap()["name"], json!("Env"));
}

#[test]
fn test_date_response() {
    let client = MockHttpClient::new([Scripted::text(200, "1700000000")]);
    let value = ApiCall::new(Arc::new(configuration(client)))
        .request(RequestBuilder::new().path("/time"))
        .response(
            ResponseHandler::new()
                .deserializer(datetime_deserializer())
                .datetime_format(DateTimeFormat::UnixTimestamp)
                .is_date_response(true),
        )
        .execute()
        .unwrap();

    assert_eq!(
        value.into_data(),
        Some(Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    );
}

// ============================================================================
// Callbacks and logging
// ============================================================================

#[derive(Default)]
struct RecordingCallback {
    urls: Mutex<Vec<String>>,
    statuses: Mutex<Vec<u16>>,
}

impl HttpCallback for RecordingCallback {
    fn on_before_request(&self, request: &HttpRequest) {
        self.urls.lock().unwrap().push(request.query_url.clone());
    }

    fn on_after_response(&self, response: &HttpResponse) {
        self.statuses.lock().unwrap().push(response.status_code);
    }
}

#[test]
fn test_callback_sees_each_exchange_once() {
    let client = MockHttpClient::new([Scripted::text(200, "ok"), Scripted::text(500, "")]);
    let callback = Arc::new(RecordingCallback::default());
    let logger = SdkLogger::new(
        LoggingConfiguration::new()
            .request(HttpLoggingConfiguration::new().log_headers(true).log_body(true))
            .response(HttpLoggingConfiguration::new().log_body(true)),
    );
    let config = Arc::new(
        configuration(client.clone())
            .with_global_header("authorization", "Bearer hidden")
            .with_client_configuration(
                ClientConfiguration::new()
                    .with_http_client(client)
                    .with_http_callback(callback.clone())
                    .with_logger(Arc::new(logger)),
            ),
    );

    let call = ApiCall::<Value>::new(config).request(RequestBuilder::new().path("/ping"));
    call.execute().unwrap();
    call.execute().unwrap();

    assert_eq!(
        *callback.urls.lock().unwrap(),
        vec!["https://api.example.com/ping", "https://api.example.com/ping"]
    );
    assert_eq!(*callback.statuses.lock().unwrap(), vec![200, 500]);
}

#[test]
fn test_missing_http_client() {
    let config = Arc::new(
        apimatic_core::config::GlobalConfiguration::new()
            .with_base_uri_executor(|_: &str| "https://api.example.com".to_string()),
    );
    let error = ApiCall::<Value>::new(config).execute().unwrap_err();
    assert!(matches!(error, ApiError::Configuration { .. }));
}
