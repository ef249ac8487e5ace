//! Integration tests for composite authentication.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use apimatic_core::auth::{AuthManager, AuthManagers, Authentication, HeaderAuth, QueryAuth};
use apimatic_core::request::RequestBuilder;
use apimatic_core::ApiError;
use common::{configuration, MockHttpClient};

fn managers() -> AuthManagers {
    let mut managers: AuthManagers = HashMap::new();
    let valid: Arc<dyn AuthManager> = Arc::new(HeaderAuth::bearer(Some("token-a")));
    let invalid: Arc<dyn AuthManager> = Arc::new(
        HeaderAuth::new(HashMap::from([("x-api-key".to_string(), None)]))
            .with_error_message("ApiKeyAuth: x-api-key is undefined."),
    );
    let query: Arc<dyn AuthManager> = Arc::new(QueryAuth::new(HashMap::from([(
        "key".to_string(),
        Some("q-1".to_string()),
    )])));
    managers.insert("a".to_string(), Some(valid));
    managers.insert("b".to_string(), Some(invalid));
    managers.insert("q".to_string(), Some(query));
    managers.insert("empty".to_string(), None);
    managers
}

#[test]
fn test_and_reports_failing_participant() {
    let validation = Authentication::and(["a", "b"])
        .with_auth_managers(&managers())
        .unwrap()
        .validate()
        .unwrap();

    assert!(!validation.is_valid);
    assert_eq!(
        validation.error_message.as_deref(),
        Some("[ApiKeyAuth: x-api-key is undefined.]")
    );
}

#[test]
fn test_or_is_valid_when_any_participant_is() {
    let validation = Authentication::or(["a", "b"])
        .with_auth_managers(&managers())
        .unwrap()
        .validate()
        .unwrap();

    assert!(validation.is_valid);
    assert_eq!(validation.error_message, None);
}

#[test]
fn test_builder_applies_nested_groups() {
    let client = MockHttpClient::new([]);
    let config = configuration(client).with_auth_managers(managers());

    let request = RequestBuilder::new()
        .path("/items")
        .auth(Authentication::or([
            Authentication::and(["a", "b"]),
            Authentication::and(["a", "q"]),
        ]))
        .build_with_configuration(&config, HashMap::new())
        .unwrap();

    assert_eq!(request.header("authorization"), Some("Bearer token-a"));
    assert_eq!(request.query_url, "https://api.example.com/items?key=q-1");
    assert_eq!(request.header("x-api-key"), None);
}

#[test]
fn test_builder_rejects_unknown_participant() {
    let client = MockHttpClient::new([]);
    let config = configuration(client).with_auth_managers(managers());

    let error = RequestBuilder::new()
        .path("/items")
        .auth(Authentication::or(["a", "missing_key"]))
        .build_with_configuration(&config, HashMap::new())
        .unwrap_err();

    assert!(matches!(error, ApiError::InvalidArgument { .. }));
    assert_eq!(error.to_string(), "Auth key is invalid.");
}

#[test]
fn test_builder_rejects_nil_manager_entry() {
    let client = MockHttpClient::new([]);
    let config = configuration(client).with_auth_managers(managers());

    let error = RequestBuilder::new()
        .path("/items")
        .auth(Authentication::and(["a", "empty"]))
        .build_with_configuration(&config, HashMap::new())
        .unwrap_err();

    assert_eq!(
        error.to_string(),
        "The auth manager entry must not have a nil value."
    );
}

#[test]
fn test_builder_applies_and_group() {
    let client = MockHttpClient::new([]);
    let config = configuration(client).with_auth_managers(managers());

    let request = RequestBuilder::new()
        .path("/items")
        .auth(Authentication::and(["a", "q"]))
        .build_with_configuration(&config, HashMap::new())
        .unwrap();

    assert_eq!(request.header("authorization"), Some("Bearer token-a"));
    assert_eq!(request.query_url, "https://api.example.com/items?key=q-1");
}
