//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use apimatic_core::clients::{HttpClient, HttpRequest, HttpResponse};
use apimatic_core::config::{ClientConfiguration, GlobalConfiguration};
use apimatic_core::{ApiError, Result};

/// A canned response: status, headers and body.
#[derive(Clone, Debug)]
pub struct Scripted {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Scripted {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            status,
            headers,
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.to_string(),
        }
    }
}

/// A transport replaying scripted responses in order and recording every
/// request it receives.
#[derive(Default)]
pub struct MockHttpClient {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    pub fn new(responses: impl IntoIterator<Item = Scripted>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.query_url)
            .collect()
    }
}

impl HttpClient for MockHttpClient {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let scripted = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::transport("no scripted response left"))?;
        Ok(HttpResponse::new(
            scripted.status,
            "",
            scripted.headers,
            scripted.body,
            request.clone(),
        ))
    }
}

/// A configuration pointing at `https://api.example.com` using `client`.
pub fn configuration(client: Arc<MockHttpClient>) -> GlobalConfiguration {
    GlobalConfiguration::new()
        .with_base_uri_executor(|server: &str| match server {
            "auth" => "https://auth.example.com".to_string(),
            _ => "https://api.example.com".to_string(),
        })
        .with_client_configuration(ClientConfiguration::new().with_http_client(client))
}
