//! Hooks invoked around every transport call.

use std::sync::{Arc, Mutex, PoisonError};

use crate::clients::{HttpRequest, HttpResponse};

/// Callback notified once before and once after each transport call.
pub trait HttpCallback: Send + Sync {
    /// Invoked with the built request just before it is sent.
    fn on_before_request(&self, request: &HttpRequest);

    /// Invoked with the response as soon as it is received.
    fn on_after_response(&self, response: &HttpResponse);
}

/// A callback that records the most recent request and response.
///
/// Pagination installs one of these on a private copy of the global
/// configuration so it can inspect the last response independently of any
/// caller-supplied callback. A wrapped callback, if any, keeps receiving
/// every notification.
#[derive(Default)]
pub struct HttpCallContext {
    request: Mutex<Option<HttpRequest>>,
    response: Mutex<Option<HttpResponse>>,
    inner: Option<Arc<dyn HttpCallback>>,
}

impl HttpCallContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context that forwards notifications to `inner`.
    #[must_use]
    pub fn wrapping(inner: Option<Arc<dyn HttpCallback>>) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Returns the last request seen, if any.
    #[must_use]
    pub fn request(&self) -> Option<HttpRequest> {
        self.request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the last response seen, if any.
    #[must_use]
    pub fn response(&self) -> Option<HttpResponse> {
        self.response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HttpCallback for HttpCallContext {
    fn on_before_request(&self, request: &HttpRequest) {
        *self.request.lock().unwrap_or_else(PoisonError::into_inner) = Some(request.clone());
        if let Some(inner) = &self.inner {
            inner.on_before_request(request);
        }
    }

    fn on_after_response(&self, response: &HttpResponse) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) = Some(response.clone());
        if let Some(inner) = &self.inner {
            inner.on_after_response(response);
        }
    }
}

impl std::fmt::Debug for HttpCallContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCallContext")
            .field("request", &self.request())
            .field("response", &self.response())
            .field("has_inner", &self.inner.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpMethod;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingCallback {
        before: AtomicUsize,
        after: AtomicUsize,
    }

    impl HttpCallback for CountingCallback {
        fn on_before_request(&self, _request: &HttpRequest) {
            self.before.fetch_add(1, Ordering::SeqCst);
        }

        fn on_after_response(&self, _response: &HttpResponse) {
            self.after.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_context_records_last_exchange_and_forwards() {
        let counter = Arc::new(CountingCallback::default());
        let context = HttpCallContext::wrapping(Some(counter.clone()));
        assert!(context.response().is_none());

        let request = HttpRequest::new(
            HttpMethod::Get,
            "https://example.com/a",
            HashMap::new(),
            None,
            HashMap::new(),
        );
        let response = HttpResponse::new(200, "OK", HashMap::new(), "{}", request.clone());

        context.on_before_request(&request);
        context.on_after_response(&response);

        assert_eq!(context.request().unwrap().query_url, "https://example.com/a");
        assert_eq!(context.response().unwrap().status_code, 200);
        assert_eq!(counter.before.load(Ordering::SeqCst), 1);
        assert_eq!(counter.after.load(Ordering::SeqCst), 1);
    }
}
