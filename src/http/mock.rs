//! # Mock Transport for Testing
//!
//! Serves canned bodies keyed by URL and representation, and records every request
//! so tests can assert on fetch order and count.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{Accept, FetchError, Response, Transport};

#[derive(Debug, Clone)]
enum Route {
    Body(String),
    Status(u16),
}

/// In-memory [`Transport`]. Unknown routes answer 404.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    routes: HashMap<(String, Accept), Route>,
    requests: Mutex<Vec<(String, Accept)>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serve `document` for JSON requests to `url`.
    pub(crate) fn with_json(mut self, url: &str, document: serde_json::Value) -> Self {
        self.routes.insert(
            (url.to_string(), Accept::Json),
            Route::Body(document.to_string()),
        );
        self
    }

    /// Serve `body` for page requests to `url`.
    pub(crate) fn with_html(mut self, url: &str, body: impl Into<String>) -> Self {
        self.routes
            .insert((url.to_string(), Accept::Html), Route::Body(body.into()));
        self
    }

    /// Serve a raw body for the given representation, whatever it contains.
    pub(crate) fn with_body(mut self, url: &str, accept: Accept, body: impl Into<String>) -> Self {
        self.routes
            .insert((url.to_string(), accept), Route::Body(body.into()));
        self
    }

    /// Answer requests to `url` with an error status.
    pub(crate) fn with_status(mut self, url: &str, accept: Accept, status_code: u16) -> Self {
        self.routes
            .insert((url.to_string(), accept), Route::Status(status_code));
        self
    }

    /// Every request made so far, in order.
    pub(crate) fn requests(&self) -> Vec<(String, Accept)> {
        self.requests.lock().unwrap().clone()
    }

    /// URLs requested so far, in order.
    pub(crate) fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|(url, _)| url).collect()
    }
}

impl Transport for MockTransport {
    async fn fetch(&self, url: &str, accept: Accept) -> Result<Response, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), accept));

        match self.routes.get(&(url.to_string(), accept)).cloned() {
            Some(Route::Body(body)) => Ok(Response::new(url, 200, body)),
            Some(Route::Status(status_code)) => Err(FetchError::Status {
                url: url.to_string(),
                status_code,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status_code: 404,
            }),
        }
    }
}
