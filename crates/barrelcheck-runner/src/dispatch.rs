//! Request dispatch with status assertion
//!
//! One synchronous request per call, no retries. A response is only handed
//! back when its status equals the expected one; otherwise the call fails
//! with both codes so the calling case aborts.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

/// Longest body excerpt carried in a status-mismatch error.
const MAX_BODY_EXCERPT: usize = 512;

/// One request to send and the status it must produce.
#[derive(Debug, Clone)]
pub struct Exchange<'a> {
    pub method: reqwest::Method,
    pub url: &'a str,
    pub query: Option<&'a HashMap<String, String>>,
    pub json: Option<&'a Value>,
    pub headers: Option<&'a HashMap<String, String>>,
    pub expected_status: u16,
}

impl<'a> Exchange<'a> {
    /// Start an exchange; expects 200 unless changed with [`expect`](Self::expect).
    #[must_use]
    pub fn new(method: reqwest::Method, url: &'a str) -> Self {
        Self {
            method,
            url,
            query: None,
            json: None,
            headers: None,
            expected_status: 200,
        }
    }

    #[must_use]
    pub fn get(url: &'a str) -> Self {
        Self::new(reqwest::Method::GET, url)
    }

    #[must_use]
    pub fn post(url: &'a str) -> Self {
        Self::new(reqwest::Method::POST, url)
    }

    #[must_use]
    pub fn delete(url: &'a str) -> Self {
        Self::new(reqwest::Method::DELETE, url)
    }

    #[must_use]
    pub fn query(mut self, query: &'a HashMap<String, String>) -> Self {
        self.query = Some(query);
        self
    }

    #[must_use]
    pub fn json(mut self, body: &'a Value) -> Self {
        self.json = Some(body);
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: &'a HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    #[must_use]
    pub fn expect(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }
}

/// A response whose status matched the expectation.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: reqwest::header::HeaderMap,
    pub body: String,
    pub elapsed: Duration,
}

impl ApiResponse {
    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidBody`] if the body is not JSON.
    pub fn json(&self) -> Result<Value, DispatchError> {
        serde_json::from_str(&self.body).map_err(|e| DispatchError::InvalidBody(e.to_string()))
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Sends exchanges over a shared blocking client.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::blocking::Client,
}

impl Dispatcher {
    /// Build a dispatcher with transport defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, DispatchError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    /// Send `exchange` and wait for the full response.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::StatusMismatch`] if the status differs from the
    ///   expected one
    /// - [`DispatchError::Transport`] if no response was received
    pub fn send(&self, exchange: &Exchange<'_>) -> Result<ApiResponse, DispatchError> {
        let mut req = self.client.request(exchange.method.clone(), exchange.url);
        if let Some(headers) = exchange.headers {
            for (k, v) in headers {
                req = req.header(k, v);
            }
        }
        if let Some(query) = exchange.query {
            req = req.query(query);
        }
        if let Some(body) = exchange.json {
            req = req.json(body);
        }

        tracing::debug!(
            method = %exchange.method,
            url = exchange.url,
            expected = exchange.expected_status,
            "dispatch"
        );

        let start = Instant::now();
        let resp = req.send().map_err(|e| {
            DispatchError::Transport(format!("{} {}: {e}", exchange.method, exchange.url))
        })?;
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp
            .text()
            .map_err(|e| DispatchError::Transport(format!("reading body: {e}")))?;
        let elapsed = start.elapsed();

        tracing::debug!(status, elapsed_ms = elapsed.as_millis() as u64, "response");

        if status != exchange.expected_status {
            return Err(DispatchError::StatusMismatch {
                method: exchange.method.to_string(),
                url: exchange.url.to_string(),
                expected: exchange.expected_status,
                actual: status,
                body: excerpt(&body),
            });
        }

        Ok(ApiResponse {
            status,
            headers,
            body,
            elapsed,
        })
    }
}

fn excerpt(body: &str) -> String {
    if body.len() <= MAX_BODY_EXCERPT {
        return body.to_string();
    }
    let mut end = MAX_BODY_EXCERPT;
    while end > 0 && !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…({} bytes total)", &body[..end], body.len())
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{method} {url}: expected {expected} but found {actual}")]
    StatusMismatch {
        method: String,
        url: String,
        expected: u16,
        actual: u16,
        body: String,
    },
    #[error("HTTP error: {0}")]
    Transport(String),
    #[error("Response body is not JSON: {0}")]
    InvalidBody(String),
}
