//! HTTP transport capability
//!
//! The exchange and fetch steps never talk to reqwest directly. They build an
//! `OutboundRequest` and hand it to a `Transport`, so tests can substitute a
//! scripted transport and count calls without opening sockets.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use common::Secret;

use crate::constants::DEFAULT_TIMEOUT;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A single request to a provider endpoint.
///
/// `form` is sent as an `application/x-www-form-urlencoded` body and may hold
/// the client secret; there is no `Debug` impl.
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub bearer: Option<Secret<String>>,
}

impl OutboundRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            form: Vec::new(),
            bearer: None,
        }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            query: Vec::new(),
            form,
            bearer: None,
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer = Some(Secret::from(token));
        self
    }

    /// Value of a form field, if present.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value of a query parameter, if present.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Status and body of a provider response. Non-2xx statuses are returned
/// here, not as errors; only connection-level failures become `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends provider requests.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`&dyn Transport`, `Arc<dyn Transport>`).
pub trait Transport: Send + Sync {
    fn send<'a>(
        &'a self,
        request: OutboundRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>>;
}

/// Default transport backed by a shared `reqwest::Client`.
///
/// Every request is bounded by the configured timeout so a stalled provider
/// can not hold a login attempt open indefinitely.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("building HTTP client: {e}")))?;
        Ok(Self { client, timeout })
    }

    /// Reuse an existing client. The timeout is applied per request.
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new(), DEFAULT_TIMEOUT)
    }
}

impl Transport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: OutboundRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = match request.method {
                Method::Get => self.client.get(&request.url),
                Method::Post => self.client.post(&request.url),
            };
            builder = builder.timeout(self.timeout);
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if request.method == Method::Post {
                builder = builder.form(&request.form);
            }
            if let Some(token) = &request.bearer {
                builder = builder.bearer_auth(token.expose());
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Error::Transport(describe(&request.url, e)))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| Error::Transport(describe(&request.url, e)))?;

            Ok(HttpResponse { status, body })
        })
    }
}

/// Error text with the URL but without the query string, which can carry an
/// access token.
fn describe(url: &str, error: reqwest::Error) -> String {
    let endpoint = url.split('?').next().unwrap_or(url);
    if error.is_timeout() {
        format!("request to {endpoint} timed out")
    } else {
        format!("request to {endpoint} failed: {}", error.without_url())
    }
}
