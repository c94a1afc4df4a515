//! Scripted transport for unit tests

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use crate::credentials::ProviderCredentials;
use crate::error::{Error, Result};
use crate::transport::{HttpResponse, Method, OutboundRequest, Transport};

pub(crate) fn test_credentials() -> ProviderCredentials {
    ProviderCredentials::new("test-client-id", "test-client-secret")
}

/// Plain copy of an `OutboundRequest` as it reached the transport.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub bearer: Option<String>,
}

impl RecordedRequest {
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

enum Scripted {
    Respond(HttpResponse),
    Fail(String),
}

/// Answers by exact URL and records every request it sees. Unscripted URLs
/// fail with a transport error.
#[derive(Default)]
pub(crate) struct MockTransport {
    scripts: HashMap<String, Scripted>,
    recorded: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, response: HttpResponse) -> Self {
        self.scripts.insert(url.to_string(), Scripted::Respond(response));
        self
    }

    pub fn fail(mut self, url: &str, message: &str) -> Self {
        self.scripts
            .insert(url.to_string(), Scripted::Fail(message.to_string()));
        self
    }

    /// Number of requests sent to `url`.
    pub fn calls(&self, url: &str) -> usize {
        self.recorded
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn send<'a>(
        &'a self,
        request: OutboundRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>> {
        self.recorded.lock().unwrap().push(RecordedRequest {
            method: request.method,
            url: request.url.clone(),
            query: request.query.clone(),
            form: request.form.clone(),
            bearer: request.bearer.as_ref().map(|b| b.expose().clone()),
        });

        let result = match self.scripts.get(&request.url) {
            Some(Scripted::Respond(response)) => Ok(response.clone()),
            Some(Scripted::Fail(message)) => Err(Error::Transport(message.clone())),
            None => Err(Error::Transport(format!(
                "no response scripted for {}",
                request.url
            ))),
        };
        Box::pin(async move { result })
    }
}
