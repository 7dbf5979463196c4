// crates/core/src/transport.rs

//! HTTP seam between the list-access layer and the network.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

/// OData verbose media type used for every SharePoint call.
pub const ODATA_VERBOSE: &str = "application/json;odata=verbose";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// A single outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: vec![("Accept".to_string(), ODATA_VERBOSE.to_string())],
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn json_body(mut self, body: &serde_json::Value) -> Self {
        self.headers
            .push(("Content-Type".to_string(), ODATA_VERBOSE.to_string()));
        self.body = Some(body.to_string());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a response. Non-2xx statuses are not errors here.
#[derive(Debug, Clone)]
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

/// Sends requests to SharePoint.
///
/// `Err` means the request never produced a response (DNS, TLS, timeout...).
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).send(request)
    }
}

/// How the live transport authenticates against the site.
#[derive(Debug, Clone, Default)]
pub enum Credentials {
    #[default]
    None,
    /// Raw `Cookie` header value (e.g. `FedAuth=...; rtFa=...`).
    Cookie(String),
    /// OAuth bearer token.
    Bearer(String),
}

impl Credentials {
    /// A bearer token wins over a cookie.
    pub fn from_parts(token: Option<String>, cookie: Option<String>) -> Self {
        match (token, cookie) {
            (Some(token), _) => Credentials::Bearer(token),
            (None, Some(cookie)) => Credentials::Cookie(cookie),
            (None, None) => Credentials::None,
        }
    }
}

/// Success bodies must arrive whole; error bodies are best effort.
fn read_body<E>(success: bool, text: std::result::Result<String, E>) -> Result<String>
where
    E: std::error::Error + Send + Sync + 'static,
{
    if success {
        text.context("failed to read response body")
    } else {
        Ok(text.unwrap_or_default())
    }
}

/// Live transport backed by a blocking reqwest client.
pub struct ReqwestTransport {
    client: Client,
    credentials: Credentials,
}

impl ReqwestTransport {
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("verlofrooster/0.1")
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            credentials,
        })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &self.credentials {
            Credentials::None => builder,
            Credentials::Cookie(cookie) => builder.header("Cookie", cookie.as_str()),
            Credentials::Bearer(token) => builder.bearer_auth(token),
        };

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let resp = builder
            .send()
            .with_context(|| format!("{} {} failed", request.method.as_str(), request.url))?;

        let status = resp.status().as_u16();
        let body = read_body(resp.status().is_success(), resp.text())?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted transport for unit tests.

    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    /// Replays queued responses in order and records every request.
    #[derive(Default)]
    pub struct ScriptedTransport {
        responses: RefCell<VecDeque<Result<HttpResponse, String>>>,
        pub requests: RefCell<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, status: u16, body: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        pub fn fail(self, message: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Err(message.to_string()));
            self
        }

        pub fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
            self.requests.borrow_mut().push(request.clone());
            match self.responses.borrow_mut().pop_front() {
                Some(Ok(resp)) => Ok(resp),
                Some(Err(msg)) => Err(anyhow::anyhow!(msg)),
                None => Err(anyhow::anyhow!("no scripted response left")),
            }
        }
    }
}
