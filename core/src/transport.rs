//! Request execution.
//!
//! # Design
//! `HttpBackend` is the raw network round trip and the seam for test doubles.
//! `Transport` wraps a backend and owns status validation, so every backend
//! gets the same 200..=299 rule. Nothing is retried or cached; a backend
//! failure reaches the caller as `ApiError::Transport` with its source intact.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{check_status, HttpMethod, HttpRequest, HttpResponse, API_KEY_PARAM};

/// Performs one HTTP round trip. Non-2xx statuses are returned as data.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `HttpBackend` over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    /// Client that never follows redirects, so 3xx reaches status validation.
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(ApiError::transport)?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(ApiError::transport)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(ApiError::transport)?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

/// Executes requests through a backend and validates the status code.
#[derive(Clone)]
pub struct Transport {
    backend: Arc<dyn HttpBackend>,
}

impl Transport {
    pub fn new(backend: Arc<dyn HttpBackend>) -> Self {
        Self { backend }
    }

    /// Send `request` and return the body of a 2xx response.
    ///
    /// # Errors
    /// - `ApiError::InvalidStatusCode` for any status outside 200..=299
    /// - `ApiError::Transport` when the backend fails before a response
    pub async fn execute(&self, request: HttpRequest) -> Result<Vec<u8>, ApiError> {
        let method = request.method.as_str();
        let url = redact_credential(&request.url);
        debug!(method, url = %url, "sending request");

        let response = match self.backend.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(method, url = %url, error = %e, "request failed");
                return Err(e);
            }
        };

        let status = response.status;
        check_status(response).inspect_err(|e| {
            warn!(method, url = %url, status, error = %e, "unexpected status");
        })
    }
}

/// Strip the credential value so URLs can be logged.
fn redact_credential(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let query: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key == API_KEY_PARAM => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect();
    format!("{base}?{}", query.join("&"))
}
