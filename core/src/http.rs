//! HTTP request descriptors and transport types.
//!
//! # Design
//! A `RequestDescriptor` says *what* to call: method, path, query, headers and
//! an optional body. `into_request` resolves it against an `ApiConfig` into an
//! `HttpRequest` with the absolute URL, the leading `api_key` parameter and the
//! encoded body. Resolution is pure; the same descriptor and config always
//! produce the same request, and nothing here touches the network.
//!
//! `HttpRequest` and `HttpResponse` are plain data with owned fields so they
//! can cross the C ABI and be executed by whatever backend the host has.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ApiConfig;
use crate::decode;
use crate::error::ApiError;

/// Query parameter carrying the TMDB credential. Always emitted first.
pub const API_KEY_PARAM: &str = "api_key";

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Ordered header list with case-insensitive names.
///
/// Names are stored lowercased; inserting an existing name replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.0
    }
}

/// Description of an outbound TMDB call, before defaults are merged in.
///
/// `B` is the body type; bodiless descriptors use `()`.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor<B = ()> {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, Option<String>)>,
    pub headers: Headers,
    pub body: Option<B>,
}

impl RequestDescriptor<()> {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Attach a body; it is encoded as JSON when the request is built.
    pub fn json_body<T: Serialize>(self, body: T) -> RequestDescriptor<T> {
        RequestDescriptor {
            method: self.method,
            path: self.path,
            query: self.query,
            headers: self.headers,
            body: Some(body),
        }
    }
}

impl<B: Serialize> RequestDescriptor<B> {
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), Some(value.to_string())));
        self
    }

    /// Add a parameter that is dropped from the URL when `value` is `None`.
    pub fn optional_query<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        self.query.push((key.to_string(), value.map(|v| v.to_string())));
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Resolve into a transport-ready request.
    ///
    /// The credential parameter comes first, followed by the descriptor's
    /// parameters in order. Duplicate keys are all kept. When a body is
    /// present it is encoded and `content-type` is forced to JSON.
    ///
    /// # Errors
    /// - `ApiError::InvalidUrl` if scheme, host, path and query do not form a URL
    /// - `ApiError::Encoding` if the body cannot be serialized
    pub fn into_request(self, config: &ApiConfig) -> Result<HttpRequest, ApiError> {
        validate_path(&self.path)?;

        let base = format!("{}://{}{}", config.scheme, config.host, self.path);
        let mut url =
            Url::parse(&base).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(ApiError::InvalidUrl(format!("{base}: missing host")));
        }

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(API_KEY_PARAM, &config.api_key);
            for (key, value) in &self.query {
                if let Some(value) = value {
                    pairs.append_pair(key, value);
                }
            }
        }

        let mut headers = self.headers;
        let body = match &self.body {
            Some(body) => {
                let bytes = decode::encode(body)?;
                let text =
                    String::from_utf8(bytes).map_err(|e| ApiError::Encoding(e.to_string()))?;
                headers.insert("content-type", JSON_CONTENT_TYPE);
                Some(text)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: self.method,
            url: url.into(),
            headers: headers.into_vec(),
            body,
        })
    }
}

/// Paths must be absolute and contain only RFC 3986 path characters, with
/// `%` only as the start of a two-digit hex escape. Dot segments are
/// rejected because `Url::parse` would resolve them to another path.
/// Anything else is rejected rather than silently percent-encoded.
fn validate_path(path: &str) -> Result<(), ApiError> {
    if !path.starts_with('/') {
        return Err(ApiError::InvalidUrl(format!(
            "path must start with '/': {path:?}"
        )));
    }
    if let Some(c) = path.chars().find(|c| !is_path_char(*c)) {
        return Err(ApiError::InvalidUrl(format!(
            "invalid character {c:?} in path {path:?}"
        )));
    }
    let bytes = path.as_bytes();
    for (i, _) in path.match_indices('%') {
        let escaped = bytes.get(i + 1..i + 3);
        if !escaped.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            return Err(ApiError::InvalidUrl(format!(
                "malformed percent escape in path {path:?}"
            )));
        }
    }
    let is_dot_segment = |segment: &str| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    };
    if path.split('/').any(is_dot_segment) {
        return Err(ApiError::InvalidUrl(format!(
            "dot segment in path {path:?}"
        )));
    }
    Ok(())
}

fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~!$&'()*+,;=:@/%".contains(c)
}

/// An HTTP request described as plain data.
///
/// Built by `RequestDescriptor::into_request`. Executed either by the
/// `Transport` in this crate or by the host on the other side of the C ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Error payload TMDB returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct TmdbErrorBody {
    status_message: String,
}

/// Accept 200..=299 and hand back the body; anything else becomes
/// `ApiError::InvalidStatusCode` carrying the observed status.
pub fn check_status(response: HttpResponse) -> Result<Vec<u8>, ApiError> {
    if (200..=299).contains(&response.status) {
        return Ok(response.body);
    }
    let message = match serde_json::from_slice::<TmdbErrorBody>(&response.body) {
        Ok(err) => err.status_message,
        Err(_) => String::from_utf8_lossy(&response.body).into_owned(),
    };
    Err(ApiError::InvalidStatusCode {
        status: response.status,
        message,
    })
}
