//! Runtime configuration for the TMDB client and the theatre finder.
//!
//! Defaults point at the public TMDB deployment. `ApiConfig::from_env` lets a
//! host or the test harness redirect the client without code changes.

use std::env;

pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_HOST: &str = "api.themoviedb.org";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Where and how to reach the TMDB API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// URL scheme, `https` outside of tests.
    pub scheme: String,
    /// Host (optionally with port) every request is sent to.
    pub host: String,
    /// Credential sent as the leading `api_key` query parameter.
    pub api_key: String,
    /// Prefix for poster and backdrop URLs handed to the image loader.
    pub image_base_url: String,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            api_key: api_key.into(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
        }
    }

    /// Point the client at another host, e.g. a local mock server.
    pub fn with_endpoint(mut self, scheme: &str, host: &str) -> Self {
        self.scheme = scheme.to_string();
        self.host = host.trim_end_matches('/').to_string();
        self
    }

    /// Build from `TMDB_API_KEY`, with optional `TMDB_API_SCHEME`,
    /// `TMDB_API_HOST` and `TMDB_IMAGE_BASE_URL` overrides.
    ///
    /// Returns `None` when no API key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("TMDB_API_KEY").ok().filter(|k| !k.is_empty())?;
        let mut config = Self::new(api_key);
        if let Ok(scheme) = env::var("TMDB_API_SCHEME") {
            config.scheme = scheme;
        }
        if let Ok(host) = env::var("TMDB_API_HOST") {
            config.host = host.trim_end_matches('/').to_string();
        }
        if let Ok(base) = env::var("TMDB_IMAGE_BASE_URL") {
            config.image_base_url = base.trim_end_matches('/').to_string();
        }
        Some(config)
    }

    /// Full image URL for a TMDB file path such as `/abc.jpg` at `size`
    /// (`w185`, `w500`, `original`, ...).
    pub fn image_url(&self, file_path: &str, size: &str) -> String {
        format!("{}/{size}{file_path}", self.image_base_url)
    }
}

/// Parameters for the nearby theatre search.
#[derive(Debug, Clone, PartialEq)]
pub struct TheatreConfig {
    /// Natural-language query handed to the map search collaborator.
    pub query: String,
    /// Width and height of the search region around the user, in meters.
    pub span_meters: f64,
}

impl Default for TheatreConfig {
    fn default() -> Self {
        Self {
            query: "movie theater".to_string(),
            span_meters: 10_000.0,
        }
    }
}
