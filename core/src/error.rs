//! Error types for the cinema client core.
//!
//! # Design
//! One enum per concern: `ApiError` for everything between a request
//! descriptor and a decoded value, `LocationError` for the location bridge and
//! place search, `StorageError` for the favorites store. None of them are
//! retried or swallowed inside the core; callers decide what to show.

use thiserror::Error;

use crate::location::AuthorizationStatus;

/// Boxed transport failure, passed through from the HTTP backend unchanged.
pub type TransportSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while building, executing or decoding a TMDB request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Scheme, host, path and query did not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be serialized.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The server answered outside 200..=299.
    #[error("HTTP {status}: {message}")]
    InvalidStatusCode { status: u16, message: String },

    /// The response body did not match the expected schema.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// DNS, TLS, connection or timeout failure from the backend.
    #[error("transport error: {0}")]
    Transport(#[source] TransportSource),
}

impl ApiError {
    /// HTTP status carried by this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::InvalidStatusCode { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ApiError::Transport(Box::new(err))
    }
}

/// Errors produced by the location bridge and the place search collaborator.
#[derive(Debug, Error)]
pub enum LocationError {
    /// A request on the same track is still waiting for its callback.
    #[error("a {0} request is already pending")]
    AlreadyRequesting(&'static str),

    /// The platform reported an update batch with no locations in it.
    #[error("no location found")]
    NoLocationFound,

    /// Location access is not granted.
    #[error("location access not authorized ({0:?})")]
    NotAuthorized(AuthorizationStatus),

    /// The platform reported a failure through its delegate.
    #[error("location platform error: {0}")]
    Platform(String),

    /// The map search collaborator failed.
    #[error("place search failed: {0}")]
    Search(String),

    /// The bridge went away before the pending request was resolved.
    #[error("{0} request abandoned before a callback arrived")]
    Abandoned(&'static str),
}

/// Errors produced by a favorites store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("stored timestamp is invalid: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

/// Composition-time failure: a required dependency was never registered.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("no registration for {type_name}")]
    Missing { type_name: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_exposed_only_for_http_errors() {
        let err = ApiError::InvalidStatusCode {
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(ApiError::Decoding("eof".to_string()).status(), None);
    }

    #[test]
    fn transport_error_keeps_its_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = ApiError::transport(io);
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "reset by peer");
    }

    #[test]
    fn display_includes_status_and_message() {
        let err = ApiError::InvalidStatusCode {
            status: 401,
            message: "Invalid API key".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: Invalid API key");
    }
}
