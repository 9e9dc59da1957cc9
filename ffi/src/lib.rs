//! C-ABI wrapper around `cinema-core`.
//!
//! # Overview
//! Exposes the TMDB movie client through `extern "C"` functions so any
//! language with a C FFI can build requests and parse responses without
//! linking to Rust's async runtime or serde directly. The host runs the
//! HTTP round trip itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors `TmdbClient` 1:1.
//! - A single `FfiCinemaResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `cinema_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use cinema_core::logging::{init_tracing, parse_level};
use cinema_core::{ApiConfig, ApiError, HttpRequest, HttpResponse, TmdbClient};
use tracing::{warn, Level};

use types::*;

/// Borrow a C string as `&str`. Null and invalid UTF-8 are `None`.
fn c_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

/// Split `http://host:port` into scheme and host. A bare host means https.
fn split_base_url(base_url: &str) -> (&str, &str) {
    match base_url.split_once("://") {
        Some((scheme, host)) => (scheme, host),
        None => ("https", base_url),
    }
}

/// Hand a built request to C, or null when building failed.
fn request_or_null(op: &str, result: Result<HttpRequest, ApiError>) -> *mut FfiHttpRequest {
    match result {
        Ok(req) => FfiHttpRequest::from_core(req),
        Err(e) => {
            warn!(op, error = %e, "failed to build request");
            std::ptr::null_mut()
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Create a client for `api_key`.
///
/// `base_url` may be null for the public TMDB API, or e.g.
/// `"http://127.0.0.1:3000"` for a local server.
/// Returns null if `api_key` is null or not UTF-8, or if an internal panic
/// occurs. The caller must free the returned pointer with `cinema_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_client_new(
    api_key: *const c_char,
    base_url: *const c_char,
) -> *mut FfiCinemaClient {
    catch_unwind(|| {
        let Some(api_key) = c_str(api_key) else {
            return std::ptr::null_mut();
        };
        let mut config = ApiConfig::new(api_key);
        if let Some(base_url) = c_str(base_url) {
            let (scheme, host) = split_base_url(base_url);
            config = config.with_endpoint(scheme, host);
        }
        Box::into_raw(Box::new(FfiCinemaClient {
            inner: TmdbClient::new(config),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `cinema_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_client_free(client: *mut FfiCinemaClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Install console logging at `level` (`"trace"` .. `"error"`; null means
/// `"info"`). `RUST_LOG` wins when set. Returns false if logging was already
/// installed or the level name is unknown.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_init_logging(level: *const c_char) -> bool {
    catch_unwind(|| {
        let level = match level.is_null() {
            true => Some(Level::INFO),
            false => c_str(level).and_then(parse_level),
        };
        level.is_some_and(init_tracing)
    })
    .unwrap_or(false)
}

/// Full image URL for a poster or backdrop path at `size` (e.g. `"w500"`).
///
/// Returns null on null arguments. Free with `cinema_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_image_url(
    client: *const FfiCinemaClient,
    file_path: *const c_char,
    size: *const c_char,
) -> *mut c_char {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match (c_str(file_path), c_str(size)) {
            (Some(path), Some(size)) => into_c_string(client.inner.config().image_url(path, size)),
            _ => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a request for one page of a curated list.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `cinema_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_build_movie_list(
    client: *const FfiCinemaClient,
    list: FfiMovieList,
    page: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        request_or_null("movie_list", client.inner.build_movie_list(list.into(), page))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a title search request.
///
/// Returns null if `client` or `query` is null, or `query` is not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_build_search_movies(
    client: *const FfiCinemaClient,
    query: *const c_char,
    page: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(query) = c_str(query) else {
            return std::ptr::null_mut();
        };
        request_or_null("search_movies", client.inner.build_search_movies(query, page))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request for one movie's details.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_build_movie_details(
    client: *const FfiCinemaClient,
    id: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        request_or_null("movie_details", client.inner.build_movie_details(id))
    })
    .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn cinema_build_similar_movies(
    client: *const FfiCinemaClient,
    id: i64,
    page: u32,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        request_or_null("similar_movies", client.inner.build_similar_movies(id, page))
    })
    .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn cinema_build_genres(client: *const FfiCinemaClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        request_or_null("genres", client.inner.build_genres())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a rating request. `guest_session_id` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_build_rate_movie(
    client: *const FfiCinemaClient,
    id: i64,
    value: f64,
    guest_session_id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let guest = c_str(guest_session_id);
        request_or_null("rate_movie", client.inner.build_rate_movie(id, value, guest))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request removing a rating. `guest_session_id` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_build_delete_rating(
    client: *const FfiCinemaClient,
    id: i64,
    guest_session_id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let guest = c_str(guest_session_id);
        request_or_null("delete_rating", client.inner.build_delete_rating(id, guest))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Copy a caller-owned `FfiHttpResponse` into a core `HttpResponse`.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        Vec::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }.to_bytes().to_vec()
    };
    HttpResponse::new(resp.status, body)
}

/// Shared null checks and conversion for every `cinema_parse_*` function.
fn parse_with<T>(
    op: &'static str,
    client: *const FfiCinemaClient,
    response: *const FfiHttpResponse,
    parse: impl FnOnce(&TmdbClient, HttpResponse) -> Result<T, ApiError>,
    ok: impl FnOnce(T) -> *mut FfiCinemaResult,
) -> *mut FfiCinemaResult {
    catch_unwind(std::panic::AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiCinemaResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCinemaResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match parse(&client.inner, ffi_response_to_core(resp)) {
            Ok(value) => ok(value),
            Err(e) => FfiCinemaResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiCinemaResult::panic(&format!("panic in cinema_parse_{op}")))
}

/// Parse a list, search or similar-movies response.
///
/// Returns a result with `data_tag = MoviePage` on success.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_parse_movie_page(
    client: *const FfiCinemaClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCinemaResult {
    parse_with(
        "movie_page",
        client,
        response,
        TmdbClient::parse_movie_page,
        FfiCinemaResult::ok_movie_page,
    )
}

/// Returns a result with `data_tag = MovieDetails` on success.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_parse_movie_details(
    client: *const FfiCinemaClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCinemaResult {
    parse_with(
        "movie_details",
        client,
        response,
        TmdbClient::parse_movie_details,
        FfiCinemaResult::ok_movie_details,
    )
}

/// Returns a result with `data_tag = GenreList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_parse_genres(
    client: *const FfiCinemaClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCinemaResult {
    parse_with(
        "genres",
        client,
        response,
        TmdbClient::parse_genres,
        FfiCinemaResult::ok_genre_list,
    )
}

/// Parse a rating or delete-rating response.
///
/// Returns a result with `data_tag = Status` on success.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_parse_status(
    client: *const FfiCinemaClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCinemaResult {
    parse_with(
        "status",
        client,
        response,
        TmdbClient::parse_status,
        FfiCinemaResult::ok_status,
    )
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `cinema_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| FfiHttpRequest::free(req));
}

/// Free an `FfiCinemaResult` returned by any `cinema_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_free_result(result: *mut FfiCinemaResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| FfiCinemaResult::free(result));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cinema_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
