//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer plus `size_t` length instead of `Vec`,
//! and tagged enums with explicit discriminants. Absent optional strings are
//! null. Conversion and release helpers live here to keep `lib.rs` focused
//! on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use cinema_core::{
    ApiError, Genre, GenreList, HttpMethod, HttpRequest, Movie, MovieDetails, MovieList,
    MoviePage, StatusResponse, TmdbClient,
};

/// Opaque handle to a `TmdbClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiCinemaClient {
    pub(crate) inner: TmdbClient,
}

// ---------------------------------------------------------------------------
// Ownership helpers
// ---------------------------------------------------------------------------

/// Move `s` into a C string owned by the caller. Interior NULs are dropped.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(e) => {
            let mut bytes = e.into_vec();
            bytes.retain(|b| *b != 0);
            CString::new(bytes).unwrap_or_default().into_raw()
        }
    }
}

fn into_optional_c_string(s: Option<String>) -> *mut c_char {
    s.map(into_c_string).unwrap_or(std::ptr::null_mut())
}

/// Release a string produced by `into_c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Leak `items` as a pointer/length pair; empty becomes null.
fn into_raw_slice<T>(items: Vec<T>) -> (*mut T, usize) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len();
    let ptr = Box::into_raw(items.into_boxed_slice()) as *mut T;
    (ptr, len)
}

/// Reclaim a pair produced by `into_raw_slice`.
fn from_raw_slice<T>(ptr: *mut T, len: usize) -> Box<[T]> {
    if ptr.is_null() || len == 0 {
        return Box::new([]);
    }
    unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)) }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `cinema_build_*` functions. `url` is absolute and already
/// carries the `api_key` parameter. The C caller executes the request and
/// passes the response back through `cinema_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: usize,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let headers = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: into_c_string(k),
                value: into_c_string(v),
            })
            .collect();
        let (headers, headers_len) = into_raw_slice(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: into_c_string(req.url),
            headers,
            headers_len,
            body: into_optional_c_string(req.body),
        }))
    }

    /// Release every allocation owned by `req`, then `req` itself.
    pub(crate) fn free(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        for header in from_raw_slice(req.headers, req.headers_len).iter() {
            free_c_string(header.key);
            free_c_string(header.value);
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `cinema_parse_*` function. The FFI layer reads
/// but does not free these fields. A null `body` is an empty body.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

/// The curated lists, for `cinema_build_movie_list`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiMovieList {
    NowPlaying = 0,
    Popular = 1,
    TopRated = 2,
    Upcoming = 3,
}

impl From<FfiMovieList> for MovieList {
    fn from(list: FfiMovieList) -> Self {
        match list {
            FfiMovieList::NowPlaying => MovieList::NowPlaying,
            FfiMovieList::Popular => MovieList::Popular,
            FfiMovieList::TopRated => MovieList::TopRated,
            FfiMovieList::Upcoming => MovieList::Upcoming,
        }
    }
}

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiCinemaResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidUrl = 1,
    Encoding = 2,
    InvalidStatusCode = 3,
    Decoding = 4,
    Transport = 5,
    Panic = 6,
    NullArg = 7,
}

/// Tag that tells `cinema_free_result` what `FfiCinemaResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    MoviePage = 1,
    MovieDetails = 2,
    GenreList = 3,
    Status = 4,
}

/// A movie from a list or search page.
#[repr(C)]
pub struct FfiMovie {
    pub id: i64,
    pub title: *mut c_char,
    pub overview: *mut c_char,
    pub poster_path: *mut c_char,
    pub backdrop_path: *mut c_char,
    pub release_date: *mut c_char,
    pub vote_average: f64,
    pub vote_count: u32,
    pub genre_ids: *mut i64,
    pub genre_ids_len: usize,
}

impl FfiMovie {
    fn from_core(movie: Movie) -> Self {
        let (genre_ids, genre_ids_len) = into_raw_slice(movie.genre_ids);
        FfiMovie {
            id: movie.id,
            title: into_c_string(movie.title),
            overview: into_c_string(movie.overview),
            poster_path: into_optional_c_string(movie.poster_path),
            backdrop_path: into_optional_c_string(movie.backdrop_path),
            release_date: into_optional_c_string(movie.release_date),
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            genre_ids,
            genre_ids_len,
        }
    }

    fn free_fields(&self) {
        free_c_string(self.title);
        free_c_string(self.overview);
        free_c_string(self.poster_path);
        free_c_string(self.backdrop_path);
        free_c_string(self.release_date);
        drop(from_raw_slice(self.genre_ids, self.genre_ids_len));
    }
}

/// One page of movies. `dates_minimum`/`dates_maximum` are null unless the
/// list carries a release window.
#[repr(C)]
pub struct FfiMoviePage {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub results: *mut FfiMovie,
    pub results_len: usize,
    pub dates_minimum: *mut c_char,
    pub dates_maximum: *mut c_char,
}

#[repr(C)]
pub struct FfiGenre {
    pub id: i64,
    pub name: *mut c_char,
}

impl FfiGenre {
    fn from_core(genre: Genre) -> Self {
        FfiGenre {
            id: genre.id,
            name: into_c_string(genre.name),
        }
    }
}

fn free_genres(ptr: *mut FfiGenre, len: usize) {
    for genre in from_raw_slice(ptr, len).iter() {
        free_c_string(genre.name);
    }
}

#[repr(C)]
pub struct FfiGenreList {
    pub items: *mut FfiGenre,
    pub len: usize,
}

/// Detail record. `runtime` is 0 when unknown.
#[repr(C)]
pub struct FfiMovieDetails {
    pub id: i64,
    pub title: *mut c_char,
    pub overview: *mut c_char,
    pub tagline: *mut c_char,
    pub poster_path: *mut c_char,
    pub backdrop_path: *mut c_char,
    pub release_date: *mut c_char,
    pub runtime: u32,
    pub vote_average: f64,
    pub vote_count: u32,
    pub genres: *mut FfiGenre,
    pub genres_len: usize,
    pub status: *mut c_char,
    pub homepage: *mut c_char,
    pub imdb_id: *mut c_char,
}

/// Acknowledgement from a write endpoint. `success` is -1 when TMDB
/// omitted it, otherwise 0 or 1.
#[repr(C)]
pub struct FfiStatus {
    pub status_code: i32,
    pub status_message: *mut c_char,
    pub success: i32,
}

// ---------------------------------------------------------------------------
// Result envelope
// ---------------------------------------------------------------------------

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, `http_status` is set for `InvalidStatusCode`,
/// and `data` is null.
#[repr(C)]
pub struct FfiCinemaResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiCinemaResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiCinemaResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn error(error_code: FfiErrorCode, http_status: u16, message: String) -> *mut Self {
        Box::into_raw(Box::new(FfiCinemaResult {
            error_code,
            error_message: into_c_string(message),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn ok_movie_page(page: MoviePage) -> *mut Self {
        let results = page.results.into_iter().map(FfiMovie::from_core).collect();
        let (results, results_len) = into_raw_slice(results);
        let (dates_minimum, dates_maximum) = match page.dates {
            Some(dates) => (into_c_string(dates.minimum), into_c_string(dates.maximum)),
            None => (std::ptr::null_mut(), std::ptr::null_mut()),
        };
        let ffi_page = Box::new(FfiMoviePage {
            page: page.page,
            total_pages: page.total_pages,
            total_results: page.total_results,
            results,
            results_len,
            dates_minimum,
            dates_maximum,
        });
        Self::ok(FfiDataTag::MoviePage, Box::into_raw(ffi_page) as *mut c_void)
    }

    pub(crate) fn ok_movie_details(details: MovieDetails) -> *mut Self {
        let genres = details.genres.into_iter().map(FfiGenre::from_core).collect();
        let (genres, genres_len) = into_raw_slice(genres);
        let ffi_details = Box::new(FfiMovieDetails {
            id: details.id,
            title: into_c_string(details.title),
            overview: into_c_string(details.overview),
            tagline: into_optional_c_string(details.tagline),
            poster_path: into_optional_c_string(details.poster_path),
            backdrop_path: into_optional_c_string(details.backdrop_path),
            release_date: into_optional_c_string(details.release_date),
            runtime: details.runtime.unwrap_or(0),
            vote_average: details.vote_average,
            vote_count: details.vote_count,
            genres,
            genres_len,
            status: into_optional_c_string(details.status),
            homepage: into_optional_c_string(details.homepage),
            imdb_id: into_optional_c_string(details.imdb_id),
        });
        Self::ok(FfiDataTag::MovieDetails, Box::into_raw(ffi_details) as *mut c_void)
    }

    pub(crate) fn ok_genre_list(list: GenreList) -> *mut Self {
        let items = list.genres.into_iter().map(FfiGenre::from_core).collect();
        let (items, len) = into_raw_slice(items);
        let ffi_list = Box::new(FfiGenreList { items, len });
        Self::ok(FfiDataTag::GenreList, Box::into_raw(ffi_list) as *mut c_void)
    }

    pub(crate) fn ok_status(status: StatusResponse) -> *mut Self {
        let ffi_status = Box::new(FfiStatus {
            status_code: status.status_code,
            status_message: into_c_string(status.status_message),
            success: status.success.map_or(-1, i32::from),
        });
        Self::ok(FfiDataTag::Status, Box::into_raw(ffi_status) as *mut c_void)
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let code = match &err {
            ApiError::InvalidUrl(_) => FfiErrorCode::InvalidUrl,
            ApiError::Encoding(_) => FfiErrorCode::Encoding,
            ApiError::InvalidStatusCode { .. } => FfiErrorCode::InvalidStatusCode,
            ApiError::Decoding(_) => FfiErrorCode::Decoding,
            ApiError::Transport(_) => FfiErrorCode::Transport,
        };
        Self::error(code, err.status().unwrap_or(0), err.to_string())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, 0, msg.to_string())
    }

    /// Release the envelope and whatever `data_tag` says `data` points to.
    pub(crate) fn free(result: *mut Self) {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::MoviePage => {
                let page = unsafe { Box::from_raw(result.data as *mut FfiMoviePage) };
                for movie in from_raw_slice(page.results, page.results_len).iter() {
                    movie.free_fields();
                }
                free_c_string(page.dates_minimum);
                free_c_string(page.dates_maximum);
            }
            FfiDataTag::MovieDetails => {
                let d = unsafe { Box::from_raw(result.data as *mut FfiMovieDetails) };
                for s in [
                    d.title,
                    d.overview,
                    d.tagline,
                    d.poster_path,
                    d.backdrop_path,
                    d.release_date,
                    d.status,
                    d.homepage,
                    d.imdb_id,
                ] {
                    free_c_string(s);
                }
                free_genres(d.genres, d.genres_len);
            }
            FfiDataTag::GenreList => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiGenreList) };
                free_genres(list.items, list.len);
            }
            FfiDataTag::Status => {
                let status = unsafe { Box::from_raw(result.data as *mut FfiStatus) };
                free_c_string(status.status_message);
            }
            FfiDataTag::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;

    #[test]
    fn interior_nul_is_stripped() {
        let s = into_c_string("Alien\0: Romulus".to_string());
        assert_eq!(unsafe { CStr::from_ptr(s) }.to_str().unwrap(), "Alien: Romulus");
        free_c_string(s);
    }

    #[test]
    fn empty_slice_is_null() {
        let (ptr, len) = into_raw_slice(Vec::<i64>::new());
        assert!(ptr.is_null());
        assert_eq!(len, 0);
        assert!(from_raw_slice(ptr, len).is_empty());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn length_is_not_truncated() {
        let count = u32::MAX as usize + 1;
        let (ptr, len) = into_raw_slice(vec![(); count]);
        assert_eq!(len, count);
        assert_eq!(from_raw_slice(ptr, len).len(), count);
    }

    #[test]
    fn slice_round_trips_through_raw_parts() {
        let (ptr, len) = into_raw_slice(vec![16_i64, 10751, 12]);
        assert_eq!(len, 3);
        assert_eq!(&*from_raw_slice(ptr, len), &[16, 10751, 12]);
    }

    #[test]
    fn error_codes_follow_the_error_variant() {
        let cases = [
            (ApiError::InvalidUrl("x".into()), FfiErrorCode::InvalidUrl, 0),
            (ApiError::Encoding("x".into()), FfiErrorCode::Encoding, 0),
            (
                ApiError::InvalidStatusCode {
                    status: 401,
                    message: "Invalid API key".into(),
                },
                FfiErrorCode::InvalidStatusCode,
                401,
            ),
            (ApiError::Decoding("x".into()), FfiErrorCode::Decoding, 0),
            (
                ApiError::transport(std::io::Error::other("refused")),
                FfiErrorCode::Transport,
                0,
            ),
        ];
        for (err, code, status) in cases {
            let result = FfiCinemaResult::from_error(err);
            let r = unsafe { &*result };
            assert_eq!(r.error_code, code);
            assert_eq!(r.http_status, status);
            assert!(!r.error_message.is_null());
            assert!(r.data.is_null());
            FfiCinemaResult::free(result);
        }
    }

    #[test]
    fn status_success_is_tri_state() {
        for (success, expected) in [(None, -1), (Some(false), 0), (Some(true), 1)] {
            let result = FfiCinemaResult::ok_status(StatusResponse {
                status_code: 1,
                status_message: "Success.".into(),
                success,
            });
            let status = unsafe { &*((*result).data as *const FfiStatus) };
            assert_eq!(status.success, expected);
            FfiCinemaResult::free(result);
        }
    }
}
