//! Client core for a TMDB-backed movie app.
//!
//! # Overview
//! Builds TMDB requests, executes them, decodes the responses and exposes the
//! results through small domain services (movies, favorites, nearby
//! theatres). Platform capabilities the core cannot own, like the location
//! manager, map search and the HTTP stack, sit behind traits.
//!
//! # Design
//! - `TmdbClient` is stateless: `build_*` produces an `HttpRequest`, `parse_*`
//!   consumes an `HttpResponse`. Hosts on the C ABI run the I/O themselves.
//! - `MovieService` pairs the client with a `Transport` for async Rust callers.
//! - `LocationBridge` turns delegate callbacks into awaitable calls with one
//!   pending request per track.
//! - `ServiceRegistry` is consulted once, in `AppServices::compose`.

pub mod client;
pub mod config;
pub mod container;
pub mod decode;
pub mod error;
pub mod favorites;
pub mod http;
pub mod location;
pub mod logging;
pub mod movies;
pub mod storage;
pub mod theatres;
pub mod transport;
pub mod types;

pub use client::TmdbClient;
pub use config::{ApiConfig, TheatreConfig};
pub use container::{AppServices, ServiceRegistry};
pub use error::{ApiError, ContainerError, LocationError, StorageError};
pub use favorites::{FavoriteMovie, FavoriteStore, FavoritesService};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestDescriptor};
pub use location::{AuthorizationStatus, Coordinate, LocationBridge, LocationPlatform};
pub use movies::MovieService;
pub use storage::{InMemoryFavoriteStore, SqliteFavoriteStore};
pub use theatres::{Place, PlaceSearch, Region, TheatreService};
pub use transport::{HttpBackend, ReqwestBackend, Transport};
pub use types::{Genre, GenreList, Movie, MovieDetails, MovieList, MoviePage, StatusResponse};
