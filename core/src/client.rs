//! Stateless request builder and response parser for the TMDB movie API.
//!
//! # Design
//! `TmdbClient` holds only an `ApiConfig` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! `MovieService` pairs them with a `Transport`; hosts on the C ABI execute
//! the round trip themselves and call the same pair.

use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::decode::decode;
use crate::error::ApiError;
use crate::http::{check_status, HttpRequest, HttpResponse, RequestDescriptor};
use crate::types::{GenreList, MovieDetails, MovieList, MoviePage, RatingRequest, StatusResponse};

/// Synchronous, stateless client for the TMDB movie endpoints.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    config: ApiConfig,
}

impl TmdbClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn build_movie_list(&self, list: MovieList, page: u32) -> Result<HttpRequest, ApiError> {
        RequestDescriptor::get(list.path())
            .query("page", page)
            .into_request(&self.config)
    }

    pub fn build_search_movies(&self, query: &str, page: u32) -> Result<HttpRequest, ApiError> {
        RequestDescriptor::get("/3/search/movie")
            .query("query", query)
            .query("page", page)
            .into_request(&self.config)
    }

    pub fn build_movie_details(&self, id: i64) -> Result<HttpRequest, ApiError> {
        RequestDescriptor::get(format!("/3/movie/{id}")).into_request(&self.config)
    }

    pub fn build_similar_movies(&self, id: i64, page: u32) -> Result<HttpRequest, ApiError> {
        RequestDescriptor::get(format!("/3/movie/{id}/similar"))
            .query("page", page)
            .into_request(&self.config)
    }

    pub fn build_genres(&self) -> Result<HttpRequest, ApiError> {
        RequestDescriptor::get("/3/genre/movie/list").into_request(&self.config)
    }

    /// Rate a movie between 0.5 and 10.0. TMDB validates the range.
    pub fn build_rate_movie(
        &self,
        id: i64,
        value: f64,
        guest_session_id: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        RequestDescriptor::post(format!("/3/movie/{id}/rating"))
            .optional_query("guest_session_id", guest_session_id)
            .json_body(RatingRequest { value })
            .into_request(&self.config)
    }

    pub fn build_delete_rating(
        &self,
        id: i64,
        guest_session_id: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        RequestDescriptor::delete(format!("/3/movie/{id}/rating"))
            .optional_query("guest_session_id", guest_session_id)
            .into_request(&self.config)
    }

    pub fn parse_movie_page(&self, response: HttpResponse) -> Result<MoviePage, ApiError> {
        parse(response)
    }

    pub fn parse_movie_details(&self, response: HttpResponse) -> Result<MovieDetails, ApiError> {
        parse(response)
    }

    pub fn parse_genres(&self, response: HttpResponse) -> Result<GenreList, ApiError> {
        parse(response)
    }

    pub fn parse_status(&self, response: HttpResponse) -> Result<StatusResponse, ApiError> {
        parse(response)
    }
}

fn parse<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    let body = check_status(response)?;
    decode(&body)
}
