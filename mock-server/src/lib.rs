//! In-process stand-in for the TMDB v3 API.
//!
//! Serves the fixtures in `test-vectors/tmdb/` for the endpoints the client
//! uses, enforces the `api_key` query parameter and keeps guest ratings in
//! memory. Error bodies use TMDB's `status_code`/`status_message` shape.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

const NOW_PLAYING: &str = include_str!("../../test-vectors/tmdb/now_playing.json");
const POPULAR: &str = include_str!("../../test-vectors/tmdb/popular.json");
const MOVIE_DETAILS: &str = include_str!("../../test-vectors/tmdb/movie_details.json");
const GENRES: &str = include_str!("../../test-vectors/tmdb/genres.json");

/// Movie id that has a details fixture.
pub const KNOWN_MOVIE_ID: i64 = 603;

#[derive(Clone)]
struct MockState {
    api_key: Arc<str>,
    ratings: Arc<RwLock<HashMap<i64, f64>>>,
}

/// TMDB-shaped error response.
struct Failure {
    status: StatusCode,
    code: u32,
    message: String,
}

impl Failure {
    fn new(status: StatusCode, code: u32, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            7,
            "Invalid API key: You must be granted a valid key.",
        )
    }

    fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            34,
            "The resource you requested could not be found.",
        )
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = json!({
            "status_code": self.code,
            "status_message": self.message,
            "success": false,
        });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct Params {
    api_key: Option<String>,
    page: Option<u32>,
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RatingBody {
    value: f64,
}

pub fn app(api_key: &str) -> Router {
    let state = MockState {
        api_key: Arc::from(api_key),
        ratings: Arc::new(RwLock::new(HashMap::new())),
    };
    Router::new()
        .route("/3/movie/now_playing", get(now_playing))
        .route("/3/movie/popular", get(popular))
        .route("/3/movie/top_rated", get(top_rated))
        .route("/3/movie/upcoming", get(upcoming))
        .route("/3/movie/{id}", get(movie_details))
        .route("/3/movie/{id}/similar", get(similar))
        .route("/3/movie/{id}/rating", post(rate_movie).delete(delete_rating))
        .route("/3/search/movie", get(search_movies))
        .route("/3/genre/movie/list", get(genres))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

fn authorize(state: &MockState, params: &Params) -> Result<(), Failure> {
    match params.api_key.as_deref() {
        Some(key) if key == &*state.api_key => Ok(()),
        _ => Err(Failure::unauthorized()),
    }
}

fn fixture(raw: &str) -> Result<Value, Failure> {
    serde_json::from_str(raw)
        .map_err(|e| Failure::new(StatusCode::INTERNAL_SERVER_ERROR, 11, e.to_string()))
}

fn fixture_results(raw: &str) -> Result<Vec<Value>, Failure> {
    let mut page = fixture(raw)?;
    match page["results"].take() {
        Value::Array(results) => Ok(results),
        _ => Ok(Vec::new()),
    }
}

/// Wrap `results` as one TMDB page. Every fixture fits on page 1; later
/// pages are empty.
fn paged(results: Vec<Value>, page: Option<u32>, dates: Option<Value>) -> Value {
    let page = page.unwrap_or(1).max(1);
    let total_results = results.len();
    let total_pages = u32::from(total_results > 0);
    let results = if page == 1 { results } else { Vec::new() };
    let mut body = json!({
        "page": page,
        "results": results,
        "total_pages": total_pages,
        "total_results": total_results,
    });
    if let Some(dates) = dates {
        body["dates"] = dates;
    }
    body
}

async fn now_playing(
    State(state): State<MockState>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Failure> {
    authorize(&state, &params)?;
    let mut raw = fixture(NOW_PLAYING)?;
    let dates = raw["dates"].take();
    Ok(Json(paged(fixture_results(NOW_PLAYING)?, params.page, Some(dates))))
}

async fn popular(
    State(state): State<MockState>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Failure> {
    authorize(&state, &params)?;
    Ok(Json(paged(fixture_results(POPULAR)?, params.page, None)))
}

async fn top_rated(
    State(state): State<MockState>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Failure> {
    authorize(&state, &params)?;
    let mut results = fixture_results(POPULAR)?;
    results.sort_by(|a, b| {
        let a = a["vote_average"].as_f64().unwrap_or_default();
        let b = b["vote_average"].as_f64().unwrap_or_default();
        b.total_cmp(&a)
    });
    Ok(Json(paged(results, params.page, None)))
}

async fn upcoming(
    State(state): State<MockState>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Failure> {
    authorize(&state, &params)?;
    let dates = json!({ "maximum": "2026-11-20", "minimum": "2026-10-22" });
    Ok(Json(paged(Vec::new(), params.page, Some(dates))))
}

async fn movie_details(
    State(state): State<MockState>,
    Path(id): Path<i64>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Failure> {
    authorize(&state, &params)?;
    if id != KNOWN_MOVIE_ID {
        return Err(Failure::not_found());
    }
    Ok(Json(fixture(MOVIE_DETAILS)?))
}

async fn similar(
    State(state): State<MockState>,
    Path(id): Path<i64>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Failure> {
    authorize(&state, &params)?;
    let results = fixture_results(POPULAR)?
        .into_iter()
        .filter(|movie| movie["id"].as_i64() != Some(id))
        .collect();
    Ok(Json(paged(results, params.page, None)))
}

/// Case-insensitive title match across every fixture list.
async fn search_movies(
    State(state): State<MockState>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Failure> {
    authorize(&state, &params)?;
    let needle = params.query.as_deref().unwrap_or_default().to_lowercase();
    let mut results = fixture_results(POPULAR)?;
    results.extend(fixture_results(NOW_PLAYING)?);
    let results = results
        .into_iter()
        .filter(|movie| {
            !needle.is_empty()
                && movie["title"]
                    .as_str()
                    .is_some_and(|title| title.to_lowercase().contains(&needle))
        })
        .collect();
    Ok(Json(paged(results, params.page, None)))
}

async fn genres(
    State(state): State<MockState>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Failure> {
    authorize(&state, &params)?;
    Ok(Json(fixture(GENRES)?))
}

async fn rate_movie(
    State(state): State<MockState>,
    Path(id): Path<i64>,
    Query(params): Query<Params>,
    Json(body): Json<RatingBody>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    authorize(&state, &params)?;
    if !(0.5..=10.0).contains(&body.value) || (body.value * 2.0).fract() != 0.0 {
        return Err(Failure::new(
            StatusCode::BAD_REQUEST,
            18,
            "Value invalid: Values must be a multiple of 0.50 between 0.5 and 10.0.",
        ));
    }
    let previous = state.ratings.write().await.insert(id, body.value);
    let (code, message) = match previous {
        None => (1, "Success."),
        Some(_) => (12, "The item/record was updated successfully."),
    };
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status_code": code, "status_message": message, "success": true })),
    ))
}

async fn delete_rating(
    State(state): State<MockState>,
    Path(id): Path<i64>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, Failure> {
    authorize(&state, &params)?;
    match state.ratings.write().await.remove(&id) {
        Some(_) => Ok(Json(json!({
            "status_code": 13,
            "status_message": "The item/record was deleted successfully.",
            "success": true,
        }))),
        None => Err(Failure::not_found()),
    }
}
