//! TMDB payloads used by the movie screens.
//!
//! # Design
//! Each struct declares exactly the wire fields it reads; unknown fields are
//! ignored and nothing is renamed by convention. Optional wire fields are
//! `Option`s, so an absent or `null` field decodes to `None` while an empty
//! string stays `Some("")`.

use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;

/// A movie as it appears in list and search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub vote_count: u32,
    pub genre_ids: Vec<i64>,
}

impl Movie {
    /// Year part of `release_date`, when the date is present and well formed.
    pub fn release_year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }

    pub fn poster_url(&self, config: &ApiConfig, size: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|path| config.image_url(path, size))
    }

    pub fn backdrop_url(&self, config: &ApiConfig, size: &str) -> Option<String> {
        self.backdrop_path
            .as_deref()
            .map(|path| config.image_url(path, size))
    }
}

fn release_year(date: Option<&str>) -> Option<i32> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}

/// Release window attached to the now-playing and upcoming lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub maximum: String,
    pub minimum: String,
}

/// One page of movie results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoviePage {
    pub page: u32,
    pub results: Vec<Movie>,
    pub total_pages: u32,
    pub total_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<DateRange>,
}

impl MoviePage {
    /// The page returned for a blank search, without asking the server.
    pub fn empty() -> Self {
        Self {
            page: 1,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
            dates: None,
        }
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenreList {
    pub genres: Vec<Genre>,
}

/// Full record behind the detail screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub tagline: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    pub vote_average: f64,
    pub vote_count: u32,
    pub genres: Vec<Genre>,
    pub status: Option<String>,
    pub homepage: Option<String>,
    pub imdb_id: Option<String>,
    pub budget: Option<u64>,
    pub revenue: Option<u64>,
}

impl MovieDetails {
    pub fn release_year(&self) -> Option<i32> {
        release_year(self.release_date.as_deref())
    }

    /// Runtime as `"2h 16m"`, or `None` when TMDB has no runtime.
    pub fn formatted_runtime(&self) -> Option<String> {
        match self.runtime {
            None | Some(0) => None,
            Some(minutes) if minutes < 60 => Some(format!("{minutes}m")),
            Some(minutes) => Some(format!("{}h {}m", minutes / 60, minutes % 60)),
        }
    }
}

/// Body of `POST /3/movie/{id}/rating`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingRequest {
    pub value: f64,
}

/// Generic acknowledgement TMDB returns from write endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status_code: i32,
    pub status_message: String,
    pub success: Option<bool>,
}

/// The four curated movie lists shown on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovieList {
    NowPlaying,
    Popular,
    TopRated,
    Upcoming,
}

impl MovieList {
    pub const ALL: [MovieList; 4] = [
        MovieList::NowPlaying,
        MovieList::Popular,
        MovieList::TopRated,
        MovieList::Upcoming,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            MovieList::NowPlaying => "/3/movie/now_playing",
            MovieList::Popular => "/3/movie/popular",
            MovieList::TopRated => "/3/movie/top_rated",
            MovieList::Upcoming => "/3/movie/upcoming",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MovieList::NowPlaying => "Now Playing",
            MovieList::Popular => "Popular",
            MovieList::TopRated => "Top Rated",
            MovieList::Upcoming => "Upcoming",
        }
    }
}
