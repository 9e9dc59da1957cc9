//! Favorite movies.
//!
//! # Design
//! The service only sees the four-operation `FavoriteStore` contract. Stores
//! return favorites newest first; adding a movie that is already a favorite
//! replaces the stored copy and moves it to the front.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StorageError;
use crate::types::{Movie, MovieDetails};

/// The locally persisted snapshot of a movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteMovie {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub added_at: DateTime<Utc>,
}

impl FavoriteMovie {
    pub fn from_movie(movie: &Movie, added_at: DateTime<Utc>) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            poster_path: movie.poster_path.clone(),
            backdrop_path: movie.backdrop_path.clone(),
            release_date: movie.release_date.clone(),
            vote_average: movie.vote_average,
            added_at,
        }
    }

    pub fn from_details(details: &MovieDetails, added_at: DateTime<Utc>) -> Self {
        Self {
            id: details.id,
            title: details.title.clone(),
            overview: details.overview.clone(),
            poster_path: details.poster_path.clone(),
            backdrop_path: details.backdrop_path.clone(),
            release_date: details.release_date.clone(),
            vote_average: details.vote_average,
            added_at,
        }
    }
}

/// Persistence collaborator for favorites, keyed by TMDB movie id.
pub trait FavoriteStore: Send + Sync {
    /// Every favorite, most recently inserted first.
    fn all(&self) -> Result<Vec<FavoriteMovie>, StorageError>;

    fn contains(&self, id: i64) -> Result<bool, StorageError>;

    /// Insert, replacing any favorite with the same id.
    fn insert(&self, favorite: FavoriteMovie) -> Result<(), StorageError>;

    /// Returns whether a favorite was removed.
    fn delete(&self, id: i64) -> Result<bool, StorageError>;
}

#[derive(Clone)]
pub struct FavoritesService {
    store: Arc<dyn FavoriteStore>,
}

impl FavoritesService {
    pub fn new(store: Arc<dyn FavoriteStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<FavoriteMovie>, StorageError> {
        self.store.all()
    }

    pub fn is_favorite(&self, id: i64) -> Result<bool, StorageError> {
        self.store.contains(id)
    }

    pub fn add(&self, movie: &Movie) -> Result<FavoriteMovie, StorageError> {
        self.insert(FavoriteMovie::from_movie(movie, Utc::now()))
    }

    pub fn add_details(&self, details: &MovieDetails) -> Result<FavoriteMovie, StorageError> {
        self.insert(FavoriteMovie::from_details(details, Utc::now()))
    }

    pub fn remove(&self, id: i64) -> Result<bool, StorageError> {
        let removed = self.store.delete(id)?;
        debug!(id, removed, "favorite removed");
        Ok(removed)
    }

    /// Flip the favorite state of `movie`; returns the new state.
    pub fn toggle(&self, movie: &Movie) -> Result<bool, StorageError> {
        if self.store.contains(movie.id)? {
            self.remove(movie.id)?;
            Ok(false)
        } else {
            self.add(movie)?;
            Ok(true)
        }
    }

    fn insert(&self, favorite: FavoriteMovie) -> Result<FavoriteMovie, StorageError> {
        debug!(id = favorite.id, title = %favorite.title, "favorite added");
        self.store.insert(favorite.clone())?;
        Ok(favorite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryFavoriteStore;

    fn movie(id: i64, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            overview: String::new(),
            poster_path: Some(format!("/{id}.jpg")),
            backdrop_path: None,
            release_date: Some("1999-03-31".to_string()),
            vote_average: 8.2,
            vote_count: 10,
            genre_ids: vec![28],
        }
    }

    fn service() -> FavoritesService {
        FavoritesService::new(Arc::new(InMemoryFavoriteStore::new()))
    }

    #[test]
    fn toggle_adds_then_removes() {
        let service = service();
        let matrix = movie(603, "The Matrix");

        assert!(service.toggle(&matrix).unwrap());
        assert!(service.is_favorite(603).unwrap());

        assert!(!service.toggle(&matrix).unwrap());
        assert!(!service.is_favorite(603).unwrap());
        assert!(service.list().unwrap().is_empty());
    }

    #[test]
    fn list_is_newest_first() {
        let service = service();
        service.add(&movie(1, "First")).unwrap();
        service.add(&movie(2, "Second")).unwrap();
        service.add(&movie(3, "Third")).unwrap();

        let ids: Vec<i64> = service.list().unwrap().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn add_snapshots_the_movie() {
        let service = service();
        let favorite = service.add(&movie(603, "The Matrix")).unwrap();
        assert_eq!(favorite.poster_path.as_deref(), Some("/603.jpg"));
        assert_eq!(service.list().unwrap(), vec![favorite]);
    }

    #[test]
    fn remove_unknown_id_reports_false() {
        assert!(!service().remove(42).unwrap());
    }
}
