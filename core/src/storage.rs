//! `FavoriteStore` implementations.
//!
//! `InMemoryFavoriteStore` backs previews and tests. `SqliteFavoriteStore`
//! keeps favorites in a single SQLite table; insertion order is the table's
//! rowid, which `INSERT OR REPLACE` always advances.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::error::StorageError;
use crate::favorites::{FavoriteMovie, FavoriteStore};

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Favorites held in memory, newest first.
#[derive(Debug, Default)]
pub struct InMemoryFavoriteStore {
    favorites: Mutex<Vec<FavoriteMovie>>,
}

impl InMemoryFavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FavoriteStore for InMemoryFavoriteStore {
    fn all(&self) -> Result<Vec<FavoriteMovie>, StorageError> {
        Ok(self.favorites.lock().clone())
    }

    fn contains(&self, id: i64) -> Result<bool, StorageError> {
        Ok(self.favorites.lock().iter().any(|f| f.id == id))
    }

    fn insert(&self, favorite: FavoriteMovie) -> Result<(), StorageError> {
        let mut favorites = self.favorites.lock();
        favorites.retain(|f| f.id != favorite.id);
        favorites.insert(0, favorite);
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let mut favorites = self.favorites.lock();
        let before = favorites.len();
        favorites.retain(|f| f.id != id);
        Ok(favorites.len() != before)
    }
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS favorites (
    movie_id      INTEGER NOT NULL UNIQUE,
    title         TEXT    NOT NULL,
    overview      TEXT    NOT NULL,
    poster_path   TEXT,
    backdrop_path TEXT,
    release_date  TEXT,
    vote_average  REAL    NOT NULL,
    added_at      TEXT    NOT NULL
)";

pub struct SqliteFavoriteStore {
    conn: Mutex<Connection>,
}

impl SqliteFavoriteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Row as read from SQLite, before the timestamp is parsed.
struct FavoriteRow {
    id: i64,
    title: String,
    overview: String,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<String>,
    vote_average: f64,
    added_at: String,
}

impl TryFrom<FavoriteRow> for FavoriteMovie {
    type Error = StorageError;

    fn try_from(row: FavoriteRow) -> Result<Self, Self::Error> {
        let added_at = DateTime::parse_from_rfc3339(&row.added_at)?.with_timezone(&Utc);
        Ok(FavoriteMovie {
            id: row.id,
            title: row.title,
            overview: row.overview,
            poster_path: row.poster_path,
            backdrop_path: row.backdrop_path,
            release_date: row.release_date,
            vote_average: row.vote_average,
            added_at,
        })
    }
}

impl FavoriteStore for SqliteFavoriteStore {
    fn all(&self) -> Result<Vec<FavoriteMovie>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT movie_id, title, overview, poster_path, backdrop_path,
                    release_date, vote_average, added_at
             FROM favorites
             ORDER BY rowid DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(FavoriteRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    overview: row.get(2)?,
                    poster_path: row.get(3)?,
                    backdrop_path: row.get(4)?,
                    release_date: row.get(5)?,
                    vote_average: row.get(6)?,
                    added_at: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(FavoriteMovie::try_from).collect()
    }

    fn contains(&self, id: i64) -> Result<bool, StorageError> {
        let conn = self.conn.lock();
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE movie_id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn insert(&self, favorite: FavoriteMovie) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO favorites
                (movie_id, title, overview, poster_path, backdrop_path,
                 release_date, vote_average, added_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                favorite.id,
                favorite.title,
                favorite.overview,
                favorite.poster_path,
                favorite.backdrop_path,
                favorite.release_date,
                favorite.vote_average,
                favorite.added_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let conn = self.conn.lock();
        let removed = conn.execute("DELETE FROM favorites WHERE movie_id = ?1", params![id])?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn favorite(id: i64, title: &str) -> FavoriteMovie {
        FavoriteMovie {
            id,
            title: title.to_string(),
            overview: "overview".to_string(),
            poster_path: Some(format!("/{id}.jpg")),
            backdrop_path: None,
            release_date: Some(String::new()),
            vote_average: 7.5,
            added_at: Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap(),
        }
    }

    /// Shared contract both stores must satisfy.
    fn exercise(store: &dyn FavoriteStore) {
        assert!(store.all().unwrap().is_empty());
        assert!(!store.contains(1).unwrap());

        store.insert(favorite(1, "One")).unwrap();
        store.insert(favorite(2, "Two")).unwrap();
        store.insert(favorite(3, "Three")).unwrap();
        assert!(store.contains(2).unwrap());

        let ids: Vec<i64> = store.all().unwrap().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        // Re-inserting moves the favorite to the front and replaces it.
        store.insert(favorite(1, "One again")).unwrap();
        let all = store.all().unwrap();
        assert_eq!(all.iter().map(|f| f.id).collect::<Vec<_>>(), vec![1, 3, 2]);
        assert_eq!(all[0].title, "One again");

        assert!(store.delete(3).unwrap());
        assert!(!store.delete(3).unwrap());
        assert!(!store.contains(3).unwrap());
        assert_eq!(store.all().unwrap().len(), 2);
    }

    #[test]
    fn in_memory_store_contract() {
        exercise(&InMemoryFavoriteStore::new());
    }

    #[test]
    fn sqlite_store_contract() {
        exercise(&SqliteFavoriteStore::open_in_memory().unwrap());
    }

    #[test]
    fn sqlite_store_keeps_optional_fields_apart() {
        let store = SqliteFavoriteStore::open_in_memory().unwrap();
        let original = favorite(603, "The Matrix");
        store.insert(original.clone()).unwrap();
        let stored = store.all().unwrap().remove(0);
        assert_eq!(stored, original);
        assert_eq!(stored.backdrop_path, None);
        assert_eq!(stored.release_date.as_deref(), Some(""));
    }

    #[test]
    fn sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.db");
        {
            let store = SqliteFavoriteStore::open(&path).unwrap();
            store.insert(favorite(603, "The Matrix")).unwrap();
        }
        let store = SqliteFavoriteStore::open(&path).unwrap();
        assert!(store.contains(603).unwrap());
    }
}
