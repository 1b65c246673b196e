use chrono::Utc;
use rusqlite::OptionalExtension;

use reelfeed_types::Movie;

use crate::db::{DbPool, StoreError};

/// Local cache of movie display fields, keyed by the external catalog id.
/// Rows are materialized the first time anything references an unseen
/// tmdb_id and are never deleted.
pub struct MovieRepository {
    pool: DbPool,
}

impl MovieRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn get(&self, tmdb_id: i64) -> Result<Option<Movie>, StoreError> {
        let conn = self.pool.get()?;
        let movie = conn
            .query_row(
                "SELECT tmdb_id, title, poster_path, release_year, release_date
                 FROM movies WHERE tmdb_id = ?1",
                [tmdb_id],
                |row| {
                    Ok(Movie {
                        tmdb_id: row.get(0)?,
                        title: row.get(1)?,
                        poster_path: row.get(2)?,
                        release_year: row.get(3)?,
                        release_date: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(movie)
    }

    /// Insert a cached movie record. First write wins; a concurrent
    /// materialization of the same tmdb_id is silently ignored.
    pub fn insert(&self, movie: &Movie) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR IGNORE INTO movies (tmdb_id, title, poster_path, release_year, release_date, cached_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                movie.tmdb_id,
                movie.title,
                movie.poster_path,
                movie.release_year,
                movie.release_date,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_test_db() -> (Database, MovieRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        let repo = MovieRepository::new(db.pool.clone());
        (db, repo)
    }

    #[test]
    fn test_insert_and_get() {
        let (_db, repo) = setup_test_db();
        let movie = Movie {
            tmdb_id: 9340,
            title: "The Goonies".to_string(),
            poster_path: Some("/eBU7gCjTCj9n2LTxvCSIXXOvHkD.jpg".to_string()),
            release_year: Some(1985),
            release_date: Some("1985-06-07".to_string()),
        };
        repo.insert(&movie).expect("insert failed");

        let cached = repo.get(9340).expect("get failed").expect("movie missing");
        assert_eq!(cached.title, "The Goonies");
        assert_eq!(cached.release_year, Some(1985));
    }

    #[test]
    fn test_first_write_wins() {
        let (_db, repo) = setup_test_db();
        let movie = Movie {
            tmdb_id: 601,
            title: "E.T. the Extra-Terrestrial".to_string(),
            poster_path: None,
            release_year: Some(1982),
            release_date: None,
        };
        repo.insert(&movie).unwrap();

        let retitled = Movie {
            title: "E.T.".to_string(),
            ..movie
        };
        repo.insert(&retitled).unwrap();

        let cached = repo.get(601).unwrap().unwrap();
        assert_eq!(cached.title, "E.T. the Extra-Terrestrial");
    }

    #[test]
    fn test_get_missing_is_none() {
        let (_db, repo) = setup_test_db();
        assert!(repo.get(404).unwrap().is_none());
    }
}
