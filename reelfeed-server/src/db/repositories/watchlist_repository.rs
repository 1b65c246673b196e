use chrono::{DateTime, Utc};
use uuid::Uuid;

use reelfeed_types::WatchlistEntry;

use crate::db::error::is_unique_violation;
use crate::db::{DbPool, StoreError};

pub struct WatchlistRepository {
    pool: DbPool,
}

impl WatchlistRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn add(&self, user_id: &Uuid, tmdb_id: i64) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO watchlist (user_id, tmdb_id, added_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![user_id.to_string(), tmdb_id, Utc::now().to_rfc3339()],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict("watchlist entry")
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    /// Remove an entry, returning how many rows went away. Review creation
    /// calls this best-effort and does not care whether the movie was listed.
    pub fn remove(&self, user_id: &Uuid, tmdb_id: i64) -> Result<usize, StoreError> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute(
            "DELETE FROM watchlist WHERE user_id = ?1 AND tmdb_id = ?2",
            rusqlite::params![user_id.to_string(), tmdb_id],
        )?;
        Ok(rows_affected)
    }

    /// The user's watchlist, newest additions first, joined with movie
    /// display fields
    pub fn list(&self, user_id: &Uuid) -> Result<Vec<WatchlistEntry>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT w.tmdb_id, m.title, m.poster_path, m.release_year, w.added_at
             FROM watchlist w
             JOIN movies m ON w.tmdb_id = m.tmdb_id
             WHERE w.user_id = ?1
             ORDER BY w.added_at DESC",
        )?;

        let entries = stmt
            .query_map([user_id.to_string()], |row| {
                Ok(WatchlistEntry {
                    tmdb_id: row.get(0)?,
                    movie_title: row.get(1)?,
                    poster_path: row.get(2)?,
                    release_year: row.get(3)?,
                    added_at: row.get::<_, String>(4)?.parse::<DateTime<Utc>>().unwrap(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup_test_db() -> (Database, WatchlistRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        db.seed_test_data().expect("Failed to seed test data");
        let repo = WatchlistRepository::new(db.pool.clone());
        (db, repo)
    }

    fn alice() -> Uuid {
        Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap()
    }

    #[test]
    fn test_seeded_watchlist_newest_first() {
        let (_db, repo) = setup_test_db();
        let entries = repo.list(&alice()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tmdb_id, 27205);
        assert_eq!(entries[1].tmdb_id, 155);
    }

    #[test]
    fn test_duplicate_add_is_conflict() {
        let (_db, repo) = setup_test_db();
        let err = repo.add(&alice(), 155).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_remove_reports_affected_rows() {
        let (_db, repo) = setup_test_db();
        assert_eq!(repo.remove(&alice(), 155).unwrap(), 1);
        assert_eq!(repo.remove(&alice(), 155).unwrap(), 0);
    }
}
