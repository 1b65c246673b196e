use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::db::error::is_unique_violation;
use crate::db::{DbPool, StoreError};

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check if the follower is following the followee
    pub fn is_following(&self, follower_id: &Uuid, followee_id: &Uuid) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
            (follower_id.to_string(), followee_id.to_string()),
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Create a follow edge.
    ///
    /// Self-edges are rejected at write time; a duplicate edge surfaces as
    /// `Conflict` so idempotent callers can catch and ignore it.
    pub fn follow(&self, follower_id: &Uuid, followee_id: &Uuid) -> Result<(), StoreError> {
        if follower_id == followee_id {
            return Err(StoreError::InvalidOperation(
                "cannot follow yourself".to_string(),
            ));
        }

        let conn = self.pool.get()?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?
            .as_secs() as i64;

        conn.execute(
            "INSERT INTO follows (follower_id, followee_id, created_at) VALUES (?1, ?2, ?3)",
            (follower_id.to_string(), followee_id.to_string(), now),
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict("follow edge")
            } else {
                e.into()
            }
        })?;

        Ok(())
    }

    /// Delete a follow edge; `NotFound` when there was nothing to delete.
    pub fn unfollow(&self, follower_id: &Uuid, followee_id: &Uuid) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute(
            "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
            (follower_id.to_string(), followee_id.to_string()),
        )?;
        if rows_affected == 0 {
            return Err(StoreError::NotFound("follow edge"));
        }
        Ok(())
    }

    /// Get list of users that this user is following
    pub fn get_following(&self, user_id: &Uuid) -> Result<Vec<Uuid>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT followee_id FROM follows WHERE follower_id = ?1 ORDER BY created_at DESC",
        )?;

        let following = stmt
            .query_map([user_id.to_string()], |row| {
                let followee_id: String = row.get(0)?;
                Ok(Uuid::parse_str(&followee_id).unwrap())
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(following)
    }

    /// Get follower count
    pub fn follower_count(&self, user_id: &Uuid) -> Result<usize, StoreError> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE followee_id = ?1",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get following count
    pub fn following_count(&self, user_id: &Uuid) -> Result<usize, StoreError> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ?1",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::db::repositories::UserRepository;
    use chrono::Utc;
    use reelfeed_types::User;

    fn setup_test_db() -> (Database, FollowRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        let repo = FollowRepository::new(db.pool.clone());
        (db, repo)
    }

    fn make_user(db: &Database, username: &str) -> Uuid {
        let users = UserRepository::new(db.pool.clone());
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            bio: None,
            join_date: Utc::now(),
        };
        users.create(&user).expect("Failed to create user");
        user.id
    }

    #[test]
    fn test_follow_and_is_following() {
        let (db, repo) = setup_test_db();
        let a = make_user(&db, "a");
        let b = make_user(&db, "b");

        repo.follow(&a, &b).expect("follow failed");
        assert!(repo.is_following(&a, &b).unwrap());
        // One-way edge only
        assert!(!repo.is_following(&b, &a).unwrap());
    }

    #[test]
    fn test_self_follow_is_invalid_operation() {
        let (db, repo) = setup_test_db();
        let a = make_user(&db, "a");

        let err = repo.follow(&a, &a).unwrap_err();
        assert!(matches!(err, StoreError::InvalidOperation(_)));
        assert!(!repo.is_following(&a, &a).unwrap());
    }

    #[test]
    fn test_duplicate_follow_is_conflict() {
        let (db, repo) = setup_test_db();
        let a = make_user(&db, "a");
        let b = make_user(&db, "b");

        repo.follow(&a, &b).expect("follow failed");
        let err = repo.follow(&a, &b).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_unfollow_missing_edge_is_not_found() {
        let (db, repo) = setup_test_db();
        let a = make_user(&db, "a");
        let b = make_user(&db, "b");

        let err = repo.unfollow(&a, &b).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_get_following_and_counts() {
        let (db, repo) = setup_test_db();
        let a = make_user(&db, "a");
        let b = make_user(&db, "b");
        let c = make_user(&db, "c");

        repo.follow(&a, &b).unwrap();
        repo.follow(&a, &c).unwrap();
        repo.follow(&b, &c).unwrap();

        let following = repo.get_following(&a).unwrap();
        assert_eq!(following.len(), 2);
        assert!(following.contains(&b));
        assert!(following.contains(&c));

        assert_eq!(repo.following_count(&a).unwrap(), 2);
        assert_eq!(repo.follower_count(&c).unwrap(), 2);

        repo.unfollow(&a, &b).unwrap();
        assert_eq!(repo.following_count(&a).unwrap(), 1);
    }
}
