use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use reelfeed_types::User;

use crate::db::{DbPool, StoreError};

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, user: &User) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (id, username, bio, join_date) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                user.id.to_string(),
                user.username,
                user.bio,
                user.join_date.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if crate::db::error::is_unique_violation(&e) {
                StoreError::Conflict("username")
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    pub fn find_by_id(&self, user_id: &Uuid) -> Result<Option<User>, StoreError> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT id, username, bio, join_date FROM users WHERE id = ?1",
                [user_id.to_string()],
                Self::map_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT id, username, bio, join_date FROM users WHERE username = ?1",
                [username],
                Self::map_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT id, username, bio, join_date FROM users ORDER BY username")?;
        let users = stmt
            .query_map([], Self::map_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
            username: row.get(1)?,
            bio: row.get(2)?,
            join_date: row.get::<_, String>(3)?.parse::<DateTime<Utc>>().unwrap(),
        })
    }
}
