use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::db::Database;

/// How long a session token stays valid.
const SESSION_LIFETIME_DAYS: i64 = 14;

/// Database-backed session manager.
///
/// The rest of the server trusts the user id this resolves from the
/// `X-Session-Token` header and performs no further authentication.
#[derive(Clone)]
pub struct SessionManager {
    db: Database,
}

impl SessionManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new session for a user and return its token.
    pub fn create_session(&self, user_id: Uuid) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let expires_at = created_at + Duration::days(SESSION_LIFETIME_DAYS);

        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                token,
                user_id.to_string(),
                created_at.to_rfc3339(),
                expires_at.to_rfc3339(),
            ],
        )
        .context("Failed to create session")?;

        tracing::info!("Created session for user {}", user_id);
        Ok(token)
    }

    /// Validate a session token and return the associated user id.
    /// An expired session is deleted on sight.
    pub fn validate_session(&self, token: &str) -> Result<Uuid> {
        let conn = self.db.connection()?;

        let (user_id_str, expires_at_str): (String, String) = conn
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                rusqlite::params![token],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .context("Session not found")?;

        let expires_at = DateTime::parse_from_rfc3339(&expires_at_str)
            .context("Failed to parse expiry time")?
            .with_timezone(&Utc);

        if Utc::now() > expires_at {
            self.delete_session(token)?;
            anyhow::bail!("Session has expired");
        }

        let user_id = Uuid::parse_str(&user_id_str).context("Failed to parse user ID")?;
        Ok(user_id)
    }

    /// Delete a session (logout).
    pub fn delete_session(&self, token: &str) -> Result<()> {
        let conn = self.db.connection()?;
        conn.execute(
            "DELETE FROM sessions WHERE token = ?1",
            rusqlite::params![token],
        )
        .context("Failed to delete session")?;
        Ok(())
    }

    /// Remove all expired sessions; returns how many went away.
    /// Run on startup and then periodically.
    pub fn cleanup_expired_sessions(&self) -> Result<usize> {
        let conn = self.db.connection()?;
        let now = Utc::now().to_rfc3339();

        let rows_affected = conn
            .execute(
                "DELETE FROM sessions WHERE expires_at < ?1",
                rusqlite::params![now],
            )
            .context("Failed to cleanup expired sessions")?;

        if rows_affected > 0 {
            tracing::info!("Cleaned up {} expired sessions", rows_affected);
        }
        Ok(rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::UserRepository;
    use reelfeed_types::User;

    fn setup_test_db() -> (Database, Uuid) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");

        let user = User {
            id: Uuid::new_v4(),
            username: "sessionuser".to_string(),
            bio: None,
            join_date: Utc::now(),
        };
        UserRepository::new(db.pool.clone())
            .create(&user)
            .expect("Failed to create test user");
        (db, user.id)
    }

    #[test]
    fn test_create_and_validate_session() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::new(db);

        let token = manager.create_session(user_id).expect("create failed");
        assert!(Uuid::parse_str(&token).is_ok(), "token should be a UUID");

        let validated = manager.validate_session(&token).expect("validate failed");
        assert_eq!(validated, user_id);
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let (db, _user_id) = setup_test_db();
        let manager = SessionManager::new(db);
        assert!(manager.validate_session("not-a-token").is_err());
    }

    #[test]
    fn test_deleted_session_is_rejected() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::new(db);

        let token = manager.create_session(user_id).unwrap();
        manager.delete_session(&token).unwrap();
        assert!(manager.validate_session(&token).is_err());
    }

    #[test]
    fn test_expired_session_is_cleaned_up() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::new(db.clone());

        let token = manager.create_session(user_id).unwrap();

        // Backdate the expiry
        let conn = db.connection().unwrap();
        let expired = (Utc::now() - Duration::days(1)).to_rfc3339();
        conn.execute(
            "UPDATE sessions SET expires_at = ?1 WHERE token = ?2",
            rusqlite::params![expired, token],
        )
        .unwrap();

        assert!(manager.validate_session(&token).is_err());
        assert_eq!(manager.cleanup_expired_sessions().unwrap(), 0);
    }
}
