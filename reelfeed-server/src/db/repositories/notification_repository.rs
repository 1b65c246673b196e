use chrono::{DateTime, Utc};
use uuid::Uuid;

use reelfeed_types::{Notification, NotificationKind};

use crate::db::{DbPool, StoreError};

/// Append-only store of notification events. Events are never updated or
/// deleted by normal operation, except for the one-way false -> true bulk
/// transition of the read flag.
pub struct NotificationRepository {
    pool: DbPool,
}

impl NotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, notification: &Notification) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO notifications (id, recipient_id, sender_id, kind, review_id, created_at, is_read)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                notification.id.to_string(),
                notification.recipient_id.to_string(),
                notification.sender_id.to_string(),
                notification.kind.as_str(),
                notification.review_id.map(|id| id.to_string()),
                notification.created_at.to_rfc3339(),
                notification.read as i32,
            ],
        )?;
        Ok(())
    }

    /// All events for a recipient, newest first, joined with the sender name
    pub fn list_for_recipient(&self, recipient_id: &Uuid) -> Result<Vec<Notification>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT n.id, n.recipient_id, n.sender_id, u.username, n.kind, n.review_id,
                    n.created_at, n.is_read
             FROM notifications n
             JOIN users u ON n.sender_id = u.id
             WHERE n.recipient_id = ?1
             ORDER BY n.created_at DESC, n.id DESC",
        )?;

        let notifications = stmt
            .query_map([recipient_id.to_string()], |row| {
                let review_id: Option<String> = row.get(5)?;
                let kind: String = row.get(4)?;
                Ok(Notification {
                    id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
                    recipient_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
                    sender_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap(),
                    sender_username: row.get(3)?,
                    kind: NotificationKind::parse(&kind).unwrap(),
                    review_id: review_id.and_then(|s| Uuid::parse_str(&s).ok()),
                    created_at: row.get::<_, String>(6)?.parse::<DateTime<Utc>>().unwrap(),
                    read: row.get::<_, i32>(7)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notifications)
    }

    /// Flip every unread event for the recipient to read. Returns how many
    /// rows changed.
    pub fn mark_all_read(&self, recipient_id: &Uuid) -> Result<usize, StoreError> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE recipient_id = ?1 AND is_read = 0",
            [recipient_id.to_string()],
        )?;
        Ok(rows_affected)
    }

    pub fn unread_count(&self, recipient_id: &Uuid) -> Result<i64, StoreError> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND is_read = 0",
            [recipient_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
