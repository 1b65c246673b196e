use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use reelfeed_types::Comment;

use crate::db::{DbPool, StoreError};

pub struct CommentRepository {
    pool: DbPool,
}

impl CommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, comment: &Comment) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO comments (id, review_id, author_id, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                comment.id.to_string(),
                comment.review_id.to_string(),
                comment.author_id.to_string(),
                comment.text,
                comment.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All comments on a review, oldest first, joined with the author name
    pub fn get_by_review(&self, review_id: &Uuid) -> Result<Vec<Comment>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.review_id, c.author_id, u.username, c.text, c.created_at
             FROM comments c
             JOIN users u ON c.author_id = u.id
             WHERE c.review_id = ?1
             ORDER BY c.created_at ASC",
        )?;

        let comments = stmt
            .query_map([review_id.to_string()], |row| {
                Ok(Comment {
                    id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
                    review_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
                    author_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap(),
                    author_username: row.get(3)?,
                    text: row.get(4)?,
                    created_at: row.get::<_, String>(5)?.parse::<DateTime<Utc>>().unwrap(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    /// Delete a comment. Allowed for the comment's author and for the author
    /// of the review it sits under; anyone else is `Forbidden`.
    pub fn delete(&self, comment_id: &Uuid, requester_id: &Uuid) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        let owners: Option<(String, String)> = conn
            .query_row(
                "SELECT c.author_id, r.author_id
                 FROM comments c
                 JOIN reviews r ON c.review_id = r.id
                 WHERE c.id = ?1",
                [comment_id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (comment_author, review_author) = owners.ok_or(StoreError::NotFound("comment"))?;
        let requester = requester_id.to_string();
        if requester != comment_author && requester != review_author {
            return Err(StoreError::Forbidden(
                "only the comment author or the review author can delete a comment",
            ));
        }

        conn.execute(
            "DELETE FROM comments WHERE id = ?1",
            [comment_id.to_string()],
        )?;
        Ok(())
    }

    /// Batched comment counts for a set of reviews; one query for the whole
    /// id set, mirroring the reaction counts.
    pub fn count_by_review(&self, review_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>, StoreError> {
        if review_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let conn = self.pool.get()?;
        let placeholders = vec!["?"; review_ids.len()].join(", ");
        let query = format!(
            "SELECT review_id, COUNT(*)
             FROM comments
             WHERE review_id IN ({})
             GROUP BY review_id",
            placeholders
        );

        let params: Vec<String> = review_ids.iter().map(|id| id.to_string()).collect();
        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
            let review_id: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((Uuid::parse_str(&review_id).unwrap(), count))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (review_id, count) = row?;
            counts.insert(review_id, count);
        }
        Ok(counts)
    }
}
