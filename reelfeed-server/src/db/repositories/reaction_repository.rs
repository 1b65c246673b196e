use std::collections::HashMap;

use chrono::Utc;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use reelfeed_types::ReactionType;

use crate::db::{DbPool, StoreError};

pub struct ReactionRepository {
    pool: DbPool,
}

impl ReactionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Upsert a reaction: a repeat reaction from the same user replaces the
    /// existing type instead of adding a second row.
    pub fn upsert(
        &self,
        review_id: &Uuid,
        reactor_id: &Uuid,
        reaction: ReactionType,
    ) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO reactions (review_id, reactor_id, reaction_type, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(review_id, reactor_id)
             DO UPDATE SET reaction_type = excluded.reaction_type, created_at = excluded.created_at",
            (
                review_id.to_string(),
                reactor_id.to_string(),
                reaction.as_str(),
                Utc::now().to_rfc3339(),
            ),
        )?;
        Ok(())
    }

    /// Remove a user's reaction; `NotFound` when there was nothing to remove.
    pub fn remove(&self, review_id: &Uuid, reactor_id: &Uuid) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        let rows_affected = conn.execute(
            "DELETE FROM reactions WHERE review_id = ?1 AND reactor_id = ?2",
            (review_id.to_string(), reactor_id.to_string()),
        )?;
        if rows_affected == 0 {
            return Err(StoreError::NotFound("reaction"));
        }
        Ok(())
    }

    /// Get a user's reaction on a review, if any
    pub fn get(
        &self,
        review_id: &Uuid,
        reactor_id: &Uuid,
    ) -> Result<Option<ReactionType>, StoreError> {
        let conn = self.pool.get()?;
        let reaction = conn
            .query_row(
                "SELECT reaction_type FROM reactions WHERE review_id = ?1 AND reactor_id = ?2",
                (review_id.to_string(), reactor_id.to_string()),
                |row| {
                    let raw: String = row.get(0)?;
                    Ok(ReactionType::parse(&raw).unwrap())
                },
            )
            .optional()?;
        Ok(reaction)
    }

    /// Batched reaction counts for a set of reviews, grouped by type.
    ///
    /// One query for the whole id set; issuing a query per review is exactly
    /// the N+1 shape the feed page must avoid.
    pub fn count_by_review(
        &self,
        review_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, HashMap<String, i64>>, StoreError> {
        if review_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let conn = self.pool.get()?;
        let placeholders = vec!["?"; review_ids.len()].join(", ");
        let query = format!(
            "SELECT review_id, reaction_type, COUNT(*)
             FROM reactions
             WHERE review_id IN ({})
             GROUP BY review_id, reaction_type",
            placeholders
        );

        let params: Vec<String> = review_ids.iter().map(|id| id.to_string()).collect();
        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
            let review_id: String = row.get(0)?;
            let reaction_type: String = row.get(1)?;
            let count: i64 = row.get(2)?;
            Ok((Uuid::parse_str(&review_id).unwrap(), reaction_type, count))
        })?;

        let mut counts: HashMap<Uuid, HashMap<String, i64>> = HashMap::new();
        for row in rows {
            let (review_id, reaction_type, count) = row?;
            counts
                .entry(review_id)
                .or_default()
                .insert(reaction_type, count);
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::db::repositories::{MovieRepository, ReviewRepository, UserRepository};
    use chrono::DateTime;
    use reelfeed_types::{Movie, Review, User};

    struct Fixture {
        db: Database,
        repo: ReactionRepository,
        review_id: Uuid,
        author_id: Uuid,
        reactor_id: Uuid,
    }

    fn setup() -> Fixture {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");

        let users = UserRepository::new(db.pool.clone());
        let author = User {
            id: Uuid::new_v4(),
            username: "author".to_string(),
            bio: None,
            join_date: Utc::now(),
        };
        let reactor = User {
            id: Uuid::new_v4(),
            username: "reactor".to_string(),
            bio: None,
            join_date: Utc::now(),
        };
        users.create(&author).unwrap();
        users.create(&reactor).unwrap();

        MovieRepository::new(db.pool.clone())
            .insert(&Movie {
                tmdb_id: 100,
                title: "Movie".to_string(),
                poster_path: None,
                release_year: None,
                release_date: None,
            })
            .unwrap();

        let reviews = ReviewRepository::new(db.pool.clone());
        let review = Review {
            id: Uuid::new_v4(),
            author_id: author.id,
            tmdb_id: 100,
            rating: 7,
            body: None,
            created_at: "2024-03-01T10:00:00+00:00".parse::<DateTime<Utc>>().unwrap(),
        };
        reviews.create(&review).unwrap();

        Fixture {
            repo: ReactionRepository::new(db.pool.clone()),
            db,
            review_id: review.id,
            author_id: author.id,
            reactor_id: reactor.id,
        }
    }

    #[test]
    fn test_repeat_reaction_replaces_type() {
        let f = setup();
        f.repo
            .upsert(&f.review_id, &f.reactor_id, ReactionType::Love)
            .unwrap();
        f.repo
            .upsert(&f.review_id, &f.reactor_id, ReactionType::Wow)
            .unwrap();

        // Exactly one row, and it carries the latest type
        let conn = f.db.connection().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM reactions WHERE review_id = ?1 AND reactor_id = ?2",
                (f.review_id.to_string(), f.reactor_id.to_string()),
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(
            f.repo.get(&f.review_id, &f.reactor_id).unwrap(),
            Some(ReactionType::Wow)
        );
    }

    #[test]
    fn test_remove_missing_reaction_is_not_found() {
        let f = setup();
        let err = f.repo.remove(&f.review_id, &f.reactor_id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_remove_then_get_is_none() {
        let f = setup();
        f.repo
            .upsert(&f.review_id, &f.reactor_id, ReactionType::Like)
            .unwrap();
        f.repo.remove(&f.review_id, &f.reactor_id).unwrap();
        assert_eq!(f.repo.get(&f.review_id, &f.reactor_id).unwrap(), None);
    }

    #[test]
    fn test_count_by_review_groups_by_type() {
        let f = setup();
        f.repo
            .upsert(&f.review_id, &f.reactor_id, ReactionType::Love)
            .unwrap();
        f.repo
            .upsert(&f.review_id, &f.author_id, ReactionType::Love)
            .unwrap();

        let counts = f.repo.count_by_review(&[f.review_id]).unwrap();
        let by_type = counts.get(&f.review_id).expect("review should have counts");
        assert_eq!(by_type.get("love"), Some(&2));
        assert_eq!(by_type.get("wow"), None);
    }

    #[test]
    fn test_count_by_review_empty_id_set() {
        let f = setup();
        let counts = f.repo.count_by_review(&[]).unwrap();
        assert!(counts.is_empty());
    }
}
