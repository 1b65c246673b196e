use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use reelfeed_types::Review;

use crate::db::error::is_unique_violation;
use crate::db::{DbPool, StoreError};

/// One review row as it comes back from the feed query, joined against
/// users and movies. The join fields stay optional so that a row whose
/// author or movie record is missing can be dropped by the caller instead
/// of failing the whole page.
#[derive(Debug, Clone)]
pub struct FeedRow {
    pub review_id: Uuid,
    pub author_id: Uuid,
    pub author_username: Option<String>,
    pub tmdb_id: i64,
    pub movie_title: Option<String>,
    pub poster_path: Option<String>,
    pub release_year: Option<i32>,
    pub rating: i32,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct ReviewRepository {
    pool: DbPool,
}

impl ReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new review.
    ///
    /// The UNIQUE(author_id, tmdb_id) constraint makes a second review of
    /// the same movie by the same author a `Conflict`, never an overwrite.
    pub fn create(&self, review: &Review) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO reviews (id, author_id, tmdb_id, rating, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                review.id.to_string(),
                review.author_id.to_string(),
                review.tmdb_id,
                review.rating,
                review.body,
                review.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict("review for this movie")
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    pub fn get_by_id(&self, review_id: &Uuid) -> Result<Option<Review>, StoreError> {
        let conn = self.pool.get()?;
        let review = conn
            .query_row(
                "SELECT id, author_id, tmdb_id, rating, body, created_at
                 FROM reviews WHERE id = ?1",
                [review_id.to_string()],
                |row| {
                    Ok(Review {
                        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
                        author_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
                        tmdb_id: row.get(2)?,
                        rating: row.get(3)?,
                        body: row.get(4)?,
                        created_at: row.get::<_, String>(5)?.parse::<DateTime<Utc>>().unwrap(),
                    })
                },
            )
            .optional()?;
        Ok(review)
    }

    /// Author lookup used by fan-out to resolve the notification recipient.
    pub fn get_author(&self, review_id: &Uuid) -> Result<Option<Uuid>, StoreError> {
        let conn = self.pool.get()?;
        let author = conn
            .query_row(
                "SELECT author_id FROM reviews WHERE id = ?1",
                [review_id.to_string()],
                |row| {
                    let id: String = row.get(0)?;
                    Ok(Uuid::parse_str(&id).unwrap())
                },
            )
            .optional()?;
        Ok(author)
    }

    /// Delete a review. Only the author may delete; comments and reactions
    /// go with it via the foreign-key cascades.
    pub fn delete(&self, review_id: &Uuid, requester_id: &Uuid) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        let author: Option<String> = conn
            .query_row(
                "SELECT author_id FROM reviews WHERE id = ?1",
                [review_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let author = author.ok_or(StoreError::NotFound("review"))?;
        if author != requester_id.to_string() {
            return Err(StoreError::Forbidden("only the author can delete a review"));
        }

        conn.execute(
            "DELETE FROM reviews WHERE id = ?1",
            [review_id.to_string()],
        )?;
        Ok(())
    }

    /// Fetch one page of reviews authored by any of the given users, newest
    /// first. The id is a stable secondary sort key so pages stay
    /// deterministic across identical timestamps.
    ///
    /// Offset pagination: a concurrent insert can shift the window between
    /// two page fetches and cause a skip or duplicate at the boundary. Known
    /// artifact, accepted.
    pub fn get_by_authors(
        &self,
        author_ids: &[Uuid],
        limit: u32,
        offset: u32,
    ) -> Result<Vec<FeedRow>, StoreError> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.pool.get()?;
        let placeholders = vec!["?"; author_ids.len()].join(", ");
        let query = format!(
            "SELECT r.id, r.author_id, u.username, r.tmdb_id, m.title, m.poster_path,
                    m.release_year, r.rating, r.body, r.created_at
             FROM reviews r
             LEFT JOIN users u ON r.author_id = u.id
             LEFT JOIN movies m ON r.tmdb_id = m.tmdb_id
             WHERE r.author_id IN ({})
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT ? OFFSET ?",
            placeholders
        );

        let mut params: Vec<String> = author_ids.iter().map(|id| id.to_string()).collect();
        params.push(limit.to_string());
        params.push(offset.to_string());

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                Ok(FeedRow {
                    review_id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
                    author_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
                    author_username: row.get(2)?,
                    tmdb_id: row.get(3)?,
                    movie_title: row.get(4)?,
                    poster_path: row.get(5)?,
                    release_year: row.get(6)?,
                    rating: row.get(7)?,
                    body: row.get(8)?,
                    created_at: row.get::<_, String>(9)?.parse::<DateTime<Utc>>().unwrap(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Review count for a user's profile
    pub fn count_by_author(&self, user_id: &Uuid) -> Result<usize, StoreError> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE author_id = ?1",
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
    use reelfeed_types::{Movie, User};

    fn setup_test_db() -> (Database, ReviewRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        let repo = ReviewRepository::new(db.pool.clone());
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

    fn make_movie(db: &Database, tmdb_id: i64, title: &str) {
        let movies = crate::db::repositories::MovieRepository::new(db.pool.clone());
        movies
            .insert(&Movie {
                tmdb_id,
                title: title.to_string(),
                poster_path: None,
                release_year: Some(2000),
                release_date: None,
            })
            .expect("Failed to insert movie");
    }

    fn make_review(
        repo: &ReviewRepository,
        author_id: Uuid,
        tmdb_id: i64,
        rating: i32,
        created_at: DateTime<Utc>,
    ) -> Review {
        let review = Review {
            id: Uuid::new_v4(),
            author_id,
            tmdb_id,
            rating,
            body: None,
            created_at,
        };
        repo.create(&review).expect("Failed to create review");
        review
    }

    #[test]
    fn test_duplicate_review_is_conflict() {
        let (db, repo) = setup_test_db();
        let author = make_user(&db, "a");
        make_movie(&db, 100, "First");

        make_review(&repo, author, 100, 7, Utc::now());
        let dup = Review {
            id: Uuid::new_v4(),
            author_id: author,
            tmdb_id: 100,
            rating: 3,
            body: None,
            created_at: Utc::now(),
        };
        let err = repo.create(&dup).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_delete_requires_ownership() {
        let (db, repo) = setup_test_db();
        let author = make_user(&db, "a");
        let other = make_user(&db, "b");
        make_movie(&db, 100, "First");
        let review = make_review(&repo, author, 100, 7, Utc::now());

        let err = repo.delete(&review.id, &other).unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));

        repo.delete(&review.id, &author).expect("delete failed");
        assert!(repo.get_by_id(&review.id).unwrap().is_none());

        let err = repo.delete(&review.id, &author).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_get_by_authors_orders_newest_first() {
        let (db, repo) = setup_test_db();
        let a = make_user(&db, "a");
        let b = make_user(&db, "b");
        make_movie(&db, 100, "First");
        make_movie(&db, 200, "Second");

        let t1 = "2024-03-01T10:00:00+00:00".parse::<DateTime<Utc>>().unwrap();
        let t2 = "2024-03-02T10:00:00+00:00".parse::<DateTime<Utc>>().unwrap();
        let r1 = make_review(&repo, a, 100, 8, t1);
        let r2 = make_review(&repo, b, 200, 5, t2);

        let rows = repo.get_by_authors(&[a, b], 10, 0).expect("query failed");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].review_id, r2.id);
        assert_eq!(rows[1].review_id, r1.id);
        assert_eq!(rows[0].author_username.as_deref(), Some("b"));
        assert_eq!(rows[0].movie_title.as_deref(), Some("Second"));
    }

    #[test]
    fn test_get_by_authors_ties_break_on_id_descending() {
        let (db, repo) = setup_test_db();
        let a = make_user(&db, "a");
        let t = "2024-03-01T10:00:00+00:00".parse::<DateTime<Utc>>().unwrap();
        for i in 0..5 {
            make_movie(&db, 100 + i, "Movie");
            make_review(&repo, a, 100 + i, 6, t);
        }

        // Same timestamp everywhere: pagination must still be deterministic
        let first = repo.get_by_authors(&[a], 3, 0).unwrap();
        let second = repo.get_by_authors(&[a], 3, 3).unwrap();
        let mut ids: Vec<String> = first
            .iter()
            .chain(second.iter())
            .map(|r| r.review_id.to_string())
            .collect();
        assert_eq!(ids.len(), 5);

        let mut sorted = ids.clone();
        sorted.sort_by(|x, y| y.cmp(x));
        assert_eq!(ids, sorted, "rows should come back in id-descending order");

        ids.dedup();
        assert_eq!(ids.len(), 5, "pages must not overlap");
    }

    #[test]
    fn test_get_by_authors_empty_set_is_empty() {
        let (_db, repo) = setup_test_db();
        let rows = repo.get_by_authors(&[], 10, 0).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_get_by_authors_limit_and_offset() {
        let (db, repo) = setup_test_db();
        let a = make_user(&db, "a");
        for i in 0..7 {
            make_movie(&db, 100 + i, "Movie");
            let t = format!("2024-03-0{}T10:00:00+00:00", i + 1)
                .parse::<DateTime<Utc>>()
                .unwrap();
            make_review(&repo, a, 100 + i, 6, t);
        }

        let page1 = repo.get_by_authors(&[a], 3, 0).unwrap();
        let page2 = repo.get_by_authors(&[a], 3, 3).unwrap();
        let page3 = repo.get_by_authors(&[a], 3, 6).unwrap();
        assert_eq!(page1.len(), 3);
        assert_eq!(page2.len(), 3);
        assert_eq!(page3.len(), 1);

        // Strictly descending across the page boundary
        assert!(page1.last().unwrap().created_at > page2.first().unwrap().created_at);
    }
}
