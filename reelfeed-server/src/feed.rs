use std::collections::HashMap;

use uuid::Uuid;

use reelfeed_types::{FeedItem, FeedPage};

use crate::db::repositories::{
    CommentRepository, FollowRepository, ReactionRepository, ReviewRepository,
};
use crate::db::{Database, StoreError};

/// Fixed page size for the activity feed.
pub const FEED_PAGE_SIZE: u32 = 10;

/// Read-path orchestrator for the aggregated activity feed.
///
/// Holds no state of its own beyond the injected database handle; every call
/// resolves the viewer's follow set, pulls one page of reviews authored by
/// it, and attaches batched engagement counters.
#[derive(Clone)]
pub struct FeedAssembler {
    db: Database,
}

impl FeedAssembler {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Assemble one feed page for a viewer. Pages are 1-based.
    ///
    /// Ordering is (created_at desc, id desc); the id tiebreak keeps
    /// pagination deterministic when timestamps collide. The page window is
    /// a plain offset, so a concurrent insert between two fetches can skip
    /// or repeat an item at the boundary; accepted behavior.
    pub fn get_page(
        &self,
        viewer_id: &Uuid,
        page: u32,
        page_size: u32,
    ) -> Result<FeedPage, StoreError> {
        if page < 1 {
            return Err(StoreError::InvalidOperation(
                "feed pages are numbered from 1".to_string(),
            ));
        }

        let follows = FollowRepository::new(self.db.pool.clone());
        let followees = follows.get_following(viewer_id)?;
        if followees.is_empty() {
            // Nobody followed: terminal empty page
            return Ok(FeedPage {
                page,
                items: Vec::new(),
                has_more: false,
            });
        }

        let reviews = ReviewRepository::new(self.db.pool.clone());
        let offset = (page - 1) * page_size;
        let rows = reviews.get_by_authors(&followees, page_size, offset)?;

        // A full fetch means there may be more. This wrongly reports true
        // when the last page is exactly full; callers find out on the next
        // (empty) page. Counted before the defensive filter below.
        let has_more = rows.len() as u32 == page_size;

        // Rows whose author or movie join went missing are dropped rather
        // than failing the whole page.
        let mut items: Vec<FeedItem> = rows
            .into_iter()
            .filter_map(|row| {
                let author_username = row.author_username?;
                let movie_title = row.movie_title?;
                Some(FeedItem {
                    review_id: row.review_id,
                    author_id: row.author_id,
                    author_username,
                    tmdb_id: row.tmdb_id,
                    movie_title,
                    poster_path: row.poster_path,
                    release_year: row.release_year,
                    rating: row.rating,
                    body: row.body,
                    created_at: row.created_at,
                    reaction_counts: HashMap::new(),
                    comment_count: 0,
                })
            })
            .collect();

        // One batched query per entity type, keyed on exactly the ids in
        // this page
        let ids: Vec<Uuid> = items.iter().map(|item| item.review_id).collect();
        let reaction_counts = ReactionRepository::new(self.db.pool.clone()).count_by_review(&ids)?;
        let comment_counts = CommentRepository::new(self.db.pool.clone()).count_by_review(&ids)?;

        for item in &mut items {
            if let Some(counts) = reaction_counts.get(&item.review_id) {
                item.reaction_counts = counts.clone();
            }
            if let Some(count) = comment_counts.get(&item.review_id) {
                item.comment_count = *count;
            }
        }

        Ok(FeedPage {
            page,
            items,
            has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{MovieRepository, UserRepository};
    use chrono::{DateTime, Utc};
    use reelfeed_types::{Movie, ReactionType, Review, User};

    struct Fixture {
        db: Database,
        assembler: FeedAssembler,
    }

    fn setup() -> Fixture {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        Fixture {
            assembler: FeedAssembler::new(db.clone()),
            db,
        }
    }

    fn make_user(db: &Database, username: &str) -> Uuid {
        let users = UserRepository::new(db.pool.clone());
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            bio: None,
            join_date: Utc::now(),
        };
        users.create(&user).unwrap();
        user.id
    }

    fn make_movie(db: &Database, tmdb_id: i64) {
        MovieRepository::new(db.pool.clone())
            .insert(&Movie {
                tmdb_id,
                title: format!("Movie {}", tmdb_id),
                poster_path: None,
                release_year: Some(2020),
                release_date: None,
            })
            .unwrap();
    }

    fn make_review(db: &Database, author: Uuid, tmdb_id: i64, rating: i32, at: &str) -> Review {
        make_movie(db, tmdb_id);
        let review = Review {
            id: Uuid::new_v4(),
            author_id: author,
            tmdb_id,
            rating,
            body: None,
            created_at: at.parse::<DateTime<Utc>>().unwrap(),
        };
        ReviewRepository::new(db.pool.clone()).create(&review).unwrap();
        review
    }

    fn follow(db: &Database, follower: Uuid, followee: Uuid) {
        FollowRepository::new(db.pool.clone())
            .follow(&follower, &followee)
            .unwrap();
    }

    #[test]
    fn test_empty_follow_set_is_terminal_empty_page() {
        let f = setup();
        let viewer = make_user(&f.db, "loner");

        let page = f.assembler.get_page(&viewer, 1, FEED_PAGE_SIZE).unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn test_page_zero_is_invalid() {
        let f = setup();
        let viewer = make_user(&f.db, "viewer");
        let err = f.assembler.get_page(&viewer, 0, FEED_PAGE_SIZE).unwrap_err();
        assert!(matches!(err, StoreError::InvalidOperation(_)));
    }

    #[test]
    fn test_feed_orders_newest_first() {
        let f = setup();
        let a = make_user(&f.db, "a");
        let b = make_user(&f.db, "b");
        let c = make_user(&f.db, "c");
        follow(&f.db, a, b);
        follow(&f.db, a, c);

        let r1 = make_review(&f.db, b, 100, 8, "2024-03-01T10:00:00+00:00");
        let r2 = make_review(&f.db, c, 200, 5, "2024-03-02T10:00:00+00:00");

        let page = f.assembler.get_page(&a, 1, FEED_PAGE_SIZE).unwrap();
        let ids: Vec<Uuid> = page.items.iter().map(|i| i.review_id).collect();
        assert_eq!(ids, vec![r2.id, r1.id]);
        assert!(!page.has_more);
    }

    #[test]
    fn test_feed_excludes_unfollowed_authors_and_viewer() {
        let f = setup();
        let a = make_user(&f.db, "a");
        let b = make_user(&f.db, "b");
        let stranger = make_user(&f.db, "stranger");
        follow(&f.db, a, b);

        make_review(&f.db, b, 100, 8, "2024-03-01T10:00:00+00:00");
        make_review(&f.db, stranger, 200, 5, "2024-03-02T10:00:00+00:00");
        make_review(&f.db, a, 300, 7, "2024-03-03T10:00:00+00:00");

        let page = f.assembler.get_page(&a, 1, FEED_PAGE_SIZE).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].author_username, "b");
    }

    #[test]
    fn test_consecutive_pages_are_disjoint() {
        let f = setup();
        let viewer = make_user(&f.db, "viewer");
        let author = make_user(&f.db, "author");
        follow(&f.db, viewer, author);

        for i in 0..25 {
            let at = format!("2024-03-01T10:{:02}:00+00:00", i);
            make_review(&f.db, author, 100 + i as i64, 6, &at);
        }

        let page1 = f.assembler.get_page(&viewer, 1, FEED_PAGE_SIZE).unwrap();
        let page2 = f.assembler.get_page(&viewer, 2, FEED_PAGE_SIZE).unwrap();
        let page3 = f.assembler.get_page(&viewer, 3, FEED_PAGE_SIZE).unwrap();

        assert_eq!(page1.items.len(), 10);
        assert!(page1.has_more);
        assert_eq!(page2.items.len(), 10);
        assert!(page2.has_more);
        assert_eq!(page3.items.len(), 5);
        assert!(!page3.has_more);

        let mut seen = std::collections::HashSet::new();
        for item in page1
            .items
            .iter()
            .chain(page2.items.iter())
            .chain(page3.items.iter())
        {
            assert!(seen.insert(item.review_id), "duplicate item across pages");
        }
        assert_eq!(seen.len(), 25);
    }

    #[test]
    fn test_engagement_counts_attached_in_bulk() {
        let f = setup();
        let viewer = make_user(&f.db, "viewer");
        let author = make_user(&f.db, "author");
        let fan = make_user(&f.db, "fan");
        follow(&f.db, viewer, author);

        let review = make_review(&f.db, author, 100, 9, "2024-03-01T10:00:00+00:00");
        let quiet = make_review(&f.db, author, 200, 4, "2024-03-02T10:00:00+00:00");

        let reactions = ReactionRepository::new(f.db.pool.clone());
        reactions.upsert(&review.id, &fan, ReactionType::Love).unwrap();
        reactions.upsert(&review.id, &viewer, ReactionType::Love).unwrap();

        let comments = CommentRepository::new(f.db.pool.clone());
        comments
            .create(&reelfeed_types::Comment {
                id: Uuid::new_v4(),
                review_id: review.id,
                author_id: fan,
                author_username: String::new(),
                text: "agreed".to_string(),
                created_at: Utc::now(),
            })
            .unwrap();

        let page = f.assembler.get_page(&viewer, 1, FEED_PAGE_SIZE).unwrap();
        let loud_item = page
            .items
            .iter()
            .find(|i| i.review_id == review.id)
            .expect("review should be on the page");
        assert_eq!(loud_item.reaction_counts.get("love"), Some(&2));
        assert_eq!(loud_item.comment_count, 1);

        let quiet_item = page
            .items
            .iter()
            .find(|i| i.review_id == quiet.id)
            .expect("quiet review should be on the page");
        assert!(quiet_item.reaction_counts.is_empty());
        assert_eq!(quiet_item.comment_count, 0);
    }

    #[test]
    fn test_rows_with_missing_joins_are_dropped() {
        let f = setup();
        let viewer = make_user(&f.db, "viewer");
        let author = make_user(&f.db, "author");
        follow(&f.db, viewer, author);

        make_review(&f.db, author, 100, 8, "2024-03-01T10:00:00+00:00");

        // Sneak in an orphan row pointing at a movie that was never cached
        let conn = f.db.connection().unwrap();
        conn.execute_batch(&format!(
            "PRAGMA foreign_keys = OFF;
             INSERT INTO reviews (id, author_id, tmdb_id, rating, body, created_at)
             VALUES ('{}', '{}', 999, 5, NULL, '2024-03-05T10:00:00+00:00');
             PRAGMA foreign_keys = ON;",
            Uuid::new_v4(),
            author
        ))
        .unwrap();

        let page = f.assembler.get_page(&viewer, 1, FEED_PAGE_SIZE).unwrap();
        assert_eq!(page.items.len(), 1, "orphan row should be filtered out");
        assert_eq!(page.items[0].movie_title, "Movie 100");
    }
}
