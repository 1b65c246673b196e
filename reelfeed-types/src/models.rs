use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::NotificationKind;

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    #[serde(with = "datetime_format")]
    pub join_date: DateTime<Utc>,
}

/// Minimal cached display fields for a movie, keyed by its external
/// catalog id. Created lazily the first time any review or watchlist
/// action references an unseen tmdb_id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub tmdb_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_year: Option<i32>,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub author_id: Uuid,
    pub tmdb_id: i64,
    /// Rating on the 0..=10 scale.
    pub rating: i32,
    /// Optional review body text.
    pub body: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub review_id: Uuid,
    pub author_id: Uuid,
    #[serde(default)]
    pub author_username: String,
    pub text: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

/// One row of the aggregated activity feed: a review authored by someone the
/// viewer follows, denormalized with author/movie display fields and
/// engagement counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub review_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub tmdb_id: i64,
    pub movie_title: String,
    pub poster_path: Option<String>,
    pub release_year: Option<i32>,
    pub rating: i32,
    pub body: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    /// Reaction counts keyed by reaction type name.
    #[serde(default)]
    pub reaction_counts: HashMap<String, i64>,
    #[serde(default)]
    pub comment_count: i64,
}

/// One page of the feed. `has_more` is an approximation: it reports true
/// whenever the page came back full, including the case where the last page
/// is exactly full.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    pub page: u32,
    pub items: Vec<FeedItem>,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Uuid,
    #[serde(default)]
    pub sender_username: String,
    pub kind: NotificationKind,
    /// The review the event refers to, absent for new_follower.
    pub review_id: Option<Uuid>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub tmdb_id: i64,
    pub movie_title: String,
    pub poster_path: Option<String>,
    pub release_year: Option<i32>,
    #[serde(with = "datetime_format")]
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub join_date: String,
    pub follower_count: usize,
    pub following_count: usize,
    pub review_count: usize,
    pub is_following: bool,
}

// Request/Response types for API

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub tmdb_id: i64,
    pub rating: i32,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReactionRequest {
    pub reaction_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddWatchlistRequest {
    pub tmdb_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub session_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}
