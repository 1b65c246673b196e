use serde::{Deserialize, Serialize};

/// The fixed vocabulary of reactions a user can leave on a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Love,
    Funny,
    Wow,
}

impl ReactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Love => "love",
            ReactionType::Funny => "funny",
            ReactionType::Wow => "wow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "like" => Some(ReactionType::Like),
            "love" => Some(ReactionType::Love),
            "funny" => Some(ReactionType::Funny),
            "wow" => Some(ReactionType::Wow),
            _ => None,
        }
    }

    /// All allowed reaction types, in display order.
    pub fn all() -> [ReactionType; 4] {
        [
            ReactionType::Like,
            ReactionType::Love,
            ReactionType::Funny,
            ReactionType::Wow,
        ]
    }
}

/// Kind of a notification event. Closed set: adding a variant forces every
/// match over it to be revisited at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewFollower,
    NewReaction,
    NewComment,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::NewFollower => "new_follower",
            NotificationKind::NewReaction => "new_reaction",
            NotificationKind::NewComment => "new_comment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new_follower" => Some(NotificationKind::NewFollower),
            "new_reaction" => Some(NotificationKind::NewReaction),
            "new_comment" => Some(NotificationKind::NewComment),
            _ => None,
        }
    }
}
