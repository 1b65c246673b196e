pub mod comment_repository;
pub mod follow_repository;
pub mod movie_repository;
pub mod notification_repository;
pub mod reaction_repository;
pub mod review_repository;
pub mod user_repository;
pub mod watchlist_repository;

pub use comment_repository::CommentRepository;
pub use follow_repository::FollowRepository;
pub use movie_repository::MovieRepository;
pub use notification_repository::NotificationRepository;
pub use reaction_repository::ReactionRepository;
pub use review_repository::{FeedRow, ReviewRepository};
pub use user_repository::UserRepository;
pub use watchlist_repository::WatchlistRepository;
