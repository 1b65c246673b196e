pub mod auth;
pub mod error;
pub mod feed;
pub mod notifications;
pub mod reviews;
pub mod users;
pub mod watchlist;

pub use error::{ApiError, ApiResult};
