use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use crate::{
    api::{
        auth::{get_optional_user_from_headers, get_user_from_headers},
        ApiError, ApiResult,
    },
    db::repositories::{FollowRepository, ReviewRepository, UserRepository},
    state::AppState,
};
use reelfeed_types::UserProfile;

/// POST /users/:id/follow - Follow a user
pub async fn follow_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id_str): Path<String>,
) -> ApiResult<StatusCode> {
    let follower_id = get_user_from_headers(&state, &headers)?;

    let followee_id = Uuid::parse_str(&user_id_str)
        .map_err(|_| ApiError::BadRequest("Invalid user ID".to_string()))?;

    // Verify user exists
    let user_repo = UserRepository::new(state.db.pool.clone());
    user_repo
        .find_by_id(&followee_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let follow_repo = FollowRepository::new(state.db.pool.clone());
    follow_repo.follow(&follower_id, &followee_id)?;

    state.fanout.notify_follow(follower_id, followee_id);

    Ok(StatusCode::OK)
}

/// DELETE /users/:id/follow - Unfollow a user
pub async fn unfollow_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id_str): Path<String>,
) -> ApiResult<StatusCode> {
    let follower_id = get_user_from_headers(&state, &headers)?;

    let followee_id = Uuid::parse_str(&user_id_str)
        .map_err(|_| ApiError::BadRequest("Invalid user ID".to_string()))?;

    let follow_repo = FollowRepository::new(state.db.pool.clone());
    follow_repo.unfollow(&follower_id, &followee_id)?;

    Ok(StatusCode::OK)
}

/// GET /users/:id/profile - Profile with follow counts and relationship
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id_str): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    let viewer_id = get_optional_user_from_headers(&state, &headers);

    let profile_user_id = Uuid::parse_str(&user_id_str)
        .map_err(|_| ApiError::BadRequest("Invalid user ID".to_string()))?;

    let pool = state.db.pool.clone();
    let user_repo = UserRepository::new(pool.clone());
    let follow_repo = FollowRepository::new(pool.clone());
    let review_repo = ReviewRepository::new(pool);

    let user = user_repo
        .find_by_id(&profile_user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let follower_count = follow_repo.follower_count(&profile_user_id)?;
    let following_count = follow_repo.following_count(&profile_user_id)?;
    let review_count = review_repo.count_by_author(&profile_user_id)?;

    let is_following = match viewer_id {
        Some(viewer) if viewer != profile_user_id => {
            follow_repo.is_following(&viewer, &profile_user_id)?
        }
        _ => false,
    };

    Ok(Json(UserProfile {
        id: user.id,
        username: user.username,
        bio: user.bio,
        join_date: user.join_date.to_rfc3339(),
        follower_count,
        following_count,
        review_count,
        is_following,
    }))
}
