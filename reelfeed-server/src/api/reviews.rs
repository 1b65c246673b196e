use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    api::{auth::get_user_from_headers, ApiError, ApiResult},
    db::repositories::{
        CommentRepository, MovieRepository, ReactionRepository, ReviewRepository,
        WatchlistRepository,
    },
    state::AppState,
};
use reelfeed_types::{
    Comment, CreateCommentRequest, CreateReviewRequest, ReactionRequest, ReactionType, Review,
};

/// POST /reviews - Create a new review
///
/// Resolves the movie against the local cache first and falls back to the
/// catalog collaborator (lazy materialization); a catalog failure fails the
/// whole request. The watchlist removal afterwards is best-effort: a
/// reviewed movie should not stay "to watch", but failing that cleanup must
/// not fail the review.
pub async fn create_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateReviewRequest>,
) -> ApiResult<Json<Review>> {
    if !(0..=10).contains(&payload.rating) {
        return Err(ApiError::BadRequest(
            "Rating must be between 0 and 10".to_string(),
        ));
    }

    let author_id = get_user_from_headers(&state, &headers)?;

    let pool = state.db.pool.clone();
    let movie_repo = MovieRepository::new(pool.clone());
    let review_repo = ReviewRepository::new(pool.clone());
    let watchlist_repo = WatchlistRepository::new(pool);

    if movie_repo.get(payload.tmdb_id)?.is_none() {
        let movie = state.catalog.fetch_movie(payload.tmdb_id).await?;
        movie_repo.insert(&movie)?;
    }

    let review = Review {
        id: Uuid::new_v4(),
        author_id,
        tmdb_id: payload.tmdb_id,
        rating: payload.rating,
        body: payload.body.filter(|b| !b.is_empty()),
        created_at: Utc::now(),
    };
    review_repo.create(&review)?;

    if let Err(e) = watchlist_repo.remove(&author_id, payload.tmdb_id) {
        tracing::warn!(
            "Failed to remove reviewed movie {} from watchlist: {}",
            payload.tmdb_id,
            e
        );
    }

    Ok(Json(review))
}

/// DELETE /reviews/:id - Delete a review (author only)
pub async fn delete_review(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let review_id = Uuid::parse_str(&review_id)
        .map_err(|_| ApiError::BadRequest("Invalid review ID".to_string()))?;

    let requester_id = get_user_from_headers(&state, &headers)?;

    let review_repo = ReviewRepository::new(state.db.pool.clone());
    review_repo.delete(&review_id, &requester_id)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "review_id": review_id
    })))
}

/// PUT /reviews/:id/reaction - Upsert the caller's reaction on a review
pub async fn upsert_reaction(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<ReactionRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let review_id = Uuid::parse_str(&review_id)
        .map_err(|_| ApiError::BadRequest("Invalid review ID".to_string()))?;

    let reaction = ReactionType::parse(&payload.reaction_type).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid reaction type '{}'. Use like, love, funny or wow",
            payload.reaction_type
        ))
    })?;

    let reactor_id = get_user_from_headers(&state, &headers)?;

    let pool = state.db.pool.clone();
    let review_repo = ReviewRepository::new(pool.clone());
    let reaction_repo = ReactionRepository::new(pool);

    review_repo
        .get_by_id(&review_id)?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;

    reaction_repo.upsert(&review_id, &reactor_id, reaction)?;

    // Fan-out runs detached; its failure never reaches this response
    state.fanout.notify_reaction(review_id, reactor_id);

    Ok(Json(serde_json::json!({
        "review_id": review_id,
        "reaction_type": reaction.as_str()
    })))
}

/// DELETE /reviews/:id/reaction - Remove the caller's reaction
pub async fn remove_reaction(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let review_id = Uuid::parse_str(&review_id)
        .map_err(|_| ApiError::BadRequest("Invalid review ID".to_string()))?;

    let reactor_id = get_user_from_headers(&state, &headers)?;

    let reaction_repo = ReactionRepository::new(state.db.pool.clone());
    reaction_repo.remove(&review_id, &reactor_id)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "review_id": review_id
    })))
}

/// GET /reviews/:id/comments - All comments on a review, oldest first
pub async fn get_comments(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
) -> ApiResult<Json<Vec<Comment>>> {
    let review_id = Uuid::parse_str(&review_id)
        .map_err(|_| ApiError::BadRequest("Invalid review ID".to_string()))?;

    let pool = state.db.pool.clone();
    let review_repo = ReviewRepository::new(pool.clone());
    let comment_repo = CommentRepository::new(pool);

    review_repo
        .get_by_id(&review_id)?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;

    let comments = comment_repo.get_by_review(&review_id)?;
    Ok(Json(comments))
}

/// POST /reviews/:id/comments - Comment on a review
pub async fn create_comment(
    State(state): State<AppState>,
    Path(review_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CreateCommentRequest>,
) -> ApiResult<Json<Comment>> {
    let review_id = Uuid::parse_str(&review_id)
        .map_err(|_| ApiError::BadRequest("Invalid review ID".to_string()))?;

    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Comment text cannot be empty".to_string(),
        ));
    }

    let author_id = get_user_from_headers(&state, &headers)?;

    let pool = state.db.pool.clone();
    let review_repo = ReviewRepository::new(pool.clone());
    let comment_repo = CommentRepository::new(pool.clone());
    let user_repo = crate::db::repositories::UserRepository::new(pool);

    review_repo
        .get_by_id(&review_id)?
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))?;

    let author = user_repo
        .find_by_id(&author_id)?
        .ok_or_else(|| ApiError::NotFound("Author not found".to_string()))?;

    let comment = Comment {
        id: Uuid::new_v4(),
        review_id,
        author_id,
        author_username: author.username,
        text: payload.text,
        created_at: Utc::now(),
    };
    comment_repo.create(&comment)?;

    state.fanout.notify_comment(review_id, author_id);

    Ok(Json(comment))
}

/// DELETE /comments/:id - Delete a comment (comment author or review author)
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let comment_id = Uuid::parse_str(&comment_id)
        .map_err(|_| ApiError::BadRequest("Invalid comment ID".to_string()))?;

    let requester_id = get_user_from_headers(&state, &headers)?;

    let comment_repo = CommentRepository::new(state.db.pool.clone());
    comment_repo.delete(&comment_id, &requester_id)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "comment_id": comment_id
    })))
}
