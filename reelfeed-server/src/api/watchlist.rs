use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use crate::{
    api::{auth::get_user_from_headers, ApiError, ApiResult},
    db::repositories::{MovieRepository, WatchlistRepository},
    state::AppState,
};
use reelfeed_types::{AddWatchlistRequest, WatchlistEntry};

/// GET /watchlist - The caller's watchlist, newest additions first
pub async fn get_watchlist(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<WatchlistEntry>>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let repo = WatchlistRepository::new(state.db.pool.clone());
    let entries = repo.list(&user_id)?;
    Ok(Json(entries))
}

/// POST /watchlist - Add a movie, materializing it from the catalog if this
/// is the first time anyone references it
pub async fn add_to_watchlist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AddWatchlistRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let pool = state.db.pool.clone();
    let movie_repo = MovieRepository::new(pool.clone());
    let watchlist_repo = WatchlistRepository::new(pool);

    if movie_repo.get(payload.tmdb_id)?.is_none() {
        let movie = state.catalog.fetch_movie(payload.tmdb_id).await?;
        movie_repo.insert(&movie)?;
    }

    watchlist_repo.add(&user_id, payload.tmdb_id)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "tmdb_id": payload.tmdb_id
    })))
}

/// DELETE /watchlist/:tmdb_id - Remove a movie from the caller's watchlist
pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tmdb_id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let repo = WatchlistRepository::new(state.db.pool.clone());
    let removed = repo.remove(&user_id, tmdb_id)?;
    if removed == 0 {
        return Err(ApiError::NotFound("Movie not on watchlist".to_string()));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "tmdb_id": tmdb_id
    })))
}
