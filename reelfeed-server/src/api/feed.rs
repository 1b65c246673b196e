use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::{
    api::{auth::get_user_from_headers, ApiResult},
    feed::FEED_PAGE_SIZE,
    state::AppState,
};
use reelfeed_types::FeedPage;

#[derive(Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_page")]
    page: u32,
}

fn default_page() -> u32 {
    1
}

/// GET /feed?page=N - One page of the viewer's aggregated activity feed.
/// Pages are 1-based; fewer than a full page of items is the caller's
/// signal to stop paginating.
pub async fn get_feed(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<FeedPage>> {
    let viewer_id = get_user_from_headers(&state, &headers)?;
    let page = state.feed.get_page(&viewer_id, query.page, FEED_PAGE_SIZE)?;
    Ok(Json(page))
}
