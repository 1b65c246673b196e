use axum::{extract::State, http::HeaderMap, Json};

use crate::{
    api::{auth::get_user_from_headers, ApiResult},
    db::repositories::NotificationRepository,
    state::AppState,
};
use reelfeed_types::{Notification, UnreadCountResponse};

/// GET /notifications - All events for the caller, newest first
pub async fn get_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Notification>>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let repo = NotificationRepository::new(state.db.pool.clone());
    let notifications = repo.list_for_recipient(&user_id)?;
    Ok(Json(notifications))
}

/// POST /notifications/read - Mark every unread event read, then return the
/// updated set
pub async fn mark_all_read(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Notification>>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let repo = NotificationRepository::new(state.db.pool.clone());
    repo.mark_all_read(&user_id)?;
    let notifications = repo.list_for_recipient(&user_id)?;
    Ok(Json(notifications))
}

/// GET /notifications/unread-count - Cheap endpoint for the client's
/// periodic poll
pub async fn unread_count(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<UnreadCountResponse>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let repo = NotificationRepository::new(state.db.pool.clone());
    let unread = repo.unread_count(&user_id)?;
    Ok(Json(UnreadCountResponse { unread }))
}
