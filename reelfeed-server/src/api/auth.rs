use axum::{extract::State, http::HeaderMap, Json};

use crate::{
    api::{ApiError, ApiResult},
    db::repositories::UserRepository,
    state::AppState,
};
use reelfeed_types::{LoginRequest, LoginResponse, User};

/// Extract user ID from session token header
pub fn get_user_from_headers(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<uuid::Uuid, ApiError> {
    let token = headers
        .get("X-Session-Token")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

    state
        .get_authenticated_user_id_from_token(token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid session token".to_string()))
}

/// Extract optional user ID from session token header (for public endpoints)
pub fn get_optional_user_from_headers(state: &AppState, headers: &HeaderMap) -> Option<uuid::Uuid> {
    let token = headers.get("X-Session-Token")?.to_str().ok()?;
    state.get_authenticated_user_id_from_token(token)
}

/// GET /users/test - List the seeded sign-in identities
pub async fn list_test_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let user_repo = UserRepository::new(state.db.pool.clone());
    let users = user_repo.list_all()?;
    Ok(Json(users))
}

/// POST /auth/login - Create a session for an existing user
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if payload.username.is_empty() {
        return Err(ApiError::BadRequest("Username cannot be empty".to_string()));
    }

    let user_repo = UserRepository::new(state.db.pool.clone());
    let user = user_repo
        .find_by_username(&payload.username)?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", payload.username)))?;

    let session_token = state
        .session_manager
        .create_session(user.id)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(LoginResponse {
        user,
        session_token,
    }))
}

/// POST /auth/logout - Invalidate the presented session token
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let token = headers
        .get("X-Session-Token")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

    state
        .session_manager
        .delete_session(token)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /auth/validate - Resolve the presented token to its user
pub async fn validate_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<User>> {
    let user_id = get_user_from_headers(&state, &headers)?;

    let user_repo = UserRepository::new(state.db.pool.clone());
    let user = user_repo
        .find_by_id(&user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
