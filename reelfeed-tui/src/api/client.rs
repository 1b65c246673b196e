use reqwest::Client;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{ApiError, ApiResult};
use reelfeed_types::*;

/// API client for communicating with the Reelfeed server
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            session_token: None,
        }
    }

    /// Set the session token for authenticated requests
    pub fn set_session_token(&mut self, token: Option<String>) {
        self.session_token = token;
    }

    /// Helper to add session token to request if available
    fn add_auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.session_token {
            req.header("X-Session-Token", token)
        } else {
            req
        }
    }

    /// Helper to handle API responses
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            match status.as_u16() {
                404 => Err(ApiError::NotFound(error_text)),
                401 => Err(ApiError::Unauthorized(error_text)),
                400 => Err(ApiError::BadRequest(error_text)),
                409 => Err(ApiError::Conflict(error_text)),
                503 => Err(ApiError::Unavailable(error_text)),
                _ => Err(ApiError::Api(error_text)),
            }
        }
    }

    // Authentication endpoints

    /// Get list of seeded sign-in identities
    pub async fn get_test_users(&self) -> ApiResult<Vec<User>> {
        let url = format!("{}/users/test", self.base_url);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Login with username
    pub async fn login(&mut self, username: String) -> ApiResult<LoginResponse> {
        let url = format!("{}/auth/login", self.base_url);
        let request = LoginRequest { username };
        let response = self.client.post(&url).json(&request).send().await?;
        let login_response: LoginResponse = self.handle_response(response).await?;

        // Store session token
        self.session_token = Some(login_response.session_token.clone());

        Ok(login_response)
    }

    /// Logout (invalidate session)
    pub async fn logout(&self) -> ApiResult<()> {
        let url = format!("{}/auth/logout", self.base_url);
        let req = self.add_auth_header(self.client.post(&url));
        let response = req.send().await?;
        response.error_for_status()?;
        Ok(())
    }

    // Feed endpoint

    /// Get one page of the aggregated activity feed
    pub async fn get_feed(&self, page: u32) -> ApiResult<FeedPage> {
        let url = format!("{}/feed?page={}", self.base_url, page);
        let req = self.add_auth_header(self.client.get(&url));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    // Review endpoints

    /// Create a new review
    pub async fn create_review(
        &self,
        tmdb_id: i64,
        rating: i32,
        body: Option<String>,
    ) -> ApiResult<Review> {
        let url = format!("{}/reviews", self.base_url);
        let request = CreateReviewRequest {
            tmdb_id,
            rating,
            body,
        };
        let req = self.add_auth_header(self.client.post(&url).json(&request));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    /// Delete a review
    pub async fn delete_review(&self, review_id: Uuid) -> ApiResult<serde_json::Value> {
        let url = format!("{}/reviews/{}", self.base_url, review_id);
        let req = self.add_auth_header(self.client.delete(&url));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    /// Upsert a reaction on a review
    pub async fn react(&self, review_id: Uuid, reaction_type: &str) -> ApiResult<serde_json::Value> {
        let url = format!("{}/reviews/{}/reaction", self.base_url, review_id);
        let request = ReactionRequest {
            reaction_type: reaction_type.to_string(),
        };
        let req = self.add_auth_header(self.client.put(&url).json(&request));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    /// Remove the caller's reaction from a review
    pub async fn remove_reaction(&self, review_id: Uuid) -> ApiResult<serde_json::Value> {
        let url = format!("{}/reviews/{}/reaction", self.base_url, review_id);
        let req = self.add_auth_header(self.client.delete(&url));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    /// Get comments on a review
    pub async fn get_comments(&self, review_id: Uuid) -> ApiResult<Vec<Comment>> {
        let url = format!("{}/reviews/{}/comments", self.base_url, review_id);
        let req = self.add_auth_header(self.client.get(&url));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    /// Comment on a review
    pub async fn create_comment(&self, review_id: Uuid, text: String) -> ApiResult<Comment> {
        let url = format!("{}/reviews/{}/comments", self.base_url, review_id);
        let request = CreateCommentRequest { text };
        let req = self.add_auth_header(self.client.post(&url).json(&request));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    // Social endpoints

    /// Follow a user
    pub async fn follow_user(&self, user_id: Uuid) -> ApiResult<()> {
        let url = format!("{}/users/{}/follow", self.base_url, user_id);
        let req = self.add_auth_header(self.client.post(&url));
        let response = req.send().await?;
        response.error_for_status()?;
        Ok(())
    }

    /// Unfollow a user
    pub async fn unfollow_user(&self, user_id: Uuid) -> ApiResult<()> {
        let url = format!("{}/users/{}/follow", self.base_url, user_id);
        let req = self.add_auth_header(self.client.delete(&url));
        let response = req.send().await?;
        response.error_for_status()?;
        Ok(())
    }

    /// Get a user's profile
    pub async fn get_profile(&self, user_id: Uuid) -> ApiResult<UserProfile> {
        let url = format!("{}/users/{}/profile", self.base_url, user_id);
        let req = self.add_auth_header(self.client.get(&url));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    // Notification endpoints

    /// All notifications for the caller, newest first
    pub async fn get_notifications(&self) -> ApiResult<Vec<Notification>> {
        let url = format!("{}/notifications", self.base_url);
        let req = self.add_auth_header(self.client.get(&url));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    /// Mark all notifications read; returns the updated set
    pub async fn mark_notifications_read(&self) -> ApiResult<Vec<Notification>> {
        let url = format!("{}/notifications/read", self.base_url);
        let req = self.add_auth_header(self.client.post(&url));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    /// Unread notification count, polled periodically
    pub async fn unread_count(&self) -> ApiResult<UnreadCountResponse> {
        let url = format!("{}/notifications/unread-count", self.base_url);
        let req = self.add_auth_header(self.client.get(&url));
        let response = req.send().await?;
        self.handle_response(response).await
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        let base_url = std::env::var("REELFEED_SERVER_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
        Self::new(base_url)
    }
}
