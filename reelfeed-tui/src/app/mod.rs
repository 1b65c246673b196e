pub mod state;

#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::api::ApiClient;
pub use state::{
    AuthState, ComposerMode, ComposerState, FeedState, NotificationsState, Screen, StatusMessage,
};

/// Fixed interval for the unread-notification poll.
const NOTIFICATION_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// How long a status message stays on screen.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state
pub struct App {
    pub running: bool,
    pub screen: Screen,
    pub api_client: ApiClient,
    pub auth_state: AuthState,
    pub feed_state: FeedState,
    pub notifications: NotificationsState,
    pub composer: ComposerState,
    pub status_message: Option<StatusMessage>,
    last_notification_poll: Option<Instant>,
}

impl App {
    pub fn new(api_client: ApiClient) -> Self {
        Self {
            running: true,
            screen: Screen::Auth,
            api_client,
            auth_state: AuthState::new(),
            feed_state: FeedState::new(),
            notifications: NotificationsState::new(),
            composer: ComposerState::new(),
            status_message: None,
            last_notification_poll: None,
        }
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            shown_at: Instant::now(),
        });
    }

    // ===== Loading =====

    pub async fn load_test_users(&mut self) {
        self.auth_state.loading = true;
        match self.api_client.get_test_users().await {
            Ok(users) => {
                self.auth_state.test_users = users;
                self.auth_state.error = None;
            }
            Err(e) => {
                log::error!("Failed to load users: {}", e);
                self.auth_state.error = Some(e.to_string());
            }
        }
        self.auth_state.loading = false;
    }

    async fn login_selected_user(&mut self) {
        let Some(user) = self
            .auth_state
            .test_users
            .get(self.auth_state.selected_index)
            .cloned()
        else {
            return;
        };

        match self.api_client.login(user.username.clone()).await {
            Ok(response) => {
                self.auth_state.current_user = Some(response.user);
                self.auth_state.error = None;
                self.screen = Screen::Main;
                self.feed_state = FeedState::new();
                // First poll fires immediately on the next tick
                self.last_notification_poll = None;
            }
            Err(e) => {
                log::error!("Login failed: {}", e);
                self.auth_state.error = Some(e.to_string());
            }
        }
    }

    /// Fetch the next feed page. A second call while one is in flight is a
    /// no-op; a response from before a reset is dropped by the generation
    /// check inside FeedState.
    pub async fn load_next_feed_page(&mut self) {
        let Some((page, generation)) = self.feed_state.begin_load() else {
            return;
        };

        log::debug!("Fetching feed page {}", page);
        match self.api_client.get_feed(page).await {
            Ok(feed_page) => self.feed_state.apply_page(generation, feed_page),
            Err(e) => {
                log::error!("Feed page {} failed: {}", page, e);
                self.feed_state.apply_error(generation, e.to_string());
            }
        }
    }

    async fn refresh_notifications_panel(&mut self) {
        self.notifications.loading = true;
        match self.api_client.get_notifications().await {
            Ok(items) => {
                self.notifications.items = items;
                self.notifications.error = None;
            }
            Err(e) => self.notifications.error = Some(e.to_string()),
        }
        self.notifications.loading = false;
    }

    async fn mark_notifications_read(&mut self) {
        match self.api_client.mark_notifications_read().await {
            Ok(items) => {
                self.notifications.items = items;
                self.notifications.unread_count = 0;
                self.set_status("Notifications marked read");
            }
            Err(e) => self.notifications.error = Some(e.to_string()),
        }
    }

    async fn poll_unread_count(&mut self) {
        match self.api_client.unread_count().await {
            Ok(response) => self.notifications.unread_count = response.unread,
            Err(e) => log::debug!("Unread poll failed: {}", e),
        }
        self.last_notification_poll = Some(Instant::now());
    }

    // ===== Interactions =====
    //
    // Every engagement-producing action ends with a full feed reset:
    // engagement counts can change on rows other than the one touched, so
    // the client starts over from page 1 rather than patching in place.

    async fn react_to_selected(&mut self, reaction_type: &str) {
        let Some(review_id) = self.feed_state.selected_item().map(|i| i.review_id) else {
            return;
        };
        match self.api_client.react(review_id, reaction_type).await {
            Ok(_) => {
                self.set_status(format!("Reacted with {}", reaction_type));
                self.feed_state.reset();
            }
            Err(e) => self.set_status(format!("Reaction failed: {}", e)),
        }
    }

    async fn remove_reaction_from_selected(&mut self) {
        let Some(review_id) = self.feed_state.selected_item().map(|i| i.review_id) else {
            return;
        };
        match self.api_client.remove_reaction(review_id).await {
            Ok(_) => {
                self.set_status("Reaction removed");
                self.feed_state.reset();
            }
            Err(e) => self.set_status(format!("Remove failed: {}", e)),
        }
    }

    async fn follow_selected_author(&mut self) {
        let Some(author_id) = self.feed_state.selected_item().map(|i| i.author_id) else {
            return;
        };
        match self.api_client.follow_user(author_id).await {
            Ok(_) => {
                self.set_status("Followed");
                self.feed_state.reset();
            }
            Err(e) => self.set_status(format!("Follow failed: {}", e)),
        }
    }

    async fn submit_composer(&mut self) {
        let Some(mode) = self.composer.mode.clone() else {
            return;
        };
        let content = self.composer.content();

        match mode {
            ComposerMode::Comment { review_id } => {
                if content.trim().is_empty() {
                    self.set_status("Comment text cannot be empty");
                    return;
                }
                match self.api_client.create_comment(review_id, content).await {
                    Ok(_) => {
                        self.composer.close();
                        self.set_status("Comment posted");
                        self.feed_state.reset();
                    }
                    Err(e) => self.set_status(format!("Comment failed: {}", e)),
                }
            }
            ComposerMode::NewReview => {
                let Some((tmdb_id, rating, body)) = parse_review_input(&content) else {
                    self.set_status("Format: <tmdb_id> <rating 0-10> [review text]");
                    return;
                };
                match self.api_client.create_review(tmdb_id, rating, body).await {
                    Ok(_) => {
                        self.composer.close();
                        self.set_status("Review posted");
                        self.feed_state.reset();
                    }
                    Err(e) => self.set_status(format!("Review failed: {}", e)),
                }
            }
        }
    }

    // ===== Event handling =====

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if self.composer.is_open() {
            self.handle_composer_key(key).await;
            return Ok(());
        }

        match self.screen {
            Screen::Auth => self.handle_auth_key(key).await,
            Screen::Main => self.handle_main_key(key).await,
        }
        Ok(())
    }

    async fn handle_auth_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.auth_state.test_users.is_empty() {
                    self.auth_state.selected_index = (self.auth_state.selected_index + 1)
                        .min(self.auth_state.test_users.len() - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.auth_state.selected_index = self.auth_state.selected_index.saturating_sub(1);
            }
            KeyCode::Enter => self.login_selected_user().await,
            _ => {}
        }
    }

    async fn handle_main_key(&mut self, key: KeyEvent) {
        // Notifications panel swallows keys while open
        if self.notifications.show_modal {
            match key.code {
                KeyCode::Esc | KeyCode::Char('n') => self.notifications.show_modal = false,
                KeyCode::Char('m') => self.mark_notifications_read().await,
                KeyCode::Char('q') => self.running = false,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('j') | KeyCode::Down => {
                if self.feed_state.select_next() {
                    self.feed_state.pending_load = true;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => self.feed_state.select_previous(),
            KeyCode::Char('r') => {
                // Manual refresh doubles as the retry affordance after an error
                self.feed_state.reset();
            }
            KeyCode::Char('1') => self.react_to_selected("like").await,
            KeyCode::Char('2') => self.react_to_selected("love").await,
            KeyCode::Char('3') => self.react_to_selected("funny").await,
            KeyCode::Char('4') => self.react_to_selected("wow").await,
            KeyCode::Char('x') => self.remove_reaction_from_selected().await,
            KeyCode::Char('f') => self.follow_selected_author().await,
            KeyCode::Char('c') => {
                if let Some(item) = self.feed_state.selected_item() {
                    self.composer.open(ComposerMode::Comment {
                        review_id: item.review_id,
                    });
                }
            }
            KeyCode::Char('w') => self.composer.open(ComposerMode::NewReview),
            KeyCode::Char('n') => {
                self.notifications.show_modal = true;
                self.refresh_notifications_panel().await;
            }
            _ => {}
        }
    }

    async fn handle_composer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.composer.close(),
            KeyCode::Enter if key.modifiers.is_empty() => self.submit_composer().await,
            _ => {
                self.composer.textarea.input(key);
            }
        }
    }

    /// Periodic work: deferred feed loads, the 60-second unread poll, and
    /// status message expiry.
    pub async fn on_tick(&mut self) {
        if self.screen != Screen::Main {
            return;
        }

        if self.feed_state.pending_load {
            self.feed_state.pending_load = false;
            self.load_next_feed_page().await;
        }

        let poll_due = self
            .last_notification_poll
            .map(|at| at.elapsed() >= NOTIFICATION_POLL_INTERVAL)
            .unwrap_or(true);
        if poll_due {
            self.poll_unread_count().await;
        }

        if let Some(message) = &self.status_message {
            if message.shown_at.elapsed() >= STATUS_MESSAGE_TTL {
                self.status_message = None;
            }
        }
    }
}

/// Parse "<tmdb_id> <rating> [text...]" from the review composer.
fn parse_review_input(input: &str) -> Option<(i64, i32, Option<String>)> {
    let mut parts = input.trim().splitn(3, char::is_whitespace);
    let tmdb_id: i64 = parts.next()?.parse().ok()?;
    let rating: i32 = parts.next()?.parse().ok()?;
    if !(0..=10).contains(&rating) {
        return None;
    }
    let body = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    Some((tmdb_id, rating, body))
}
