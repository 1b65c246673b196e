use std::collections::HashSet;
use std::time::Instant;

use ratatui::widgets::ListState;
use tui_textarea::TextArea;
use uuid::Uuid;

use reelfeed_types::{FeedItem, FeedPage, Notification, User};

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Auth,
    Main,
}

/// Incremental client-side cache of the activity feed.
///
/// State machine per page fetch: Idle -> Loading -> Idle (success) or
/// Idle -> Loading -> Error. The `loading` flag is the single-in-flight
/// guard; a second trigger while a page is loading is a no-op. The
/// generation counter invalidates an in-flight fetch when the whole feed is
/// reset, so a stale response is dropped instead of merged.
pub struct FeedState {
    pub items: Vec<FeedItem>,
    pub list_state: ListState,
    /// Next page to request (1-based)
    pub next_page: u32,
    /// True while a page fetch is in flight
    pub loading: bool,
    pub error: Option<String>,
    /// Server returned a short page; stop asking for more
    pub at_end_of_feed: bool,
    /// Deferred load trigger, consumed by the tick handler
    pub pending_load: bool,
    /// Bumped on every reset; responses carrying an older value are stale
    pub generation: u64,
}

impl FeedState {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            list_state: ListState::default(),
            next_page: 1,
            loading: false,
            error: None,
            at_end_of_feed: false,
            pending_load: true,
            generation: 0,
        }
    }

    /// Try to move to Loading. Returns the (page, generation) pair to fetch,
    /// or None when a fetch is already in flight or the feed is exhausted.
    pub fn begin_load(&mut self) -> Option<(u32, u64)> {
        if self.loading || self.at_end_of_feed {
            return None;
        }
        self.loading = true;
        self.error = None;
        Some((self.next_page, self.generation))
    }

    /// Merge a fetched page. A response from before the last reset is
    /// silently dropped.
    pub fn apply_page(&mut self, generation: u64, page: FeedPage) {
        if generation != self.generation {
            return;
        }
        self.loading = false;
        self.next_page = page.page + 1;
        self.at_end_of_feed = !page.has_more;
        self.merge_page(page.items);
    }

    /// Record a failed fetch. Pagination halts until the user retries.
    pub fn apply_error(&mut self, generation: u64, error: String) {
        if generation != self.generation {
            return;
        }
        self.loading = false;
        self.error = Some(error);
    }

    /// Merge new items into the accumulated list: concatenate, then drop
    /// ids already held. The server's descending-time order is
    /// authoritative, so there is no resort here: re-delivered items keep
    /// their original position.
    pub fn merge_page(&mut self, items: Vec<FeedItem>) {
        let mut seen: HashSet<Uuid> = self.items.iter().map(|i| i.review_id).collect();
        for item in items {
            if seen.insert(item.review_id) {
                self.items.push(item);
            }
        }
    }

    /// Discard everything and start over from page 1. Used after any
    /// engagement-producing interaction, since counts may have changed on
    /// rows other than the one touched.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.items.clear();
        self.list_state.select(None);
        self.next_page = 1;
        self.loading = false;
        self.error = None;
        self.at_end_of_feed = false;
        self.pending_load = true;
    }

    pub fn selected_item(&self) -> Option<&FeedItem> {
        self.list_state.selected().and_then(|i| self.items.get(i))
    }

    /// Move the selection down; returns true when the selection ran off the
    /// end and another page should be requested.
    pub fn select_next(&mut self) -> bool {
        if self.items.is_empty() {
            return !self.at_end_of_feed;
        }
        let next = match self.list_state.selected() {
            Some(i) if i + 1 < self.items.len() => i + 1,
            Some(i) => {
                // Sitting on the last loaded item
                self.list_state.select(Some(i));
                return !self.at_end_of_feed;
            }
            None => 0,
        };
        self.list_state.select(Some(next));
        false
    }

    pub fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let previous = match self.list_state.selected() {
            Some(0) | None => 0,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(previous));
    }
}

/// Notifications panel state, refreshed by the 60-second poll and on demand
/// when the panel opens.
pub struct NotificationsState {
    pub items: Vec<Notification>,
    pub unread_count: i64,
    pub show_modal: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl NotificationsState {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            unread_count: 0,
            show_modal: false,
            loading: false,
            error: None,
        }
    }
}

/// What the composer is writing
#[derive(Debug, Clone)]
pub enum ComposerMode {
    /// A comment on the given review
    Comment { review_id: Uuid },
    /// A new review, entered as "<tmdb_id> <rating> [text]"
    NewReview,
}

/// Unified composer state using tui-textarea
pub struct ComposerState {
    pub mode: Option<ComposerMode>,
    pub textarea: TextArea<'static>,
}

impl ComposerState {
    pub fn new() -> Self {
        Self {
            mode: None,
            textarea: TextArea::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    pub fn open(&mut self, mode: ComposerMode) {
        self.mode = Some(mode);
        self.textarea = TextArea::default();
    }

    pub fn close(&mut self) {
        self.mode = None;
        self.textarea = TextArea::default();
    }

    pub fn content(&self) -> String {
        self.textarea.lines().join("\n")
    }
}

/// Authentication screen state
pub struct AuthState {
    pub test_users: Vec<User>,
    pub selected_index: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub current_user: Option<User>,
}

impl AuthState {
    pub fn new() -> Self {
        Self {
            test_users: Vec::new(),
            selected_index: 0,
            loading: false,
            error: None,
            current_user: None,
        }
    }
}

/// Transient status line shown at the bottom of the main screen
pub struct StatusMessage {
    pub text: String,
    pub shown_at: Instant,
}
