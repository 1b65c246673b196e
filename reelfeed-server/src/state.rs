use std::sync::Arc;

use crate::catalog::MovieCatalog;
use crate::db::Database;
use crate::fanout::FanoutDispatcher;
use crate::feed::FeedAssembler;
use crate::session::SessionManager;

/// Shared application state.
///
/// Every collaborator is constructed explicitly and handed in here; handlers
/// reach them through axum's `State` extractor, and tests build the same
/// state around an in-memory database and a stub catalog.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub session_manager: SessionManager,
    pub catalog: Arc<dyn MovieCatalog>,
    pub feed: FeedAssembler,
    pub fanout: FanoutDispatcher,
}

impl AppState {
    pub fn new(db: Database, catalog: Arc<dyn MovieCatalog>) -> Self {
        Self {
            session_manager: SessionManager::new(db.clone()),
            feed: FeedAssembler::new(db.clone()),
            fanout: FanoutDispatcher::new(db.clone()),
            catalog,
            db,
        }
    }

    /// Get authenticated user ID from session token
    pub fn get_authenticated_user_id_from_token(&self, token: &str) -> Option<uuid::Uuid> {
        self.session_manager.validate_session(token).ok()
    }
}
