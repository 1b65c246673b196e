mod api;
mod catalog;
mod config;
mod db;
mod fanout;
mod feed;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog::TmdbCatalog;
use state::AppState;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelfeed_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load settings
    let settings = config::Settings::new().expect("Failed to load settings");

    // Initialize database
    let db = db::Database::new(&settings.database.path).expect("Failed to create database");

    db.initialize()
        .expect("Failed to initialize database schema");

    // Always seed test data for development
    db.seed_test_data().expect("Failed to seed test data");
    tracing::info!("Database initialized and test data seeded");

    // External movie catalog collaborator
    let catalog = Arc::new(TmdbCatalog::new(
        settings.catalog.api_url.clone(),
        settings.catalog.api_key.clone(),
    ));

    // Create application state
    let state = AppState::new(db, catalog);

    // Session cleanup on startup, then hourly
    match state.session_manager.cleanup_expired_sessions() {
        Ok(count) if count > 0 => tracing::info!("Cleaned up {} expired sessions", count),
        Ok(_) => {}
        Err(e) => tracing::error!("Failed to cleanup expired sessions on startup: {}", e),
    }

    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            if let Err(e) = cleanup_state.session_manager.cleanup_expired_sessions() {
                tracing::error!("Periodic session cleanup failed: {}", e);
            }
        }
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication routes
        .route("/users/test", get(api::auth::list_test_users))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/validate", get(api::auth::validate_session))
        // Feed route
        .route("/feed", get(api::feed::get_feed))
        // Review routes
        .route("/reviews", post(api::reviews::create_review))
        .route("/reviews/:id", delete(api::reviews::delete_review))
        .route(
            "/reviews/:id/reaction",
            put(api::reviews::upsert_reaction).delete(api::reviews::remove_reaction),
        )
        .route(
            "/reviews/:id/comments",
            get(api::reviews::get_comments).post(api::reviews::create_comment),
        )
        .route("/comments/:id", delete(api::reviews::delete_comment))
        // User routes
        .route(
            "/users/:id/follow",
            post(api::users::follow_user).delete(api::users::unfollow_user),
        )
        .route("/users/:id/profile", get(api::users::get_profile))
        // Notification routes
        .route("/notifications", get(api::notifications::get_notifications))
        .route("/notifications/read", post(api::notifications::mark_all_read))
        .route(
            "/notifications/unread-count",
            get(api::notifications::unread_count),
        )
        // Watchlist routes
        .route(
            "/watchlist",
            get(api::watchlist::get_watchlist).post(api::watchlist::add_to_watchlist),
        )
        .route(
            "/watchlist/:tmdb_id",
            delete(api::watchlist::remove_from_watchlist),
        )
        .with_state(state)
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .expect("Failed to parse server address");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}

async fn health_check() -> &'static str {
    "OK"
}
