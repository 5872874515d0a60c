//! Router configuration.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::welcome))
        .route("/verse-of-day", get(handlers::verse_of_day))
        .route("/quotes", get(handlers::quotes))
        .route("/quotes/en", get(handlers::quotes_en))
        .route("/quotes/fr", get(handlers::quotes_fr))
        .route("/music", get(handlers::music_all))
        .route("/music/albums", get(handlers::music_albums))
        .route("/music/artists", get(handlers::music_artists))
        .route("/music/albums/:name", get(handlers::album_contents))
        .route("/music/artists/:name", get(handlers::artist_contents))
        .route("/music/file/*key", get(handlers::music_file_url))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
