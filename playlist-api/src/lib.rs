//! playlist-api library - HTTP query service over the song store

use std::path::PathBuf;

use axum::Router;
use playlist_common::Store;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod pagination;
pub mod render;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Song store; every handler reads and writes through it
    pub store: Store,
    /// Playlist JSON used by the reload and probe endpoints
    pub data_path: PathBuf,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Store, data_path: PathBuf) -> Self {
        Self { store, data_path }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::home))
        .route("/view_songs_from_db", get(api::view_songs_from_db))
        .route(
            "/songs/table_without_pagination",
            get(api::songs_table_without_pagination),
        )
        .route("/songs/table", get(api::songs_table))
        .route("/song", get(api::get_song_by_title))
        .route("/songs/search", get(api::search_songs_by_title))
        .route("/songs/:id/rate", post(api::rate_song))
        .route("/show_data", get(api::show_data))
        .route("/save_normalized_data", get(api::save_normalized_data))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
