//! Playlist ingestion endpoints
//!
//! Both read the configured playlist JSON. `/show_data` only normalizes it;
//! `/save_normalized_data` also replaces the songs table.

use axum::extract::State;
use playlist_common::normalize_file;
use tracing::info;

use super::ApiError;
use crate::AppState;

/// GET /show_data
///
/// Normalization probe: parses the playlist without persisting anything.
pub async fn show_data(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    normalize_file(&state.data_path)?;
    Ok("True")
}

/// GET /save_normalized_data
///
/// Reloads the songs table from the playlist file.
pub async fn save_normalized_data(State(state): State<AppState>) -> Result<String, ApiError> {
    let table = normalize_file(&state.data_path)?;
    let count = state.store.reload(&table).await?;

    info!(
        path = %state.data_path.display(),
        rows = count.rows,
        "Playlist reloaded over HTTP"
    );

    Ok(format!(
        "Saved {} songs with {} columns into DB!",
        count.rows, count.columns
    ))
}
