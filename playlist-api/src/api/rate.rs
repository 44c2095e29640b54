//! Song rating endpoint

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use playlist_common::Rating;
use serde::Serialize;
use serde_json::Value;

use super::ApiError;
use crate::AppState;

/// Rating update acknowledgement
#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub message: String,
    pub rating: Rating,
}

/// POST /songs/:id/rate with body `{"rating": 1..=5}`
///
/// A missing or unparsable body is treated like a missing rating. Unknown ids
/// are acknowledged the same way as known ones.
pub async fn rate_song(
    State(state): State<AppState>,
    Path(song_id): Path<String>,
    body: Bytes,
) -> Result<Json<RateResponse>, ApiError> {
    let payload: Option<Value> = serde_json::from_slice(&body).ok();
    let rating = Rating::from_json(payload.as_ref().and_then(|p| p.get("rating")))?;

    state.store.update_rating(&song_id, rating.get()).await?;

    Ok(Json(RateResponse {
        message: format!("Rating updated for song {}", song_id),
        rating,
    }))
}
