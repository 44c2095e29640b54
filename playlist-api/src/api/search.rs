//! Title search endpoints
//!
//! `/song` matches case-sensitively and returns a bare array; `/songs/search`
//! ignores case and wraps results with a count. Both behaviors are observable
//! by clients and are kept distinct.

use axum::{
    extract::{Query, State},
    Json,
};
use playlist_common::{Error, Song};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::AppState;

/// Query parameters for title lookups
#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: Option<String>,
}

impl TitleQuery {
    /// The title fragment, or `EmptyQuery` when absent or empty
    fn fragment(&self) -> Result<&str, Error> {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => Ok(t),
            _ => Err(Error::EmptyQuery),
        }
    }
}

/// Search response with result count
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub results: Vec<Song>,
}

/// GET /song?title=T
///
/// Case-sensitive substring match on title.
pub async fn get_song_by_title(
    State(state): State<AppState>,
    Query(query): Query<TitleQuery>,
) -> Result<Json<Vec<Song>>, ApiError> {
    let title = query.fragment()?;

    let songs = state
        .store
        .find_by_title_substring(title, true)
        .await
        .map_err(|e| match e {
            Error::NotFound(_) => {
                Error::NotFound(format!("No song found with title containing '{}'", title))
            }
            other => other,
        })?;

    Ok(Json(songs))
}

/// GET /songs/search?title=T
///
/// Case-insensitive substring match on title.
pub async fn search_songs_by_title(
    State(state): State<AppState>,
    Query(query): Query<TitleQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let title = query.fragment()?;
    let results = state.store.find_by_title_substring(title, false).await?;

    Ok(Json(SearchResponse {
        count: results.len(),
        results,
    }))
}
