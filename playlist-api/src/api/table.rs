//! Song listing endpoints: JSON dump and HTML table views

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use playlist_common::Song;
use serde::Deserialize;
use tracing::debug;

use super::ApiError;
use crate::pagination::{calculate_pagination, parse_page, PAGE_SIZE};
use crate::render::{render_page, render_table};
use crate::AppState;

/// Query parameters for the paginated table
#[derive(Debug, Deserialize)]
pub struct TableQuery {
    /// Page number (1-indexed); kept raw so junk falls back to page 1
    pub page: Option<String>,
}

/// GET /view_songs_from_db
///
/// Every stored row as a JSON array of objects.
pub async fn view_songs_from_db(
    State(state): State<AppState>,
) -> Result<Json<Vec<Song>>, ApiError> {
    let songs = state.store.list_all().await?;
    debug!(rows = songs.len(), "Listing all songs");
    Ok(Json(songs))
}

/// GET /songs/table_without_pagination
///
/// Every stored row as one HTML table.
pub async fn songs_table_without_pagination(
    State(state): State<AppState>,
) -> Result<Html<String>, ApiError> {
    let columns = state.store.columns().await?;
    let songs = state.store.list_all().await?;
    Ok(Html(render_table(&columns, &songs)))
}

/// GET /songs/table?page=N
///
/// One page of rows rendered with pagination controls.
pub async fn songs_table(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Html<String>, ApiError> {
    let requested = parse_page(query.page.as_deref());
    let columns = state.store.columns().await?;
    let (songs, total) = state.store.page(requested, PAGE_SIZE).await?;
    let pagination = calculate_pagination(total, requested);

    debug!(
        page = pagination.page,
        total_pages = pagination.total_pages,
        rows = songs.len(),
        "Rendering song table page"
    );

    let table = render_table(&columns, &songs);
    Ok(Html(render_page(
        &table,
        pagination.page,
        pagination.total_pages,
    )))
}
