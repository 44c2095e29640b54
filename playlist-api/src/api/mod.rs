//! HTTP API handlers for playlist-api

pub mod error;
pub mod health;
pub mod ingest;
pub mod rate;
pub mod search;
pub mod table;
pub mod ui;

pub use error::ApiError;
pub use health::health_routes;
pub use ingest::{save_normalized_data, show_data};
pub use rate::rate_song;
pub use search::{get_song_by_title, search_songs_by_title};
pub use table::{songs_table, songs_table_without_pagination, view_songs_from_db};
pub use ui::home;
