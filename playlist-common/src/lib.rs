//! # Playlist Common Library
//!
//! Shared code for the playlist service:
//! - JSON playlist normalization into a union-schema table
//! - SQLite-backed song store (reload, scan, page, search, rate)
//! - Rating domain type
//! - Configuration loading
//! - Error taxonomy

pub mod config;
pub mod error;
pub mod normalize;
pub mod rating;
pub mod store;

pub use error::{Error, Result};
pub use normalize::{normalize, normalize_file, normalize_str, ColumnType, TableSpec};
pub use rating::Rating;
pub use store::{Song, Store};
