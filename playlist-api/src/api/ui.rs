//! Plain-text landing route

/// GET /
pub async fn home() -> &'static str {
    "Hello from the playlist service!"
}
