//! Pagination utilities for the song table view
//!
//! Fixed page size of 10 rows. Unlike a clamped cursor, pages past the end are
//! valid and simply hold no rows.

/// Page size constant for all pagination
pub const PAGE_SIZE: i64 = 10;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Row limit for SQL LIMIT/OFFSET query
    pub limit: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Calculate pagination metadata from total results and requested page
///
/// Pages below 1 are raised to 1; pages above `total_pages` are kept as-is.
///
/// # Examples
/// ```
/// use playlist_api::pagination::calculate_pagination;
///
/// // 25 total results = 3 pages (10 + 10 + 5)
/// let p = calculate_pagination(25, 2);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 10);
///
/// // Past-the-end pages are not clamped
/// let p = calculate_pagination(25, 4);
/// assert_eq!(p.page, 4);
/// assert_eq!(p.offset, 30);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64) -> Pagination {
    let total_pages = (total_results.max(0) + PAGE_SIZE - 1) / PAGE_SIZE;
    let page = requested_page.max(1);
    let offset = (page - 1).saturating_mul(PAGE_SIZE);

    Pagination {
        page,
        total_pages,
        limit: PAGE_SIZE,
        offset,
    }
}

/// Parse the `page` query parameter; absent or non-integer means page 1
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok()).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(25, 2);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.limit, 10);
        assert_eq!(p.offset, 10);
    }

    #[test]
    fn test_pagination_last_page() {
        let p = calculate_pagination(25, 3);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 20);
    }

    #[test]
    fn test_pagination_past_end_not_clamped() {
        let p = calculate_pagination(25, 9999);
        assert_eq!(p.page, 9999);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 99980);
    }

    #[test]
    fn test_pagination_out_of_bounds_low() {
        let p = calculate_pagination(25, 0);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, 1);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_exact_page_boundary() {
        let p = calculate_pagination(20, 2);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 10);
    }

    #[test]
    fn test_parse_page_defaults() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("2.5")), 1);
        assert_eq!(parse_page(Some("")), 1);
        assert_eq!(parse_page(Some("3")), 3);
        assert_eq!(parse_page(Some("-2")), -2);
    }
}
