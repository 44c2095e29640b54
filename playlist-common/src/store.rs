//! SQLite-backed song store
//!
//! Owns the `songs` table. The table is only ever created by [`Store::reload`],
//! which drops and recreates it inside one transaction, so readers never see a
//! half-built table. Reads against a database that was never loaded behave as
//! reads of an empty table.

use std::path::Path;

use serde_json::{json, Map, Value};
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{query::Query, Column, Row, Sqlite, TypeInfo, ValueRef};
use tracing::{debug, info, warn};

use crate::normalize::{TableSpec, RATING_COLUMN, ROWID_ALIASES};
use crate::{Error, Rating, Result};

/// Table holding the loaded playlist
pub const SONGS_TABLE: &str = "songs";

/// Column searched by title lookups
pub const TITLE_COLUMN: &str = "title";

/// Column keying rating updates
pub const ID_COLUMN: &str = "id";

/// One stored row: column name → scalar value, in column order
pub type Song = Map<String, Value>;

/// Result of a reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCount {
    pub rows: usize,
    pub columns: usize,
}

/// Handle to the song database
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the database file at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        if newly_created {
            info!("Initialized new database: {}", db_path.display());
        } else {
            info!("Opened existing database: {}", db_path.display());
        }

        Ok(Self { pool })
    }

    /// Replace the songs table with `table` (drop, create, insert, commit)
    pub async fn reload(&self, table: &TableSpec) -> Result<RowCount> {
        let column_defs: Vec<String> = table
            .columns
            .iter()
            .map(|c| {
                if c.name == RATING_COLUMN {
                    format!("{} INTEGER NOT NULL DEFAULT 0", quote_ident(&c.name))
                } else {
                    format!("{} {}", quote_ident(&c.name), c.ty.sql())
                }
            })
            .collect();

        let create_sql = format!(
            "CREATE TABLE {} ({})",
            quote_ident(SONGS_TABLE),
            column_defs.join(", ")
        );
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(SONGS_TABLE),
            table
                .column_names()
                .map(quote_ident)
                .collect::<Vec<_>>()
                .join(", "),
            vec!["?"; table.column_count()].join(", ")
        );

        debug!(sql = %create_sql, "Recreating songs table");

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(SONGS_TABLE)))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&create_sql).execute(&mut *tx).await?;

        for row in &table.rows {
            let query = row
                .iter()
                .fold(sqlx::query(&insert_sql), |query, value| bind_value(query, value));
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;

        let count = RowCount {
            rows: table.row_count(),
            columns: table.column_count(),
        };
        info!(rows = count.rows, columns = count.columns, "Reloaded songs table");
        Ok(count)
    }

    /// Every row, in insertion order
    pub async fn list_all(&self) -> Result<Vec<Song>> {
        let columns = self.columns().await?;
        if columns.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT * FROM {} ORDER BY {}",
            quote_ident(SONGS_TABLE),
            row_order(&columns)?
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_song).collect())
    }

    /// Number of stored rows
    pub async fn count(&self) -> Result<i64> {
        if !self.table_exists().await? {
            return Ok(0);
        }

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", quote_ident(SONGS_TABLE)))
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    /// One page of rows plus the total row count.
    ///
    /// Pages are 1-indexed; anything below 1 reads page 1. Pages past the end
    /// yield no rows.
    pub async fn page(&self, page: i64, page_size: i64) -> Result<(Vec<Song>, i64)> {
        let page_size = page_size.max(1);
        let offset = (page.max(1) - 1).saturating_mul(page_size);

        let total = self.count().await?;
        if total == 0 || offset >= total {
            debug!(page, total, "Requested page is past the end of the table");
            return Ok((Vec::new(), total));
        }

        let columns = self.columns().await?;
        let rows = sqlx::query(&format!(
            "SELECT * FROM {} ORDER BY {} LIMIT ? OFFSET ?",
            quote_ident(SONGS_TABLE),
            row_order(&columns)?
        ))
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.iter().map(row_to_song).collect(), total))
    }

    /// Column names of the songs table, empty when nothing is loaded
    pub async fn columns(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(&format!("PRAGMA table_info({})", quote_ident(SONGS_TABLE)))
            .fetch_all(&self.pool)
            .await?;

        // PRAGMA table_info returns: (cid, name, type, notnull, dflt_value, pk)
        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(Error::from))
            .collect()
    }

    /// Rows whose title contains `fragment`.
    ///
    /// Fails with `EmptyQuery` for an empty fragment and `NotFound` when no
    /// row matches.
    pub async fn find_by_title_substring(
        &self,
        fragment: &str,
        case_sensitive: bool,
    ) -> Result<Vec<Song>> {
        if fragment.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let not_found =
            || Error::NotFound(format!("No songs found with title containing '{}'", fragment));

        let columns = self.columns().await?;
        if !has_column(&columns, TITLE_COLUMN) {
            return Err(not_found());
        }

        let predicate = if case_sensitive {
            format!("instr({}, ?) > 0", quote_ident(TITLE_COLUMN))
        } else {
            format!("instr(LOWER({}), LOWER(?)) > 0", quote_ident(TITLE_COLUMN))
        };

        let rows = sqlx::query(&format!(
            "SELECT * FROM {} WHERE {} ORDER BY {}",
            quote_ident(SONGS_TABLE),
            predicate,
            row_order(&columns)?
        ))
        .bind(fragment)
        .fetch_all(&self.pool)
        .await?;

        debug!(fragment, case_sensitive, matches = rows.len(), "Title search");

        if rows.is_empty() {
            return Err(not_found());
        }
        Ok(rows.iter().map(row_to_song).collect())
    }

    /// Set the rating of the song keyed by `id`.
    ///
    /// The rating is validated before storage is touched. Returns the number
    /// of rows changed; an unknown id changes nothing and is not an error.
    pub async fn update_rating(&self, id: &str, rating: i64) -> Result<u64> {
        let rating = Rating::new(rating)?;

        let columns = self.columns().await?;
        if columns.is_empty() {
            warn!(id, "Rating update before any playlist was loaded");
            return Ok(0);
        }
        // A missing column would make SQLite read "id" as a string literal
        if !has_column(&columns, ID_COLUMN) {
            warn!(id, "Rating update on a playlist without an id column");
            return Ok(0);
        }

        let result = sqlx::query(&format!(
            "UPDATE {} SET {} = ? WHERE {} = ?",
            quote_ident(SONGS_TABLE),
            quote_ident(RATING_COLUMN),
            quote_ident(ID_COLUMN)
        ))
        .bind(rating.get())
        .bind(id)
        .execute(&self.pool)
        .await?;

        let affected = result.rows_affected();
        if affected == 0 {
            warn!(id, "Rating update matched no song");
        } else {
            info!(id, rating = rating.get(), "Rating updated");
        }
        Ok(affected)
    }

    async fn table_exists(&self) -> Result<bool> {
        let found: Option<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(SONGS_TABLE)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }
}

/// SQLite identifiers compare case-insensitively
fn has_column(columns: &[String], name: &str) -> bool {
    columns.iter().any(|c| c.eq_ignore_ascii_case(name))
}

/// First row id alias not hidden by a source column
fn row_order(columns: &[String]) -> Result<&'static str> {
    ROWID_ALIASES
        .iter()
        .copied()
        .find(|alias| !has_column(columns, alias))
        .ok_or_else(|| {
            Error::MalformedInput("songs table hides every row id alias".to_string())
        })
}

/// Quote an SQL identifier taken from source data
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        // Normalized tables hold scalars only
        other => query.bind(other.to_string()),
    }
}

fn row_to_song(row: &SqliteRow) -> Song {
    row.columns()
        .iter()
        .map(|col| (col.name().to_string(), column_value(row, col.ordinal())))
        .collect()
}

/// Convert one SQLite value to JSON by its storage class
fn column_value(row: &SqliteRow, i: usize) -> Value {
    let raw = match row.try_get_raw(i) {
        Ok(raw) => raw,
        Err(_) => return Value::Null,
    };
    if raw.is_null() {
        return Value::Null;
    }

    let type_info = raw.type_info();
    match type_info.name() {
        "INTEGER" | "BOOLEAN" => row.try_get::<i64, _>(i).ok().map(Value::from),
        "REAL" => row.try_get::<f64, _>(i).ok().map(|v| json!(v)),
        _ => row.try_get::<String, _>(i).ok().map(Value::String),
    }
    .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;
    use tempfile::TempDir;

    async fn open_temp_store() -> (TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("songs.db")).await.unwrap();
        (dir, store)
    }

    fn sample_table() -> TableSpec {
        normalize(&json!([
            {"id": "a1", "title": "3AM", "tempo": 120.5, "duration_ms": 200000},
            {"id": "b2", "title": "Late 3am Drive", "tempo": 98.0},
            {"id": "c3", "title": "Morning", "explicit": true},
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_unloaded_store_reads_as_empty() {
        let (_dir, store) = open_temp_store().await;

        assert!(store.list_all().await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.columns().await.unwrap().is_empty());
        let (rows, total) = store.page(1, 10).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);
        assert_eq!(store.update_rating("a1", 3).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reload_persists_union_schema() {
        let (_dir, store) = open_temp_store().await;

        let count = store.reload(&sample_table()).await.unwrap();
        assert_eq!(count, RowCount { rows: 3, columns: 6 });

        assert_eq!(
            store.columns().await.unwrap(),
            vec!["id", "title", "tempo", "duration_ms", "explicit", "rating"]
        );

        let songs = store.list_all().await.unwrap();
        assert_eq!(songs.len(), 3);
        assert_eq!(songs[0]["id"], json!("a1"));
        assert_eq!(songs[0]["tempo"], json!(120.5));
        assert_eq!(songs[0]["duration_ms"], json!(200000));
        assert_eq!(songs[0]["explicit"], Value::Null);
        assert_eq!(songs[0]["rating"], json!(0));
        assert_eq!(songs[2]["explicit"], json!(1));
    }

    #[tokio::test]
    async fn test_reload_replaces_schema_and_rows() {
        let (_dir, store) = open_temp_store().await;
        store.reload(&sample_table()).await.unwrap();

        let replacement = normalize(&json!([{"id": "z9", "name": "Other"}])).unwrap();
        let count = store.reload(&replacement).await.unwrap();
        assert_eq!(count, RowCount { rows: 1, columns: 3 });

        assert_eq!(store.columns().await.unwrap(), vec!["id", "name", "rating"]);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reload_is_idempotent() {
        let (_dir, store) = open_temp_store().await;
        let first = store.reload(&sample_table()).await.unwrap();
        let second = store.reload(&sample_table()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count().await.unwrap(), 3);
        assert_eq!(store.columns().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_pages_cover_table_in_order() {
        let (_dir, store) = open_temp_store().await;
        let records: Vec<Value> = (0..23)
            .map(|i| json!({"id": format!("s{}", i), "title": format!("Song {}", i)}))
            .collect();
        store.reload(&normalize(&Value::Array(records)).unwrap()).await.unwrap();

        let all = store.list_all().await.unwrap();
        let mut paged = Vec::new();
        for page in 1..=3 {
            let (rows, total) = store.page(page, 10).await.unwrap();
            assert_eq!(total, 23);
            paged.extend(rows);
        }
        assert_eq!(paged, all);

        let (past_end, total) = store.page(4, 10).await.unwrap();
        assert!(past_end.is_empty());
        assert_eq!(total, 23);
    }

    #[tokio::test]
    async fn test_title_search_case_handling() {
        let (_dir, store) = open_temp_store().await;
        store.reload(&sample_table()).await.unwrap();

        let lower = store.find_by_title_substring("3am", false).await.unwrap();
        let upper = store.find_by_title_substring("3AM", false).await.unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.len(), 2);

        let exact = store.find_by_title_substring("3AM", true).await.unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0]["id"], json!("a1"));
    }

    #[tokio::test]
    async fn test_title_search_errors() {
        let (_dir, store) = open_temp_store().await;
        store.reload(&sample_table()).await.unwrap();

        assert!(matches!(
            store.find_by_title_substring("", false).await,
            Err(Error::EmptyQuery)
        ));

        match store.find_by_title_substring("nonexistent123", false).await {
            Err(Error::NotFound(msg)) => assert!(msg.contains("nonexistent123")),
            other => panic!("expected NotFound, got {:?}", other),
        }

        // LIKE wildcards in the fragment are literal text
        assert!(matches!(
            store.find_by_title_substring("%", false).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_rating() {
        let (_dir, store) = open_temp_store().await;
        store.reload(&sample_table()).await.unwrap();

        for rating in 1..=5 {
            assert_eq!(store.update_rating("b2", rating).await.unwrap(), 1);
        }
        for rating in [0, 6, -1] {
            assert!(matches!(
                store.update_rating("b2", rating).await,
                Err(Error::InvalidRating(_))
            ));
        }

        let songs = store.find_by_title_substring("Late", true).await.unwrap();
        assert_eq!(songs[0]["rating"], json!(5));

        assert_eq!(store.update_rating("missing", 4).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_rating_without_id_column_changes_nothing() {
        let (_dir, store) = open_temp_store().await;
        let table = normalize(&json!([
            {"song_id": "a", "title": "One"},
            {"song_id": "b", "title": "Two"},
        ]))
        .unwrap();
        store.reload(&table).await.unwrap();

        assert_eq!(store.update_rating("id", 5).await.unwrap(), 0);
        assert_eq!(store.update_rating("a", 5).await.unwrap(), 0);

        let ratings: Vec<Value> = store
            .list_all()
            .await
            .unwrap()
            .iter()
            .map(|song| song["rating"].clone())
            .collect();
        assert_eq!(ratings, vec![json!(0), json!(0)]);
    }

    #[tokio::test]
    async fn test_rowid_column_does_not_change_row_order() {
        let (_dir, store) = open_temp_store().await;
        let records: Vec<Value> = (0..12)
            .map(|i| json!({"rowid": 100 - i, "id": format!("s{}", i), "title": "T"}))
            .collect();
        store.reload(&normalize(&Value::Array(records)).unwrap()).await.unwrap();

        let ids: Vec<Value> = store
            .list_all()
            .await
            .unwrap()
            .iter()
            .map(|song| song["id"].clone())
            .collect();
        let expected: Vec<Value> = (0..12).map(|i| json!(format!("s{}", i))).collect();
        assert_eq!(ids, expected);

        let (first_page, _) = store.page(1, 10).await.unwrap();
        assert_eq!(first_page[0]["id"], json!("s0"));
        let (second_page, _) = store.page(2, 10).await.unwrap();
        assert_eq!(second_page[0]["id"], json!("s10"));

        let found = store.find_by_title_substring("T", true).await.unwrap();
        assert_eq!(found[0]["id"], json!("s0"));
    }

    #[test]
    fn test_row_order_skips_shadowed_aliases() {
        let cols = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
        assert_eq!(row_order(&cols(&["id", "title"])).unwrap(), "rowid");
        assert_eq!(row_order(&cols(&["ROWID", "title"])).unwrap(), "_rowid_");
        assert_eq!(row_order(&cols(&["rowid", "_rowid_"])).unwrap(), "oid");
        assert!(row_order(&cols(&["rowid", "_rowid_", "oid"])).is_err());
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("title"), "\"title\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
