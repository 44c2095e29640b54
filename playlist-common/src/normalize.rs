//! Playlist normalization
//!
//! Converts a raw JSON playlist into a column-uniform table. Two source
//! layouts are accepted:
//! - records: `[{"id": "..", "title": ".."}, ...]`
//! - columns: `{"id": {"0": "..", "1": ".."}, "title": {"0": "..", ...}}`
//!
//! The column set is the union of keys seen across all records, in first-seen
//! order. Absent values become null. A `rating` column (default 0) is always
//! present in the result.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{Error, Result};

/// Name of the mutable user-rating column
pub const RATING_COLUMN: &str = "rating";

/// Names SQLite accepts for the implicit row id; a column of the same name
/// hides that alias
pub const ROWID_ALIASES: [&str; 3] = ["rowid", "_rowid_", "oid"];

/// SQLite storage class inferred for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Column type declaration used in CREATE TABLE
    pub fn sql(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    /// Storage class of a single scalar, None for null
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ColumnType::Integer),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(ColumnType::Integer),
            Value::Number(_) => Some(ColumnType::Real),
            _ => Some(ColumnType::Text),
        }
    }

    /// Widen two observed types to one that holds both
    fn widen(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (ColumnType::Integer, ColumnType::Real) | (ColumnType::Real, ColumnType::Integer) => {
                ColumnType::Real
            }
            _ => ColumnType::Text,
        }
    }
}

/// One column of the union schema
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

/// Column-uniform table ready to be persisted
#[derive(Debug, Clone, Default)]
pub struct TableSpec {
    pub columns: Vec<Column>,
    /// Every row holds exactly `columns.len()` values, in column order
    pub rows: Vec<Vec<Value>>,
}

impl TableSpec {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }
}

/// Incremental union-schema builder.
///
/// SQLite identifiers are case-insensitive, so columns are keyed by their
/// ASCII-lowercased name. Any casing of `rating` is the rating column; any
/// other pair of names differing only in case is rejected.
#[derive(Default)]
struct SchemaBuilder {
    columns: Vec<(String, Option<ColumnType>)>,
    index: HashMap<String, usize>,
}

impl SchemaBuilder {
    fn observe(&mut self, name: &str, value: &Value) -> Result<usize> {
        let name = if name.eq_ignore_ascii_case(RATING_COLUMN) {
            RATING_COLUMN
        } else {
            name
        };
        let key = name.to_ascii_lowercase();
        let observed = ColumnType::of(value);

        match self.index.get(&key).copied() {
            Some(i) => {
                let (existing, slot) = &mut self.columns[i];
                if existing.as_str() != name {
                    return Err(Error::MalformedInput(format!(
                        "Columns '{}' and '{}' differ only in case",
                        existing, name
                    )));
                }
                *slot = match (*slot, observed) {
                    (Some(a), Some(b)) => Some(a.widen(b)),
                    (a, b) => a.or(b),
                };
                Ok(i)
            }
            None => {
                let i = self.columns.len();
                self.columns.push((name.to_string(), observed));
                self.index.insert(key, i);
                Ok(i)
            }
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_ascii_lowercase()).copied()
    }
}

/// Normalize a parsed JSON playlist into a union-schema table
pub fn normalize(json: &Value) -> Result<TableSpec> {
    let records: Vec<Map<String, Value>> = match json {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                item.as_object().ok_or_else(|| {
                    Error::MalformedInput(format!("Array item {} is not an object", idx))
                })
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .cloned()
            .collect(),
        Value::Object(columns) => records_from_columns(columns)?,
        other => {
            return Err(Error::MalformedInput(format!(
                "Expected a JSON array of objects, found {}",
                json_kind(other)
            )))
        }
    };

    build_table(&records)
}

/// Parse and normalize a JSON playlist held in memory
pub fn normalize_str(source: &str) -> Result<TableSpec> {
    let json: Value =
        serde_json::from_str(source).map_err(|e| Error::MalformedInput(e.to_string()))?;
    normalize(&json)
}

/// Read, parse and normalize a JSON playlist file
pub fn normalize_file(path: &Path) -> Result<TableSpec> {
    debug!(path = %path.display(), "Reading playlist source");
    let source = std::fs::read_to_string(path)?;
    let table = normalize_str(&source)?;
    info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "Normalized playlist"
    );
    Ok(table)
}

fn build_table(records: &[Map<String, Value>]) -> Result<TableSpec> {
    let mut schema = SchemaBuilder::default();
    let mut sparse: Vec<Vec<(usize, Value)>> = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let mut cells = Vec::with_capacity(record.len());
        for (key, value) in record {
            if key.is_empty() {
                return Err(Error::MalformedInput(format!(
                    "Record {} has an empty column name",
                    idx
                )));
            }
            if value.is_array() || value.is_object() {
                return Err(Error::MalformedInput(format!(
                    "Record {} column '{}' holds a nested {}",
                    idx,
                    key,
                    json_kind(value)
                )));
            }
            let i = schema.observe(key, value)?;
            if cells.iter().any(|(seen, _)| *seen == i) {
                return Err(Error::MalformedInput(format!(
                    "Record {} sets column '{}' more than once",
                    idx, key
                )));
            }
            cells.push((i, value.clone()));
        }
        sparse.push(cells);
    }

    if ROWID_ALIASES.iter().all(|alias| schema.position(alias).is_some()) {
        return Err(Error::MalformedInput(format!(
            "Columns {} hide every SQLite row id alias",
            ROWID_ALIASES.join(", ")
        )));
    }

    let rating_idx = match schema.position(RATING_COLUMN) {
        Some(i) => i,
        None => schema.observe(RATING_COLUMN, &Value::Null)?,
    };

    let columns: Vec<Column> = schema
        .columns
        .into_iter()
        .enumerate()
        .map(|(i, (name, ty))| Column {
            name,
            ty: if i == rating_idx {
                ColumnType::Integer
            } else {
                ty.unwrap_or(ColumnType::Text)
            },
        })
        .collect();

    let rows = sparse
        .into_iter()
        .map(|cells| {
            let mut row = vec![Value::Null; columns.len()];
            for (i, value) in cells {
                row[i] = value;
            }
            if row[rating_idx].is_null() {
                row[rating_idx] = Value::from(0);
            }
            row
        })
        .collect();

    Ok(TableSpec { columns, rows })
}

/// Pivot the column-oriented layout into records ordered by row index
fn records_from_columns(columns: &Map<String, Value>) -> Result<Vec<Map<String, Value>>> {
    let mut row_keys: Vec<String> = Vec::new();
    let mut rows: HashMap<String, Map<String, Value>> = HashMap::new();

    for (column, cells) in columns {
        let cells = cells.as_object().ok_or_else(|| {
            Error::MalformedInput(format!(
                "Column '{}' must map row indexes to values, found {}",
                column,
                json_kind(cells)
            ))
        })?;
        for (row_key, value) in cells {
            let row = rows.entry(row_key.clone()).or_insert_with(|| {
                row_keys.push(row_key.clone());
                Map::new()
            });
            row.insert(column.clone(), value.clone());
        }
    }

    // Numeric indexes sort numerically; anything else keeps first-seen order
    if row_keys.iter().all(|k| k.parse::<u64>().is_ok()) {
        row_keys.sort_by_key(|k| k.parse::<u64>().unwrap_or(u64::MAX));
    }

    Ok(row_keys
        .into_iter()
        .filter_map(|k| rows.remove(&k))
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
