//! Rows and row keys.
//!
//! A `Row` is an insertion-ordered mapping from field name to `CellValue`.
//! Rows are owned by the caller; the engines only ever read them and hand out
//! copies (merged edits, batch payloads), never mutate them in place.
//!
//! Every engine identifies rows through a `KeyAccessor`. The default reads the
//! `id` field and falls back to the row's index when the field is absent or null.

use crate::error::GridError;
use crate::value::{format_number, CellValue};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// Ordered field → value mapping for one record.
pub type Row = IndexMap<String, CellValue>;

/// Build a row from `(field, value)` pairs, keeping their order.
///
/// ```
/// use livegrid::{build_row, CellValue};
///
/// let row = build_row([("id", CellValue::from(1)), ("name", CellValue::from("Alice"))]);
/// assert_eq!(row.keys().collect::<Vec<_>>(), vec!["id", "name"]);
/// ```
pub fn build_row<K, V, I>(pairs: I) -> Row
where
    K: Into<String>,
    V: Into<CellValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Decode a JSON array of objects into rows, preserving field order.
///
/// ```
/// use livegrid::rows_from_json;
///
/// let rows = rows_from_json(r#"[{"id": 1, "name": "Alice"}, {"id": 2, "name": "Bob"}]"#).unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1]["name"].as_string(), Some("Bob"));
/// ```
pub fn rows_from_json(json: &str) -> Result<Vec<Row>, GridError> {
    serde_json::from_str::<Vec<Row>>(json).map_err(|e| {
        if e.is_data() {
            GridError::InvalidRows(format!("expected an array of flat objects: {}", e))
        } else {
            GridError::Json(e)
        }
    })
}

/// Stable identifier of a row, extracted by a `KeyAccessor`.
///
/// Whole numbers become `Int`. Every other non-null key value is stringified
/// into `Text`, so a bool id `true` and a string id `"true"` produce the same
/// key, as do `1.5` and `"1.5"`. Keys are assumed unique across a row set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum RowKey {
    Int(i64),
    Text(String),
    /// Position in the row array, used when the key field is missing
    Index(usize),
}

impl RowKey {
    /// Key for a value read from the key field. `None` for null values,
    /// which makes the accessor fall back to the row index.
    pub fn from_value(value: &CellValue) -> Option<RowKey> {
        match value {
            CellValue::Null => None,
            CellValue::Int64(v) => Some(RowKey::Int(*v)),
            CellValue::Float64(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                Some(RowKey::Int(*v as i64))
            }
            CellValue::Float64(v) => Some(RowKey::Text(format_number(*v))),
            CellValue::Bool(b) => Some(RowKey::Text(b.to_string())),
            CellValue::String(s) => Some(RowKey::Text(s.clone())),
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Int(v) => write!(f, "{}", v),
            RowKey::Text(s) => f.write_str(s),
            RowKey::Index(i) => write!(f, "#{}", i),
        }
    }
}

impl From<i64> for RowKey {
    fn from(v: i64) -> Self {
        RowKey::Int(v)
    }
}

impl From<i32> for RowKey {
    fn from(v: i32) -> Self {
        RowKey::Int(v as i64)
    }
}

impl From<&str> for RowKey {
    fn from(v: &str) -> Self {
        RowKey::Text(v.to_string())
    }
}

/// Address of one cell: the owning row's key plus the field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CellKey {
    pub row: RowKey,
    pub field: String,
}

impl CellKey {
    pub fn new(row: impl Into<RowKey>, field: impl Into<String>) -> Self {
        CellKey {
            row: row.into(),
            field: field.into(),
        }
    }
}

/// Extracts a `RowKey` from a row.
///
/// Cloning is cheap; every engine of a grid holds its own copy.
#[derive(Clone)]
pub enum KeyAccessor {
    /// Read the named field, falling back to the row index
    Field(String),
    /// Caller-supplied extraction
    Custom(Rc<dyn Fn(&Row, usize) -> RowKey>),
}

impl Default for KeyAccessor {
    fn default() -> Self {
        KeyAccessor::Field("id".to_string())
    }
}

impl fmt::Debug for KeyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAccessor::Field(name) => write!(f, "KeyAccessor::Field({:?})", name),
            KeyAccessor::Custom(_) => f.write_str("KeyAccessor::Custom(..)"),
        }
    }
}

impl KeyAccessor {
    pub fn field(name: impl Into<String>) -> Self {
        KeyAccessor::Field(name.into())
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Row, usize) -> RowKey + 'static,
    {
        KeyAccessor::Custom(Rc::new(f))
    }

    /// Key of the row at `index`.
    pub fn key_of(&self, row: &Row, index: usize) -> RowKey {
        match self {
            KeyAccessor::Field(name) => row
                .get(name)
                .and_then(RowKey::from_value)
                .unwrap_or(RowKey::Index(index)),
            KeyAccessor::Custom(f) => f(row, index),
        }
    }

    /// Keys of every row, in row order.
    pub fn keys(&self, rows: &[Row]) -> Vec<RowKey> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| self.key_of(row, i))
            .collect()
    }

    /// Locate a row by key. Linear scan; keys are assumed unique, first match wins.
    pub fn find<'a>(&self, rows: &'a [Row], key: &RowKey) -> Option<(usize, &'a Row)> {
        rows.iter()
            .enumerate()
            .find(|(i, row)| self.key_of(row, *i) == *key)
    }
}
