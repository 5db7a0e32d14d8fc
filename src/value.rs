//! LiveGrid Cell Values
//!
//! A `CellValue` is the value stored under one field of a row. Rows come from
//! the caller (usually decoded from JSON), so values are loosely typed: the
//! same column may hold numbers in one row and strings in another.
//!
//! # Numeric coercion
//!
//! Numeric aggregates go through [`CellValue::to_number`]:
//!
//! - `Int64` / `Float64` are used as-is (`NaN` is rejected)
//! - `String` is trimmed and parsed; empty or unparseable strings are rejected
//! - `Bool` casts to `1` / `0`
//! - `Null` is rejected

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell value enum to support the value kinds a row may carry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
}

impl CellValue {
    /// The empty-string value used for freshly added draft rows.
    pub fn empty() -> Self {
        CellValue::String(String::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float64(v) => Some(*v),
            CellValue::Int64(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            CellValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric cast used by Sum / Average / Min / Max.
    /// Text must parse to a finite number; `"inf"` and `"nan"` are not numbers.
    #[inline]
    pub fn to_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Int64(v) => *v as f64,
            CellValue::Float64(v) => *v,
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())?
            }
            CellValue::Null => return None,
        };
        if n.is_nan() {
            None
        } else {
            Some(n)
        }
    }
}

/// Renders a float the way the grid displays whole numbers: `30` rather than `30.0`.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int64(v) => write!(f, "{}", v),
            CellValue::Float64(v) => write!(f, "{}", format_number(*v)),
            CellValue::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Int64(v as i64)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int64(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float64(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::String(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::String(v)
    }
}
