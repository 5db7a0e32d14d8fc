//! Footer aggregates.
//!
//! `compute_aggregates` is a pure function of (rows, specs). It is recomputed
//! whenever the visible row set or the aggregate configuration changes and holds
//! no state of its own.
//!
//! # Kinds
//!
//! - `Sum` / `Average` / `Min` / `Max`: numeric cast of every value, entries that
//!   do not coerce are skipped; with no valid entries the result is `0`
//! - `Count`: number of rows, unconditional
//! - `TrueCount` / `FalseCount`: rows whose value is exactly `true` / `false`
//! - `Custom`: caller-supplied function of `(rows, field)`
//!
//! # Formatting
//!
//! An `AggregateSpec` formatter always wins over the built-in rendering. Built-in rendering
//! prints Average with two decimals, Sum/Min/Max as a plain integer when whole and
//! with two decimals otherwise, everything else as-is. All kinds except `Custom`
//! carry a short label prefix:
//!
//! ```
//! use livegrid::{build_row, compute_aggregates, AggregateKind, AggregateSpec, CellValue};
//!
//! let rows = vec![
//!     build_row([("price", CellValue::from(10))]),
//!     build_row([("price", CellValue::from(20))]),
//!     build_row([("price", CellValue::from("x"))]),
//! ];
//! let result = compute_aggregates(&rows, &[AggregateSpec::new("price", AggregateKind::Sum)]);
//! assert_eq!(result[0].value.as_f64(), Some(30.0));
//! assert_eq!(result[0].formatted, "Sum: 30");
//! ```

use crate::error::GridError;
use crate::row::Row;
use crate::value::{format_number, CellValue};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

/// Renders a raw value for display.
pub type ValueFormatter = Rc<dyn Fn(&CellValue) -> String>;

/// Custom aggregate over `(rows, field)`.
pub type CustomAggregator = Rc<dyn Fn(&[&Row], &str) -> CellValue>;

/// Aggregate kind with its behaviour. A `Custom` kind always carries its function.
#[derive(Clone)]
pub enum AggregateKind {
    Sum,
    Average,
    Count,
    Min,
    Max,
    TrueCount,
    FalseCount,
    Custom(CustomAggregator),
}

impl AggregateKind {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[&Row], &str) -> CellValue + 'static,
    {
        AggregateKind::Custom(Rc::new(f))
    }

    /// Build a kind from its configuration tag. `Custom` cannot be built this way.
    pub fn from_type(ty: AggregateType, field: &str) -> Result<Self, GridError> {
        Ok(match ty {
            AggregateType::Sum => AggregateKind::Sum,
            AggregateType::Average => AggregateKind::Average,
            AggregateType::Count => AggregateKind::Count,
            AggregateType::Min => AggregateKind::Min,
            AggregateType::Max => AggregateKind::Max,
            AggregateType::TrueCount => AggregateKind::TrueCount,
            AggregateType::FalseCount => AggregateKind::FalseCount,
            AggregateType::Custom => {
                return Err(GridError::MissingCustomAggregator(field.to_string()))
            }
        })
    }

    pub fn aggregate_type(&self) -> AggregateType {
        match self {
            AggregateKind::Sum => AggregateType::Sum,
            AggregateKind::Average => AggregateType::Average,
            AggregateKind::Count => AggregateType::Count,
            AggregateKind::Min => AggregateType::Min,
            AggregateKind::Max => AggregateType::Max,
            AggregateKind::TrueCount => AggregateType::TrueCount,
            AggregateKind::FalseCount => AggregateType::FalseCount,
            AggregateKind::Custom(_) => AggregateType::Custom,
        }
    }
}

impl fmt::Debug for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.aggregate_type())
    }
}

/// Plain tag of an aggregate kind, as it appears in configuration and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateType {
    Sum,
    Average,
    Count,
    Min,
    Max,
    TrueCount,
    FalseCount,
    Custom,
}

impl AggregateType {
    /// Short display label. Custom aggregates are shown without one.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            AggregateType::Sum => Some("Sum"),
            AggregateType::Average => Some("Avg"),
            AggregateType::Count => Some("Count"),
            AggregateType::Min => Some("Min"),
            AggregateType::Max => Some("Max"),
            AggregateType::TrueCount => Some("True"),
            AggregateType::FalseCount => Some("False"),
            AggregateType::Custom => None,
        }
    }
}

/// What to compute for one column.
#[derive(Clone)]
pub struct AggregateSpec {
    pub field: String,
    pub kind: AggregateKind,
    pub formatter: Option<ValueFormatter>,
}

impl AggregateSpec {
    pub fn new(field: impl Into<String>, kind: AggregateKind) -> Self {
        AggregateSpec {
            field: field.into(),
            kind,
            formatter: None,
        }
    }

    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&CellValue) -> String + 'static,
    {
        self.formatter = Some(Rc::new(formatter));
        self
    }
}

impl fmt::Debug for AggregateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AggregateSpec {{ field: '{}', kind: {:?}, formatter: {} }}",
            self.field,
            self.kind,
            self.formatter.is_some()
        )
    }
}

/// One computed footer value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedAggregate {
    pub field: String,
    #[serde(rename = "type")]
    pub aggregate_type: AggregateType,
    pub value: CellValue,
    pub formatted: String,
}

/// Compute every spec over `rows`.
pub fn compute_aggregates<R: Borrow<Row>>(rows: &[R], specs: &[AggregateSpec]) -> Vec<ComputedAggregate> {
    let rows: Vec<&Row> = rows.iter().map(|r| <R as Borrow<Row>>::borrow(r)).collect();
    specs.iter().map(|spec| compute_aggregate(&rows, spec)).collect()
}

/// Compute a single spec.
pub fn compute_aggregate(rows: &[&Row], spec: &AggregateSpec) -> ComputedAggregate {
    let field = spec.field.as_str();
    let value = match &spec.kind {
        AggregateKind::Sum => CellValue::Float64(numeric_values(rows, field).sum()),
        AggregateKind::Average => {
            let (total, count) = numeric_values(rows, field).fold((0.0, 0usize), |(t, c), n| (t + n, c + 1));
            CellValue::Float64(if count == 0 { 0.0 } else { total / count as f64 })
        }
        AggregateKind::Min => CellValue::Float64(numeric_values(rows, field).reduce(f64::min).unwrap_or(0.0)),
        AggregateKind::Max => CellValue::Float64(numeric_values(rows, field).reduce(f64::max).unwrap_or(0.0)),
        AggregateKind::Count => CellValue::Int64(rows.len() as i64),
        AggregateKind::TrueCount => CellValue::Int64(count_bool(rows, field, true)),
        AggregateKind::FalseCount => CellValue::Int64(count_bool(rows, field, false)),
        AggregateKind::Custom(f) => f(rows, field),
    };

    let aggregate_type = spec.kind.aggregate_type();
    let body = match &spec.formatter {
        Some(f) => f(&value),
        None => default_format(aggregate_type, &value),
    };
    let formatted = match aggregate_type.label() {
        Some(label) => format!("{}: {}", label, body),
        None => body,
    };

    ComputedAggregate {
        field: spec.field.clone(),
        aggregate_type,
        value,
        formatted,
    }
}

fn numeric_values<'a>(rows: &'a [&'a Row], field: &'a str) -> impl Iterator<Item = f64> + 'a {
    rows.iter()
        .filter_map(move |row| row.get(field).and_then(CellValue::to_number))
}

fn count_bool(rows: &[&Row], field: &str, wanted: bool) -> i64 {
    rows.iter()
        .filter(|row| row.get(field).and_then(CellValue::as_bool) == Some(wanted))
        .count() as i64
}

fn default_format(aggregate_type: AggregateType, value: &CellValue) -> String {
    match aggregate_type {
        AggregateType::Average => match value.to_number() {
            Some(n) => format!("{:.2}", n),
            None => value.to_string(),
        },
        AggregateType::Sum | AggregateType::Min | AggregateType::Max => match value.to_number() {
            Some(n) if n.fract() == 0.0 => format_number(n),
            Some(n) => format!("{:.2}", n),
            None => value.to_string(),
        },
        AggregateType::Count
        | AggregateType::TrueCount
        | AggregateType::FalseCount
        | AggregateType::Custom => value.to_string(),
    }
}
