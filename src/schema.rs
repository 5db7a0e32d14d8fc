//! Column definitions.
//!
//! The schema is the grid's ordered list of columns. Besides naming the fields,
//! it drives two engine behaviours: new draft rows get one empty value per
//! column, and a row editor snapshots exactly the schema's fields.
//!
//! # Examples
//!
//! ```
//! use livegrid::{AggregateKind, Column, Schema};
//!
//! let schema = Schema::new(vec![
//!     Column::new("id", "ID").read_only(),
//!     Column::new("name", "Name"),
//!     Column::new("salary", "Salary").with_aggregate(AggregateKind::Sum),
//! ]);
//!
//! assert_eq!(schema.len(), 3);
//! assert_eq!(schema.get_column_index("salary"), Some(2));
//! assert_eq!(schema.aggregate_specs().len(), 1);
//! ```

use crate::aggregate::{AggregateKind, AggregateSpec, ValueFormatter};
use crate::value::CellValue;
use std::fmt;
use std::rc::Rc;

/// One column of the grid.
#[derive(Clone)]
pub struct Column {
    pub field: String,
    pub header: String,
    /// Cells of read-only columns refuse to open an editor
    pub editable: bool,
    pub formatter: Option<ValueFormatter>,
    pub aggregate: Option<AggregateKind>,
}

impl Column {
    pub fn new(field: impl Into<String>, header: impl Into<String>) -> Self {
        Column {
            field: field.into(),
            header: header.into(),
            editable: true,
            formatter: None,
            aggregate: None,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&CellValue) -> String + 'static,
    {
        self.formatter = Some(Rc::new(formatter));
        self
    }

    pub fn with_aggregate(mut self, kind: AggregateKind) -> Self {
        self.aggregate = Some(kind);
        self
    }

    /// Display text for a cell of this column.
    pub fn format_value(&self, value: &CellValue) -> String {
        match &self.formatter {
            Some(f) => f(value),
            None => value.to_string(),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Column {{ field: '{}', header: '{}', editable: {}, aggregate: {:?} }}",
            self.field, self.header, self.editable, self.aggregate
        )
    }
}

/// Ordered column list of a grid.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Schema { columns }
    }

    /// Returns the number of columns in the schema.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns a list of all field names, in column order.
    pub fn field_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.field.as_str()).collect()
    }

    /// Returns the index of a column by field name, or None if not found.
    pub fn get_column_index(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.field == field)
    }

    pub fn get_column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Unknown fields are treated as editable; the grid does not validate
    /// edits against the schema.
    pub fn is_editable(&self, field: &str) -> bool {
        self.get_column(field).map_or(true, |c| c.editable)
    }

    /// Footer aggregate specs for every column carrying aggregate metadata.
    /// The column formatter, if any, formats the aggregate value too.
    pub fn aggregate_specs(&self) -> Vec<AggregateSpec> {
        self.columns
            .iter()
            .filter_map(|c| {
                c.aggregate.clone().map(|kind| AggregateSpec {
                    field: c.field.clone(),
                    kind,
                    formatter: c.formatter.clone(),
                })
            })
            .collect()
    }
}
