//! LiveGrid - headless data grid state engine
//!
//! Row and cell selection, inline/dialog/batch editing, hierarchical grouping
//! and footer aggregates over a caller-owned slice of rows. The engine keeps
//! only identifiers and pending edits; the rows themselves are passed in on
//! every call, so the caller can replace them at any time.

pub mod aggregate;
pub mod changeset;
pub mod config;
pub mod editing;
pub mod error;
pub mod grid;
pub mod grouping;
pub mod row;
pub mod schema;
pub mod selection;
pub mod value;

pub use aggregate::{
    compute_aggregate, compute_aggregates, AggregateKind, AggregateSpec, AggregateType, ComputedAggregate,
    CustomAggregator, ValueFormatter,
};
pub use changeset::{BatchChanges, Changeset};
pub use config::{ColumnConfig, GridConfig};
pub use editing::{EditConfig, EditMode, EditSession, Editor};
pub use error::GridError;
pub use grid::DataGrid;
pub use grouping::{build_groups, flatten_groups, group_path, DisplayRow, GroupItems, GroupNode, GroupingEngine};
pub use row::{build_row, rows_from_json, CellKey, KeyAccessor, Row, RowKey};
pub use schema::{Column, Schema};
pub use selection::{Modifiers, SelectionConfig, SelectionManager, SelectionMode, SelectionUnit};
pub use value::CellValue;
