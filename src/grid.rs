//! The per-table owner.
//!
//! A `DataGrid` holds the four engines of one table instance and the schema
//! they share. The engines never call each other; the grid only hands each of
//! them the same rows and key accessor and exposes them for the caller to drive.

use crate::aggregate::{compute_aggregates, AggregateKind, ComputedAggregate};
use crate::config::GridConfig;
use crate::editing::{EditConfig, EditSession};
use crate::error::GridError;
use crate::grouping::{GroupNode, GroupingEngine};
use crate::row::{KeyAccessor, Row, RowKey};
use crate::schema::Schema;
use crate::selection::{SelectionConfig, SelectionManager};
use std::borrow::Borrow;

pub struct DataGrid {
    schema: Schema,
    key: KeyAccessor,
    selection: SelectionManager,
    editing: EditSession,
    grouping: GroupingEngine,
}

impl DataGrid {
    pub fn new(schema: Schema, selection: SelectionConfig, editing: EditConfig) -> Self {
        Self::with_key_accessor(schema, selection, editing, KeyAccessor::default())
    }

    pub fn with_key_accessor(
        schema: Schema,
        selection: SelectionConfig,
        editing: EditConfig,
        key: KeyAccessor,
    ) -> Self {
        DataGrid {
            selection: SelectionManager::with_key_accessor(selection, key.clone()),
            editing: EditSession::with_key_accessor(editing, schema.clone(), key.clone()),
            grouping: GroupingEngine::new(),
            schema,
            key,
        }
    }

    /// Build a grid from a validated config, including its initial group fields.
    pub fn from_config(config: &GridConfig) -> Result<Self, GridError> {
        config.validate()?;
        let mut grid = Self::with_key_accessor(
            config.schema()?,
            config.selection,
            config.editing,
            config.key_accessor(),
        );
        grid.grouping = GroupingEngine::with_fields(config.group_by.clone());
        Ok(grid)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn key_accessor(&self) -> &KeyAccessor {
        &self.key
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionManager {
        &mut self.selection
    }

    pub fn editing(&self) -> &EditSession {
        &self.editing
    }

    pub fn editing_mut(&mut self) -> &mut EditSession {
        &mut self.editing
    }

    pub fn grouping(&self) -> &GroupingEngine {
        &self.grouping
    }

    pub fn grouping_mut(&mut self) -> &mut GroupingEngine {
        &mut self.grouping
    }

    pub fn row_key(&self, rows: &[Row], index: usize) -> Option<RowKey> {
        rows.get(index).map(|row| self.key.key_of(row, index))
    }

    /// Attach or replace the footer aggregate of a column.
    /// Returns false if the schema has no such column.
    pub fn set_aggregate(&mut self, field: &str, kind: AggregateKind) -> bool {
        match self.schema.get_column_index(field) {
            Some(_) => {
                let mut columns = self.schema.columns().to_vec();
                if let Some(column) = columns.iter_mut().find(|c| c.field == field) {
                    column.aggregate = Some(kind);
                }
                self.schema = Schema::new(columns);
                true
            }
            None => false,
        }
    }

    /// Footer values over `rows` for every column with aggregate metadata.
    pub fn aggregates<R: Borrow<Row>>(&self, rows: &[R]) -> Vec<ComputedAggregate> {
        compute_aggregates(rows, &self.schema.aggregate_specs())
    }

    /// Footer values of one group.
    pub fn group_aggregates(&self, group: &GroupNode<'_>) -> Vec<ComputedAggregate> {
        compute_aggregates(&group.rows(), &self.schema.aggregate_specs())
    }

    pub fn groups<'a>(&self, rows: &'a [Row]) -> Vec<GroupNode<'a>> {
        self.grouping.groups(rows)
    }

    /// Display text of a cell, provisional edits included, through the column formatter.
    pub fn display_value(&self, rows: &[Row], key: &RowKey, field: &str) -> Option<String> {
        let value = self.editing.get_cell_value(rows, key, field)?;
        Some(match self.schema.get_column(field) {
            Some(column) => column.format_value(value),
            None => value.to_string(),
        })
    }

    /// Prune selection and batch state against a replacement row set.
    /// Returns the number of stale entries removed.
    pub fn reconcile(&mut self, rows: &[Row]) -> usize {
        self.selection.reconcile(rows) + self.editing.reconcile(rows)
    }
}

impl std::fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("schema", &self.schema)
            .field("selection", &self.selection)
            .field("editing", &self.editing)
            .field("grouping", &self.grouping)
            .finish()
    }
}
