//! Changeset - Batch Edit Accumulator for LiveGrid
//!
//! In Batch mode edits are not surfaced one at a time. Instead the edit session
//! accumulates them here and hands the caller one combined commit.
//!
//! # What is tracked
//!
//! - `dirty_cells`: provisional value per `(row key, field)`
//! - `dirty_rows`: every row key owning at least one dirty cell
//! - `added`: draft rows that have no key yet
//! - `deleted`: soft-deleted row keys (rows stay visible, flagged, until commit)
//!
//! `dirty_rows` is derived: a key enters it only when one of its cells becomes
//! dirty and leaves it only when its last dirty cell is dropped.
//!
//! # Usage Pattern
//!
//! 1. The edit session records cell values, drafts and deletions as they happen
//! 2. Rendering reads provisional values through `cell_value()`
//! 3. On commit, `build()` resolves keys against the current rows into `BatchChanges`
//! 4. `clear()` empties the buffer and bumps the generation

use crate::row::{CellKey, KeyAccessor, Row, RowKey};
use crate::value::CellValue;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::HashSet;

/// Payload of one batch commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchChanges {
    pub added: Vec<Row>,
    /// Original rows with every dirty cell merged in
    pub edited: Vec<Row>,
    /// Rows that were soft-deleted and still exist
    pub deleted: Vec<Row>,
}

impl BatchChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.edited.is_empty() && self.deleted.is_empty()
    }

    /// Total number of rows across the three collections
    pub fn len(&self) -> usize {
        self.added.len() + self.edited.len() + self.deleted.len()
    }
}

/// Uncommitted batch edits
#[derive(Debug, Clone, Default)]
pub struct Changeset {
    dirty_cells: IndexMap<CellKey, CellValue>,
    dirty_rows: IndexSet<RowKey>,
    added: Vec<Row>,
    deleted: IndexSet<RowKey>,
    /// Generation counter - incremented each time the changeset is cleared
    generation: u64,
}

impl Changeset {
    pub fn new() -> Self {
        Changeset::default()
    }

    /// Record a provisional cell value, marking its row dirty.
    pub fn record_cell(&mut self, cell: CellKey, value: CellValue) {
        self.dirty_rows.insert(cell.row.clone());
        self.dirty_cells.insert(cell, value);
    }

    pub fn cell_value(&self, cell: &CellKey) -> Option<&CellValue> {
        self.dirty_cells.get(cell)
    }

    pub fn is_cell_dirty(&self, cell: &CellKey) -> bool {
        self.dirty_cells.contains_key(cell)
    }

    pub fn is_row_dirty(&self, key: &RowKey) -> bool {
        self.dirty_rows.contains(key)
    }

    pub fn push_added(&mut self, row: Row) {
        self.added.push(row);
    }

    pub fn added_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.added.get_mut(index)
    }

    /// Returns false if the key was already marked
    pub fn mark_deleted(&mut self, key: RowKey) -> bool {
        self.deleted.insert(key)
    }

    /// Returns false if the key was not marked
    pub fn restore(&mut self, key: &RowKey) -> bool {
        self.deleted.shift_remove(key)
    }

    pub fn is_deleted(&self, key: &RowKey) -> bool {
        self.deleted.contains(key)
    }

    pub fn dirty_cells(&self) -> &IndexMap<CellKey, CellValue> {
        &self.dirty_cells
    }

    pub fn dirty_rows(&self) -> &IndexSet<RowKey> {
        &self.dirty_rows
    }

    pub fn added(&self) -> &[Row] {
        &self.added
    }

    pub fn deleted(&self) -> &IndexSet<RowKey> {
        &self.deleted
    }

    /// Returns true if there are no pending changes
    pub fn is_empty(&self) -> bool {
        self.dirty_cells.is_empty() && self.added.is_empty() && self.deleted.is_empty()
    }

    /// Number of pending changes: dirty cells + drafts + deletions
    pub fn len(&self) -> usize {
        self.dirty_cells.len() + self.added.len() + self.deleted.len()
    }

    /// Returns the current generation number
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Clear all changes and increment generation
    pub fn clear(&mut self) {
        self.dirty_cells.clear();
        self.dirty_rows.clear();
        self.added.clear();
        self.deleted.clear();
        self.generation += 1;
    }

    /// Resolve the accumulated keys against `rows`.
    ///
    /// Dirty or deleted keys that no longer match a row are dropped.
    pub fn build(&self, rows: &[Row], accessor: &KeyAccessor) -> BatchChanges {
        let edited = self
            .dirty_rows
            .iter()
            .filter_map(|key| {
                let (_, original) = accessor.find(rows, key)?;
                let mut merged = original.clone();
                for (cell, value) in self.dirty_cells.iter().filter(|(cell, _)| cell.row == *key) {
                    merged.insert(cell.field.clone(), value.clone());
                }
                Some(merged)
            })
            .collect();

        let deleted = self
            .deleted
            .iter()
            .filter_map(|key| accessor.find(rows, key).map(|(_, row)| row.clone()))
            .collect();

        BatchChanges {
            added: self.added.clone(),
            edited,
            deleted,
        }
    }

    /// Drop every dirty cell and deletion whose row key is not in `live`.
    /// Returns the number of entries removed.
    pub fn retain_rows(&mut self, live: &HashSet<RowKey>) -> usize {
        let before = self.dirty_cells.len() + self.deleted.len();
        self.dirty_cells.retain(|cell, _| live.contains(&cell.row));
        self.dirty_rows.retain(|key| live.contains(key));
        self.deleted.retain(|key| live.contains(key));
        before - (self.dirty_cells.len() + self.deleted.len())
    }
}
