//! Inline editing sessions.
//!
//! One `EditSession` per grid. Its mode is fixed at construction:
//!
//! - **Normal / Dialog**: row-scoped. `start_edit` snapshots the row into a draft,
//!   `update_edit_value` changes the draft, `save_edit` hands the caller the
//!   merged row through `on_save`. Dialog mode additionally flags the dialog open.
//! - **Batch**: cell-scoped. Every `update_edit_value` is recorded immediately in
//!   the session's [`Changeset`]; nothing reaches the caller until `save_batch`
//!   emits one combined `BatchChanges`.
//!
//! References to rows that are not in the current row slice are silent no-ops.
//!
//! # Examples
//!
//! ```
//! use livegrid::{build_row, CellValue, Column, EditConfig, EditMode, EditSession, RowKey, Schema};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let schema = Schema::new(vec![Column::new("id", "ID"), Column::new("name", "Name")]);
//! let rows = vec![build_row([("id", CellValue::from(1)), ("name", CellValue::from("Ann"))])];
//!
//! let mut session = EditSession::new(EditConfig::with_mode(EditMode::Batch), schema);
//! let commits = Rc::new(RefCell::new(Vec::new()));
//! let sink = commits.clone();
//! session.on_batch_save(move |changes| sink.borrow_mut().push(changes.clone()));
//!
//! session.start_cell_edit(&rows, &RowKey::Int(1), "name");
//! session.update_edit_value("name", CellValue::from("Anna"));
//! session.save_edit(&rows);
//! assert_eq!(session.get_cell_value(&rows, &RowKey::Int(1), "name"), Some(&CellValue::from("Anna")));
//!
//! session.save_batch(&rows);
//! assert_eq!(commits.borrow()[0].edited[0]["name"], CellValue::from("Anna"));
//! ```

use crate::changeset::{BatchChanges, Changeset};
use crate::row::{CellKey, KeyAccessor, Row, RowKey};
use crate::schema::Schema;
use crate::value::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    #[default]
    Normal,
    Dialog,
    Batch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    pub mode: EditMode,
    pub allow_adding: bool,
    pub allow_editing: bool,
    pub allow_deleting: bool,
}

impl Default for EditConfig {
    fn default() -> Self {
        EditConfig {
            mode: EditMode::Normal,
            allow_adding: true,
            allow_editing: true,
            allow_deleting: true,
        }
    }
}

impl EditConfig {
    pub fn with_mode(mode: EditMode) -> Self {
        EditConfig {
            mode,
            ..Default::default()
        }
    }
}

/// The editor currently open, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Editor {
    Row(RowKey),
    Cell(CellKey),
}

impl Editor {
    pub fn row_key(&self) -> &RowKey {
        match self {
            Editor::Row(key) => key,
            Editor::Cell(cell) => &cell.row,
        }
    }
}

pub type SaveCallback = Box<dyn FnMut(&Row, &Row)>;
pub type RowCallback = Box<dyn FnMut(&Row)>;
pub type BatchSaveCallback = Box<dyn FnMut(&BatchChanges)>;

#[derive(Default)]
struct EditCallbacks {
    on_save: Option<SaveCallback>,
    on_delete: Option<RowCallback>,
    on_add: Option<RowCallback>,
    on_batch_save: Option<BatchSaveCallback>,
}

pub struct EditSession {
    config: EditConfig,
    key: KeyAccessor,
    schema: Schema,
    editor: Option<Editor>,
    /// Live draft of whichever row or cell is open
    pending: Row,
    dialog_open: bool,
    /// Batch accumulators; stays empty outside Batch mode
    changes: Changeset,
    callbacks: EditCallbacks,
}

impl EditSession {
    pub fn new(config: EditConfig, schema: Schema) -> Self {
        Self::with_key_accessor(config, schema, KeyAccessor::default())
    }

    pub fn with_key_accessor(config: EditConfig, schema: Schema, key: KeyAccessor) -> Self {
        EditSession {
            config,
            key,
            schema,
            editor: None,
            pending: Row::new(),
            dialog_open: false,
            changes: Changeset::new(),
            callbacks: EditCallbacks::default(),
        }
    }

    pub fn mode(&self) -> EditMode {
        self.config.mode
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    // ========================================================================
    // Callbacks
    // ========================================================================

    /// Receives `(edited, original)` on a successful Normal/Dialog save.
    pub fn on_save<F: FnMut(&Row, &Row) + 'static>(&mut self, f: F) -> &mut Self {
        self.callbacks.on_save = Some(Box::new(f));
        self
    }

    pub fn on_delete<F: FnMut(&Row) + 'static>(&mut self, f: F) -> &mut Self {
        self.callbacks.on_delete = Some(Box::new(f));
        self
    }

    pub fn on_add<F: FnMut(&Row) + 'static>(&mut self, f: F) -> &mut Self {
        self.callbacks.on_add = Some(Box::new(f));
        self
    }

    pub fn on_batch_save<F: FnMut(&BatchChanges) + 'static>(&mut self, f: F) -> &mut Self {
        self.callbacks.on_batch_save = Some(Box::new(f));
        self
    }

    // ========================================================================
    // Editor lifecycle
    // ========================================================================

    /// Open a row editor on `key`, snapshotting every column value.
    pub fn start_edit(&mut self, rows: &[Row], key: &RowKey) {
        if !self.config.allow_editing {
            log::debug!("start_edit ignored: editing disabled");
            return;
        }
        if self.config.mode == EditMode::Batch {
            log::debug!("start_edit ignored: batch mode edits cells, not rows");
            return;
        }
        let Some((_, row)) = self.key.find(rows, key) else {
            log::debug!("start_edit ignored: row {} not found", key);
            return;
        };

        self.pending = if self.schema.is_empty() {
            row.clone()
        } else {
            self.schema
                .columns()
                .iter()
                .map(|c| (c.field.clone(), row.get(&c.field).cloned().unwrap_or_default()))
                .collect()
        };
        self.editor = Some(Editor::Row(key.clone()));
        self.dialog_open = self.config.mode == EditMode::Dialog;
        log::debug!("editing row {} ({:?})", key, self.config.mode);
    }

    /// Open a cell editor. Dialog mode opens the row dialog instead.
    pub fn start_cell_edit(&mut self, rows: &[Row], key: &RowKey, field: &str) {
        if !self.config.allow_editing || !self.schema.is_editable(field) {
            log::debug!("start_cell_edit ignored: field '{}' is not editable", field);
            return;
        }
        if self.config.mode == EditMode::Dialog {
            self.start_edit(rows, key);
            return;
        }
        let Some((_, row)) = self.key.find(rows, key) else {
            log::debug!("start_cell_edit ignored: row {} not found", key);
            return;
        };

        let cell = CellKey {
            row: key.clone(),
            field: field.to_string(),
        };
        let current = self
            .changes
            .cell_value(&cell)
            .or_else(|| row.get(field))
            .cloned()
            .unwrap_or_default();

        self.pending = Row::new();
        self.pending.insert(field.to_string(), current);
        self.editor = Some(Editor::Cell(cell));
        self.dialog_open = false;
        log::debug!("editing cell {}:{}", key, field);
    }

    /// Change one field of the open draft. In Batch mode the value is recorded
    /// as a dirty cell right away.
    pub fn update_edit_value(&mut self, field: &str, value: CellValue) {
        let Some(editor) = &self.editor else {
            log::debug!("update_edit_value ignored: no editor open");
            return;
        };
        if self.config.mode == EditMode::Batch {
            let cell = CellKey {
                row: editor.row_key().clone(),
                field: field.to_string(),
            };
            self.changes.record_cell(cell, value.clone());
        }
        self.pending.insert(field.to_string(), value);
    }

    /// Commit the open editor.
    ///
    /// Normal/Dialog: merges the draft over the current row and fires `on_save`.
    /// If the row has vanished the editor stays open and nothing fires.
    /// Batch: the diff is already recorded, so this only closes the editor.
    pub fn save_edit(&mut self, rows: &[Row]) {
        let Some(editor) = &self.editor else {
            return;
        };
        if self.config.mode == EditMode::Batch {
            self.clear_editor();
            return;
        }

        let key = editor.row_key();
        let Some((_, original)) = self.key.find(rows, key) else {
            log::debug!("save_edit ignored: row {} no longer exists", key);
            return;
        };
        let mut merged = original.clone();
        for (field, value) in &self.pending {
            merged.insert(field.clone(), value.clone());
        }
        log::debug!("saving row {}", key);

        if let Some(cb) = self.callbacks.on_save.as_mut() {
            cb(&merged, original);
        }
        self.clear_editor();
    }

    /// Close the open editor without firing anything. In Batch mode cells
    /// recorded earlier stay dirty.
    pub fn cancel_edit(&mut self) {
        if self.editor.is_some() {
            log::debug!("edit cancelled");
        }
        self.clear_editor();
    }

    // ========================================================================
    // Row add / delete
    // ========================================================================

    /// Normal/Dialog: fire `on_delete` immediately. Batch: soft-delete.
    pub fn delete_row(&mut self, rows: &[Row], key: &RowKey) {
        if !self.config.allow_deleting {
            log::debug!("delete_row ignored: deleting disabled");
            return;
        }
        let Some((_, row)) = self.key.find(rows, key) else {
            log::debug!("delete_row ignored: row {} not found", key);
            return;
        };
        match self.config.mode {
            EditMode::Batch => {
                self.changes.mark_deleted(key.clone());
            }
            EditMode::Normal | EditMode::Dialog => {
                if let Some(cb) = self.callbacks.on_delete.as_mut() {
                    cb(row);
                }
            }
        }
    }

    /// Undo a Batch soft delete. Returns false if the row was not marked.
    pub fn restore_row(&mut self, key: &RowKey) -> bool {
        self.changes.restore(key)
    }

    /// Create a draft with every column set to the empty string.
    /// Normal/Dialog: fire `on_add`. Batch: queue it until `save_batch`.
    pub fn add_new_row(&mut self) {
        if !self.config.allow_adding {
            log::debug!("add_new_row ignored: adding disabled");
            return;
        }
        let draft: Row = self
            .schema
            .field_names()
            .into_iter()
            .map(|field| (field.to_string(), CellValue::empty()))
            .collect();
        match self.config.mode {
            EditMode::Batch => self.changes.push_added(draft),
            EditMode::Normal | EditMode::Dialog => {
                if let Some(cb) = self.callbacks.on_add.as_mut() {
                    cb(&draft);
                }
            }
        }
    }

    /// Edit a queued Batch draft. Returns false if there is no draft at `index`.
    pub fn update_added_row(&mut self, index: usize, field: &str, value: CellValue) -> bool {
        match self.changes.added_mut(index) {
            Some(draft) => {
                draft.insert(field.to_string(), value);
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Batch commit
    // ========================================================================

    /// Fire `on_batch_save` once with everything accumulated, then reset.
    pub fn save_batch(&mut self, rows: &[Row]) {
        let changes = self.changes.build(rows, &self.key);
        log::debug!(
            "batch save: {} added, {} edited, {} deleted",
            changes.added.len(),
            changes.edited.len(),
            changes.deleted.len()
        );
        if let Some(cb) = self.callbacks.on_batch_save.as_mut() {
            cb(&changes);
        }
        self.changes.clear();
        self.clear_editor();
    }

    /// Discard everything accumulated without firing anything.
    pub fn cancel_batch(&mut self) {
        log::debug!("batch cancelled: {} pending changes dropped", self.changes.len());
        self.changes.clear();
        self.clear_editor();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Provisional value of a cell: the dirty value if any, else the row's own.
    pub fn get_cell_value<'a>(&'a self, rows: &'a [Row], key: &RowKey, field: &str) -> Option<&'a CellValue> {
        let cell = CellKey {
            row: key.clone(),
            field: field.to_string(),
        };
        if let Some(value) = self.changes.cell_value(&cell) {
            return Some(value);
        }
        self.key.find(rows, key).and_then(|(_, row)| row.get(field))
    }

    pub fn is_row_deleted(&self, key: &RowKey) -> bool {
        self.changes.is_deleted(key)
    }

    pub fn is_cell_dirty(&self, key: &RowKey, field: &str) -> bool {
        self.changes.is_cell_dirty(&CellKey {
            row: key.clone(),
            field: field.to_string(),
        })
    }

    pub fn is_row_dirty(&self, key: &RowKey) -> bool {
        self.changes.is_row_dirty(key)
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    /// Row owning the open editor, for row and cell editors alike.
    pub fn editing_row_key(&self) -> Option<&RowKey> {
        self.editor.as_ref().map(Editor::row_key)
    }

    pub fn editing_cell(&self) -> Option<&CellKey> {
        match &self.editor {
            Some(Editor::Cell(cell)) => Some(cell),
            _ => None,
        }
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn pending_values(&self) -> &Row {
        &self.pending
    }

    pub fn changes(&self) -> &Changeset {
        &self.changes
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    /// Drop batch entries and the open editor whose rows no longer resolve.
    /// Returns the number of batch entries removed.
    pub fn reconcile(&mut self, rows: &[Row]) -> usize {
        let live: HashSet<RowKey> = self.key.keys(rows).into_iter().collect();
        let removed = self.changes.retain_rows(&live);
        if self.editor.as_ref().is_some_and(|e| !live.contains(e.row_key())) {
            log::debug!("closing editor on vanished row");
            self.clear_editor();
        }
        removed
    }

    fn clear_editor(&mut self) {
        self.editor = None;
        self.pending.clear();
        self.dialog_open = false;
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("config", &self.config)
            .field("editor", &self.editor)
            .field("pending", &self.pending)
            .field("dialog_open", &self.dialog_open)
            .field("changes", &self.changes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::build_row;
    use crate::schema::Column;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("id", "ID").read_only(),
            Column::new("name", "Name"),
            Column::new("salary", "Salary"),
        ])
    }

    fn rows() -> Vec<Row> {
        vec![
            build_row([("id", CellValue::from(1)), ("name", CellValue::from("Ann")), ("salary", CellValue::from(100))]),
            build_row([("id", CellValue::from(2)), ("name", CellValue::from("Bo")), ("salary", CellValue::from(200))]),
        ]
    }

    fn session(mode: EditMode) -> EditSession {
        EditSession::new(EditConfig::with_mode(mode), schema())
    }

    type Saved = Rc<RefCell<Vec<(Row, Row)>>>;

    fn capture_saves(s: &mut EditSession) -> Saved {
        let saved: Saved = Rc::new(RefCell::new(Vec::new()));
        let sink = saved.clone();
        s.on_save(move |edited, original| sink.borrow_mut().push((edited.clone(), original.clone())));
        saved
    }

    fn capture_batches(s: &mut EditSession) -> Rc<RefCell<Vec<BatchChanges>>> {
        let batches = Rc::new(RefCell::new(Vec::new()));
        let sink = batches.clone();
        s.on_batch_save(move |changes| sink.borrow_mut().push(changes.clone()));
        batches
    }

    #[test]
    fn test_normal_edit_save() {
        let data = rows();
        let mut s = session(EditMode::Normal);
        let saved = capture_saves(&mut s);

        s.start_edit(&data, &RowKey::Int(1));
        assert!(s.is_editing());
        assert!(!s.is_dialog_open());
        assert_eq!(s.pending_values().len(), 3);

        s.update_edit_value("name", CellValue::from("Anna"));
        s.save_edit(&data);

        let saved = saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0["name"], CellValue::from("Anna"));
        assert_eq!(saved[0].0["salary"], CellValue::from(100));
        assert_eq!(saved[0].1["name"], CellValue::from("Ann"));
        assert!(!s.is_editing());
        assert!(s.pending_values().is_empty());
        // Source rows untouched
        assert_eq!(data[0]["name"], CellValue::from("Ann"));
    }

    #[test]
    fn test_dialog_mode_opens_dialog() {
        let data = rows();
        let mut s = session(EditMode::Dialog);
        s.start_edit(&data, &RowKey::Int(2));
        assert!(s.is_dialog_open());
        assert_eq!(s.editing_row_key(), Some(&RowKey::Int(2)));
        s.cancel_edit();
        assert!(!s.is_dialog_open());
        assert!(!s.is_editing());
    }

    #[test]
    fn test_dialog_cell_edit_opens_row_dialog() {
        let data = rows();
        let mut s = session(EditMode::Dialog);
        s.start_cell_edit(&data, &RowKey::Int(1), "name");
        assert!(s.is_dialog_open());
        assert_eq!(s.editor(), Some(&Editor::Row(RowKey::Int(1))));
    }

    #[test]
    fn test_start_edit_missing_row_is_noop() {
        let data = rows();
        let mut s = session(EditMode::Normal);
        s.start_edit(&data, &RowKey::Int(99));
        assert!(!s.is_editing());
        assert!(s.pending_values().is_empty());
    }

    #[test]
    fn test_save_edit_keeps_state_when_row_vanished() {
        let data = rows();
        let mut s = session(EditMode::Normal);
        let saved = capture_saves(&mut s);
        s.start_edit(&data, &RowKey::Int(2));
        s.update_edit_value("name", CellValue::from("Bob"));

        let shrunk = vec![data[0].clone()];
        s.save_edit(&shrunk);
        assert!(saved.borrow().is_empty());
        assert!(s.is_editing());
        assert_eq!(s.pending_values()["name"], CellValue::from("Bob"));
    }

    #[test]
    fn test_cancel_edit_fires_nothing() {
        let data = rows();
        let mut s = session(EditMode::Normal);
        let saved = capture_saves(&mut s);
        s.start_edit(&data, &RowKey::Int(1));
        s.update_edit_value("name", CellValue::from("zzz"));
        s.cancel_edit();
        assert!(saved.borrow().is_empty());
        assert!(!s.is_editing());
    }

    #[test]
    fn test_save_without_callback_still_clears() {
        let data = rows();
        let mut s = session(EditMode::Normal);
        s.start_edit(&data, &RowKey::Int(1));
        s.save_edit(&data);
        assert!(!s.is_editing());
    }

    #[test]
    fn test_normal_cell_edit_saves_through_on_save() {
        let data = rows();
        let mut s = session(EditMode::Normal);
        let saved = capture_saves(&mut s);
        s.start_cell_edit(&data, &RowKey::Int(2), "salary");
        assert_eq!(s.editing_cell(), Some(&CellKey::new(2, "salary")));
        assert_eq!(s.pending_values()["salary"], CellValue::from(200));
        s.update_edit_value("salary", CellValue::from(250));
        s.save_edit(&data);
        assert_eq!(saved.borrow()[0].0["salary"], CellValue::from(250));
        assert!(!s.has_changes());
    }

    #[test]
    fn test_read_only_column_refuses_cell_edit() {
        let data = rows();
        let mut s = session(EditMode::Batch);
        s.start_cell_edit(&data, &RowKey::Int(1), "id");
        assert!(!s.is_editing());
    }

    #[test]
    fn test_batch_diffs_are_live() {
        let data = rows();
        let mut s = session(EditMode::Batch);
        assert_eq!(s.get_cell_value(&data, &RowKey::Int(1), "name"), Some(&CellValue::from("Ann")));

        s.start_cell_edit(&data, &RowKey::Int(1), "name");
        s.update_edit_value("name", CellValue::from("Anna"));
        assert!(s.is_cell_dirty(&RowKey::Int(1), "name"));
        assert!(s.is_row_dirty(&RowKey::Int(1)));
        assert_eq!(s.get_cell_value(&data, &RowKey::Int(1), "name"), Some(&CellValue::from("Anna")));
    }

    #[test]
    fn test_batch_cell_edit_seeds_from_dirty_value() {
        let data = rows();
        let mut s = session(EditMode::Batch);
        s.start_cell_edit(&data, &RowKey::Int(1), "name");
        s.update_edit_value("name", CellValue::from("Anna"));
        s.save_edit(&data);
        assert!(!s.is_editing());

        s.start_cell_edit(&data, &RowKey::Int(1), "name");
        assert_eq!(s.pending_values()["name"], CellValue::from("Anna"));
    }

    #[test]
    fn test_batch_two_fields_merge_into_one_edited_row() {
        let data = rows();
        let mut s = session(EditMode::Batch);
        let batches = capture_batches(&mut s);

        s.start_cell_edit(&data, &RowKey::Int(1), "name");
        s.update_edit_value("name", CellValue::from("Anna"));
        s.save_edit(&data);
        s.start_cell_edit(&data, &RowKey::Int(1), "salary");
        s.update_edit_value("salary", CellValue::from(150));
        s.save_edit(&data);

        s.save_batch(&data);
        let batches = batches.borrow();
        assert_eq!(batches.len(), 1);
        let edited = &batches[0].edited;
        assert_eq!(edited.len(), 1);
        assert_eq!(edited[0]["name"], CellValue::from("Anna"));
        assert_eq!(edited[0]["salary"], CellValue::from(150));
        assert!(!s.has_changes());
    }

    #[test]
    fn test_batch_cancel_edit_keeps_other_dirty_cells() {
        let data = rows();
        let mut s = session(EditMode::Batch);
        s.start_cell_edit(&data, &RowKey::Int(1), "name");
        s.update_edit_value("name", CellValue::from("Anna"));
        s.save_edit(&data);

        s.start_cell_edit(&data, &RowKey::Int(2), "name");
        s.cancel_edit();
        assert!(s.is_cell_dirty(&RowKey::Int(1), "name"));
        assert_eq!(s.changes().dirty_rows().len(), 1);
    }

    #[test]
    fn test_batch_delete_and_add() {
        let data = rows();
        let mut s = session(EditMode::Batch);
        let batches = capture_batches(&mut s);

        s.delete_row(&data, &RowKey::Int(2));
        assert!(s.is_row_deleted(&RowKey::Int(2)));
        s.add_new_row();
        assert!(s.update_added_row(0, "name", CellValue::from("New")));
        assert!(!s.update_added_row(3, "name", CellValue::from("x")));

        s.save_batch(&data);
        let batch = &batches.borrow()[0];
        assert_eq!(batch.deleted.len(), 1);
        assert_eq!(batch.deleted[0]["id"], CellValue::from(2));
        assert_eq!(batch.added.len(), 1);
        assert_eq!(batch.added[0]["name"], CellValue::from("New"));
        assert_eq!(batch.added[0]["salary"], CellValue::empty());
        assert!(!s.is_row_deleted(&RowKey::Int(2)));
    }

    #[test]
    fn test_batch_deleted_row_vanished_before_commit() {
        let data = rows();
        let mut s = session(EditMode::Batch);
        let batches = capture_batches(&mut s);
        s.delete_row(&data, &RowKey::Int(2));
        s.save_batch(&data[..1]);
        assert!(batches.borrow()[0].deleted.is_empty());
    }

    #[test]
    fn test_restore_row() {
        let data = rows();
        let mut s = session(EditMode::Batch);
        s.delete_row(&data, &RowKey::Int(1));
        assert!(s.restore_row(&RowKey::Int(1)));
        assert!(!s.is_row_deleted(&RowKey::Int(1)));
        assert!(!s.restore_row(&RowKey::Int(1)));
    }

    #[test]
    fn test_cancel_batch_resets_everything() {
        let data = rows();
        let mut s = session(EditMode::Batch);
        let batches = capture_batches(&mut s);

        s.start_cell_edit(&data, &RowKey::Int(1), "name");
        s.update_edit_value("name", CellValue::from("Anna"));
        s.add_new_row();
        s.delete_row(&data, &RowKey::Int(2));
        assert_eq!(s.change_count(), 3);

        s.cancel_batch();
        assert!(s.changes().dirty_cells().is_empty());
        assert!(s.changes().dirty_rows().is_empty());
        assert!(s.changes().added().is_empty());
        assert!(s.changes().deleted().is_empty());
        assert!(!s.is_editing());
        assert!(batches.borrow().is_empty());
    }

    #[test]
    fn test_delete_missing_row_is_noop() {
        for mode in [EditMode::Normal, EditMode::Dialog, EditMode::Batch] {
            let data = rows();
            let mut s = session(mode);
            let deleted = Rc::new(RefCell::new(0));
            let d = deleted.clone();
            s.on_delete(move |_| *d.borrow_mut() += 1);

            s.delete_row(&data, &RowKey::Int(404));
            assert_eq!(*deleted.borrow(), 0);
            assert!(!s.has_changes());
            assert!(!s.is_editing());
        }
    }

    #[test]
    fn test_normal_delete_and_add_fire_immediately() {
        let data = rows();
        let mut s = session(EditMode::Normal);
        let events = Rc::new(RefCell::new(Vec::new()));
        let e1 = events.clone();
        let e2 = events.clone();
        s.on_delete(move |r| e1.borrow_mut().push(format!("delete {}", r["id"])))
            .on_add(move |r| e2.borrow_mut().push(format!("add {} fields", r.len())));

        s.delete_row(&data, &RowKey::Int(1));
        s.add_new_row();
        assert_eq!(*events.borrow(), vec!["delete 1", "add 3 fields"]);
        assert!(!s.has_changes());
    }

    #[test]
    fn test_permissions() {
        let data = rows();
        let config = EditConfig {
            mode: EditMode::Normal,
            allow_adding: false,
            allow_editing: false,
            allow_deleting: false,
        };
        let mut s = EditSession::new(config, schema());
        let fired = Rc::new(RefCell::new(0));
        let f1 = fired.clone();
        let f2 = fired.clone();
        s.on_delete(move |_| *f1.borrow_mut() += 1).on_add(move |_| *f2.borrow_mut() += 1);

        s.start_edit(&data, &RowKey::Int(1));
        s.delete_row(&data, &RowKey::Int(1));
        s.add_new_row();
        assert!(!s.is_editing());
        assert_eq!(*fired.borrow(), 0);
    }

    #[test]
    fn test_update_without_editor_is_noop() {
        let mut s = session(EditMode::Batch);
        s.update_edit_value("name", CellValue::from("x"));
        assert!(!s.has_changes());
        assert!(s.pending_values().is_empty());
    }

    #[test]
    fn test_reconcile_drops_stale_batch_entries() {
        let data = rows();
        let mut s = session(EditMode::Batch);
        s.start_cell_edit(&data, &RowKey::Int(2), "name");
        s.update_edit_value("name", CellValue::from("gone"));
        s.delete_row(&data, &RowKey::Int(2));

        let removed = s.reconcile(&data[..1]);
        assert_eq!(removed, 2);
        assert!(!s.is_editing());
        assert!(!s.has_changes());
    }
}
