//! Row and cell selection.
//!
//! Selection is tracked by `RowKey`, not by position, so it survives re-sorting
//! of the rows the caller renders. Only the Shift-click anchor is positional: it
//! is the index of the last plain or toggling click within the row slice passed in.
//!
//! Selected keys are never pruned when the caller swaps in a new row array.
//! Call [`SelectionManager::reconcile`] to drop keys that no longer resolve.
//!
//! # Examples
//!
//! ```
//! use livegrid::{build_row, CellValue, Modifiers, SelectionConfig, SelectionManager, SelectionMode};
//!
//! let rows: Vec<_> = (1..=5).map(|i| build_row([("id", CellValue::from(i))])).collect();
//! let mut selection = SelectionManager::new(SelectionConfig {
//!     mode: SelectionMode::Multiple,
//!     ..Default::default()
//! });
//!
//! selection.handle_row_click(&rows, 1, Modifiers::NONE);
//! selection.handle_row_click(&rows, 3, Modifiers::SHIFT);
//! assert_eq!(selection.selected_count(), 3);
//! ```

use crate::row::{CellKey, KeyAccessor, Row, RowKey};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How many rows may be selected at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Single,
    /// Ctrl/Meta toggles, Shift selects a range
    Multiple,
}

/// What a click selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionUnit {
    #[default]
    Row,
    Cell,
    Both,
}

impl SelectionUnit {
    pub fn includes_rows(&self) -> bool {
        matches!(self, SelectionUnit::Row | SelectionUnit::Both)
    }

    pub fn includes_cells(&self) -> bool {
        matches!(self, SelectionUnit::Cell | SelectionUnit::Both)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub mode: SelectionMode,
    pub unit: SelectionUnit,
    /// Plain clicks toggle rows, as if a checkbox column were clicked
    pub checkbox: bool,
}

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { ctrl: false, meta: false, shift: false };
    pub const CTRL: Modifiers = Modifiers { ctrl: true, meta: false, shift: false };
    pub const META: Modifiers = Modifiers { ctrl: false, meta: true, shift: false };
    pub const SHIFT: Modifiers = Modifiers { ctrl: false, meta: false, shift: true };

    fn toggles(&self) -> bool {
        self.ctrl || self.meta
    }
}

pub type RowCallback = Box<dyn FnMut(&Row)>;
pub type RowsCallback = Box<dyn FnMut(&[&Row])>;
pub type CellsCallback = Box<dyn FnMut(&[CellKey])>;

#[derive(Default)]
struct SelectionCallbacks {
    on_row_selected: Option<RowCallback>,
    on_row_deselected: Option<RowCallback>,
    on_selection_change: Option<RowsCallback>,
    on_cell_selection_change: Option<CellsCallback>,
}

/// Selection state of one grid.
pub struct SelectionManager {
    config: SelectionConfig,
    key: KeyAccessor,
    selected_rows: IndexSet<RowKey>,
    selected_cells: IndexSet<CellKey>,
    /// Row index Shift-click ranges start from
    anchor: Option<usize>,
    callbacks: SelectionCallbacks,
}

impl SelectionManager {
    pub fn new(config: SelectionConfig) -> Self {
        Self::with_key_accessor(config, KeyAccessor::default())
    }

    pub fn with_key_accessor(config: SelectionConfig, key: KeyAccessor) -> Self {
        SelectionManager {
            config,
            key,
            selected_rows: IndexSet::new(),
            selected_cells: IndexSet::new(),
            anchor: None,
            callbacks: SelectionCallbacks::default(),
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    // ========================================================================
    // Callbacks
    // ========================================================================

    pub fn on_row_selected<F: FnMut(&Row) + 'static>(&mut self, f: F) -> &mut Self {
        self.callbacks.on_row_selected = Some(Box::new(f));
        self
    }

    pub fn on_row_deselected<F: FnMut(&Row) + 'static>(&mut self, f: F) -> &mut Self {
        self.callbacks.on_row_deselected = Some(Box::new(f));
        self
    }

    /// Fired once per mutating call with every selected row, in row order.
    pub fn on_selection_change<F: FnMut(&[&Row]) + 'static>(&mut self, f: F) -> &mut Self {
        self.callbacks.on_selection_change = Some(Box::new(f));
        self
    }

    pub fn on_cell_selection_change<F: FnMut(&[CellKey]) + 'static>(&mut self, f: F) -> &mut Self {
        self.callbacks.on_cell_selection_change = Some(Box::new(f));
        self
    }

    // ========================================================================
    // Click handling
    // ========================================================================

    /// Resolve a click on the row at `index` of `rows`.
    pub fn handle_row_click(&mut self, rows: &[Row], index: usize, modifiers: Modifiers) {
        if !self.config.unit.includes_rows() {
            return;
        }
        let Some(row) = rows.get(index) else {
            log::debug!("row click ignored: index {} out of range [0, {})", index, rows.len());
            return;
        };
        let key = self.key.key_of(row, index);

        match self.config.mode {
            SelectionMode::Single => self.select_single(rows, index, key),
            SelectionMode::Multiple => {
                if modifiers.shift {
                    self.select_range(rows, index);
                } else if modifiers.toggles() || self.config.checkbox {
                    self.toggle_row(row, index, key);
                } else {
                    self.select_single(rows, index, key);
                }
            }
        }

        self.notify_change(rows);
    }

    /// Toggle the `(row, field)` cell. No-op unless the unit includes cells.
    pub fn handle_cell_click(&mut self, row: &Row, row_index: usize, field: &str) {
        if !self.config.unit.includes_cells() {
            return;
        }
        let cell = CellKey {
            row: self.key.key_of(row, row_index),
            field: field.to_string(),
        };
        if !self.selected_cells.shift_remove(&cell) {
            log::trace!("cell {}:{} selected", cell.row, cell.field);
            self.selected_cells.insert(cell);
        }

        if let Some(cb) = self.callbacks.on_cell_selection_change.as_mut() {
            let cells: Vec<CellKey> = self.selected_cells.iter().cloned().collect();
            cb(&cells);
        }
    }

    /// Select every row, or clear the row selection if every row already is.
    ///
    /// In Single mode this never selects more than one row: an existing
    /// selection is cleared, otherwise nothing happens.
    pub fn handle_select_all(&mut self, rows: &[Row]) {
        if !self.config.unit.includes_rows() {
            return;
        }
        match self.config.mode {
            SelectionMode::Single => {
                if self.selected_rows.is_empty() {
                    return;
                }
                self.selected_rows.clear();
            }
            SelectionMode::Multiple => {
                if self.is_all_selected(rows) {
                    self.selected_rows.clear();
                } else {
                    self.selected_rows = self.key.keys(rows).into_iter().collect();
                }
            }
        }
        log::trace!("select all: {} rows selected", self.selected_rows.len());
        self.notify_change(rows);
    }

    /// Replace the row selection with `keys`. In Single mode only the first key is kept.
    pub fn select_rows<I>(&mut self, rows: &[Row], keys: I)
    where
        I: IntoIterator<Item = RowKey>,
    {
        let mut keys = keys.into_iter();
        self.selected_rows = match self.config.mode {
            SelectionMode::Single => keys.next().into_iter().collect(),
            SelectionMode::Multiple => keys.collect(),
        };
        self.notify_change(rows);
    }

    pub fn deselect_row(&mut self, rows: &[Row], key: &RowKey) {
        if self.selected_rows.shift_remove(key) {
            if let Some((_, row)) = self.key.find(rows, key) {
                if let Some(cb) = self.callbacks.on_row_deselected.as_mut() {
                    cb(row);
                }
            }
            self.notify_change(rows);
        }
    }

    /// Empty both sets. Per-row deselect callbacks are not fired.
    pub fn clear_selection(&mut self) {
        self.selected_rows.clear();
        self.selected_cells.clear();
        self.anchor = None;
        if let Some(cb) = self.callbacks.on_selection_change.as_mut() {
            cb(&[]);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn is_row_selected(&self, key: &RowKey) -> bool {
        self.selected_rows.contains(key)
    }

    pub fn is_cell_selected(&self, key: &RowKey, field: &str) -> bool {
        self.selected_cells.contains(&CellKey {
            row: key.clone(),
            field: field.to_string(),
        })
    }

    /// False for an empty row set.
    pub fn is_all_selected(&self, rows: &[Row]) -> bool {
        !rows.is_empty()
            && rows
                .iter()
                .enumerate()
                .all(|(i, row)| self.selected_rows.contains(&self.key.key_of(row, i)))
    }

    /// True when some but not all rows are selected (indeterminate header checkbox).
    pub fn is_some_selected(&self, rows: &[Row]) -> bool {
        !self.selected_rows.is_empty() && !self.is_all_selected(rows)
    }

    pub fn selected_row_keys(&self) -> &IndexSet<RowKey> {
        &self.selected_rows
    }

    pub fn selected_cell_keys(&self) -> &IndexSet<CellKey> {
        &self.selected_cells
    }

    pub fn selected_count(&self) -> usize {
        self.selected_rows.len()
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// Selected rows in row order.
    pub fn selected_rows<'a>(&self, rows: &'a [Row]) -> Vec<&'a Row> {
        rows.iter()
            .enumerate()
            .filter(|(i, row)| self.selected_rows.contains(&self.key.key_of(row, *i)))
            .map(|(_, row)| row)
            .collect()
    }

    /// Drop selected keys that no longer resolve against `rows`.
    /// Returns the number of row and cell keys removed.
    pub fn reconcile(&mut self, rows: &[Row]) -> usize {
        let live: HashSet<RowKey> = self.key.keys(rows).into_iter().collect();
        let before = self.selected_rows.len() + self.selected_cells.len();
        self.selected_rows.retain(|k| live.contains(k));
        self.selected_cells.retain(|c| live.contains(&c.row));
        if self.anchor.is_some_and(|a| a >= rows.len()) {
            self.anchor = None;
        }
        let removed = before - (self.selected_rows.len() + self.selected_cells.len());
        if removed > 0 {
            log::debug!("selection reconcile dropped {} stale keys", removed);
        }
        removed
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Replace the selection with exactly `key`, or clear it if `key` is the
    /// sole selected row.
    fn select_single(&mut self, rows: &[Row], index: usize, key: RowKey) {
        let row = &rows[index];
        if self.selected_rows.len() == 1 && self.selected_rows.contains(&key) {
            self.selected_rows.clear();
            if let Some(cb) = self.callbacks.on_row_deselected.as_mut() {
                cb(row);
            }
        } else {
            let was_selected = self.selected_rows.contains(&key);
            let previous: Vec<RowKey> = self
                .selected_rows
                .drain(..)
                .filter(|k| *k != key)
                .collect();
            self.fire_deselected(rows, &previous);
            self.selected_rows.insert(key);
            if !was_selected {
                if let Some(cb) = self.callbacks.on_row_selected.as_mut() {
                    cb(row);
                }
            }
        }
        self.anchor = Some(index);
    }

    fn toggle_row(&mut self, row: &Row, index: usize, key: RowKey) {
        if self.selected_rows.shift_remove(&key) {
            log::trace!("row {} toggled off", key);
            if let Some(cb) = self.callbacks.on_row_deselected.as_mut() {
                cb(row);
            }
        } else {
            log::trace!("row {} toggled on", key);
            self.selected_rows.insert(key);
            if let Some(cb) = self.callbacks.on_row_selected.as_mut() {
                cb(row);
            }
        }
        self.anchor = Some(index);
    }

    /// Selection becomes exactly the inclusive range between the anchor and `index`.
    fn select_range(&mut self, rows: &[Row], index: usize) {
        let anchor = self.anchor.unwrap_or(index).min(rows.len() - 1);
        let (start, end) = if anchor <= index { (anchor, index) } else { (index, anchor) };

        let range: IndexSet<RowKey> = (start..=end)
            .map(|i| self.key.key_of(&rows[i], i))
            .collect();

        let removed: Vec<RowKey> = self
            .selected_rows
            .iter()
            .filter(|k| !range.contains(*k))
            .cloned()
            .collect();
        let added: Vec<RowKey> = range
            .iter()
            .filter(|k| !self.selected_rows.contains(*k))
            .cloned()
            .collect();

        log::trace!("range select {}..={} (+{} -{})", start, end, added.len(), removed.len());
        self.selected_rows = range;
        if self.anchor.is_none() {
            self.anchor = Some(index);
        }

        self.fire_deselected(rows, &removed);
        let added_rows: Vec<&Row> = added
            .iter()
            .filter_map(|k| self.key.find(rows, k).map(|(_, r)| r))
            .collect();
        if let Some(cb) = self.callbacks.on_row_selected.as_mut() {
            for row in added_rows {
                cb(row);
            }
        }
    }

    fn fire_deselected(&mut self, rows: &[Row], keys: &[RowKey]) {
        if keys.is_empty() {
            return;
        }
        let deselected: Vec<&Row> = keys
            .iter()
            .filter_map(|k| self.key.find(rows, k).map(|(_, r)| r))
            .collect();
        if let Some(cb) = self.callbacks.on_row_deselected.as_mut() {
            for row in deselected {
                cb(row);
            }
        }
    }

    fn notify_change(&mut self, rows: &[Row]) {
        if self.callbacks.on_selection_change.is_none() {
            return;
        }
        let selected = self.selected_rows(rows);
        if let Some(cb) = self.callbacks.on_selection_change.as_mut() {
            cb(&selected);
        }
    }
}

impl std::fmt::Debug for SelectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionManager")
            .field("config", &self.config)
            .field("key", &self.key)
            .field("selected_rows", &self.selected_rows)
            .field("selected_cells", &self.selected_cells)
            .field("anchor", &self.anchor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::build_row;
    use crate::value::CellValue;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn rows(n: i64) -> Vec<Row> {
        (1..=n)
            .map(|i| build_row([("id", CellValue::from(i)), ("name", CellValue::from(format!("row{}", i)))]))
            .collect()
    }

    fn multiple() -> SelectionManager {
        SelectionManager::new(SelectionConfig {
            mode: SelectionMode::Multiple,
            ..Default::default()
        })
    }

    fn keys(sel: &SelectionManager) -> Vec<i64> {
        let mut ks: Vec<i64> = sel
            .selected_row_keys()
            .iter()
            .map(|k| match k {
                RowKey::Int(v) => *v,
                other => panic!("unexpected key {:?}", other),
            })
            .collect();
        ks.sort();
        ks
    }

    #[test]
    fn test_single_click_replaces_and_reclick_clears() {
        let data = rows(3);
        let mut sel = SelectionManager::new(SelectionConfig::default());

        sel.handle_row_click(&data, 0, Modifiers::NONE);
        assert_eq!(keys(&sel), vec![1]);
        sel.handle_row_click(&data, 2, Modifiers::CTRL);
        assert_eq!(keys(&sel), vec![3]);
        sel.handle_row_click(&data, 2, Modifiers::NONE);
        assert!(sel.selected_row_keys().is_empty());
    }

    #[test]
    fn test_single_mode_never_exceeds_one() {
        let data = rows(6);
        let mut sel = SelectionManager::new(SelectionConfig::default());
        let clicks = [(0, Modifiers::NONE), (3, Modifiers::SHIFT), (5, Modifiers::CTRL), (5, Modifiers::META), (1, Modifiers::SHIFT), (2, Modifiers::NONE)];
        for (idx, mods) in clicks {
            sel.handle_row_click(&data, idx, mods);
            assert!(sel.selected_count() <= 1);
        }
        sel.handle_select_all(&data);
        assert!(sel.selected_count() <= 1);
    }

    #[test]
    fn test_single_mode_callbacks() {
        let data = rows(2);
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sel = SelectionManager::new(SelectionConfig::default());
        let l1 = log.clone();
        let l2 = log.clone();
        sel.on_row_selected(move |r| l1.borrow_mut().push(format!("+{}", r["id"])))
            .on_row_deselected(move |r| l2.borrow_mut().push(format!("-{}", r["id"])));

        sel.handle_row_click(&data, 0, Modifiers::NONE);
        sel.handle_row_click(&data, 1, Modifiers::NONE);
        sel.handle_row_click(&data, 1, Modifiers::NONE);
        assert_eq!(*log.borrow(), vec!["+1", "-1", "+2", "-2"]);
    }

    #[test]
    fn test_multiple_plain_click_replaces() {
        let data = rows(4);
        let mut sel = multiple();
        sel.handle_row_click(&data, 0, Modifiers::CTRL);
        sel.handle_row_click(&data, 1, Modifiers::CTRL);
        sel.handle_row_click(&data, 3, Modifiers::NONE);
        assert_eq!(keys(&sel), vec![4]);
    }

    #[test]
    fn test_ctrl_and_meta_toggle() {
        let data = rows(4);
        let mut sel = multiple();
        sel.handle_row_click(&data, 0, Modifiers::CTRL);
        sel.handle_row_click(&data, 2, Modifiers::META);
        assert_eq!(keys(&sel), vec![1, 3]);
        assert_eq!(sel.anchor(), Some(2));
        sel.handle_row_click(&data, 0, Modifiers::CTRL);
        assert_eq!(keys(&sel), vec![3]);
        assert_eq!(sel.anchor(), Some(0));
    }

    #[test]
    fn test_checkbox_plain_click_toggles() {
        let data = rows(3);
        let mut sel = SelectionManager::new(SelectionConfig {
            mode: SelectionMode::Multiple,
            unit: SelectionUnit::Row,
            checkbox: true,
        });
        sel.handle_row_click(&data, 0, Modifiers::NONE);
        sel.handle_row_click(&data, 1, Modifiers::NONE);
        assert_eq!(keys(&sel), vec![1, 2]);
        sel.handle_row_click(&data, 0, Modifiers::NONE);
        assert_eq!(keys(&sel), vec![2]);
    }

    #[test]
    fn test_shift_range_is_order_independent() {
        let data = rows(6);

        let mut forward = multiple();
        forward.handle_row_click(&data, 0, Modifiers::NONE);
        forward.handle_row_click(&data, 3, Modifiers::SHIFT);

        let mut backward = multiple();
        backward.handle_row_click(&data, 3, Modifiers::NONE);
        backward.handle_row_click(&data, 0, Modifiers::SHIFT);

        assert_eq!(keys(&forward), vec![1, 2, 3, 4]);
        assert_eq!(keys(&forward), keys(&backward));
    }

    #[test]
    fn test_shift_range_replaces_prior_toggles() {
        let data = rows(8);
        let mut sel = multiple();
        sel.handle_row_click(&data, 7, Modifiers::CTRL);
        sel.handle_row_click(&data, 2, Modifiers::CTRL);
        sel.handle_row_click(&data, 4, Modifiers::SHIFT);
        assert_eq!(keys(&sel), vec![3, 4, 5]);
        assert_eq!(sel.anchor(), Some(2));
    }

    #[test]
    fn test_shift_without_anchor_selects_clicked_row() {
        let data = rows(3);
        let mut sel = multiple();
        sel.handle_row_click(&data, 1, Modifiers::SHIFT);
        assert_eq!(keys(&sel), vec![2]);
        assert_eq!(sel.anchor(), Some(1));
    }

    #[test]
    fn test_toggle_and_range_row_callbacks() {
        let data = rows(8);
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sel = multiple();
        let l1 = log.clone();
        let l2 = log.clone();
        sel.on_row_selected(move |r| l1.borrow_mut().push(format!("+{}", r["id"])))
            .on_row_deselected(move |r| l2.borrow_mut().push(format!("-{}", r["id"])));

        sel.handle_row_click(&data, 0, Modifiers::CTRL);
        sel.handle_row_click(&data, 7, Modifiers::CTRL);
        sel.handle_row_click(&data, 2, Modifiers::CTRL);
        assert_eq!(*log.borrow(), vec!["+1", "+8", "+3"]);

        log.borrow_mut().clear();
        sel.handle_row_click(&data, 4, Modifiers::SHIFT);
        assert_eq!(*log.borrow(), vec!["-1", "-8", "+4", "+5"]);
        assert_eq!(keys(&sel), vec![3, 4, 5]);

        // anchor stays at 2, so the range flips to the other side
        log.borrow_mut().clear();
        sel.handle_row_click(&data, 0, Modifiers::SHIFT);
        assert_eq!(*log.borrow(), vec!["-4", "-5", "+1", "+2"]);
        assert_eq!(keys(&sel), vec![1, 2, 3]);

        log.borrow_mut().clear();
        sel.handle_row_click(&data, 1, Modifiers::META);
        assert_eq!(*log.borrow(), vec!["-2"]);
    }

    #[test]
    fn test_cell_selection_change_callback() {
        let data = rows(2);
        let seen: Rc<RefCell<Vec<Vec<String>>>> = Rc::new(RefCell::new(Vec::new()));
        let mut sel = SelectionManager::new(SelectionConfig {
            mode: SelectionMode::Multiple,
            unit: SelectionUnit::Both,
            checkbox: false,
        });
        let sink = seen.clone();
        sel.on_cell_selection_change(move |cells| {
            sink.borrow_mut()
                .push(cells.iter().map(|c| format!("{}:{}", c.row, c.field)).collect());
        });

        sel.handle_cell_click(&data[0], 0, "name");
        sel.handle_cell_click(&data[1], 1, "name");
        sel.handle_cell_click(&data[0], 0, "id");
        sel.handle_cell_click(&data[0], 0, "name");
        // row clicks never report cells
        sel.handle_row_click(&data, 1, Modifiers::NONE);

        assert_eq!(
            *seen.borrow(),
            vec![
                vec!["1:name"],
                vec!["1:name", "2:name"],
                vec!["1:name", "2:name", "1:id"],
                vec!["2:name", "1:id"],
            ]
        );
        assert_eq!(keys(&sel), vec![2]);
    }

    #[test]
    fn test_cell_unit_ignores_row_clicks() {
        let data = rows(3);
        let mut sel = SelectionManager::new(SelectionConfig {
            mode: SelectionMode::Multiple,
            unit: SelectionUnit::Cell,
            checkbox: false,
        });
        sel.handle_row_click(&data, 0, Modifiers::NONE);
        assert!(sel.selected_row_keys().is_empty());

        sel.handle_cell_click(&data[0], 0, "name");
        assert!(sel.is_cell_selected(&RowKey::Int(1), "name"));
        sel.handle_cell_click(&data[0], 0, "name");
        assert!(!sel.is_cell_selected(&RowKey::Int(1), "name"));
    }

    #[test]
    fn test_row_unit_ignores_cell_clicks() {
        let data = rows(1);
        let mut sel = SelectionManager::new(SelectionConfig::default());
        sel.handle_cell_click(&data[0], 0, "name");
        assert!(sel.selected_cell_keys().is_empty());
    }

    #[test]
    fn test_select_all_round_trip() {
        let data = rows(5);
        let mut sel = multiple();
        sel.handle_row_click(&data, 2, Modifiers::NONE);
        sel.handle_select_all(&data);
        assert!(sel.is_all_selected(&data));
        sel.handle_select_all(&data);
        assert!(sel.selected_row_keys().is_empty());
    }

    #[test]
    fn test_select_all_empty_data() {
        let data: Vec<Row> = Vec::new();
        let mut sel = multiple();
        assert!(!sel.is_all_selected(&data));
        sel.handle_select_all(&data);
        sel.handle_select_all(&data);
        assert!(sel.selected_row_keys().is_empty());
    }

    #[test]
    fn test_selection_change_fires_once_per_click() {
        let data = rows(5);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let c = calls.clone();
        let mut sel = multiple();
        sel.on_selection_change(move |rows| c.borrow_mut().push(rows.len()));

        sel.handle_row_click(&data, 1, Modifiers::NONE);
        sel.handle_row_click(&data, 4, Modifiers::SHIFT);
        sel.handle_select_all(&data);
        assert_eq!(*calls.borrow(), vec![1, 4, 5]);
    }

    #[test]
    fn test_clear_selection_skips_row_callbacks() {
        let data = rows(3);
        let deselected = Rc::new(RefCell::new(0));
        let d = deselected.clone();
        let mut sel = SelectionManager::new(SelectionConfig {
            mode: SelectionMode::Multiple,
            unit: SelectionUnit::Both,
            checkbox: false,
        });
        sel.on_row_deselected(move |_| *d.borrow_mut() += 1);
        sel.handle_select_all(&data);
        sel.handle_cell_click(&data[0], 0, "name");
        sel.clear_selection();
        assert!(sel.selected_row_keys().is_empty());
        assert!(sel.selected_cell_keys().is_empty());
        assert_eq!(*deselected.borrow(), 0);
    }

    #[test]
    fn test_indeterminate_state() {
        let data = rows(3);
        let mut sel = multiple();
        assert!(!sel.is_some_selected(&data));
        sel.handle_row_click(&data, 0, Modifiers::NONE);
        assert!(sel.is_some_selected(&data));
        sel.handle_select_all(&data);
        assert!(!sel.is_some_selected(&data));
    }

    #[test]
    fn test_selection_survives_data_replacement_until_reconciled() {
        let data = rows(4);
        let mut sel = multiple();
        sel.handle_select_all(&data);

        let replaced = rows(2);
        assert_eq!(sel.selected_count(), 4);
        assert_eq!(sel.selected_rows(&replaced).len(), 2);

        assert_eq!(sel.reconcile(&replaced), 2);
        assert_eq!(keys(&sel), vec![1, 2]);
    }

    #[test]
    fn test_select_rows_programmatic() {
        let data = rows(4);
        let mut sel = multiple();
        sel.select_rows(&data, vec![RowKey::Int(2), RowKey::Int(4)]);
        assert_eq!(keys(&sel), vec![2, 4]);
        sel.deselect_row(&data, &RowKey::Int(2));
        assert_eq!(keys(&sel), vec![4]);

        let mut single = SelectionManager::new(SelectionConfig::default());
        single.select_rows(&data, vec![RowKey::Int(3), RowKey::Int(1)]);
        assert_eq!(keys(&single), vec![3]);
    }

    #[test]
    fn test_out_of_range_click_is_ignored() {
        let data = rows(2);
        let mut sel = multiple();
        sel.handle_row_click(&data, 9, Modifiers::NONE);
        assert!(sel.selected_row_keys().is_empty());
    }
}
