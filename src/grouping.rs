//! Row grouping.
//!
//! `build_groups` partitions rows into a nested tree by an ordered list of
//! fields. Groups appear in first-seen order of their value, not sorted. The
//! tree borrows the caller's rows and is rebuilt whenever rows or group fields
//! change.
//!
//! Collapse state lives in the `GroupingEngine`, keyed by each node's composite
//! `path` (`team:A|role:Dev`), so it survives rebuilds: after a field is added or
//! removed, branches whose path still exists keep their state.
//!
//! # Examples
//!
//! ```
//! use livegrid::{build_groups, build_row, CellValue};
//!
//! let rows = vec![
//!     build_row([("team", CellValue::from("A"))]),
//!     build_row([("team", CellValue::from("B"))]),
//!     build_row([("team", CellValue::from("A"))]),
//! ];
//! let groups = build_groups(&rows, &["team".to_string()]);
//! assert_eq!(groups.len(), 2);
//! assert_eq!((groups[0].key.as_str(), groups[0].count), ("A", 2));
//! assert_eq!((groups[1].key.as_str(), groups[1].count), ("B", 1));
//! ```

use crate::row::Row;
use crate::value::CellValue;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

const PATH_SEPARATOR: char = '|';

/// One partition of the rows sharing a value for `field` at `level`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupNode<'a> {
    pub field: String,
    /// Stringified group value
    pub key: String,
    /// Composite key of this node and its ancestors
    pub path: String,
    pub value: CellValue,
    /// Leaf rows beneath this node
    pub count: usize,
    pub level: usize,
    pub collapsed: bool,
    pub items: GroupItems<'a>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GroupItems<'a> {
    Groups(Vec<GroupNode<'a>>),
    Rows(Vec<&'a Row>),
}

impl<'a> GroupNode<'a> {
    /// Every leaf row beneath this node, in original order.
    pub fn rows(&self) -> Vec<&'a Row> {
        let mut out = Vec::with_capacity(self.count);
        self.collect_rows(&mut out);
        out
    }

    fn collect_rows(&self, out: &mut Vec<&'a Row>) {
        match &self.items {
            GroupItems::Rows(rows) => out.extend(rows.iter().copied()),
            GroupItems::Groups(children) => {
                for child in children {
                    child.collect_rows(out);
                }
            }
        }
    }

    /// Visit this node and all descendants, depth first.
    pub fn walk<F: FnMut(&GroupNode<'a>)>(&self, f: &mut F) {
        f(self);
        if let GroupItems::Groups(children) = &self.items {
            for child in children {
                child.walk(f);
            }
        }
    }
}

/// Composite key of a group: the parent path plus `field:key`.
pub fn group_path(parent: Option<&str>, field: &str, key: &str) -> String {
    match parent {
        Some(p) => format!("{}{}{}:{}", p, PATH_SEPARATOR, field, key),
        None => format!("{}:{}", field, key),
    }
}

/// Group `rows` by `fields`, every node expanded.
pub fn build_groups<'a>(rows: &'a [Row], fields: &[String]) -> Vec<GroupNode<'a>> {
    build_level(rows.iter().collect(), fields, 0, None, &HashSet::new())
}

fn build_level<'a>(
    rows: Vec<&'a Row>,
    fields: &[String],
    level: usize,
    parent: Option<&str>,
    collapsed: &HashSet<String>,
) -> Vec<GroupNode<'a>> {
    let Some((field, rest)) = fields.split_first() else {
        return Vec::new();
    };

    let mut partitions: IndexMap<String, (CellValue, Vec<&'a Row>)> = IndexMap::new();
    for row in rows {
        let value = row.get(field).cloned().unwrap_or_default();
        partitions
            .entry(value.to_string())
            .or_insert_with(|| (value, Vec::new()))
            .1
            .push(row);
    }

    partitions
        .into_iter()
        .map(|(key, (value, members))| {
            let path = group_path(parent, field, &key);
            let (count, items) = if rest.is_empty() {
                (members.len(), GroupItems::Rows(members))
            } else {
                let children = build_level(members, rest, level + 1, Some(path.as_str()), collapsed);
                (children.iter().map(|c| c.count).sum(), GroupItems::Groups(children))
            };
            GroupNode {
                field: field.clone(),
                collapsed: collapsed.contains(&path),
                key,
                path,
                value,
                count,
                level,
                items,
            }
        })
        .collect()
}

/// One line of the rendered grouped grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayRow<'g, 'a> {
    Group(&'g GroupNode<'a>),
    Row(&'a Row),
}

/// Flatten a group tree into display order: each header followed by its
/// children, which are skipped while the header is collapsed.
pub fn flatten_groups<'g, 'a>(groups: &'g [GroupNode<'a>]) -> Vec<DisplayRow<'g, 'a>> {
    let mut out = Vec::new();
    for group in groups {
        flatten_into(group, &mut out);
    }
    out
}

fn flatten_into<'g, 'a>(group: &'g GroupNode<'a>, out: &mut Vec<DisplayRow<'g, 'a>>) {
    out.push(DisplayRow::Group(group));
    if group.collapsed {
        return;
    }
    match &group.items {
        GroupItems::Rows(rows) => out.extend(rows.iter().map(|r| DisplayRow::Row(*r))),
        GroupItems::Groups(children) => {
            for child in children {
                flatten_into(child, out);
            }
        }
    }
}

/// Active group fields and per-group collapse state of one grid.
#[derive(Default)]
pub struct GroupingEngine {
    fields: Vec<String>,
    collapsed: HashSet<String>,
    on_group_change: Option<Box<dyn FnMut(&[String])>>,
}

impl GroupingEngine {
    pub fn new() -> Self {
        GroupingEngine::default()
    }

    pub fn with_fields(fields: Vec<String>) -> Self {
        let mut engine = GroupingEngine::new();
        engine.fields = dedup(fields);
        engine
    }

    pub fn on_group_change<F: FnMut(&[String]) + 'static>(&mut self, f: F) -> &mut Self {
        self.on_group_change = Some(Box::new(f));
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_grouped(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Append `field` unless it is already grouped. Returns true if added.
    pub fn add_group(&mut self, field: &str) -> bool {
        if self.fields.iter().any(|f| f == field) {
            return false;
        }
        self.fields.push(field.to_string());
        self.notify();
        true
    }

    /// Returns true if `field` was grouped.
    pub fn remove_group(&mut self, field: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f != field);
        if self.fields.len() == before {
            return false;
        }
        self.notify();
        true
    }

    /// Replace the field order. Duplicates keep their first position.
    pub fn reorder_groups(&mut self, fields: Vec<String>) {
        self.fields = dedup(fields);
        self.notify();
    }

    pub fn clear_groups(&mut self) {
        if self.fields.is_empty() {
            return;
        }
        self.fields.clear();
        self.notify();
    }

    /// Group tree of `rows` under the current fields and collapse state.
    pub fn groups<'a>(&self, rows: &'a [Row]) -> Vec<GroupNode<'a>> {
        build_level(rows.iter().collect(), &self.fields, 0, None, &self.collapsed)
    }

    pub fn toggle_collapse(&mut self, path: &str) {
        if !self.collapsed.remove(path) {
            self.collapsed.insert(path.to_string());
        }
    }

    pub fn is_collapsed(&self, path: &str) -> bool {
        self.collapsed.contains(path)
    }

    /// Collapse every group the current fields produce over `rows`.
    pub fn collapse_all(&mut self, rows: &[Row]) {
        let mut paths = Vec::new();
        for group in self.groups(rows) {
            group.walk(&mut |node| paths.push(node.path.clone()));
        }
        self.collapsed.extend(paths);
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    pub fn collapsed_paths(&self) -> &HashSet<String> {
        &self.collapsed
    }

    fn notify(&mut self) {
        log::debug!("group fields now {:?}", self.fields);
        if let Some(cb) = self.on_group_change.as_mut() {
            cb(&self.fields);
        }
    }
}

impl std::fmt::Debug for GroupingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupingEngine")
            .field("fields", &self.fields)
            .field("collapsed", &self.collapsed)
            .finish()
    }
}

fn dedup(fields: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    fields.into_iter().filter(|f| seen.insert(f.clone())).collect()
}
