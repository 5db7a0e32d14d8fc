//! Grid configuration.
//!
//! Everything a rendering layer would otherwise pass as props: the key field,
//! selection and edit behaviour, initial group fields and the column list with
//! footer aggregates. Every field has a default, so `{}` is a valid config.
//!
//! # Example
//!
//! ```
//! use livegrid::{EditMode, GridConfig, SelectionMode};
//!
//! let config = GridConfig::from_json(r#"{
//!     "selection": { "mode": "multiple", "checkbox": true },
//!     "editing": { "mode": "batch", "allow_deleting": false },
//!     "group_by": ["team"],
//!     "columns": [
//!         { "field": "id", "editable": false },
//!         { "field": "salary", "header": "Salary", "aggregate": "sum" }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(config.key_field, "id");
//! assert_eq!(config.selection.mode, SelectionMode::Multiple);
//! assert_eq!(config.editing.mode, EditMode::Batch);
//! assert!(!config.editing.allow_deleting);
//! assert_eq!(config.schema().unwrap().aggregate_specs().len(), 1);
//! ```

use crate::aggregate::{AggregateKind, AggregateType};
use crate::editing::EditConfig;
use crate::error::GridError;
use crate::row::KeyAccessor;
use crate::schema::{Column, Schema};
use crate::selection::SelectionConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Field read by the default key accessor
    pub key_field: String,
    pub selection: SelectionConfig,
    pub editing: EditConfig,
    pub group_by: Vec<String>,
    pub columns: Vec<ColumnConfig>,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            key_field: "id".to_string(),
            selection: SelectionConfig::default(),
            editing: EditConfig::default(),
            group_by: Vec::new(),
            columns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub field: String,
    /// Defaults to the field name
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default = "default_editable")]
    pub editable: bool,
    #[serde(default)]
    pub aggregate: Option<AggregateType>,
}

fn default_editable() -> bool {
    true
}

impl GridConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        let config: GridConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.key_field.trim().is_empty() {
            return Err(GridError::InvalidConfig("key_field must not be empty".to_string()));
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.field.is_empty() {
                return Err(GridError::InvalidConfig("column field must not be empty".to_string()));
            }
            if !seen.insert(column.field.as_str()) {
                return Err(GridError::InvalidConfig(format!(
                    "duplicate column '{}'",
                    column.field
                )));
            }
        }
        Ok(())
    }

    /// Build the column schema. A `custom` aggregate has no function to run
    /// and is rejected; attach custom aggregates in code instead.
    pub fn schema(&self) -> Result<Schema, GridError> {
        let columns = self
            .columns
            .iter()
            .map(|c| -> Result<Column, GridError> {
                let mut column = Column::new(
                    c.field.clone(),
                    c.header.clone().unwrap_or_else(|| c.field.clone()),
                );
                column.editable = c.editable;
                if let Some(ty) = c.aggregate {
                    column.aggregate = Some(AggregateKind::from_type(ty, &c.field)?);
                }
                Ok(column)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Schema::new(columns))
    }

    pub fn key_accessor(&self) -> KeyAccessor {
        KeyAccessor::field(self.key_field.clone())
    }
}
