//! Schema descriptors
//!
//! In-memory representation of tables, columns and indexes, shared by the
//! live snapshot and the virtual (in-script) schema state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single column: base type plus the size information needed for
/// type-change checks. Length and precision/scale are mutually exclusive
/// except for decimal-like types, which carry both slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    /// Upper-cased base type, e.g. "VARCHAR", "DECIMAL".
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    pub nullable: bool,
}

/// An index: ordered column list plus uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
}

/// A table: columns in definition order, indexes in creation order.
/// Lookup is case-insensitive; order is preserved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub indexes: Vec<IndexDescriptor>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        let lower = name.to_lowercase();
        self.columns.iter().find(|c| c.name == lower)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn add_column(&mut self, column: ColumnDescriptor) {
        if !self.has_column(&column.name) {
            self.columns.push(column);
        }
    }

    pub fn remove_column(&mut self, name: &str) {
        let lower = name.to_lowercase();
        self.columns.retain(|c| c.name != lower);
    }

    /// Replace a column's descriptor in place, keeping its position.
    pub fn replace_column(&mut self, name: &str, column: ColumnDescriptor) {
        let lower = name.to_lowercase();
        if let Some(slot) = self.columns.iter_mut().find(|c| c.name == lower) {
            *slot = column;
        }
    }

    pub fn index(&self, name: &str) -> Option<&IndexDescriptor> {
        let lower = name.to_lowercase();
        self.indexes.iter().find(|i| i.name == lower)
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    pub fn add_index(&mut self, index: IndexDescriptor) {
        if !self.has_index(&index.name) {
            self.indexes.push(index);
        }
    }

    pub fn remove_index(&mut self, name: &str) {
        let lower = name.to_lowercase();
        self.indexes.retain(|i| i.name != lower);
    }
}

/// What exists at a point in time: table name (lower-cased) → descriptor.
///
/// Two instances matter per validation run: the live state fetched from the
/// database, and the effective state derived from it by the overlay fold.
/// Neither is ever mutated through a shared reference; the overlay works on
/// its own clone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaState {
    pub tables: HashMap<String, TableDescriptor>,
}

impl SchemaState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.get(&name.to_lowercase())
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut TableDescriptor> {
        self.tables.get_mut(&name.to_lowercase())
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(&name.to_lowercase())
    }

    pub fn insert_table(&mut self, table: TableDescriptor) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn remove_table(&mut self, name: &str) {
        self.tables.remove(&name.to_lowercase());
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}
