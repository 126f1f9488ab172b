//! Virtual schema builder
//!
//! Folds the statement sequence, in order, into an evolving schema state.
//! The overlay starts as a copy of the live snapshot; before validating
//! statement *i* the overlay reflects statements 1..i-1, so a table created
//! earlier in the same script is visible to later statements even though the
//! live database does not contain it yet.

use crate::ddl::{AlterOp, DdlStatement};
use crate::schema::{IndexDescriptor, SchemaState, TableDescriptor};

pub struct SchemaOverlay {
    state: SchemaState,
}

impl SchemaOverlay {
    /// Start the fold from the live snapshot. The snapshot itself is never
    /// mutated; the overlay works on its own copy.
    pub fn new(live: &SchemaState) -> Self {
        Self {
            state: live.clone(),
        }
    }

    /// The effective schema visible to the statement about to be validated.
    pub fn state(&self) -> &SchemaState {
        &self.state
    }

    /// Advance the fold past one statement. Called after the statement has
    /// been validated; its effects are fixed for all later statements.
    pub fn apply(&mut self, statement: &DdlStatement) {
        match statement {
            DdlStatement::CreateTable {
                table, columns, ..
            } => {
                // Never overwrite: a duplicate CREATE raises an issue at the
                // validator instead of clobbering the earlier definition.
                if !self.state.has_table(table) {
                    let mut descriptor = TableDescriptor::new(table.clone());
                    for column in columns {
                        descriptor.add_column(column.clone());
                    }
                    self.state.insert_table(descriptor);
                }
            }
            DdlStatement::DropTable { table, .. } => {
                self.state.remove_table(table);
            }
            DdlStatement::AlterTable { table, op } => {
                if let Some(descriptor) = self.state.table_mut(table) {
                    match op {
                        AlterOp::AddColumn { name, type_def } => {
                            descriptor.add_column(type_def.to_column(name));
                        }
                        AlterOp::DropColumn { name } => {
                            descriptor.remove_column(name);
                        }
                        AlterOp::ModifyColumn { name, type_def } => {
                            descriptor.replace_column(name, type_def.to_column(name));
                        }
                        AlterOp::ChangeColumn {
                            old_name,
                            new_name,
                            type_def,
                        } => {
                            descriptor.remove_column(old_name);
                            descriptor.add_column(type_def.to_column(new_name));
                        }
                    }
                }
            }
            DdlStatement::CreateIndex {
                table,
                name,
                columns,
                unique,
            } => {
                if let Some(descriptor) = self.state.table_mut(table) {
                    descriptor.add_index(IndexDescriptor {
                        name: name.clone(),
                        columns: columns.clone(),
                        is_unique: *unique,
                    });
                }
            }
            DdlStatement::DropIndex { table, name } => {
                if let Some(descriptor) = self.state.table_mut(table) {
                    descriptor.remove_index(name);
                }
            }
            DdlStatement::Unknown { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::parse_script;

    fn fold(sql: &str) -> SchemaState {
        let parsed = parse_script(sql);
        let mut overlay = SchemaOverlay::new(&SchemaState::new());
        for stmt in &parsed.statements {
            overlay.apply(&stmt.statement);
        }
        overlay.state().clone()
    }

    #[test]
    fn test_create_then_alter_is_visible() {
        let state = fold(
            "CREATE TABLE t (id INT);\
             ALTER TABLE t ADD name VARCHAR(50);\
             CREATE INDEX idx_name ON t (name);",
        );
        let table = state.table("t").unwrap();
        assert!(table.has_column("name"));
        assert!(table.has_index("idx_name"));
    }

    #[test]
    fn test_duplicate_create_does_not_overwrite() {
        let state = fold("CREATE TABLE t (id INT);CREATE TABLE t (other BIGINT);");
        let table = state.table("t").unwrap();
        assert!(table.has_column("id"));
        assert!(!table.has_column("other"));
    }

    #[test]
    fn test_drop_table_removes_from_overlay() {
        let state = fold("CREATE TABLE t (id INT);DROP TABLE t;");
        assert!(!state.has_table("t"));
    }

    #[test]
    fn test_change_column_renames() {
        let state = fold("CREATE TABLE t (id INT, old_name VARCHAR(20));ALTER TABLE t CHANGE old_name new_name VARCHAR(40);");
        let table = state.table("t").unwrap();
        assert!(!table.has_column("old_name"));
        let renamed = table.column("new_name").unwrap();
        assert_eq!(renamed.length, Some(40));
    }

    #[test]
    fn test_live_state_is_not_mutated() {
        let mut live = SchemaState::new();
        live.insert_table(TableDescriptor::new("existing"));

        let parsed = parse_script("DROP TABLE existing;");
        let mut overlay = SchemaOverlay::new(&live);
        for stmt in &parsed.statements {
            overlay.apply(&stmt.statement);
        }

        assert!(!overlay.state().has_table("existing"));
        assert!(live.has_table("existing"));
    }
}
