//! Statement validator
//!
//! Checks one statement against the schema that would exist at that point in
//! the script. Exhaustive over the statement variants so no shape can be
//! silently ignored.

use super::typecheck::check_type_change;
use super::verdict::{StatementVerdict, ValidationIssue};
use crate::ddl::{AlterOp, DdlStatement, ParsedStatement, TypeDef};
use crate::schema::SchemaState;
use tracing::debug;

/// Validate one statement against the effective schema.
pub fn validate_statement(
    parsed: &ParsedStatement,
    effective: &SchemaState,
) -> StatementVerdict {
    let index = parsed.index;
    let mut issues: Vec<ValidationIssue> = parsed
        .parse_issues
        .iter()
        .map(|m| ValidationIssue::syntax(index, m.clone()))
        .collect();

    match &parsed.statement {
        DdlStatement::CreateTable {
            table,
            if_not_exists,
            ..
        } => {
            if effective.has_table(table) {
                let message = if *if_not_exists {
                    format!(
                        "Table '{}' already exists; IF NOT EXISTS makes this statement a no-op.",
                        table
                    )
                } else {
                    format!("Table '{}' already exists.", table)
                };
                issues.push(ValidationIssue::structural(index, message));
            }
        }
        DdlStatement::AlterTable { table, op } => {
            validate_alter(index, table, op, effective, &mut issues);
        }
        DdlStatement::CreateIndex {
            table,
            name,
            columns,
            ..
        } => match effective.table(table) {
            None => issues.push(ValidationIssue::structural(
                index,
                format!("Table '{}' not found.", table),
            )),
            Some(descriptor) => {
                if descriptor.has_index(name) {
                    issues.push(ValidationIssue::structural(
                        index,
                        format!("Index '{}' already exists on table '{}'.", name, table),
                    ));
                }
                for column in columns {
                    if !descriptor.has_column(column) {
                        issues.push(ValidationIssue::structural(
                            index,
                            format!("Column '{}' not found on table '{}'.", column, table),
                        ));
                    }
                }
            }
        },
        DdlStatement::DropTable { table, if_exists } => {
            if !effective.has_table(table) && !if_exists {
                issues.push(ValidationIssue::structural(
                    index,
                    format!("Table '{}' not found.", table),
                ));
            }
        }
        DdlStatement::DropIndex { table, name } => match effective.table(table) {
            None => issues.push(ValidationIssue::structural(
                index,
                format!("Table '{}' not found.", table),
            )),
            Some(descriptor) => {
                if !descriptor.has_index(name) {
                    issues.push(ValidationIssue::structural(
                        index,
                        format!("Index '{}' not found on table '{}'.", name, table),
                    ));
                }
            }
        },
        DdlStatement::Unknown { .. } => {
            // Non-structural statements pass through with zero issues.
        }
    }

    let valid = issues.is_empty();
    debug!(
        statement = index,
        kind = %parsed.statement.kind(),
        valid,
        issues = issues.len(),
        "statement validated"
    );

    StatementVerdict {
        index,
        kind: parsed.statement.kind(),
        text: parsed.text.clone(),
        valid,
        checked: true,
        issues,
    }
}

fn validate_alter(
    index: usize,
    table: &str,
    op: &AlterOp,
    effective: &SchemaState,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(descriptor) = effective.table(table) else {
        // Table absence is fatal for the statement; no column checks run.
        issues.push(ValidationIssue::structural(
            index,
            format!("Table '{}' not found.", table),
        ));
        return;
    };

    match op {
        AlterOp::AddColumn { name, .. } => {
            if descriptor.has_column(name) {
                issues.push(ValidationIssue::structural(
                    index,
                    format!("Column '{}' already exists on table '{}'.", name, table),
                ));
            }
        }
        AlterOp::DropColumn { name } => {
            if !descriptor.has_column(name) {
                issues.push(ValidationIssue::structural(
                    index,
                    format!("Column '{}' not found on table '{}'.", name, table),
                ));
            }
        }
        AlterOp::ModifyColumn { name, type_def } => {
            match descriptor.column(name) {
                None => issues.push(ValidationIssue::structural(
                    index,
                    format!("Column '{}' not found on table '{}'.", name, table),
                )),
                Some(existing) => {
                    push_type_issues(index, existing, type_def, issues);
                }
            }
        }
        AlterOp::ChangeColumn {
            old_name,
            new_name,
            type_def,
        } => match descriptor.column(old_name) {
            None => issues.push(ValidationIssue::structural(
                index,
                format!("Column '{}' not found on table '{}'.", old_name, table),
            )),
            Some(existing) => {
                if new_name != old_name && descriptor.has_column(new_name) {
                    issues.push(ValidationIssue::structural(
                        index,
                        format!(
                            "New column name '{}' already exists on table '{}'.",
                            new_name, table
                        ),
                    ));
                }
                push_type_issues(index, existing, type_def, issues);
            }
        },
    }
}

fn push_type_issues(
    index: usize,
    existing: &crate::schema::ColumnDescriptor,
    new_def: &TypeDef,
    issues: &mut Vec<ValidationIssue>,
) {
    for message in check_type_change(existing, new_def) {
        issues.push(ValidationIssue::structural(index, message));
    }
}
