//! Validation engine
//!
//! The synchronous core: extraction, virtual-schema folding, per-statement
//! validation and aggregation. Pure, ordered, in-memory; the only blocking
//! operation in a validation run, the live snapshot fetch, happens before
//! this module is entered.

pub mod batch;
pub mod overlay;
pub mod typecheck;
pub mod validator;
pub mod verdict;

use self::overlay::SchemaOverlay;
use self::verdict::{
    aggregate, IssueCategory, ScriptVerdict, StatementVerdict, ValidationIssue,
};
use crate::ddl::{parse_script, ParsedScript};
use crate::schema::SchemaState;
use tracing::debug;

pub use self::batch::{validate_batch_scripts, BatchReport, BatchScript, DEFAULT_BATCH_LIMIT};

/// Validate a script against a live schema snapshot.
///
/// Single left-to-right pass: each statement is checked against the schema
/// that would exist at that point (live state plus the effects of all prior
/// statements), then folded into the overlay. No backtracking.
pub fn validate_script(
    name: Option<String>,
    script: &str,
    live: &SchemaState,
) -> ScriptVerdict {
    let parsed = parse_script(script);
    debug!(
        statements = parsed.statements.len(),
        live_tables = live.table_count(),
        parse_errors = parsed.has_parse_errors(),
        "validating script"
    );

    let script_issues = script_level_issues(&parsed);

    let mut overlay = SchemaOverlay::new(live);
    let mut verdicts = Vec::with_capacity(parsed.statements.len());
    for statement in &parsed.statements {
        let verdict = validator::validate_statement(statement, overlay.state());
        overlay.apply(&statement.statement);
        verdicts.push(verdict);
    }

    aggregate(name, verdicts, script_issues)
}

/// Validate a script without a live snapshot.
///
/// Parsing and `Unknown` acknowledgment still run; structural statements are
/// listed but skipped, and the snapshot failure is reported once for the
/// whole script.
pub fn validate_script_offline(
    name: Option<String>,
    script: &str,
    reason: &str,
) -> ScriptVerdict {
    let parsed = parse_script(script);

    let mut script_issues = script_level_issues(&parsed);
    script_issues.push(ValidationIssue {
        statement_index: 0,
        category: IssueCategory::Snapshot,
        message: format!(
            "Live schema snapshot unavailable ({}); structural checks were skipped.",
            reason
        ),
    });

    let verdicts = parsed
        .statements
        .iter()
        .map(|statement| {
            let structural = statement.statement.is_structural();
            let issues: Vec<ValidationIssue> = statement
                .parse_issues
                .iter()
                .map(|m| ValidationIssue::syntax(statement.index, m.clone()))
                .collect();
            StatementVerdict {
                index: statement.index,
                kind: statement.statement.kind(),
                text: statement.text.clone(),
                valid: issues.is_empty(),
                checked: !structural,
                issues,
            }
        })
        .collect();

    aggregate(name, verdicts, script_issues)
}

fn script_level_issues(parsed: &ParsedScript) -> Vec<ValidationIssue> {
    parsed
        .script_issues
        .iter()
        .map(|m| ValidationIssue::syntax(0, m.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::verdict::VerdictStatus;
    use super::*;
    use crate::schema::{ColumnDescriptor, TableDescriptor};

    fn live_with(table: &str, columns: &[(&str, &str, Option<u32>)]) -> SchemaState {
        let mut descriptor = TableDescriptor::new(table);
        for (name, data_type, length) in columns {
            descriptor.add_column(ColumnDescriptor {
                name: name.to_string(),
                data_type: data_type.to_string(),
                length: *length,
                precision: None,
                scale: None,
                nullable: true,
            });
        }
        let mut state = SchemaState::new();
        state.insert_table(descriptor);
        state
    }

    #[test]
    fn test_create_then_alter_passes_on_empty_live_schema() {
        let verdict = validate_script(
            None,
            "CREATE TABLE t(id INT); ALTER TABLE t ADD COLUMN name VARCHAR(50);",
            &SchemaState::new(),
        );
        assert_eq!(verdict.status, VerdictStatus::Pass);
        assert_eq!(verdict.statements.len(), 2);
        assert!(verdict.statements.iter().all(|s| s.valid));
    }

    #[test]
    fn test_duplicate_create_fails_second_statement() {
        let verdict = validate_script(
            None,
            "CREATE TABLE t(id INT); CREATE TABLE t(id INT);",
            &SchemaState::new(),
        );
        assert_eq!(verdict.status, VerdictStatus::Fail);
        assert!(verdict.statements[0].valid);
        assert!(!verdict.statements[1].valid);
        assert!(verdict.statements[1].issues[0]
            .message
            .contains("Table 't' already exists"));
    }

    #[test]
    fn test_alter_ghost_table_fails() {
        let verdict = validate_script(
            None,
            "ALTER TABLE ghost ADD COLUMN x INT;",
            &SchemaState::new(),
        );
        assert_eq!(verdict.status, VerdictStatus::Fail);
        assert!(verdict.statements[0].issues[0]
            .message
            .contains("Table 'ghost' not found"));
    }

    #[test]
    fn test_modify_length_reduction_fails() {
        let live = live_with("t", &[("name", "VARCHAR", Some(100))]);
        let verdict = validate_script(
            None,
            "ALTER TABLE t MODIFY COLUMN name VARCHAR(10);",
            &live,
        );
        assert_eq!(verdict.status, VerdictStatus::Fail);
        let message = &verdict.statements[0].issues[0].message;
        assert!(message.contains("100") && message.contains("10"));
    }

    #[test]
    fn test_index_on_missing_column_fails() {
        let live = live_with("t", &[("id", "INT", None)]);
        let verdict = validate_script(None, "CREATE INDEX idx1 ON t(missing_col);", &live);
        assert_eq!(verdict.status, VerdictStatus::Fail);
        assert!(verdict.statements[0].issues[0]
            .message
            .contains("Column 'missing_col' not found on table 't'"));
    }

    #[test]
    fn test_ordering_invariant_create_then_index_later() {
        // Table created at statement 1, indexed at statement 3: never
        // "not found".
        let verdict = validate_script(
            None,
            "CREATE TABLE t(id INT, name VARCHAR(50));\
             SELECT 1;\
             CREATE INDEX idx_name ON t(name);",
            &SchemaState::new(),
        );
        assert_eq!(verdict.status, VerdictStatus::Pass);
    }

    #[test]
    fn test_case_insensitive_resolution() {
        let verdict = validate_script(
            None,
            "CREATE TABLE Foo(id INT); ALTER TABLE foo ADD bar INT;",
            &SchemaState::new(),
        );
        assert_eq!(verdict.status, VerdictStatus::Pass);
    }

    #[test]
    fn test_drop_then_recreate_passes() {
        let live = live_with("t", &[("id", "INT", None)]);
        let verdict = validate_script(
            None,
            "DROP TABLE t; CREATE TABLE t(id BIGINT);",
            &live,
        );
        assert_eq!(verdict.status, VerdictStatus::Pass);
    }

    #[test]
    fn test_offline_run_reports_snapshot_failure_once() {
        let verdict = validate_script_offline(
            Some("migration.sql".to_string()),
            "CREATE TABLE t(id INT); SELECT 1;",
            "no connection registered",
        );
        assert_eq!(verdict.status, VerdictStatus::Fail);
        assert_eq!(verdict.script_issues.len(), 1);
        assert_eq!(verdict.script_issues[0].category, IssueCategory::Snapshot);

        // Structural statement listed but skipped; non-structural acknowledged.
        assert!(!verdict.statements[0].checked);
        assert!(verdict.statements[1].checked);
        assert!(verdict.statements.iter().all(|s| s.issues.is_empty()));
    }

    #[test]
    fn test_issue_attribution_is_monotonic() {
        let verdict = validate_script(
            None,
            "ALTER TABLE ghost ADD x INT; CREATE TABLE t(id INT); CREATE TABLE t(id INT)",
            &SchemaState::new(),
        );
        let max_index = verdict.statements.iter().map(|s| s.index).max().unwrap();
        for issue in verdict.all_issues() {
            assert!(issue.statement_index <= max_index);
        }
    }
}
