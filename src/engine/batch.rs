//! Batch validation
//!
//! Validates several scripts sequentially, each against its own live
//! snapshot fetch, with a hard cap on batch size. A script whose snapshot
//! fetch fails is marked failed with a single snapshot issue; the batch
//! continues with the next script. No state is shared across scripts;
//! every script gets a fresh overlay.

use super::verdict::{ScriptVerdict, VerdictStatus};
use super::{validate_script, validate_script_offline};
use crate::schema::SchemaState;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::warn;

/// Default hard cap on scripts per batch.
pub const DEFAULT_BATCH_LIMIT: usize = 5;

/// One script submitted for batch validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchScript {
    pub name: String,
    pub sql: String,
}

/// The consolidated outcome for a batch run. Output order equals input
/// order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub reports: Vec<ScriptVerdict>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Scripts dropped beyond the batch cap, in input order.
    pub truncated: usize,
}

/// Run a batch: cap, then validate each script in input order, fetching a
/// fresh snapshot per script through `snapshot_for`.
pub async fn validate_batch_scripts<F, Fut>(
    scripts: Vec<BatchScript>,
    limit: usize,
    mut snapshot_for: F,
) -> BatchReport
where
    F: FnMut(&BatchScript) -> Fut,
    Fut: Future<Output = Result<SchemaState, String>>,
{
    let submitted = scripts.len();
    let truncated = submitted.saturating_sub(limit);
    if truncated > 0 {
        warn!(
            submitted,
            limit, "batch exceeds the script cap; dropping trailing scripts"
        );
    }

    let mut reports = Vec::new();
    for script in scripts.into_iter().take(limit) {
        let verdict = match snapshot_for(&script).await {
            Ok(live) => validate_script(Some(script.name.clone()), &script.sql, &live),
            Err(reason) => {
                validate_script_offline(Some(script.name.clone()), &script.sql, &reason)
            }
        };
        reports.push(verdict);
    }

    let passed = reports
        .iter()
        .filter(|r| r.status == VerdictStatus::Pass)
        .count();
    let failed = reports.len() - passed;

    BatchReport {
        total: reports.len(),
        passed,
        failed,
        truncated,
        reports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::verdict::IssueCategory;
    use crate::schema::{ColumnDescriptor, TableDescriptor};

    fn script(name: &str, sql: &str) -> BatchScript {
        BatchScript {
            name: name.to_string(),
            sql: sql.to_string(),
        }
    }

    fn live_users() -> SchemaState {
        let mut table = TableDescriptor::new("users");
        table.add_column(ColumnDescriptor {
            name: "id".to_string(),
            data_type: "INT".to_string(),
            length: None,
            precision: None,
            scale: None,
            nullable: false,
        });
        let mut state = SchemaState::new();
        state.insert_table(table);
        state
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order_and_counts() {
        let scripts = vec![
            script("a.sql", "CREATE TABLE t1(id INT);"),
            script("b.sql", "ALTER TABLE ghost ADD x INT;"),
            script("c.sql", "CREATE TABLE t2(id INT);"),
        ];
        let report =
            validate_batch_scripts(scripts, DEFAULT_BATCH_LIMIT, |_| async { Ok(SchemaState::new()) })
                .await;

        assert_eq!(report.total, 3);
        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.truncated, 0);
        let names: Vec<_> = report
            .reports
            .iter()
            .map(|r| r.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["a.sql", "b.sql", "c.sql"]);
    }

    #[tokio::test]
    async fn test_batch_truncates_in_input_order() {
        let scripts = (0..8)
            .map(|i| script(&format!("{}.sql", i), "SELECT 1;"))
            .collect();
        let report =
            validate_batch_scripts(scripts, 5, |_| async { Ok(SchemaState::new()) }).await;

        assert_eq!(report.total, 5);
        assert_eq!(report.truncated, 3);
        assert_eq!(report.reports.last().unwrap().name.as_deref(), Some("4.sql"));
    }

    #[tokio::test]
    async fn test_snapshot_failure_fails_one_script_and_continues() {
        let scripts = vec![
            script("ok1.sql", "ALTER TABLE users ADD email VARCHAR(100);"),
            script("bad.sql", "ALTER TABLE users ADD phone VARCHAR(20);"),
            script("ok2.sql", "ALTER TABLE users ADD age INT;"),
        ];
        let report = validate_batch_scripts(scripts, 5, |s| {
            let fail = s.name == "bad.sql";
            async move {
                if fail {
                    Err("connection refused".to_string())
                } else {
                    Ok(live_users())
                }
            }
        })
        .await;

        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 1);

        let bad = &report.reports[1];
        assert_eq!(bad.status, VerdictStatus::Fail);
        assert_eq!(bad.script_issues.len(), 1);
        assert_eq!(bad.script_issues[0].category, IssueCategory::Snapshot);
        // Structural statement listed but skipped, no per-statement issues.
        assert!(bad.statements.iter().all(|s| s.issues.is_empty()));

        // Independent neighbors validated normally.
        assert_eq!(report.reports[0].status, VerdictStatus::Pass);
        assert_eq!(report.reports[2].status, VerdictStatus::Pass);
    }
}
