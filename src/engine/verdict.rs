//! Verdicts
//!
//! The engine's only output: per-statement verdicts aggregated into a script
//! verdict. Verdicts are immutable after aggregation; issues are never
//! deduplicated or reordered; report consumers rely on stable ordering.

use crate::ddl::DdlKind;
use serde::{Deserialize, Serialize};

/// Where an issue came from. `Advisory` entries are commentary and never
/// affect validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// A statement region that does not match a recognized DDL shape.
    Syntax,
    /// A recognized statement that conflicts with the effective schema.
    Structural,
    /// The live schema snapshot could not be obtained.
    Snapshot,
    /// Opinion from the optional AI reviewer.
    Advisory,
}

/// One problem, attributable to exactly one statement. Index 0 is the
/// synthetic script-level statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub statement_index: usize,
    pub category: IssueCategory,
    pub message: String,
}

impl ValidationIssue {
    pub fn structural(statement_index: usize, message: impl Into<String>) -> Self {
        Self {
            statement_index,
            category: IssueCategory::Structural,
            message: message.into(),
        }
    }

    pub fn syntax(statement_index: usize, message: impl Into<String>) -> Self {
        Self {
            statement_index,
            category: IssueCategory::Syntax,
            message: message.into(),
        }
    }
}

/// The validity result and issue list for one parsed statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementVerdict {
    /// 1-based position in the script.
    pub index: usize,
    pub kind: DdlKind,
    /// Comment-stripped source text, carried for report rendering.
    pub text: String,
    pub valid: bool,
    /// False when structural validation was skipped for the whole script
    /// (snapshot failure). Skipped statements carry no structural issues.
    pub checked: bool,
    pub issues: Vec<ValidationIssue>,
}

/// Overall outcome for one script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl VerdictStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictStatus::Pass => "PASS",
            VerdictStatus::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The aggregate result for an entire script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptVerdict {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: VerdictStatus,
    pub statements: Vec<StatementVerdict>,
    /// Issues attached to the synthetic statement 0: empty script, missing
    /// terminator, snapshot failure.
    pub script_issues: Vec<ValidationIssue>,
}

impl ScriptVerdict {
    pub fn passed(&self) -> bool {
        self.status == VerdictStatus::Pass
    }

    /// All issues in report order: script-level first, then statement order,
    /// then discovery order within a statement.
    pub fn all_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.script_issues
            .iter()
            .chain(self.statements.iter().flat_map(|s| s.issues.iter()))
    }

    /// Issue count excluding advisory commentary.
    pub fn binding_issue_count(&self) -> usize {
        self.all_issues()
            .filter(|i| i.category != IssueCategory::Advisory)
            .count()
    }
}

/// Collect per-statement verdicts into the script verdict. `PASS` iff every
/// statement verdict is valid and parsing/snapshotting produced no
/// script-level issues.
pub fn aggregate(
    name: Option<String>,
    statements: Vec<StatementVerdict>,
    script_issues: Vec<ValidationIssue>,
) -> ScriptVerdict {
    let all_valid = statements.iter().all(|s| s.valid);
    let status = if all_valid && script_issues.is_empty() {
        VerdictStatus::Pass
    } else {
        VerdictStatus::Fail
    };

    ScriptVerdict {
        name,
        status,
        statements,
        script_issues,
    }
}
