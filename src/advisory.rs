//! Advisory reviewer seam
//!
//! An optional second opinion on each statement, appended to the verdict as
//! `Advisory` issues. Strictly additive commentary: it never changes a
//! statement's validity or the script's PASS/FAIL, and a reviewer that fails
//! or returns nothing is silently omitted.

use crate::engine::verdict::{IssueCategory, ScriptVerdict, ValidationIssue};
use crate::error::AppError;
use crate::schema::SchemaState;
use async_trait::async_trait;
use tracing::debug;

#[async_trait]
pub trait AdvisoryReviewer: Send + Sync {
    /// Review one statement in context. `prior_issues` are the structural
    /// findings already attached to the statement, so the reviewer can add
    /// a non-duplicating perspective.
    async fn review(
        &self,
        statement_text: &str,
        schema_context: &SchemaState,
        prior_issues: &[ValidationIssue],
    ) -> Result<Option<String>, AppError>;
}

/// The default wiring: no reviewer configured.
pub struct DisabledReviewer;

#[async_trait]
impl AdvisoryReviewer for DisabledReviewer {
    async fn review(
        &self,
        _statement_text: &str,
        _schema_context: &SchemaState,
        _prior_issues: &[ValidationIssue],
    ) -> Result<Option<String>, AppError> {
        Ok(None)
    }
}

/// Run the reviewer over every statement of a finished verdict and append
/// its opinions. The verdict's status is computed before this runs and is
/// never revisited.
pub async fn append_advisory_opinions(
    reviewer: &dyn AdvisoryReviewer,
    verdict: &mut ScriptVerdict,
    schema_context: &SchemaState,
) {
    for statement in &mut verdict.statements {
        match reviewer
            .review(&statement.text, schema_context, &statement.issues)
            .await
        {
            Ok(Some(opinion)) => {
                statement.issues.push(ValidationIssue {
                    statement_index: statement.index,
                    category: IssueCategory::Advisory,
                    message: opinion,
                });
            }
            Ok(None) => {}
            Err(e) => {
                // Advisory failures are never surfaced as issues.
                debug!(statement = statement.index, error = %e, "advisory review skipped");
            }
        }
    }
}
