//! Validation routes
//!
//! The command surface over the engine: one script or a batch, against a
//! registered target database or offline. Snapshot fetches happen here, one
//! per script, before the synchronous engine runs.

use crate::advisory::append_advisory_opinions;
use crate::engine::verdict::ScriptVerdict;
use crate::engine::{self, BatchReport, BatchScript};
use crate::error::{ApiResult, AppError};
use crate::introspection::PostgresIntrospector;
use crate::report;
use crate::state::SharedState;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Html,
    Text,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub sql: String,
    pub name: Option<String>,
    /// Registered target database; omitted = offline run (structural checks
    /// skipped).
    pub connection_id: Option<Uuid>,
    #[serde(default)]
    pub format: ReportFormat,
    /// Ask the configured advisory reviewer for a second opinion.
    #[serde(default)]
    pub advisory: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    pub captured_at: DateTime<Utc>,
    pub table_count: usize,
    pub checksum: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotMeta>,
    pub verdict: ScriptVerdict,
}

/// Validate one script.
pub async fn validate_script(
    State(state): State<SharedState>,
    Json(req): Json<ValidateRequest>,
) -> ApiResult<Response> {
    let (mut verdict, schema, snapshot_meta) = match req.connection_id {
        Some(id) => {
            // An unknown id is a client error, not a snapshot failure.
            let pool = state.connections.get_pool(id).await?;
            match PostgresIntrospector::introspect(&pool).await {
                Ok(snapshot) => {
                    let verdict =
                        engine::validate_script(req.name.clone(), &req.sql, &snapshot.schema);
                    let meta = SnapshotMeta {
                        captured_at: snapshot.captured_at,
                        table_count: snapshot.table_count,
                        checksum: snapshot.checksum,
                    };
                    (verdict, snapshot.schema, Some(meta))
                }
                Err(e) => {
                    let verdict = engine::validate_script_offline(
                        req.name.clone(),
                        &req.sql,
                        &e.to_string(),
                    );
                    (verdict, Default::default(), None)
                }
            }
        }
        None => {
            let verdict = engine::validate_script_offline(
                req.name.clone(),
                &req.sql,
                "no connection id provided",
            );
            (verdict, Default::default(), None)
        }
    };

    if req.advisory {
        append_advisory_opinions(state.reviewer.as_ref(), &mut verdict, &schema).await;
    }

    Ok(match req.format {
        ReportFormat::Json => Json(ValidateResponse {
            success: true,
            snapshot: snapshot_meta,
            verdict,
        })
        .into_response(),
        ReportFormat::Html => Html(report::render_html(&verdict)).into_response(),
        ReportFormat::Text => report::render_text(&verdict).into_response(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateBatchRequest {
    pub scripts: Vec<BatchScript>,
    pub connection_id: Option<Uuid>,
    #[serde(default)]
    pub format: ReportFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateBatchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: BatchReport,
}

/// Validate a batch of scripts sequentially, each with its own snapshot
/// fetch. Scripts beyond the configured cap are dropped in input order and
/// reported in the `truncated` count.
pub async fn validate_batch(
    State(state): State<SharedState>,
    Json(req): Json<ValidateBatchRequest>,
) -> ApiResult<Response> {
    if req.scripts.is_empty() {
        return Err(AppError::BadRequest(
            "Batch contains no scripts".to_string(),
        ));
    }

    let pool = match req.connection_id {
        Some(id) => Some(state.connections.get_pool(id).await?),
        None => None,
    };

    let batch_report = engine::validate_batch_scripts(req.scripts, state.batch_limit, |_| {
        let pool = pool.clone();
        async move {
            match pool {
                Some(pool) => PostgresIntrospector::introspect(&pool)
                    .await
                    .map(|snapshot| snapshot.schema)
                    .map_err(|e| e.to_string()),
                None => Err("no connection id provided".to_string()),
            }
        }
    })
    .await;

    Ok(match req.format {
        ReportFormat::Html => Html(report::render_batch_html(&batch_report)).into_response(),
        _ => Json(ValidateBatchResponse {
            success: true,
            report: batch_report,
        })
        .into_response(),
    })
}
