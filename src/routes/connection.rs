//! Target database registry routes

use crate::connection::ConnectionInfo;
use crate::error::ApiResult;
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterConnectionRequest {
    pub connection_string: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResponse {
    pub success: bool,
    pub connection: ConnectionInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionListResponse {
    pub success: bool,
    pub connections: Vec<ConnectionInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Register a target database and smoke test it.
pub async fn register_connection(
    State(state): State<SharedState>,
    Json(req): Json<RegisterConnectionRequest>,
) -> ApiResult<Json<ConnectionResponse>> {
    let connection = state
        .connections
        .register(&req.connection_string, req.name)
        .await?;

    Ok(Json(ConnectionResponse {
        success: true,
        connection,
    }))
}

/// List registered target databases.
pub async fn list_connections(
    State(state): State<SharedState>,
) -> ApiResult<Json<ConnectionListResponse>> {
    Ok(Json(ConnectionListResponse {
        success: true,
        connections: state.connections.list().await,
    }))
}

/// Test a connection string without registering it.
pub async fn test_connection(
    State(state): State<SharedState>,
    Json(req): Json<RegisterConnectionRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state.connections.test(&req.connection_string).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Connection successful".to_string(),
    }))
}

/// Remove a registered target database.
pub async fn remove_connection(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.connections.remove(id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("Connection {} removed", id),
    }))
}
