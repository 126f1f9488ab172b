//! DDL Gate - Migration Review Service
//!
//! Validates SQL migration scripts against a live database before they run:
//! - Extract: parse the script into typed schema-change statements
//! - Snapshot: capture the target database's live schema once per script
//! - Validate: check each statement against the schema it would actually
//!   see, including tables created earlier in the same script
//! - Report: per-statement verdicts, rendered as JSON, HTML or plain text
//!
//! Targets are registered dynamically: clients provide a connection string
//! via the API; nothing is configured in .env and nothing is persisted.

mod advisory;
mod config;
mod connection;
mod ddl;
mod engine;
mod error;
mod introspection;
mod report;
mod routes;
mod schema;
mod state;

use crate::config::Settings;
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("🚀 Starting DDL Gate - Migration Review Service...");

    let settings = Settings::load()?;
    info!(
        batch_limit = settings.validation.batch_limit,
        "📋 Configuration loaded"
    );

    let state = Arc::new(AppState::new(&settings));
    let app = create_router(state, &settings);

    let addr = SocketAddr::from((settings.server.host, settings.server.port));
    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Target Databases ───");
    info!("   POST   /api/connections        - Register a target database");
    info!("   GET    /api/connections        - List registered databases");
    info!("   POST   /api/connections/test   - Test a connection string");
    info!("   DELETE /api/connections/:id    - Remove a registered database");
    info!("");
    info!("   ─── Validation ───");
    info!("   POST   /api/validate           - Validate one migration script");
    info!("   POST   /api/validate/batch     - Validate a batch of scripts");
    info!("");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ddlgate_api=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
