//! Orca Decision Engine HTTP Server

mod api;
mod audit;
mod config;
mod error;

use crate::audit::ReceiptStore;
use crate::config::ServerConfig;
use anyhow::Result;
use api::AppState;
use orca_engine::{DecisionEngine, OrcaSettings};
use orca_events::ContractValidator;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let server_config = ServerConfig::load()?;
    info!(?server_config, "loaded server configuration");

    let settings = OrcaSettings::load();
    for issue in settings.validate_config() {
        tracing::warn!(issue = %issue, "configuration issue detected at startup");
    }

    let explainer = DecisionEngine::build_explainer(&settings);
    let engine = Arc::new(DecisionEngine::new(&settings, explainer));
    info!("decision engine initialized");

    let state = AppState {
        engine,
        validator: Arc::new(ContractValidator::new(settings.schemas_dir.clone())),
        receipts: Arc::new(ReceiptStore::new()),
        audit_source_uri: "https://weave.ocn.ai/audit-service".to_string(),
    };

    let app = api::create_router(state);

    let addr = format!("{}:{}", server_config.host, server_config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("server listening on http://{}", addr);
    info!("  health check: http://{}/health", addr);
    info!("  decision API: http://{}/v1/decide", addr);
    info!("  audit sink:   http://{}/v1/audit/events", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orca_server=info,orca_engine=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))?;
    Ok(())
}
