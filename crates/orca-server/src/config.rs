//! HTTP server configuration: host/port/tracing knobs layered on top of
//! the engine's own [`orca_engine::OrcaSettings`], which stays the single
//! source of truth for decision-pipeline configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_tracing: bool,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_tracing: true,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config/server.{yaml,toml,...}` (if present)
    /// layered with `ORCA_SERVER_*` environment variables, falling back to
    /// defaults when neither source is present.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/server").required(false))
            .add_source(config::Environment::with_prefix("ORCA_SERVER"))
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("failed to deserialize server config: {}", e)),
            Err(_) => {
                tracing::info!("no server config file found, using default configuration");
                Ok(Self::default())
            }
        }
    }
}
