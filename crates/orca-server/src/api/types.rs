//! REST API type definitions.

use crate::audit::{Receipt, ReceiptStore};
use orca_engine::DecisionEngine;
use orca_events::ContractValidator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DecisionEngine>,
    pub validator: Arc<ContractValidator>,
    pub receipts: Arc<ReceiptStore>,
    pub audit_source_uri: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Inbound CloudEvent envelope, as posted to the audit subscriber sink (§4.10).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CloudEventEnvelope {
    pub specversion: String,
    pub id: String,
    pub source: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub subject: String,
    pub time: String,
    #[serde(default = "default_content_type")]
    pub datacontenttype: String,
    #[serde(default)]
    pub dataschema: Option<String>,
    pub data: serde_json::Value,
}

fn default_content_type() -> String {
    "application/json".to_string()
}

#[derive(Debug, Serialize)]
pub struct AuditEventResponse {
    pub status: String,
    pub message: String,
    pub receipt: Receipt,
    pub audit_event_id: String,
}

#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub status: String,
    pub receipt: Receipt,
}
