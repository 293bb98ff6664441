//! HTTP request handlers for the decision API, audit subscriber sink, and
//! health endpoint.

use super::types::*;
use crate::error::ServerError;
use axum::extract::{Path, State};
use axum::Json;
use orca_core::DecisionRequest;
use orca_events::{build_event, validate_trace_id, EventKind};
use tracing::{info, warn};

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy".to_string(), version: env!("CARGO_PKG_VERSION").to_string() })
}

/// `POST /v1/decide` (§4.9, §6): runs a full decision cycle and returns the
/// AP2 wire contract.
pub(super) async fn decide(
    State(state): State<AppState>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let outcome = state.engine.decide(request).await?;
    let contract = serde_json::to_value(&outcome.contract)
        .map_err(|e| ServerError::InternalError(format!("failed to serialize contract: {e}")))?;
    Ok(Json(contract))
}

/// `POST /v1/audit/events` — the Audit Subscriber sink (§4.10).
pub(super) async fn receive_audit_event(
    State(state): State<AppState>,
    Json(event): Json<CloudEventEnvelope>,
) -> Result<Json<AuditEventResponse>, ServerError> {
    info!(id = %event.id, event_type = %event.event_type, subject = %event.subject, "received CloudEvent");

    if event.specversion != "1.0" {
        return Err(ServerError::InvalidRequest(format!("unsupported specversion {}", event.specversion)));
    }
    validate_trace_id(&event.subject).map_err(|e| ServerError::InvalidRequest(e.to_string()))?;

    let envelope_json = serde_json::to_value(&event)
        .map_err(|e| ServerError::InternalError(format!("failed to serialize envelope: {e}")))?;
    let schema_name = if event.event_type.contains("explanation") {
        EventKind::Explanation.schema_cache_name()
    } else {
        EventKind::Decision.schema_cache_name()
    };
    if let Err(issues) = state.validator.validate_cloudevent(&envelope_json, schema_name) {
        warn!(issues = ?issues, "CloudEvent failed contract validation");
        return Err(ServerError::InvalidRequest("CloudEvent validation failed".to_string()));
    }

    let event_kind = if event.event_type.contains("decision") { "decision" } else { "explanation" };
    let receipt = state.receipts.store(&event.subject, event_kind, &event.data, chrono::Utc::now());

    let audit_data = serde_json::to_value(&receipt)
        .map_err(|e| ServerError::InternalError(format!("failed to serialize receipt: {e}")))?;
    let audit_event = build_event(EventKind::Audit, audit_data, &event.subject, &state.audit_source_uri)
        .map_err(|e| ServerError::InternalError(e.to_string()))?;
    info!(id = %audit_event.id, subject = %event.subject, "emitted audit CloudEvent");

    Ok(Json(AuditEventResponse {
        status: "success".to_string(),
        message: format!("CloudEvent {} processed successfully", event.id),
        audit_event_id: audit_event.id.clone(),
        receipt,
    }))
}

/// `GET /v1/audit/receipts/:trace_id` (§4.10 receipt lookup).
pub(super) async fn get_receipt(
    State(state): State<AppState>,
    Path(trace_id): Path<String>,
) -> Result<Json<ReceiptResponse>, ServerError> {
    validate_trace_id(&trace_id).map_err(|e| ServerError::InvalidRequest(e.to_string()))?;

    let receipt = state
        .receipts
        .latest(&trace_id)
        .ok_or_else(|| ServerError::NotFound(format!("no receipt stored for {trace_id}")))?;

    Ok(Json(ReceiptResponse { status: "success".to_string(), receipt }))
}
