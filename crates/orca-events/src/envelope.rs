//! CloudEvents 1.0 envelope for decision, explanation, and audit events (§4.8).

use crate::error::{EventsError, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::sync::OnceLock;

fn subject_pattern() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^txn_[A-Za-z0-9_-]+$").unwrap())
}

/// Checks a trace id against the subject format the Event Emitter and
/// Audit Subscriber both require.
pub fn validate_trace_id(trace_id: &str) -> Result<()> {
    if subject_pattern().is_match(trace_id) {
        Ok(())
    } else {
        Err(EventsError::InvalidSubject(trace_id.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Decision,
    Explanation,
    Audit,
}

impl EventKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            EventKind::Decision => "ocn.orca.decision.v1",
            EventKind::Explanation => "ocn.orca.explanation.v1",
            EventKind::Audit => "ocn.weave.audit.v1",
        }
    }

    pub fn schema_uri(&self) -> &'static str {
        match self {
            EventKind::Decision => "https://schemas.ocn.ai/ap2/v1/decision.schema.json",
            EventKind::Explanation => "https://schemas.ocn.ai/ap2/v1/explanation.schema.json",
            EventKind::Audit => "https://schemas.ocn.ai/weave/v1/audit.schema.json",
        }
    }

    /// The `(type, name)` key the Contract Validator caches compiled
    /// schemas under for this event kind.
    pub fn schema_cache_name(&self) -> &'static str {
        match self {
            EventKind::Decision => "orca.decision.v1",
            EventKind::Explanation => "orca.explanation.v1",
            EventKind::Audit => "weave.audit.v1",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudEvent {
    pub specversion: String,
    pub id: String,
    pub source: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub subject: String,
    pub time: String,
    pub datacontenttype: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataschema: Option<String>,
    pub data: Json,
}

/// Builds a CloudEvent envelope around `data`, failing fast if `trace_id`
/// is not a valid subject.
pub fn build_event(kind: EventKind, data: Json, trace_id: &str, source_uri: &str) -> Result<CloudEvent> {
    validate_trace_id(trace_id)?;
    Ok(CloudEvent {
        specversion: "1.0".to_string(),
        id: uuid::Uuid::new_v4().to_string(),
        source: source_uri.to_string(),
        event_type: kind.type_name().to_string(),
        subject: trace_id.to_string(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        datacontenttype: "application/json".to_string(),
        dataschema: Some(kind.schema_uri().to_string()),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_subject_without_txn_prefix() {
        assert!(validate_trace_id("abc123").is_err());
        assert!(validate_trace_id("txn_abc-123_DEF").is_ok());
    }

    #[test]
    fn build_event_fails_fast_on_bad_subject() {
        let result = build_event(EventKind::Decision, json!({}), "not-a-trace-id", "https://orca.example/decision-engine");
        assert!(result.is_err());
    }

    #[test]
    fn build_event_populates_expected_fields() {
        let event = build_event(EventKind::Decision, json!({"result": "APPROVE"}), "txn_abc123", "https://orca.example/decision-engine")
            .unwrap();
        assert_eq!(event.event_type, "ocn.orca.decision.v1");
        assert_eq!(event.subject, "txn_abc123");
        assert_eq!(event.datacontenttype, "application/json");
    }
}
