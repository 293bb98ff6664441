//! At-least-once HTTP Event Emitter (§4.8). Event emission never sits on
//! the critical path of a decision: callers fire this and record the
//! outcome, but a failure here never changes the decision already
//! returned to the caller.

use crate::envelope::{build_event, CloudEvent, EventKind};
use crate::error::{EventsError, Result};
use crate::validator::ContractValidator;
use serde_json::Value as Json;
use std::time::Duration;

const USER_AGENT: &str = "Orca-Core-CloudEvents/1.0";

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_millis(250), max_delay: Duration::from_secs(2) }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.base_delay.saturating_mul(1 << attempt.min(16));
        scaled.min(self.max_delay)
    }
}

pub struct EventEmitter {
    client: reqwest::Client,
    subscriber_url: Option<String>,
    source_uri: String,
    retry_policy: RetryPolicy,
    validator: ContractValidator,
}

impl EventEmitter {
    pub fn new(subscriber_url: Option<String>, source_uri: String, validator: ContractValidator) -> Self {
        Self {
            client: reqwest::Client::builder().timeout(Duration::from_secs(30)).build().unwrap_or_default(),
            subscriber_url,
            source_uri,
            retry_policy: RetryPolicy::default(),
            validator,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub async fn emit_decision_event(&self, data: Json, trace_id: &str) -> Result<CloudEvent> {
        self.emit(EventKind::Decision, data, trace_id).await
    }

    pub async fn emit_explanation_event(&self, data: Json, trace_id: &str) -> Result<CloudEvent> {
        self.emit(EventKind::Explanation, data, trace_id).await
    }

    pub async fn emit_audit_event(&self, data: Json, trace_id: &str) -> Result<CloudEvent> {
        self.emit(EventKind::Audit, data, trace_id).await
    }

    async fn emit(&self, kind: EventKind, data: Json, trace_id: &str) -> Result<CloudEvent> {
        let event = build_event(kind, data, trace_id, &self.source_uri)?;

        let envelope_json = serde_json::to_value(&event)?;
        if let Err(issues) = self.validator.validate_cloudevent(&envelope_json, kind.schema_cache_name()) {
            return Err(EventsError::ValidationFailed(issues));
        }

        if let Some(url) = &self.subscriber_url {
            self.post_with_retry(url, &event).await?;
        }
        Ok(event)
    }

    async fn post_with_retry(&self, url: &str, event: &CloudEvent) -> Result<()> {
        let body = serde_json::to_string(event)?;
        let mut last_error = String::new();

        for attempt in 0..self.retry_policy.max_attempts {
            let response = self
                .client
                .post(url)
                .header("Content-Type", "application/cloudevents+json")
                .header("User-Agent", USER_AGENT)
                .body(body.clone())
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) if resp.status().is_client_error() => {
                    return Err(EventsError::EmissionFailed(format!(
                        "non-retryable {} from subscriber",
                        resp.status()
                    )));
                }
                Ok(resp) => {
                    last_error = format!("subscriber returned {}", resp.status());
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }

            if attempt + 1 < self.retry_policy.max_attempts {
                tokio::time::sleep(self.retry_policy.delay_for(attempt)).await;
            }
        }

        Err(EventsError::EmissionFailed(last_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_grows_exponentially_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(250));
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(10), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn emit_fails_fast_on_invalid_subject() {
        let emitter = EventEmitter::new(None, "https://orca.example/decision-engine".to_string(), ContractValidator::without_schemas());
        let result = emitter.emit_decision_event(serde_json::json!({}), "bad-subject").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn emit_without_subscriber_url_succeeds_locally() {
        let emitter = EventEmitter::new(None, "https://orca.example/decision-engine".to_string(), ContractValidator::without_schemas());
        let result = emitter
            .emit_decision_event(
                serde_json::json!({"ap2_version": "0.1.0", "intent": {}, "cart": {}, "payment": {}, "decision": {"result": "APPROVE"}, "signing": {}}),
                "txn_abc123",
            )
            .await;
        assert!(result.is_ok());
    }
}
