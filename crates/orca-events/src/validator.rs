//! Contract Validator (§4.11): embedded JSON-schema validation for AP2
//! mandates and CloudEvents, with a non-silent fallback when no schema
//! directory is installed.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
    pub schema_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Mandate,
    Event,
}

impl SchemaKind {
    fn subtree(&self) -> &'static str {
        match self {
            SchemaKind::Mandate => "mandates",
            SchemaKind::Event => "events",
        }
    }
}

/// Validates AP2 mandate payloads and CloudEvent envelopes against
/// embedded JSON-schema draft-2020-12 documents, falling back to a
/// minimal built-in check when no schema directory is configured or the
/// named schema is missing.
pub struct ContractValidator {
    schemas_dir: Option<PathBuf>,
    cache: Mutex<HashMap<(SchemaKind, String), Arc<Json>>>,
}

impl ContractValidator {
    pub fn new(schemas_dir: Option<PathBuf>) -> Self {
        Self { schemas_dir, cache: Mutex::new(HashMap::new()) }
    }

    pub fn without_schemas() -> Self {
        Self::new(None)
    }

    pub fn validate_mandate(&self, payload: &Json, name: &str) -> Result<(), Vec<ValidationIssue>> {
        self.validate(SchemaKind::Mandate, name, payload)
    }

    pub fn validate_cloudevent(&self, payload: &Json, type_name: &str) -> Result<(), Vec<ValidationIssue>> {
        self.validate(SchemaKind::Event, type_name, payload)
    }

    fn validate(&self, kind: SchemaKind, name: &str, payload: &Json) -> Result<(), Vec<ValidationIssue>> {
        match self.load_schema(kind, name) {
            Some(schema) => Self::validate_against_schema(&schema, payload),
            None => {
                tracing::warn!(schema = name, "no schema available, using fallback validator");
                Self::fallback_validate(kind, name, payload)
            }
        }
    }

    fn load_schema(&self, kind: SchemaKind, name: &str) -> Option<Arc<Json>> {
        let key = (kind, name.to_string());
        if let Some(cached) = self.cache.lock().unwrap().get(&key) {
            return Some(cached.clone());
        }

        let dir = self.schemas_dir.as_ref()?;
        let path = dir.join(kind.subtree()).join(format!("{name}.schema.json"));
        let raw = std::fs::read_to_string(&path).ok()?;
        let mut schema: Json = serde_json::from_str(&raw).ok()?;
        let mandates_root = dir.join("mandates");
        resolve_refs(&mut schema, &mandates_root);

        let arc = Arc::new(schema);
        self.cache.lock().unwrap().insert(key, arc.clone());
        Some(arc)
    }

    fn validate_against_schema(schema: &Json, payload: &Json) -> Result<(), Vec<ValidationIssue>> {
        let compiled = match jsonschema::JSONSchema::compile(schema) {
            Ok(compiled) => compiled,
            Err(e) => {
                return Err(vec![ValidationIssue {
                    path: "$".to_string(),
                    message: format!("invalid schema: {e}"),
                    schema_path: "$".to_string(),
                }])
            }
        };

        let result = compiled.validate(payload);
        if let Err(errors) = result {
            let issues = errors
                .map(|e| ValidationIssue {
                    path: e.instance_path.to_string(),
                    message: e.to_string(),
                    schema_path: e.schema_path.to_string(),
                })
                .collect();
            return Err(issues);
        }
        Ok(())
    }

    fn fallback_validate(kind: SchemaKind, name: &str, payload: &Json) -> Result<(), Vec<ValidationIssue>> {
        match kind {
            SchemaKind::Mandate if name == "ap2_decision" => fallback_decision_validation(payload),
            SchemaKind::Mandate if name == "ap2_explanation" => fallback_explanation_validation(payload),
            SchemaKind::Event => fallback_cloudevent_validation(payload),
            _ => Ok(()),
        }
    }
}

fn missing_field_issue(field: &str) -> ValidationIssue {
    ValidationIssue {
        path: format!("$.{field}"),
        message: format!("missing required field: {field}"),
        schema_path: "fallback".to_string(),
    }
}

fn fallback_decision_validation(payload: &Json) -> Result<(), Vec<ValidationIssue>> {
    let required = ["ap2_version", "intent", "cart", "payment", "decision", "signing"];
    let mut issues: Vec<ValidationIssue> =
        required.iter().filter(|f| payload.get(**f).is_none()).map(|f| missing_field_issue(f)).collect();

    if let Some(result) = payload.pointer("/decision/result").and_then(Json::as_str) {
        if !["APPROVE", "DECLINE", "REVIEW"].contains(&result) {
            issues.push(ValidationIssue {
                path: "$.decision.result".to_string(),
                message: format!("invalid decision result: {result}"),
                schema_path: "fallback".to_string(),
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn fallback_explanation_validation(payload: &Json) -> Result<(), Vec<ValidationIssue>> {
    let required = ["trace_id", "decision_result", "explanation", "confidence", "model_provenance"];
    let mut issues: Vec<ValidationIssue> =
        required.iter().filter(|f| payload.get(**f).is_none()).map(|f| missing_field_issue(f)).collect();

    if let Some(confidence) = payload.get("confidence").and_then(Json::as_f64) {
        if !(0.0..=1.0).contains(&confidence) {
            issues.push(ValidationIssue {
                path: "$.confidence".to_string(),
                message: format!("confidence out of range: {confidence}"),
                schema_path: "fallback".to_string(),
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn fallback_cloudevent_validation(payload: &Json) -> Result<(), Vec<ValidationIssue>> {
    let required = ["specversion", "id", "source", "type", "subject", "time", "data"];
    let issues: Vec<ValidationIssue> =
        required.iter().filter(|f| payload.get(**f).is_none()).map(|f| missing_field_issue(f)).collect();

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Recursively inlines `$ref` entries that point at a relative file under
/// the mandates tree, stripping `$id` from the resolved document.
fn resolve_refs(value: &mut Json, mandates_root: &Path) {
    match value {
        Json::Object(map) => {
            if let Some(Json::String(reference)) = map.get("$ref").cloned() {
                if !reference.starts_with('#') {
                    if let Some(mut resolved) = load_ref(&reference, mandates_root) {
                        if let Json::Object(resolved_map) = &mut resolved {
                            resolved_map.remove("$id");
                        }
                        resolve_refs(&mut resolved, mandates_root);
                        *value = resolved;
                        return;
                    }
                }
            }
            for (_, child) in map.iter_mut() {
                resolve_refs(child, mandates_root);
            }
        }
        Json::Array(items) => {
            for item in items.iter_mut() {
                resolve_refs(item, mandates_root);
            }
        }
        _ => {}
    }
}

fn load_ref(reference: &str, mandates_root: &Path) -> Option<Json> {
    let path = mandates_root.join(reference);
    let raw = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fallback_accepts_well_formed_decision() {
        let payload = json!({
            "ap2_version": "0.1.0",
            "intent": {}, "cart": {}, "payment": {},
            "decision": {"result": "APPROVE"},
            "signing": {"vc_proof": null, "receipt_hash": null},
        });
        let validator = ContractValidator::without_schemas();
        assert!(validator.validate_mandate(&payload, "ap2_decision").is_ok());
    }

    #[test]
    fn fallback_rejects_missing_fields() {
        let payload = json!({"ap2_version": "0.1.0"});
        let validator = ContractValidator::without_schemas();
        let err = validator.validate_mandate(&payload, "ap2_decision").unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn fallback_rejects_invalid_decision_result() {
        let payload = json!({
            "ap2_version": "0.1.0",
            "intent": {}, "cart": {}, "payment": {},
            "decision": {"result": "MAYBE"},
            "signing": {},
        });
        let validator = ContractValidator::without_schemas();
        let err = validator.validate_mandate(&payload, "ap2_decision").unwrap_err();
        assert!(err.iter().any(|i| i.message.contains("invalid decision result")));
    }

    #[test]
    fn fallback_cloudevent_requires_envelope_fields() {
        let payload = json!({"id": "1"});
        let validator = ContractValidator::without_schemas();
        assert!(validator.validate_cloudevent(&payload, "orca.decision.v1").is_err());
    }
}
