//! Feature Extractor (§4.1) — pure derivation of `DerivedFeatures` from a `DecisionRequest`.

use crate::request::DecisionRequest;
use std::collections::HashMap;

/// Flat numeric feature map derived from a request. Always carries
/// `is_high_ticket`, `ip_country_mismatch`, `has_chargebacks` plus every
/// numeric/boolean key copied from `request.features`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedFeatures(pub HashMap<String, f64>);

impl DerivedFeatures {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.0.get(key).copied().unwrap_or(default)
    }
}

/// Derive features from a raw request. Pure, total, never errors: missing
/// or ill-typed fields yield `0.0` for the derived flags rather than an error.
pub fn extract_features(request: &DecisionRequest) -> DerivedFeatures {
    let mut out = HashMap::with_capacity(request.features.len() + 3);

    for (key, value) in &request.features {
        if let Some(n) = value.as_f64() {
            out.insert(key.clone(), n);
        } else if let Some(b) = value.as_bool() {
            out.insert(key.clone(), if b { 1.0 } else { 0.0 });
        }
        // Anything else (string, array, object, null) is dropped silently.
    }

    let is_high_ticket = if request.cart_total > 500.0 { 1.0 } else { 0.0 };
    out.insert("is_high_ticket".to_string(), is_high_ticket);

    let ip_country_mismatch = match (request.location_ip_country(), request.billing_country()) {
        (Some(ip), Some(billing)) if !ip.is_empty() && !billing.is_empty() => {
            if ip != billing {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    out.insert("ip_country_mismatch".to_string(), ip_country_mismatch);

    let has_chargebacks = if request.chargebacks_12m() > 0.0 { 1.0 } else { 0.0 };
    out.insert("has_chargebacks".to_string(), has_chargebacks);

    DerivedFeatures(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn req(value: serde_json::Value) -> DecisionRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn high_ticket_is_strict_inequality() {
        let at_threshold = extract_features(&req(json!({"cart_total": 500.0})));
        assert_eq!(at_threshold.get("is_high_ticket"), Some(0.0));

        let above_threshold = extract_features(&req(json!({"cart_total": 500.01})));
        assert_eq!(above_threshold.get("is_high_ticket"), Some(1.0));
    }

    #[test]
    fn country_mismatch_requires_both_present() {
        let neither = extract_features(&req(json!({"cart_total": 1.0})));
        assert_eq!(neither.get("ip_country_mismatch"), Some(0.0));

        let one_sided = extract_features(&req(json!({
            "cart_total": 1.0,
            "context": {"location_ip_country": "GB"}
        })));
        assert_eq!(one_sided.get("ip_country_mismatch"), Some(0.0));

        let mismatched = extract_features(&req(json!({
            "cart_total": 1.0,
            "context": {"location_ip_country": "GB", "billing_country": "US"}
        })));
        assert_eq!(mismatched.get("ip_country_mismatch"), Some(1.0));

        let matched = extract_features(&req(json!({
            "cart_total": 1.0,
            "context": {"location_ip_country": "US", "billing_country": "US"}
        })));
        assert_eq!(matched.get("ip_country_mismatch"), Some(0.0));
    }

    #[test]
    fn chargebacks_require_positive_count() {
        let none = extract_features(&req(json!({
            "cart_total": 1.0,
            "context": {"customer": {"chargebacks_12m": 0}}
        })));
        assert_eq!(none.get("has_chargebacks"), Some(0.0));

        let some = extract_features(&req(json!({
            "cart_total": 1.0,
            "context": {"customer": {"chargebacks_12m": 2}}
        })));
        assert_eq!(some.get("has_chargebacks"), Some(1.0));
    }

    #[test]
    fn non_numeric_feature_values_are_dropped() {
        let derived = extract_features(&req(json!({
            "cart_total": 1.0,
            "features": {"velocity_24h": 3.5, "label": "flagged", "present": true}
        })));
        assert_eq!(derived.get("velocity_24h"), Some(3.5));
        assert_eq!(derived.get("present"), Some(1.0));
        assert_eq!(derived.get("label"), None);
    }
}
