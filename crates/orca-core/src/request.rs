//! Inbound decision request types (§3 DecisionRequest)

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashMap;

/// Payment clearing rail used by the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rail {
    Card,
    ACH,
}

impl Default for Rail {
    fn default() -> Self {
        Rail::Card
    }
}

impl Rail {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rail::Card => "Card",
            Rail::ACH => "ACH",
        }
    }
}

/// Point of sale for the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Online,
    Pos,
}

impl Default for Channel {
    fn default() -> Self {
        Channel::Online
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Raw checkout decision request as received from a caller (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub cart_total: f64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub rail: Rail,

    #[serde(default)]
    pub channel: Channel,

    /// Behavioral/numeric-or-boolean feature inputs, e.g. `velocity_24h`.
    #[serde(default)]
    pub features: HashMap<String, Json>,

    /// Nested context: location, payment method, customer history.
    #[serde(default)]
    pub context: Json,
}

impl DecisionRequest {
    /// Validate request shape and enum membership (§4.9 step 1, §7 VALIDATION_ERROR).
    pub fn validate(&self) -> Result<(), String> {
        if !self.cart_total.is_finite() || self.cart_total < 0.0 {
            return Err("cart_total must be a non-negative, finite amount".to_string());
        }
        if self.currency.trim().is_empty() {
            return Err("currency must not be empty".to_string());
        }
        if !self.context.is_null() && !self.context.is_object() {
            return Err("context must be an object".to_string());
        }
        Ok(())
    }

    fn context_obj(&self) -> Option<&serde_json::Map<String, Json>> {
        self.context.as_object()
    }

    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context_obj()?.get(key)?.as_str()
    }

    pub fn context_bool(&self, key: &str) -> Option<bool> {
        self.context_obj()?.get(key)?.as_bool()
    }

    pub fn context_number(&self, key: &str) -> Option<f64> {
        self.context_obj()?.get(key)?.as_f64()
    }

    fn customer(&self) -> Option<&serde_json::Map<String, Json>> {
        self.context_obj()?.get("customer")?.as_object()
    }

    pub fn chargebacks_12m(&self) -> f64 {
        self.customer()
            .and_then(|c| c.get("chargebacks_12m"))
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    pub fn loyalty_tier(&self) -> Option<&str> {
        self.customer()?.get("loyalty_tier")?.as_str()
    }

    pub fn customer_age_days(&self) -> Option<f64> {
        self.customer()?.get("age_days")?.as_f64()
    }

    pub fn item_count(&self) -> f64 {
        self.context_number("item_count").unwrap_or(1.0)
    }

    pub fn location_ip_country(&self) -> Option<&str> {
        self.context_str("location_ip_country")
    }

    pub fn billing_country(&self) -> Option<&str> {
        self.context_str("billing_country")
    }

    pub fn location_mismatch_flag(&self) -> bool {
        self.context_bool("location_mismatch").unwrap_or(false)
    }

    /// `payment_method` may be a bare string or `{"type": "..."}`.
    pub fn payment_method(&self) -> Option<String> {
        let pm = self.context_obj()?.get("payment_method")?;
        if let Some(s) = pm.as_str() {
            return Some(s.to_string());
        }
        pm.as_object()?.get("type")?.as_str().map(|s| s.to_string())
    }

    pub fn feature_number(&self, key: &str) -> Option<f64> {
        let v = self.features.get(key)?;
        if let Some(n) = v.as_f64() {
            return Some(n);
        }
        v.as_bool().map(|b| if b { 1.0 } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply() {
        let req: DecisionRequest = serde_json::from_value(json!({"cart_total": 10.0})).unwrap();
        assert_eq!(req.currency, "USD");
        assert_eq!(req.rail, Rail::Card);
        assert_eq!(req.channel, Channel::Online);
    }

    #[test]
    fn negative_cart_total_fails_validation() {
        let req: DecisionRequest = serde_json::from_value(json!({"cart_total": -1.0})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn payment_method_accepts_string_or_struct() {
        let req: DecisionRequest = serde_json::from_value(json!({
            "cart_total": 1.0,
            "context": {"payment_method": "visa"}
        }))
        .unwrap();
        assert_eq!(req.payment_method().as_deref(), Some("visa"));

        let req2: DecisionRequest = serde_json::from_value(json!({
            "cart_total": 1.0,
            "context": {"payment_method": {"type": "ach"}}
        }))
        .unwrap();
        assert_eq!(req2.payment_method().as_deref(), Some("ach"));
    }
}
