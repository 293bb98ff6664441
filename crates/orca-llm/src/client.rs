//! LLM client interface and types.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request to an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMRequest {
    pub prompt: String,
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system: Option<String>,
}

impl LLMRequest {
    pub fn new(prompt: String, model: String) -> Self {
        Self {
            prompt,
            model,
            max_tokens: None,
            temperature: None,
            system: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_system(mut self, system: String) -> Self {
        self.system = Some(system);
        self
    }
}

/// Response from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub model: String,
    pub tokens_used: u32,
    pub finish_reason: String,
}

impl LLMResponse {
    pub fn new(content: String, model: String) -> Self {
        Self {
            content,
            model,
            tokens_used: 0,
            finish_reason: "stop".to_string(),
        }
    }

    pub fn with_tokens(mut self, tokens: u32) -> Self {
        self.tokens_used = tokens;
        self
    }

    pub fn with_finish_reason(mut self, reason: String) -> Self {
        self.finish_reason = reason;
        self
    }
}

/// Async LLM client trait. Implementations must apply their own timeout
/// (§4.5: "all paths complete within the configured timeout; timeout counts
/// as unavailable").
#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse>;

    fn name(&self) -> &str;
}
