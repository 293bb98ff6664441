//! Mock LLM provider for testing the explanation overlay without network access.

use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::Result;
use async_trait::async_trait;

pub struct MockProvider {
    default_response: String,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            default_response: r#"{"explanation":"Mock explanation.","confidence":0.9,"key_factors":["BASELINE"]}"#
                .to_string(),
        }
    }

    pub fn with_response(response: String) -> Self {
        Self { default_response: response }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for MockProvider {
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse> {
        Ok(LLMResponse::new(self.default_response.clone(), request.model)
            .with_tokens(10)
            .with_finish_reason("stop".to_string()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_configured_response() {
        let provider = MockProvider::with_response("custom".to_string());
        let request = LLMRequest::new("prompt".to_string(), "mock-model".to_string());
        let response = provider.call(request).await.unwrap();
        assert_eq!(response.content, "custom");
    }
}
