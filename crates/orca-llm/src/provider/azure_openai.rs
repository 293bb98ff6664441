//! Azure OpenAI provider (§4.5, §4.12 `AZURE_OPENAI_*`).

use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::{LLMError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const API_VERSION: &str = "2024-02-01";

/// A client for an Azure OpenAI chat-completions deployment.
pub struct AzureOpenAiProvider {
    endpoint: String,
    api_key: String,
    deployment: String,
    client: Client,
}

impl AzureOpenAiProvider {
    pub fn new(endpoint: String, api_key: String, deployment: String, timeout: Duration) -> Self {
        Self {
            endpoint,
            api_key,
            deployment,
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            API_VERSION
        )
    }
}

#[async_trait]
impl LLMClient for AzureOpenAiProvider {
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let mut body = json!({ "messages": messages });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }

        let resp = self
            .client
            .post(self.url())
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else {
                    LLMError::ApiCallFailed(e.to_string())
                }
            })?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(|e| LLMError::ApiCallFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(LLMError::ApiCallFailed(format!("Azure OpenAI error ({status}): {resp_text}")));
        }

        let resp_json: serde_json::Value =
            serde_json::from_str(&resp_text).map_err(|e| LLMError::InvalidResponse(e.to_string()))?;

        let content = resp_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LLMError::InvalidResponse("no content in response".to_string()))?
            .to_string();
        let finish_reason = resp_json["choices"][0]["finish_reason"].as_str().unwrap_or("stop").to_string();
        let tokens_used = resp_json["usage"]["total_tokens"].as_u64().unwrap_or(0) as u32;

        Ok(LLMResponse::new(content, request.model)
            .with_tokens(tokens_used)
            .with_finish_reason(finish_reason))
    }

    fn name(&self) -> &str {
        "azure_openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_includes_deployment_and_api_version() {
        let provider = AzureOpenAiProvider::new(
            "https://example.openai.azure.com/".to_string(),
            "key".to_string(),
            "gpt-4o-mini".to_string(),
            Duration::from_secs(10),
        );
        let url = provider.url();
        assert!(url.starts_with("https://example.openai.azure.com/openai/deployments/gpt-4o-mini/chat/completions"));
        assert!(url.contains("api-version=2024-02-01"));
    }
}
