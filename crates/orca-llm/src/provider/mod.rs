//! LLM provider implementations.

mod azure_openai;
mod mock;

pub use azure_openai::AzureOpenAiProvider;
pub use mock::MockProvider;
