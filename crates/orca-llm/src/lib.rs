//! Optional LLM explanation overlay for the Orca decision engine (§4.5).
//!
//! A decision is always explainable without this crate: `orca-core` composes
//! a deterministic narrative from reason codes alone. When an LLM provider is
//! configured, this crate asks it for a richer customer-facing explanation
//! and runs the result through a guardrail pipeline before trusting it.
//! Any failure — the provider being unreachable, timing out, or producing
//! something the guardrail rejects — falls back to the deterministic text.

pub mod client;
pub mod error;
pub mod explainer;
pub mod guardrail;
pub mod provider;

pub use client::{LLMClient, LLMRequest, LLMResponse};
pub use error::{LLMError, Result};
pub use explainer::{ExplainerConfig, ExplanationOutcome, LlmExplainer, Provenance};
pub use guardrail::{ExplanationPayload, ValidationResult};
pub use provider::{AzureOpenAiProvider, MockProvider};
