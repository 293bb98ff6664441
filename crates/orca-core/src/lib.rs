//! Orca Core - deterministic pipeline stages of the checkout decision engine.
//!
//! This crate covers the parts of the pipeline that never touch a network or
//! a filesystem: request validation, feature extraction, rule evaluation,
//! decision aggregation, deterministic explanation, and AP2 contract
//! assembly. The optional risk model, LLM overlay, signing, and event
//! emission live in their own crates and are wired together by
//! `orca-engine`.

pub mod aggregator;
pub mod contract;
pub mod decision;
pub mod error;
pub mod explanation;
pub mod features;
pub mod request;
pub mod response;
pub mod rules;

pub use aggregator::{aggregate, AggregatedDecision};
pub use contract::{build_contract, DecisionContract};
pub use decision::{Decision, RoutingHint, Status};
pub use error::{CoreError, Result};
pub use explanation::{compose_explanation, compose_human_explanation};
pub use features::{extract_features, DerivedFeatures};
pub use request::{Channel, DecisionRequest, Rail};
pub use response::{DecisionResponse, MetaStructured};
pub use rules::{Rule, RuleOutcome, RuleRegistry};
