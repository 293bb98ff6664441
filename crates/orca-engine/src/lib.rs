//! Decision Orchestrator (§4.9): binds `orca-core`, `orca-risk`,
//! `orca-llm`, `orca-signing` and `orca-events` into a single
//! `DecisionEngine`, plus the process-wide configuration snapshot and
//! engine-level error taxonomy.

pub mod engine;
pub mod error;
pub mod settings;

pub use engine::{DecisionEngine, DecisionOutcome, MODEL_NAME};
pub use error::{EngineError, Result};
pub use settings::{DecisionMode, OrcaSettings};
