//! CloudEvent envelopes, embedded contract validation, and the
//! at-least-once event emitter used by the Orca decision engine (§4.8,
//! §4.11).

pub mod emitter;
pub mod envelope;
pub mod error;
pub mod validator;

pub use emitter::{EventEmitter, RetryPolicy};
pub use envelope::{build_event, validate_trace_id, CloudEvent, EventKind};
pub use error::{EventsError, Result};
pub use validator::{ContractValidator, SchemaKind, ValidationIssue};
