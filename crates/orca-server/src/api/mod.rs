//! REST API: decision endpoint, audit subscriber sink, health check.

mod handlers;
mod router;
pub mod types;


pub use router::create_router;
pub use types::AppState;
