//! Orca Decision Engine HTTP Server
//!
//! Provides the REST decision API, the audit subscriber sink, and the
//! health endpoint as components usable from tests and `main`.

pub mod api;
pub mod audit;
pub mod config;
pub mod error;
