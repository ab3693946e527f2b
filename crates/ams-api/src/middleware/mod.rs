//! # Middleware Stack
//!
//! Tower middleware for the API layer:
//! - `TraceLayer`: request/response tracing (applied in `lib.rs`).
//! - [`metrics`]: Prometheus-compatible request metrics.

pub mod metrics;
