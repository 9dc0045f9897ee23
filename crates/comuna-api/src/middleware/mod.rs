//! # Middleware Stack
//!
//! Tower middleware for the API layer:
//! - [`envelope`]: per-request correlation identifier plus error
//!   normalization into the uniform JSON envelope.
//! - [`metrics`]: Prometheus-compatible request metrics.

pub mod envelope;
pub mod metrics;
