//! Observability infrastructure for ohmysales.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging with request context
//! - `LogBuilder` - Fluent typed fields for a single entry
//! - `LogSink` - Where entries go (stderr, or an in-memory capture for tests)

mod logging;

pub use logging::*;

// Re-export RequestId from edge-core for convenience
pub use edge_core::RequestId;
