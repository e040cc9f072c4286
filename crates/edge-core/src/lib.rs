//! Core request abstractions shared by the ohmysales edge components.
//!
//! This crate provides:
//! - `RequestId` - Unique request identifier for log correlation
//! - `RequestContext` - Typed path, query and header access
//! - Query-string helpers (`parse_query_string`, `percent_decode`, `percent_encode`)

mod context;
mod query;

pub use context::*;
pub use query::*;
