//! Data access layer with dependency tagging and timeouts.
//!
//! This crate provides:
//! - `FetchClient` - Outbound requests with base URL, default headers and per-dependency timeouts
//! - `DependencyTag` - Semantic dependency categories
//! - `TimeoutConfig` - Per-dependency timeouts
//! - `HttpTransport` - The seam between the client and the runtime (Spin or reqwest)
//! - `component` - Spin request/response conversions for HTTP components (wasm32 only)

mod client;
#[cfg(target_arch = "wasm32")]
pub mod component;
mod dependency;
mod request;
mod response;
mod timeout;
mod transport;

pub use client::*;
pub use dependency::*;
pub use request::*;
pub use response::*;
pub use timeout::*;
pub use transport::*;
