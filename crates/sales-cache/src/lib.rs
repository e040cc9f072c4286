//! Typed key-value store for ohmysales.
//!
//! Values are stored as JSON, in memory or in a JSON file that survives
//! restarts (the CLI keeps its vote markers there).
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_cache::{cache_key, Cache};
//!
//! let cache = Cache::open_file(".ohmysales/votes.json")?;
//! cache.set(&cache_key!("vote", sale_id), &"hot")?;
//! let vote: Option<String> = cache.get(&cache_key!("vote", sale_id))?;
//! ```

mod error;
mod kv;

pub use error::CacheError;
pub use kv::Cache;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{cache_key, Cache, CacheError};
}
