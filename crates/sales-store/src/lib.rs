//! Supabase-backed stores for ohmysales.
//!
//! `SupabaseClient` talks to the PostgREST API of a Supabase project with the
//! public anon key and implements both `SaleSource` (the `sales` table) and
//! `VoteStore` (the `sale_ratings` table plus the `vote_hot`/`vote_cold` RPCs).

mod client;
mod config;

pub use client::{StoreSetupError, SupabaseClient};
pub use config::{ConfigError, SupabaseConfig};
