//! Sales API component.
//!
//! Routes:
//! - `GET /api/sales` - the listing for the filters in the query string
//! - `GET /api/retailers` - distinct retailer names for the filter picker
//! - `GET /sitemap.xml` - sitemap of the homepage, auth page and active sales

mod api;
mod settings;

#[cfg(target_arch = "wasm32")]
mod component;

pub use api::{SalesApi, UnavailableSource};
pub use settings::ApiSettings;
