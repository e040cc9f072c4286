//! Sale listing domain for ohmysales.
//!
//! This crate provides the listing side of the site:
//!
//! - **Catalog**: `Sale` records, expiry, discount extraction, category labels
//! - **Listing**: filter/sort/search parameters and the deterministic listing pipeline
//! - **Source**: the `SaleSource` seam and the fetch-then-filter `load_listing`
//! - **SEO**: sitemap generation for active sales
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_core::prelude::*;
//!
//! let (params, _rejected) = ListingParams::from_query_string("q=zara&discount=40-50");
//! let visible = ListingPipeline::new(ListingPipeline::today()).apply(&sales, &params);
//! ```

pub mod error;
pub mod ids;

pub mod catalog;
pub mod listing;
pub mod seo;
pub mod source;

pub use error::SalesError;
pub use ids::SaleId;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::SalesError;
    pub use crate::ids::SaleId;

    // Catalog
    pub use crate::catalog::{category_label, Sale, KNOWN_CATEGORIES};

    // Listing
    pub use crate::listing::{
        extract_discount, listing_summary, retailers, CategoryFilter, DiscountBand,
        ListingParams, ListingPipeline, RetailerFilter, SortKey, Tz, DEFAULT_TIME_ZONE,
    };

    // Source
    pub use crate::source::{load_listing, ListingOutcome, SaleSource};

    // SEO
    pub use crate::seo::{ChangeFreq, SitemapBuilder, SitemapEntry, DEFAULT_BASE_URL};
}
