//! Listing parameters and the listing pipeline.

mod discount;
mod params;
mod pipeline;
mod summary;

pub use discount::extract_discount;
pub use params::{CategoryFilter, DiscountBand, ListingParams, RetailerFilter, SortKey};
pub use chrono_tz::Tz;
pub use pipeline::{ListingPipeline, DEFAULT_TIME_ZONE};
pub use summary::{listing_summary, retailers};
