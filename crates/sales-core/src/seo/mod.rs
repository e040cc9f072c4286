//! Search engine support.

mod sitemap;

pub use sitemap::{ChangeFreq, SitemapBuilder, SitemapEntry, DEFAULT_BASE_URL};
