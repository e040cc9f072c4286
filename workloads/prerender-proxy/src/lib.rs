//! Prerender edge proxy.
//!
//! Sits in front of the single-page app. Requests from known crawlers are
//! answered with a prerendered snapshot from the prerender service; everyone
//! else is forwarded to the app unchanged. `GET /api/prerender?url=...` fetches
//! a snapshot for an explicit URL, for debugging and cache warming.

mod crawler;
mod proxy;
mod settings;

#[cfg(target_arch = "wasm32")]
mod component;

pub use crawler::{CrawlerMatcher, CRAWLER_SIGNATURES};
pub use proxy::{prerender_url, PrerenderProxy, ProxyRoute, PRERENDER_API_PATH};
pub use settings::{ProxySettings, DEFAULT_PRERENDER_SERVICE_URL};
