//! Request handling for the sales endpoints.

use std::rc::Rc;

use async_trait::async_trait;
use chrono::NaiveDate;
use edge_core::{Method, RequestContext};
use edge_data::HttpResponse;
use edge_observability::StructuredLogger;
use sales_core::prelude::*;
use serde_json::json;

/// A source that is never reachable, used when the store is not configured.
#[derive(Debug, Clone)]
pub struct UnavailableSource(pub String);

#[async_trait(?Send)]
impl SaleSource for UnavailableSource {
    async fn fetch_sales(&self) -> Result<Vec<Sale>, SalesError> {
        Err(SalesError::Fetch(self.0.clone()))
    }
}

/// Sales endpoints over one sale source.
pub struct SalesApi {
    source: Rc<dyn SaleSource>,
    site_base_url: String,
    today: NaiveDate,
}

impl SalesApi {
    pub fn new(source: Rc<dyn SaleSource>, site_base_url: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            source,
            site_base_url: site_base_url.into(),
            today,
        }
    }

    pub async fn handle(&self, ctx: &RequestContext, logger: &StructuredLogger) -> HttpResponse {
        if !matches!(ctx.method, Method::Get | Method::Head) {
            return json_response(405, &json!({ "error": "Method not allowed" }))
                .with_header("allow", "GET, HEAD");
        }

        let mut response = match ctx.path.trim_end_matches('/') {
            "/api/sales" => self.listing(ctx, logger).await,
            "/api/retailers" => self.retailers(logger).await,
            "/sitemap.xml" => self.sitemap(logger).await,
            _ => json_response(404, &json!({ "error": "Not found" })),
        };
        if ctx.method == Method::Head {
            response.body.clear();
        }
        response
    }

    async fn listing(&self, ctx: &RequestContext, logger: &StructuredLogger) -> HttpResponse {
        let (params, rejected) = ListingParams::from_query(&ctx.query);
        for error in &rejected {
            logger
                .warn_builder("Ignoring listing parameter")
                .field("error", error.to_string())
                .emit();
        }

        let pipeline = ListingPipeline::new(self.today);
        let outcome = load_listing(self.source.as_ref(), &pipeline, &params, logger).await;
        if let ListingOutcome::Unavailable(_) = outcome {
            return json_response(503, &json!({ "error": "Sales are temporarily unavailable" }));
        }

        let sales = outcome.sales();
        json_response(
            200,
            &json!({
                "sales": sales,
                "count": sales.len(),
                "summary": listing_summary(sales.len(), &params),
                "params": params,
            }),
        )
        .with_header("cache-control", "public, max-age=60")
    }

    async fn retailers(&self, logger: &StructuredLogger) -> HttpResponse {
        match self.source.fetch_sales().await {
            Ok(sales) => json_response(200, &json!({ "retailers": retailers(&sales) })),
            Err(e) => {
                logger
                    .error_builder("Failed to fetch sales")
                    .field("error", e.to_string())
                    .emit();
                json_response(503, &json!({ "error": "Sales are temporarily unavailable" }))
            }
        }
    }

    /// Without sales the sitemap still lists the static pages.
    async fn sitemap(&self, logger: &StructuredLogger) -> HttpResponse {
        let sales = match self.source.fetch_sales().await {
            Ok(sales) => sales,
            Err(e) => {
                logger
                    .warn_builder("Rendering sitemap without sale pages")
                    .field("error", e.to_string())
                    .emit();
                Vec::new()
            }
        };

        let xml = SitemapBuilder::new(self.site_base_url.as_str(), self.today).render(&sales);
        HttpResponse::new(
            200,
            vec![
                ("content-type".to_string(), "application/xml; charset=utf-8".to_string()),
                ("cache-control".to_string(), "public, max-age=3600".to_string()),
            ],
            xml.into_bytes(),
        )
    }
}

fn json_response(status: u16, body: &serde_json::Value) -> HttpResponse {
    HttpResponse::new(
        status,
        vec![("content-type".to_string(), "application/json".to_string())],
        body.to_string().into_bytes(),
    )
}
