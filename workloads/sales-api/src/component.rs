//! Spin HTTP entry point.

use std::rc::Rc;

use edge_data::component::{request_context, send_response};
use edge_data::HttpResponse;
use edge_observability::{RequestId, StructuredLogger};
use sales_core::listing::ListingPipeline;
use sales_core::source::SaleSource;
use sales_store::SupabaseClient;
use spin_sdk::http::{IncomingRequest, ResponseOutparam};
use spin_sdk::http_component;

use crate::{ApiSettings, SalesApi, UnavailableSource};

#[http_component]
async fn handle_sales_api(req: IncomingRequest, response_out: ResponseOutparam) {
    let Some(ctx) = request_context(&req) else {
        let logger = StructuredLogger::new(RequestId::generate()).with_component("sales-api");
        let response = HttpResponse::new(405, Vec::new(), Vec::new());
        if let Err(e) = send_response(response_out, response, None).await {
            logger
                .error_builder("Failed to send response")
                .field("error", e.to_string())
                .emit();
        }
        return;
    };

    let logger = StructuredLogger::new(ctx.request_id.clone())
        .with_component("sales-api")
        .with_route(ctx.path.clone());

    let settings = ApiSettings::from_spin();
    let source: Rc<dyn SaleSource> = match SupabaseClient::new(&settings.supabase) {
        Ok(client) => Rc::new(client),
        Err(e) => {
            logger
                .error_builder("Sale store not available")
                .field("error", e.to_string())
                .emit();
            Rc::new(UnavailableSource(e.to_string()))
        }
    };

    let today = ListingPipeline::today_in(settings.time_zone);
    let api = SalesApi::new(source, settings.site_base_url, today);
    let response = api.handle(&ctx, &logger).await;

    logger
        .info_builder("Request served")
        .field_i64("status", response.status as i64)
        .emit();

    if let Err(e) = send_response(response_out, response, Some(&ctx)).await {
        logger
            .error_builder("Failed to send response")
            .field("error", e.to_string())
            .emit();
    }
}
