//! Spin HTTP entry point.

use edge_core::RequestContext;
use edge_data::component::{request_body, request_context, send_response};
use edge_data::{FetchClient, HttpResponse};
use edge_observability::{RequestId, StructuredLogger};
use spin_sdk::http::{IncomingRequest, ResponseOutparam};
use spin_sdk::http_component;

use crate::{PrerenderProxy, ProxySettings};

#[http_component]
async fn handle_prerender_proxy(req: IncomingRequest, response_out: ResponseOutparam) {
    let Some(ctx) = request_context(&req) else {
        let logger = StructuredLogger::new(RequestId::generate()).with_component("prerender-proxy");
        logger.warn("Unsupported method");
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
        .with_component("prerender-proxy")
        .with_route(ctx.path.clone());

    let response = match request_body(req).await {
        Ok(body) => serve(&ctx, body, &logger).await,
        Err(e) => {
            logger
                .warn_builder("Failed to read request body")
                .field("error", e.to_string())
                .emit();
            HttpResponse::new(400, Vec::new(), Vec::new())
        }
    };

    logger
        .info_builder("Request served")
        .field("method", ctx.method.as_str())
        .field_i64("status", response.status as i64)
        .emit();

    if let Err(e) = send_response(response_out, response, Some(&ctx)).await {
        logger
            .error_builder("Failed to send response")
            .field("error", e.to_string())
            .emit();
    }
}

async fn serve(
    ctx: &RequestContext,
    body: Vec<u8>,
    logger: &StructuredLogger,
) -> HttpResponse {
    match FetchClient::new() {
        Ok(client) => {
            PrerenderProxy::new(ProxySettings::from_spin(), client)
                .handle(ctx, body, logger)
                .await
        }
        Err(e) => {
            logger
                .error_builder("Fetch client unavailable")
                .field("error", e.to_string())
                .emit();
            HttpResponse::new(502, Vec::new(), Vec::new())
        }
    }
}
