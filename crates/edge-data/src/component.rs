//! Conversions between Spin's HTTP types and the platform's.
//!
//! Components take the streaming `IncomingRequest`/`ResponseOutparam` pair so
//! repeated headers (several `set-cookie` lines) survive in both directions.

use edge_core::{Method, RequestContext};
use futures::SinkExt;
use spin_sdk::http::{Fields, IncomingRequest, Method as SpinMethod, OutgoingResponse, ResponseOutparam};

use crate::client::FetchError;
use crate::response::HttpResponse;

/// Build a `RequestContext` for an incoming Spin request.
///
/// Methods the platform does not model (CONNECT, TRACE, extensions) are
/// reported as `None` so the component can answer 405.
pub fn request_context(req: &IncomingRequest) -> Option<RequestContext> {
    let method = match req.method() {
        SpinMethod::Get => Method::Get,
        SpinMethod::Post => Method::Post,
        SpinMethod::Put => Method::Put,
        SpinMethod::Delete => Method::Delete,
        SpinMethod::Patch => Method::Patch,
        SpinMethod::Head => Method::Head,
        SpinMethod::Options => Method::Options,
        _ => return None,
    };
    let path_with_query = req.path_with_query().unwrap_or_else(|| "/".to_string());
    let headers = req
        .headers()
        .entries()
        .into_iter()
        .map(|(k, v)| (k, String::from_utf8_lossy(&v).into_owned()));

    Some(RequestContext::new(method, path_with_query).with_headers(headers))
}

/// Read the whole request body.
pub async fn request_body(req: IncomingRequest) -> Result<Vec<u8>, FetchError> {
    req.into_body()
        .await
        .map_err(|e| FetchError::Connection(format!("request body: {:?}", e)))
}

/// Send a platform response through Spin, tagging it with the request id.
pub async fn send_response(
    response_out: ResponseOutparam,
    response: HttpResponse,
    ctx: Option<&RequestContext>,
) -> Result<(), FetchError> {
    let mut header_list: Vec<(String, Vec<u8>)> = response
        .headers
        .into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.into_bytes()))
        .collect();
    if let Some(ctx) = ctx {
        header_list.push(("x-request-id".to_owned(), ctx.request_id.to_string().into_bytes()));
    }

    let headers = Fields::from_list(&header_list)
        .map_err(|e| FetchError::Request(format!("response headers: {:?}", e)))?;
    let outgoing = OutgoingResponse::new(headers);
    outgoing
        .set_status_code(response.status)
        .map_err(|_| FetchError::Request(format!("invalid status {}", response.status)))?;

    let mut body = outgoing.take_body();
    response_out.set(outgoing);
    if !response.body.is_empty() {
        body.send(response.body)
            .await
            .map_err(|e| FetchError::Connection(format!("response body: {:?}", e)))?;
    }
    Ok(())
}
