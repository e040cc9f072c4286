//! Runtime transports behind `FetchClient`.
//!
//! Inside a Spin component requests go through `spin_sdk::http::send`; native
//! builds (the CLI, tests against a live backend) use `reqwest`.

use std::rc::Rc;

use async_trait::async_trait;

use crate::client::FetchError;
use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::timeout::TimeoutConfig;

/// Sends a single request and returns the raw response.
///
/// Implementations must not treat non-2xx statuses as errors; that is the
/// client's decision.
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(
        &self,
        request: HttpRequest,
        timeout: &TimeoutConfig,
    ) -> Result<HttpResponse, FetchError>;
}

/// The transport for the current target.
pub fn default_transport() -> Result<Rc<dyn HttpTransport>, FetchError> {
    #[cfg(target_arch = "wasm32")]
    {
        Ok(Rc::new(SpinTransport))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Ok(Rc::new(ReqwestTransport::new(&TimeoutConfig::default())?))
    }
}

/// Transport backed by Spin's outbound HTTP.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinTransport;

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl HttpTransport for SpinTransport {
    async fn send(
        &self,
        request: HttpRequest,
        _timeout: &TimeoutConfig,
    ) -> Result<HttpResponse, FetchError> {
        use edge_core::Method;
        use spin_sdk::http::{IncomingResponse, Method as SpinMethod, Request};

        let method = match request.method {
            Method::Get => SpinMethod::Get,
            Method::Post => SpinMethod::Post,
            Method::Put => SpinMethod::Put,
            Method::Patch => SpinMethod::Patch,
            Method::Delete => SpinMethod::Delete,
            Method::Head => SpinMethod::Head,
            Method::Options => SpinMethod::Options,
        };

        let mut builder = Request::builder();
        builder.method(method).uri(&request.url);
        // Spin's request builder keeps one value per name.
        for (key, value) in fold_repeated(&request.headers) {
            builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder.body(body);
        }

        // Spin enforces its own outbound limits; no per-request timer in WASI here.
        let response: IncomingResponse = spin_sdk::http::send(builder.build())
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .entries()
            .into_iter()
            .map(|(k, v)| (k, String::from_utf8_lossy(&v).into_owned()))
            .collect();
        let body = response
            .into_body()
            .await
            .map_err(|e| FetchError::Connection(format!("response body: {:?}", e)))?;

        Ok(HttpResponse::new(status, headers, body))
    }
}

/// Merge repeated request headers into one comma-separated value per name,
/// in first-seen order. `cookie` values are joined with `; `.
pub fn fold_repeated(headers: &[(String, String)]) -> Vec<(String, String)> {
    let mut folded: Vec<(String, String)> = Vec::new();
    for (key, value) in headers {
        match folded.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some((k, existing)) => {
                let separator = if k.eq_ignore_ascii_case("cookie") { "; " } else { ", " };
                existing.push_str(separator);
                existing.push_str(value);
            }
            None => folded.push((key.clone(), value.clone())),
        }
    }
    folded
}

/// Transport backed by a shared `reqwest::Client`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl ReqwestTransport {
    /// Build a client whose connect timeout comes from `timeouts`.
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: HttpRequest,
        timeout: &TimeoutConfig,
    ) -> Result<HttpResponse, FetchError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(timeout.total);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(format!("{} after {:?}", request.url, timeout.total))
            } else if e.is_connect() {
                FetchError::Connection(e.to_string())
            } else {
                FetchError::Request(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))?
            .to_vec();

        Ok(HttpResponse::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_repeated_headers() {
        let headers = vec![
            ("Accept".to_string(), "text/html".to_string()),
            ("Cookie".to_string(), "a=1".to_string()),
            ("accept".to_string(), "*/*".to_string()),
            ("cookie".to_string(), "b=2".to_string()),
        ];
        assert_eq!(
            fold_repeated(&headers),
            vec![
                ("Accept".to_string(), "text/html, */*".to_string()),
                ("Cookie".to_string(), "a=1; b=2".to_string()),
            ]
        );
    }
}
