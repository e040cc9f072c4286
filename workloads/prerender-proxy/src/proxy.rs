//! Request routing and relaying.

use edge_core::{percent_encode, Method, RequestContext};
use edge_data::{DependencyTag, FetchClient, HttpRequest, HttpResponse};
use edge_observability::StructuredLogger;
use serde_json::json;

use crate::crawler::CrawlerMatcher;
use crate::settings::ProxySettings;

/// Explicit prerender endpoint.
pub const PRERENDER_API_PATH: &str = "/api/prerender";

/// Paths that are never prerendered.
const PASS_THROUGH_PREFIXES: &[&str] = &["/_next/", "/api/"];

/// Request headers not copied onto the forwarded request.
const HOP_BY_HOP: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "upgrade",
    "te",
    "trailer",
    "content-length",
];

/// How a request is served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRoute {
    /// `GET /api/prerender?url=...`.
    PrerenderApi,
    /// A crawler; the matched signature.
    Crawler(String),
    /// Forward to the app unchanged.
    PassThrough,
}

/// Prerender URL for a page: the service root followed by path and query.
pub fn prerender_url(service_url: &str, path_and_query: &str) -> String {
    let service = service_url.trim_end_matches('/');
    if path_and_query.starts_with('/') {
        format!("{}{}", service, path_and_query)
    } else {
        format!("{}/{}", service, path_and_query)
    }
}

/// The proxy for one request.
#[derive(Debug)]
pub struct PrerenderProxy {
    settings: ProxySettings,
    client: FetchClient,
    matcher: CrawlerMatcher,
}

impl PrerenderProxy {
    pub fn new(settings: ProxySettings, client: FetchClient) -> Self {
        let matcher = CrawlerMatcher::default().extend(&settings.extra_crawlers);
        Self {
            settings,
            client,
            matcher,
        }
    }

    pub fn route(&self, ctx: &RequestContext) -> ProxyRoute {
        if ctx.path == PRERENDER_API_PATH {
            return ProxyRoute::PrerenderApi;
        }
        if PASS_THROUGH_PREFIXES
            .iter()
            .any(|prefix| ctx.path.starts_with(prefix))
        {
            return ProxyRoute::PassThrough;
        }
        match self.matcher.matched(ctx.user_agent()) {
            Some(signature) => ProxyRoute::Crawler(signature.to_string()),
            None => ProxyRoute::PassThrough,
        }
    }

    /// Serve one request. Never fails; upstream problems become error responses.
    pub async fn handle(
        &self,
        ctx: &RequestContext,
        body: Vec<u8>,
        logger: &StructuredLogger,
    ) -> HttpResponse {
        match self.route(ctx) {
            ProxyRoute::PrerenderApi => self.prerender_api(ctx, logger).await,
            ProxyRoute::Crawler(signature) => {
                logger
                    .info_builder("Crawler detected")
                    .field("signature", signature)
                    .field("path", ctx.path.clone())
                    .emit();
                match &self.settings.prerender_token {
                    Some(token) => self.relay_snapshot(ctx, token, logger).await,
                    None => {
                        logger.warn("Prerender token not configured, serving the app instead");
                        self.pass_through(ctx, body, logger).await
                    }
                }
            }
            ProxyRoute::PassThrough => self.pass_through(ctx, body, logger).await,
        }
    }

    /// Fetch the snapshot of the requested page for a crawler.
    async fn relay_snapshot(
        &self,
        ctx: &RequestContext,
        token: &str,
        logger: &StructuredLogger,
    ) -> HttpResponse {
        let url = prerender_url(&self.settings.prerender_service_url, &ctx.path_and_query());
        let request = HttpRequest::get(url.clone())
            .header("X-Prerender-Token", token)
            .header("User-Agent", ctx.user_agent());

        match self.client.send(request, DependencyTag::Prerender).await {
            Ok(upstream) => {
                logger
                    .info_builder("Prerendered page relayed")
                    .field("url", url)
                    .field_i64("status", upstream.status as i64)
                    .emit();
                html(upstream.status, upstream.body, false)
            }
            Err(e) => {
                logger
                    .error_builder("Prerender service unreachable")
                    .field("url", url)
                    .field("error", e.to_string())
                    .emit();
                text(500, "Prerender service unavailable")
            }
        }
    }

    async fn prerender_api(&self, ctx: &RequestContext, logger: &StructuredLogger) -> HttpResponse {
        if ctx.method != Method::Get {
            return json_error(405, json!({ "error": "Method not allowed" }));
        }
        let Some(token) = &self.settings.prerender_token else {
            logger.error("Prerender token not configured");
            return json_error(
                500,
                json!({
                    "error": "PRERENDER_TOKEN not configured",
                    "message": "Set the prerender_token variable for this component",
                }),
            );
        };
        let Some(target) = ctx.query_param("url").filter(|u| !u.trim().is_empty()) else {
            return json_error(
                400,
                json!({
                    "error": "Missing URL parameter",
                    "message": "Usage: /api/prerender?url=https://ohmysales.app/sale/123",
                }),
            );
        };

        let url = prerender_url(&self.settings.prerender_service_url, &percent_encode(target));
        let request = HttpRequest::get(url).header("X-Prerender-Token", token.as_str());

        match self.client.send(request, DependencyTag::Prerender).await {
            Ok(upstream) if upstream.is_success() => html(200, upstream.body, true),
            Ok(upstream) => {
                logger
                    .warn_builder("Prerender service returned an error")
                    .field("target", target)
                    .field_i64("status", upstream.status as i64)
                    .emit();
                json_error(
                    upstream.status,
                    json!({ "error": "Prerender.io error", "status": upstream.status }),
                )
            }
            Err(e) => {
                logger
                    .error_builder("Prerender service unreachable")
                    .field("target", target)
                    .field("error", e.to_string())
                    .emit();
                json_error(
                    500,
                    json!({
                        "error": "Failed to fetch pre-rendered content",
                        "message": e.to_string(),
                    }),
                )
            }
        }
    }

    /// Forward the request to the app and relay its response.
    async fn pass_through(
        &self,
        ctx: &RequestContext,
        body: Vec<u8>,
        logger: &StructuredLogger,
    ) -> HttpResponse {
        let Some(origin) = &self.settings.origin_url else {
            logger.error("Origin not configured");
            return text(502, "Origin not configured");
        };

        let url = format!("{}{}", origin.trim_end_matches('/'), ctx.path_and_query());
        let mut request = HttpRequest::new(ctx.method, url.clone());
        for (key, value) in &ctx.headers {
            if !HOP_BY_HOP.contains(&key.to_ascii_lowercase().as_str()) {
                request = request.append_header(key.clone(), value.clone());
            }
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        match self.client.send(request, DependencyTag::Origin).await {
            Ok(mut upstream) => {
                upstream
                    .headers
                    .retain(|(k, _)| !HOP_BY_HOP.contains(&k.to_ascii_lowercase().as_str()));
                upstream
            }
            Err(e) => {
                logger
                    .error_builder("Origin unreachable")
                    .field("url", url)
                    .field("error", e.to_string())
                    .emit();
                text(502, "Bad gateway")
            }
        }
    }
}

fn html(status: u16, body: Vec<u8>, mark_prerendered: bool) -> HttpResponse {
    if mark_prerendered {
        HttpResponse::new(status, Vec::new(), body)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_header("x-prerender", "true")
    } else {
        HttpResponse::new(status, Vec::new(), body).with_header("content-type", "text/html")
    }
}

fn text(status: u16, message: &str) -> HttpResponse {
    HttpResponse::new(
        status,
        vec![("content-type".to_string(), "text/plain; charset=utf-8".to_string())],
        message.as_bytes().to_vec(),
    )
}

fn json_error(status: u16, body: serde_json::Value) -> HttpResponse {
    HttpResponse::new(
        status,
        vec![("content-type".to_string(), "application/json".to_string())],
        body.to_string().into_bytes(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use edge_data::{FetchError, HttpTransport, TimeoutConfig};
    use edge_observability::{LogSink, RequestId};
    use std::cell::RefCell;
    use std::rc::Rc;

    const GOOGLEBOT: &str = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
    const BROWSER: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/125.0";

    /// Records requests; answers with a fixed status, or fails when `status` is None.
    struct FakeUpstream {
        status: Option<u16>,
        body: &'static str,
        headers: Vec<(&'static str, &'static str)>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl FakeUpstream {
        fn answering(status: u16, body: &'static str) -> Rc<Self> {
            Self::answering_with(
                status,
                body,
                vec![
                    ("content-type", "text/html; charset=utf-8"),
                    ("transfer-encoding", "chunked"),
                ],
            )
        }

        fn answering_with(
            status: u16,
            body: &'static str,
            headers: Vec<(&'static str, &'static str)>,
        ) -> Rc<Self> {
            Rc::new(Self {
                status: Some(status),
                body,
                headers,
                seen: RefCell::new(Vec::new()),
            })
        }

        fn down() -> Rc<Self> {
            Rc::new(Self {
                status: None,
                body: "",
                headers: Vec::new(),
                seen: RefCell::new(Vec::new()),
            })
        }
    }

    #[async_trait(?Send)]
    impl HttpTransport for FakeUpstream {
        async fn send(
            &self,
            request: HttpRequest,
            _timeout: &TimeoutConfig,
        ) -> Result<HttpResponse, FetchError> {
            self.seen.borrow_mut().push(request);
            match self.status {
                Some(status) => Ok(HttpResponse::new(
                    status,
                    self.headers
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                    self.body.as_bytes().to_vec(),
                )),
                None => Err(FetchError::Connection("connection refused".into())),
            }
        }
    }

    fn settings(token: Option<&str>) -> ProxySettings {
        ProxySettings {
            prerender_token: token.map(String::from),
            origin_url: Some("https://app.ohmysales.test".to_string()),
            ..ProxySettings::default()
        }
    }

    fn proxy(settings: ProxySettings, upstream: Rc<FakeUpstream>) -> PrerenderProxy {
        PrerenderProxy::new(settings, FetchClient::with_transport(upstream))
    }

    fn logger() -> StructuredLogger {
        StructuredLogger::new(RequestId::from_string("test")).with_sink(LogSink::capture().0)
    }

    fn get(path: &str, user_agent: &str) -> RequestContext {
        RequestContext::new(Method::Get, path).with_headers([
            ("User-Agent", user_agent),
            ("Host", "ohmysales.app"),
            ("Accept-Language", "de-DE"),
        ])
    }

    #[test]
    fn test_prerender_url() {
        assert_eq!(
            prerender_url("https://service.prerender.io/", "/sale/42?ref=x"),
            "https://service.prerender.io/sale/42?ref=x"
        );
        assert_eq!(
            prerender_url("https://service.prerender.io", "https%3A%2F%2Fohmysales.app%2F"),
            "https://service.prerender.io/https%3A%2F%2Fohmysales.app%2F"
        );
    }

    #[test]
    fn test_routing() {
        let proxy = proxy(settings(Some("tok")), FakeUpstream::down());
        assert_eq!(proxy.route(&get("/sale/1", BROWSER)), ProxyRoute::PassThrough);
        assert_eq!(
            proxy.route(&get("/sale/1", GOOGLEBOT)),
            ProxyRoute::Crawler("googlebot".into())
        );
        assert_eq!(proxy.route(&get("/api/sales", GOOGLEBOT)), ProxyRoute::PassThrough);
        assert_eq!(proxy.route(&get("/_next/static/app.js", GOOGLEBOT)), ProxyRoute::PassThrough);
        assert_eq!(
            proxy.route(&get("/api/prerender?url=x", BROWSER)),
            ProxyRoute::PrerenderApi
        );
    }

    #[tokio::test]
    async fn test_crawler_gets_snapshot() {
        let upstream = FakeUpstream::answering(200, "<html>snapshot</html>");
        let proxy = proxy(settings(Some("tok")), upstream.clone());

        let response = proxy
            .handle(&get("/sale/42?ref=x", GOOGLEBOT), Vec::new(), &logger())
            .await;
        assert_eq!(response.status, 200);
        assert_eq!(response.text(), "<html>snapshot</html>");
        assert_eq!(response.header("content-type"), Some("text/html"));

        let seen = upstream.seen.borrow();
        assert_eq!(seen[0].url, "https://service.prerender.io/sale/42?ref=x");
        assert_eq!(seen[0].header_value("x-prerender-token"), Some("tok"));
        assert_eq!(seen[0].header_value("user-agent"), Some(GOOGLEBOT));
    }

    #[tokio::test]
    async fn test_crawler_snapshot_status_is_relayed() {
        let proxy = proxy(settings(Some("tok")), FakeUpstream::answering(404, "gone"));
        let response = proxy.handle(&get("/sale/old", GOOGLEBOT), Vec::new(), &logger()).await;
        assert_eq!(response.status, 404);
        assert_eq!(response.text(), "gone");
    }

    #[tokio::test]
    async fn test_crawler_with_service_down_is_500() {
        let proxy = proxy(settings(Some("tok")), FakeUpstream::down());
        let response = proxy.handle(&get("/", GOOGLEBOT), Vec::new(), &logger()).await;
        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn test_browser_is_forwarded_unchanged() {
        let upstream = FakeUpstream::answering(200, "<html>app</html>");
        let proxy = proxy(settings(Some("tok")), upstream.clone());

        let ctx = RequestContext::new(Method::Post, "/auth?next=%2F")
            .with_headers([("User-Agent", BROWSER), ("Host", "ohmysales.app")]);
        let response = proxy.handle(&ctx, b"email=a%40b.de".to_vec(), &logger()).await;

        assert_eq!(response.status, 200);
        assert!(response.header("transfer-encoding").is_none());
        let seen = upstream.seen.borrow();
        assert_eq!(seen[0].method, Method::Post);
        assert_eq!(seen[0].url, "https://app.ohmysales.test/auth?next=%2F");
        assert_eq!(seen[0].header_value("user-agent"), Some(BROWSER));
        assert!(seen[0].header_value("host").is_none());
        assert!(seen[0].header_value("x-prerender-token").is_none());
        assert_eq!(seen[0].body.as_deref(), Some(b"email=a%40b.de".as_slice()));
    }

    #[tokio::test]
    async fn test_pass_through_keeps_repeated_headers() {
        let upstream = FakeUpstream::answering_with(
            302,
            "",
            vec![
                ("location", "/"),
                ("set-cookie", "sb-access-token=abc; Path=/; HttpOnly"),
                ("set-cookie", "sb-refresh-token=def; Path=/; HttpOnly"),
                ("connection", "keep-alive"),
            ],
        );
        let proxy = proxy(settings(None), upstream.clone());

        let ctx = RequestContext::new(Method::Get, "/auth/callback").with_headers([
            ("User-Agent", BROWSER),
            ("Accept", "text/html"),
            ("Accept", "application/xhtml+xml"),
        ]);
        let response = proxy.handle(&ctx, Vec::new(), &logger()).await;

        assert_eq!(response.status, 302);
        assert_eq!(
            response.header_values("set-cookie").collect::<Vec<_>>(),
            vec![
                "sb-access-token=abc; Path=/; HttpOnly",
                "sb-refresh-token=def; Path=/; HttpOnly",
            ]
        );
        assert!(response.header("connection").is_none());

        let seen = upstream.seen.borrow();
        let accept: Vec<&str> = seen[0]
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("accept"))
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(accept, vec!["text/html", "application/xhtml+xml"]);
    }

    #[tokio::test]
    async fn test_crawler_without_token_gets_app() {
        let upstream = FakeUpstream::answering(200, "<html>app</html>");
        let proxy = proxy(settings(None), upstream.clone());
        let response = proxy.handle(&get("/", GOOGLEBOT), Vec::new(), &logger()).await;
        assert_eq!(response.status, 200);
        assert_eq!(upstream.seen.borrow()[0].url, "https://app.ohmysales.test/");
    }

    #[tokio::test]
    async fn test_origin_down_is_bad_gateway() {
        let proxy = proxy(settings(None), FakeUpstream::down());
        let response = proxy.handle(&get("/", BROWSER), Vec::new(), &logger()).await;
        assert_eq!(response.status, 502);
    }

    #[tokio::test]
    async fn test_api_requires_token_then_url() {
        let no_token = proxy(settings(None), FakeUpstream::down());
        let response = no_token
            .handle(&get("/api/prerender", BROWSER), Vec::new(), &logger())
            .await;
        assert_eq!(response.status, 500);

        let no_url = proxy(settings(Some("tok")), FakeUpstream::down());
        let response = no_url
            .handle(&get("/api/prerender", BROWSER), Vec::new(), &logger())
            .await;
        assert_eq!(response.status, 400);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["error"], "Missing URL parameter");
    }

    #[tokio::test]
    async fn test_api_fetches_encoded_url() {
        let upstream = FakeUpstream::answering(200, "<html>sale</html>");
        let proxy = proxy(settings(Some("tok")), upstream.clone());

        let response = proxy
            .handle(
                &get("/api/prerender?url=https%3A%2F%2Fohmysales.app%2Fsale%2F1", BROWSER),
                Vec::new(),
                &logger(),
            )
            .await;
        assert_eq!(response.status, 200);
        assert_eq!(response.header("x-prerender"), Some("true"));
        assert_eq!(response.header("content-type"), Some("text/html; charset=utf-8"));
        assert_eq!(
            upstream.seen.borrow()[0].url,
            "https://service.prerender.io/https%3A%2F%2Fohmysales.app%2Fsale%2F1"
        );
    }

    #[tokio::test]
    async fn test_api_relays_upstream_error_status() {
        let proxy = proxy(settings(Some("tok")), FakeUpstream::answering(429, "slow down"));
        let response = proxy
            .handle(&get("/api/prerender?url=https://x.test", BROWSER), Vec::new(), &logger())
            .await;
        assert_eq!(response.status, 429);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["status"], 429);
    }
}
