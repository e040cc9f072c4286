//! Platform fetch client with dependency tagging.

use std::collections::HashMap;
use std::rc::Rc;

use edge_core::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::dependency::DependencyTag;
use crate::request::HttpRequest;
use crate::response::HttpResponse;
use crate::timeout::TimeoutConfig;
use crate::transport::{default_transport, HttpTransport};

/// Error type for fetch operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Request error: {0}")]
    Request(String),
}

impl FetchError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Fetch client for outbound requests.
///
/// Resolves paths against an optional base URL, attaches default headers and
/// applies the timeout of the dependency each call is tagged with.
#[derive(Clone)]
pub struct FetchClient {
    transport: Rc<dyn HttpTransport>,
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
    timeouts: HashMap<DependencyTag, TimeoutConfig>,
}

impl FetchClient {
    /// Create a client on the platform's default transport.
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self::with_transport(default_transport()?))
    }

    /// Create a client on an explicit transport.
    pub fn with_transport(transport: Rc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            base_url: None,
            default_headers: HashMap::new(),
            timeouts: HashMap::new(),
        }
    }

    /// Prepend `base_url` to relative paths.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a header sent with every request.
    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Override the timeout used for one dependency.
    pub fn with_timeout(mut self, tag: DependencyTag, timeout: TimeoutConfig) -> Self {
        self.timeouts.insert(tag, timeout);
        self
    }

    /// Timeout applied to calls tagged with `tag`.
    pub fn timeout_for(&self, tag: DependencyTag) -> TimeoutConfig {
        self.timeouts
            .get(&tag)
            .cloned()
            .unwrap_or_else(|| TimeoutConfig::for_tag(tag))
    }

    /// Build a request for `url` with default headers applied.
    pub fn request(&self, method: Method, url: &str) -> HttpRequest {
        let mut request = HttpRequest::new(method, self.resolve(url));
        for (key, value) in &self.default_headers {
            request = request.header(key.clone(), value.clone());
        }
        request
    }

    /// Send a request and return the raw response, whatever its status.
    pub async fn send(
        &self,
        request: HttpRequest,
        tag: DependencyTag,
    ) -> Result<HttpResponse, FetchError> {
        let timeout = self.timeout_for(tag);
        self.transport.send(request, &timeout).await
    }

    /// GET `url` and decode a JSON body; non-2xx is an error.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        tag: DependencyTag,
    ) -> Result<T, FetchError> {
        let request = self
            .request(Method::Get, url)
            .header("accept", "application/json");
        let full_url = request.url.clone();
        self.send(request, tag)
            .await?
            .error_for_status(&full_url)?
            .json()
    }

    /// POST a JSON body to `url` and decode the JSON reply; non-2xx is an error.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        tag: DependencyTag,
    ) -> Result<T, FetchError> {
        let request = self
            .request(Method::Post, url)
            .header("accept", "application/json")
            .json(body)?;
        let full_url = request.url.clone();
        self.send(request, tag)
            .await?
            .error_for_status(&full_url)?
            .json()
    }

    fn resolve(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !url.starts_with("http://") && !url.starts_with("https://") => {
                format!("{}{}", base.trim_end_matches('/'), url)
            }
            _ => url.to_string(),
        }
    }
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers.keys().collect::<Vec<_>>())
            .finish()
    }
}
