//! HTTP response handling.

use serde::de::DeserializeOwned;

use crate::client::FetchError;

/// An HTTP response as returned by a transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The response headers in arrival order; a name may repeat (`set-cookie`).
    pub headers: Vec<(String, String)>,
    /// The response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a new response.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body).map_err(|e| FetchError::Deserialization(e.to_string()))
    }

    /// Add a header, keeping any existing values under the same name.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Get the first value of a header (case-insensitive).
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// All values of a header, in arrival order.
    pub fn header_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Convert to a Result, returning an error for non-2xx status codes.
    pub fn error_for_status(self, url: &str) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::Http {
                status: self.status,
                url: url.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        let ok = HttpResponse::new(204, Vec::new(), Vec::new());
        assert!(ok.is_success());
        let missing = HttpResponse::new(404, Vec::new(), Vec::new());
        assert!(!missing.is_success());
        assert!(matches!(
            missing.error_for_status("https://x"),
            Err(FetchError::Http { status: 404, .. })
        ));
    }

    #[test]
    fn test_json_and_headers() {
        let resp = HttpResponse::new(
            200,
            vec![("Content-Type".to_string(), "application/json".to_string())],
            br#"{"hot_votes":3}"#.to_vec(),
        );
        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["hot_votes"], 3);
        assert_eq!(resp.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_repeated_headers() {
        let resp = HttpResponse::new(200, Vec::new(), Vec::new())
            .with_header("Set-Cookie", "a=1")
            .with_header("set-cookie", "b=2");
        assert_eq!(resp.header("set-cookie"), Some("a=1"));
        assert_eq!(resp.header_values("SET-COOKIE").collect::<Vec<_>>(), vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_json_error_is_deserialization() {
        let resp = HttpResponse::new(200, Vec::new(), b"<html>".to_vec());
        let result: Result<serde_json::Value, _> = resp.json();
        assert!(matches!(result, Err(FetchError::Deserialization(_))));
    }
}
