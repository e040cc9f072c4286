//! Proxy settings from Spin variables.

/// Public prerender service endpoint.
pub const DEFAULT_PRERENDER_SERVICE_URL: &str = "https://service.prerender.io";

/// Runtime settings of the proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxySettings {
    /// Account token sent as `X-Prerender-Token`.
    pub prerender_token: Option<String>,
    pub prerender_service_url: String,
    /// Where non-crawler traffic goes.
    pub origin_url: Option<String>,
    /// Comma-separated crawler signatures added to the built-in list.
    pub extra_crawlers: Vec<String>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            prerender_token: None,
            prerender_service_url: DEFAULT_PRERENDER_SERVICE_URL.to_string(),
            origin_url: None,
            extra_crawlers: Vec::new(),
        }
    }
}

impl ProxySettings {
    /// Read settings through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            prerender_token: get("prerender_token"),
            prerender_service_url: get("prerender_service_url")
                .unwrap_or_else(|| DEFAULT_PRERENDER_SERVICE_URL.to_string()),
            origin_url: get("origin_url"),
            extra_crawlers: get("crawler_signatures")
                .map(|list| list.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
        }
    }

    /// Read settings from the component's Spin variables.
    #[cfg(target_arch = "wasm32")]
    pub fn from_spin() -> Self {
        Self::from_lookup(|name| spin_sdk::variables::get(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let settings = ProxySettings::from_lookup(|_| None);
        assert_eq!(settings, ProxySettings::default());
    }

    #[test]
    fn test_from_lookup() {
        let vars = HashMap::from([
            ("prerender_token", "tok"),
            ("origin_url", "https://app.example "),
            ("prerender_service_url", ""),
            ("crawler_signatures", "slackbot, discordbot"),
        ]);
        let settings = ProxySettings::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(settings.prerender_token.as_deref(), Some("tok"));
        assert_eq!(settings.origin_url.as_deref(), Some("https://app.example"));
        assert_eq!(settings.prerender_service_url, DEFAULT_PRERENDER_SERVICE_URL);
        assert_eq!(settings.extra_crawlers, vec!["slackbot", "discordbot"]);
    }
}
