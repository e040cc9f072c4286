//! Connection settings for a Supabase project.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder shipped in example environment files.
const PLACEHOLDER_URL: &str = "YOUR_SUPABASE_URL";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Supabase URL is missing")]
    MissingUrl,

    #[error("Supabase URL must start with http:// or https://, got {0:?}")]
    InvalidUrl(String),

    #[error("Supabase anon key is missing")]
    MissingKey,
}

/// Project URL and public anon key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// Check that both values are present and the URL is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if url == PLACEHOLDER_URL || !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(url.to_string()));
        }
        if self.anon_key.trim().is_empty() {
            return Err(ConfigError::MissingKey);
        }
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.validate().is_ok()
    }

    /// Base URL of the REST API.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url.trim().trim_end_matches('/'))
    }
}
