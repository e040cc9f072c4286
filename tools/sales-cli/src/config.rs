//! CLI configuration.

use anyhow::{Context, Result};
use edge_observability::{LogFormat, LogLevel};
use sales_core::listing::{Tz, DEFAULT_TIME_ZONE};
use sales_core::seo::DEFAULT_BASE_URL;
use sales_rating::DEFAULT_VOTE_TIMEOUT;
use sales_store::SupabaseConfig;
use serde::{Deserialize, Serialize};

/// File names looked up from the working directory upwards.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["ohmysales.toml", ".ohmysales.toml", "ohmysales.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Supabase project.
    #[serde(default)]
    pub supabase: SupabaseConfig,

    /// Public site settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Local vote bookkeeping.
    #[serde(default)]
    pub votes: VotesConfig,

    /// Diagnostics.
    #[serde(default)]
    pub log: LogConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::parse(path, &content)
    }

    fn parse(path: &str, content: &str) -> Result<Self> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Let `SUPABASE_URL` and `SUPABASE_ANON_KEY` win over the file.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("SUPABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.supabase.url = url;
        }
        if let Some(key) = lookup("SUPABASE_ANON_KEY").filter(|v| !v.trim().is_empty()) {
            self.supabase.anon_key = key;
        }
        self
    }
}

/// Public site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute origin used in sitemap URLs.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// IANA zone whose calendar decides when a sale has ended.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.name().to_string()
}

impl SiteConfig {
    pub fn time_zone(&self) -> Result<Tz> {
        self.time_zone
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid site.time_zone: {}", self.time_zone))
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            time_zone: default_time_zone(),
        }
    }
}

/// Local vote bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotesConfig {
    /// JSON file remembering this machine's vote per sale. Relative paths
    /// resolve against the config file's directory, or the home directory
    /// when there is no config file.
    #[serde(default = "default_marker_file")]
    pub marker_file: String,

    /// Seconds a vote may take before it counts as failed.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_marker_file() -> String {
    ".ohmysales/votes.json".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_VOTE_TIMEOUT.as_secs()
}

impl Default for VotesConfig {
    fn default() -> Self {
        Self {
            marker_file: default_marker_file(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Diagnostics written to stderr.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum level: trace, debug, info, warn or error.
    #[serde(default = "default_level")]
    pub level: String,

    /// `human` or `json`.
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "human".to_string()
}

impl LogConfig {
    pub fn level(&self) -> Result<LogLevel> {
        self.level
            .parse()
            .with_context(|| format!("Invalid log.level: {}", self.level))
    }

    pub fn format(&self) -> Result<LogFormat> {
        self.format
            .parse()
            .with_context(|| format!("Invalid log.format: {}", self.format))
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

/// Generate a default ohmysales.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# ohmysales CLI configuration

[supabase]
# SUPABASE_URL and SUPABASE_ANON_KEY override these values.
url = ""
anon_key = ""

[site]
base_url = "{base_url}"
time_zone = "{time_zone}"

[votes]
marker_file = "{marker_file}"
timeout_secs = {timeout_secs}

[log]
level = "warn"
format = "human"
"#,
        base_url = DEFAULT_BASE_URL,
        time_zone = default_time_zone(),
        marker_file = default_marker_file(),
        timeout_secs = default_timeout_secs(),
    )
}
