//! Component settings from Spin variables.

use sales_core::listing::{Tz, DEFAULT_TIME_ZONE};
use sales_core::seo::DEFAULT_BASE_URL;
use sales_store::SupabaseConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub supabase: SupabaseConfig,
    /// Public site root used in sitemap URLs.
    pub site_base_url: String,
    /// Zone whose calendar decides expiry; unknown names fall back to Berlin.
    pub time_zone: Tz,
}

impl ApiSettings {
    /// Read settings through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            supabase: SupabaseConfig::new(
                get("supabase_url").unwrap_or_default(),
                get("supabase_anon_key").unwrap_or_default(),
            ),
            site_base_url: get("site_base_url").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            time_zone: get("time_zone")
                .and_then(|name| name.parse().ok())
                .unwrap_or(DEFAULT_TIME_ZONE),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_spin() -> Self {
        Self::from_lookup(|name| spin_sdk::variables::get(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ApiSettings::from_lookup(|_| None);
        assert_eq!(settings.site_base_url, "https://ohmysales.app");
        assert!(!settings.supabase.is_configured());
        assert_eq!(settings.time_zone, DEFAULT_TIME_ZONE);
    }

    #[test]
    fn test_from_lookup() {
        let settings = ApiSettings::from_lookup(|name| match name {
            "supabase_url" => Some("https://abc.supabase.co".into()),
            "supabase_anon_key" => Some("key".into()),
            "site_base_url" => Some("https://staging.ohmysales.app".into()),
            "time_zone" => Some("Europe/Vienna".into()),
            _ => None,
        });
        assert!(settings.supabase.is_configured());
        assert_eq!(settings.site_base_url, "https://staging.ohmysales.app");
        assert_eq!(settings.time_zone.name(), "Europe/Vienna");
    }

    #[test]
    fn test_unknown_time_zone_falls_back() {
        let settings = ApiSettings::from_lookup(|name| match name {
            "time_zone" => Some("Mars/Olympus".into()),
            _ => None,
        });
        assert_eq!(settings.time_zone, DEFAULT_TIME_ZONE);
    }
}
