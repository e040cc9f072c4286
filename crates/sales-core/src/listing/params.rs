//! Filter, sort and search parameters for a listing.

use std::collections::HashMap;
use std::fmt;

use edge_core::{parse_query_string, percent_encode};
use serde::{Deserialize, Serialize};

use crate::error::SalesError;

/// Category restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    /// Sales tagged with this category.
    Tag(String),
}

impl CategoryFilter {
    /// `"all"` or an empty value means no restriction.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "all" => Self::All,
            tag => Self::Tag(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Tag(tag) => tag,
        }
    }
}

/// Discount band; bounds are half-open `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DiscountBand {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "20-30")]
    From20To30,
    #[serde(rename = "30-40")]
    From30To40,
    #[serde(rename = "40-50")]
    From40To50,
    #[serde(rename = "50+")]
    From50,
}

impl DiscountBand {
    pub const ALL: [DiscountBand; 5] = [
        DiscountBand::All,
        DiscountBand::From20To30,
        DiscountBand::From30To40,
        DiscountBand::From40To50,
        DiscountBand::From50,
    ];

    pub fn parse(value: &str) -> Result<Self, SalesError> {
        match value.trim() {
            "" | "all" => Ok(Self::All),
            "20-30" => Ok(Self::From20To30),
            "30-40" => Ok(Self::From30To40),
            "40-50" => Ok(Self::From40To50),
            // an unencoded '+' decodes to a space and is trimmed away
            "50+" | "50" => Ok(Self::From50),
            other => Err(SalesError::validation("discount", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::From20To30 => "20-30",
            Self::From30To40 => "30-40",
            Self::From40To50 => "40-50",
            Self::From50 => "50+",
        }
    }

    /// Lower bound and optional exclusive upper bound.
    pub fn bounds(&self) -> Option<(u32, Option<u32>)> {
        match self {
            Self::All => None,
            Self::From20To30 => Some((20, Some(30))),
            Self::From30To40 => Some((30, Some(40))),
            Self::From40To50 => Some((40, Some(50))),
            Self::From50 => Some((50, None)),
        }
    }

    pub fn contains(&self, discount: u32) -> bool {
        match self.bounds() {
            None => true,
            Some((low, None)) => discount >= low,
            Some((low, Some(high))) => discount >= low && discount < high,
        }
    }
}

/// Retailer restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetailerFilter {
    #[default]
    All,
    /// Sales whose retailer equals this name exactly.
    Name(String),
}

impl RetailerFilter {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "all" => Self::All,
            name => Self::Name(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Name(name) => name,
        }
    }
}

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Creation time, newest first.
    #[default]
    Newest,
    DiscountHigh,
    DiscountLow,
    /// End date, earliest first.
    EndingSoon,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Newest,
        SortKey::DiscountHigh,
        SortKey::DiscountLow,
        SortKey::EndingSoon,
    ];

    pub fn parse(value: &str) -> Result<Self, SalesError> {
        match value.trim() {
            "" | "newest" => Ok(Self::Newest),
            "discount-high" => Ok(Self::DiscountHigh),
            "discount-low" => Ok(Self::DiscountLow),
            "ending-soon" => Ok(Self::EndingSoon),
            other => Err(SalesError::validation("sort", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::DiscountHigh => "discount-high",
            Self::DiscountLow => "discount-low",
            Self::EndingSoon => "ending-soon",
        }
    }

    /// German label shown in the sort picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Newest => "Neueste zuerst",
            Self::DiscountHigh => "Höchster Rabatt",
            Self::DiscountLow => "Niedrigster Rabatt",
            Self::EndingSoon => "Endet bald",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a visitor chose on the listing page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListingParams {
    pub search_query: String,
    pub category: CategoryFilter,
    pub discount_band: DiscountBand,
    pub retailer: RetailerFilter,
    pub sort_key: SortKey,
    pub show_expired: bool,
}

impl ListingParams {
    /// Default listing: everything active, newest first.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    pub fn category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    pub fn discount(mut self, band: DiscountBand) -> Self {
        self.discount_band = band;
        self
    }

    pub fn retailer(mut self, retailer: RetailerFilter) -> Self {
        self.retailer = retailer;
        self
    }

    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort_key = key;
        self
    }

    pub fn expired(mut self, show_expired: bool) -> Self {
        self.show_expired = show_expired;
        self
    }

    /// Build from decoded query parameters (`q`, `category`, `discount`,
    /// `retailer`, `sort`, `expired`).
    ///
    /// Unusable values fall back to their defaults and are returned alongside
    /// so the caller can log them.
    pub fn from_query(query: &HashMap<String, String>) -> (Self, Vec<SalesError>) {
        let mut params = Self::default();
        let mut rejected = Vec::new();

        if let Some(q) = query.get("q") {
            params.search_query = q.clone();
        }
        if let Some(category) = query.get("category") {
            params.category = CategoryFilter::parse(category);
        }
        if let Some(retailer) = query.get("retailer") {
            params.retailer = RetailerFilter::parse(retailer);
        }
        if let Some(band) = query.get("discount") {
            match DiscountBand::parse(band) {
                Ok(band) => params.discount_band = band,
                Err(e) => rejected.push(e),
            }
        }
        if let Some(sort) = query.get("sort") {
            match SortKey::parse(sort) {
                Ok(key) => params.sort_key = key,
                Err(e) => rejected.push(e),
            }
        }
        if let Some(expired) = query.get("expired") {
            match expired.trim() {
                "true" | "1" | "yes" => params.show_expired = true,
                "" | "false" | "0" | "no" => params.show_expired = false,
                other => rejected.push(SalesError::validation("expired", other)),
            }
        }

        (params, rejected)
    }

    /// Build from a raw query string such as `q=zara&sort=ending-soon`.
    pub fn from_query_string(query: &str) -> (Self, Vec<SalesError>) {
        Self::from_query(&parse_query_string(query))
    }

    /// Canonical query string; default values are omitted.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        let q = self.search_query.trim();
        if !q.is_empty() {
            pairs.push(("q", percent_encode(q)));
        }
        if self.category != CategoryFilter::All {
            pairs.push(("category", percent_encode(self.category.as_str())));
        }
        if self.discount_band != DiscountBand::All {
            pairs.push(("discount", percent_encode(self.discount_band.as_str())));
        }
        if self.retailer != RetailerFilter::All {
            pairs.push(("retailer", percent_encode(self.retailer.as_str())));
        }
        if self.sort_key != SortKey::Newest {
            pairs.push(("sort", self.sort_key.as_str().to_string()));
        }
        if self.show_expired {
            pairs.push(("expired", "true".to_string()));
        }
        pairs
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Whether any filter beyond the defaults is active.
    pub fn is_filtered(&self) -> bool {
        !self.search_query.trim().is_empty()
            || self.category != CategoryFilter::All
            || self.discount_band != DiscountBand::All
            || self.retailer != RetailerFilter::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_half_open() {
        let band = DiscountBand::From30To40;
        assert!(!band.contains(29));
        assert!(band.contains(30));
        assert!(band.contains(39));
        assert!(!band.contains(40));
        assert!(DiscountBand::From50.contains(50));
        assert!(DiscountBand::From50.contains(90));
        assert!(!DiscountBand::From20To30.contains(0));
        assert!(DiscountBand::All.contains(0));
    }

    #[test]
    fn test_parse_sort_and_band() {
        assert_eq!(SortKey::parse("ending-soon").unwrap(), SortKey::EndingSoon);
        assert!(SortKey::parse("cheapest").is_err());
        assert_eq!(DiscountBand::parse("50+").unwrap(), DiscountBand::From50);
        let (params, _) = ListingParams::from_query_string("discount=50+");
        assert_eq!(params.discount_band, DiscountBand::From50);
        assert!(DiscountBand::parse("10-20").is_err());
    }

    #[test]
    fn test_from_query_string() {
        let (params, rejected) = ListingParams::from_query_string(
            "q=Sommer%20Sale&category=women&discount=40-50&retailer=H%26M&sort=discount-high&expired=1",
        );
        assert!(rejected.is_empty());
        assert_eq!(params.search_query, "Sommer Sale");
        assert_eq!(params.category, CategoryFilter::Tag("women".into()));
        assert_eq!(params.discount_band, DiscountBand::From40To50);
        assert_eq!(params.retailer, RetailerFilter::Name("H&M".into()));
        assert_eq!(params.sort_key, SortKey::DiscountHigh);
        assert!(params.show_expired);
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let (params, rejected) =
            ListingParams::from_query_string("sort=cheapest&discount=90-100&expired=maybe");
        assert_eq!(params.sort_key, SortKey::Newest);
        assert_eq!(params.discount_band, DiscountBand::All);
        assert!(!params.show_expired);
        assert_eq!(rejected.len(), 3);
    }

    #[test]
    fn test_to_query_string_roundtrip() {
        let params = ListingParams::new()
            .search("zara")
            .discount(DiscountBand::From50)
            .sort(SortKey::EndingSoon);
        let query = params.to_query_string();
        assert_eq!(query, "q=zara&discount=50%2B&sort=ending-soon");
        let (back, rejected) = ListingParams::from_query_string(&query);
        assert!(rejected.is_empty());
        assert_eq!(back, params);
    }

    #[test]
    fn test_default_is_unfiltered() {
        assert!(!ListingParams::new().is_filtered());
        assert_eq!(ListingParams::new().to_query_string(), "");
        assert!(ListingParams::new().search("  x ").is_filtered());
    }
}
