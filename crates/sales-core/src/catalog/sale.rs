//! The sale record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::SaleId;
use crate::listing::extract_discount;

/// A time-limited promotion from one retailer.
///
/// Records come from the sale store as JSON rows. Older rows carry a single
/// `category` string next to or instead of the `categories` list, and
/// optional text columns may be `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SaleRow")]
pub struct Sale {
    pub id: SaleId,
    pub retailer: String,
    /// Logo URL.
    pub logo: String,
    pub image: Option<String>,
    pub title: String,
    /// Free text such as "Bis zu 50%".
    pub discount: String,
    pub code: Option<String>,
    pub start_date: Option<NaiveDate>,
    /// Last valid calendar day; the sale is still active on this day.
    pub end_date: NaiveDate,
    pub url: String,
    pub categories: Vec<String>,
    pub featured: bool,
    pub is_manually_expired: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A sale row as stored, before the legacy `category` column is folded in.
#[derive(Deserialize)]
struct SaleRow {
    id: SaleId,
    retailer: String,
    #[serde(default, alias = "logo_url", deserialize_with = "null_as_default")]
    logo: String,
    #[serde(default)]
    image: Option<String>,
    title: String,
    discount: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    end_date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_default")]
    url: String,
    #[serde(default, deserialize_with = "one_or_many")]
    categories: Vec<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    featured: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    is_manually_expired: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        let mut categories = row.categories;
        if categories.is_empty() {
            if let Some(tag) = row.category.filter(|tag| !tag.trim().is_empty()) {
                categories.push(tag);
            }
        }

        Self {
            id: row.id,
            retailer: row.retailer,
            logo: row.logo,
            image: row.image,
            title: row.title,
            discount: row.discount,
            code: row.code,
            start_date: row.start_date,
            end_date: row.end_date,
            url: row.url,
            categories,
            featured: row.featured,
            is_manually_expired: row.is_manually_expired,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Sale {
    /// Create a sale with the required fields; everything else is empty.
    pub fn new(
        id: impl Into<SaleId>,
        retailer: impl Into<String>,
        title: impl Into<String>,
        discount: impl Into<String>,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            retailer: retailer.into(),
            logo: String::new(),
            image: None,
            title: title.into(),
            discount: discount.into(),
            code: None,
            start_date: None,
            end_date,
            url: String::new(),
            categories: Vec::new(),
            featured: false,
            is_manually_expired: false,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Mark the sale as expired by an administrator.
    pub fn manually_expired(mut self) -> Self {
        self.is_manually_expired = true;
        self
    }

    /// Whether the sale counts as expired on `today`.
    ///
    /// A sale is expired once an administrator flagged it or its end date
    /// lies strictly before `today`.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.is_manually_expired || self.end_date < today
    }

    /// Whether the sale counts as active on `today`.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        !self.is_expired(today)
    }

    /// Numeric discount from the free-text field; 0 when it has no digits.
    pub fn discount_value(&self) -> u32 {
        extract_discount(&self.discount)
    }

    pub fn has_category(&self, tag: &str) -> bool {
        self.categories.iter().any(|c| c == tag)
    }

    /// Case-insensitive substring match on retailer, title or any category tag.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_search(&self, needle: &str) -> bool {
        self.retailer.to_lowercase().contains(needle)
            || self.title.to_lowercase().contains(needle)
            || self
                .categories
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(tag)) if tag.is_empty() => Vec::new(),
        Some(OneOrMany::One(tag)) => vec![tag],
        Some(OneOrMany::Many(tags)) => tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_expiry_boundaries() {
        let today = date(2024, 5, 10);
        let sale = Sale::new("s1", "Zara", "Sommer Sale", "30%", today);
        assert!(!sale.is_expired(today));
        assert!(sale.is_expired(date(2024, 5, 11)));
        assert!(sale.clone().manually_expired().is_expired(date(2024, 1, 1)));
    }

    #[test]
    fn test_decode_store_row() {
        let row = r#"{
            "id": "7b1e",
            "retailer": "Mango",
            "logo": "https://cdn.example/mango.png",
            "image": null,
            "title": "Mid Season Sale",
            "discount": "Bis zu 50%",
            "code": null,
            "start_date": "2024-05-01",
            "end_date": "2024-05-31",
            "url": "https://mango.com",
            "featured": true,
            "categories": ["women", "men"],
            "created_at": "2024-05-01T08:00:00+00:00"
        }"#;
        let sale: Sale = serde_json::from_str(row).unwrap();
        assert_eq!(sale.id.as_str(), "7b1e");
        assert_eq!(sale.discount_value(), 50);
        assert!(sale.has_category("men"));
        assert!(!sale.is_manually_expired);
        assert!(sale.updated_at.is_none());
    }

    #[test]
    fn test_decode_legacy_single_category() {
        let row = r#"{"id":"a","retailer":"H&M","title":"t","discount":"20%",
                      "end_date":"2024-06-01","category":"beauty"}"#;
        let sale: Sale = serde_json::from_str(row).unwrap();
        assert_eq!(sale.categories, vec!["beauty".to_string()]);
    }

    #[test]
    fn test_decode_row_with_both_category_columns() {
        let row = r#"{"id":"a","retailer":"Zara","title":"t","discount":"20%",
                      "end_date":"2024-06-01","category":"women","categories":["women","men"]}"#;
        let sale: Sale = serde_json::from_str(row).unwrap();
        assert_eq!(sale.categories, vec!["women".to_string(), "men".to_string()]);

        let row = r#"{"id":"b","retailer":"Zara","title":"t","discount":"20%",
                      "end_date":"2024-06-01","category":"kids","categories":[]}"#;
        let sale: Sale = serde_json::from_str(row).unwrap();
        assert_eq!(sale.categories, vec!["kids".to_string()]);
    }

    #[test]
    fn test_decode_null_columns() {
        let row = r#"{"id":"a","retailer":"Zara","logo":null,"title":"t","discount":"20%",
                      "end_date":"2024-06-01","url":null,"featured":null,
                      "is_manually_expired":null,"category":null}"#;
        let sale: Sale = serde_json::from_str(row).unwrap();
        assert_eq!(sale.logo, "");
        assert_eq!(sale.url, "");
        assert!(!sale.featured);
        assert!(!sale.is_manually_expired);
        assert!(sale.categories.is_empty());
    }

    #[test]
    fn test_serialize_has_no_legacy_category() {
        let sale = Sale::new("s1", "Zara", "Sale", "30%", date(2024, 5, 10))
            .with_categories(["women"]);
        let json = serde_json::to_value(&sale).unwrap();
        assert!(json.get("category").is_none());
        assert_eq!(json["categories"], serde_json::json!(["women"]));
    }

    #[test]
    fn test_decode_null_categories() {
        let row = r#"{"id":"a","retailer":"H&M","title":"t","discount":"20%",
                      "end_date":"2024-06-01","categories":null}"#;
        let sale: Sale = serde_json::from_str(row).unwrap();
        assert!(sale.categories.is_empty());
    }

    #[test]
    fn test_search_matches_retailer_title_or_tag() {
        let sale = Sale::new("s1", "Zalando", "Summer Sale", "40%", date(2024, 1, 1))
            .with_categories(["accessories"]);
        assert!(sale.matches_search("zal"));
        assert!(sale.matches_search("summer"));
        assert!(sale.matches_search("access"));
        assert!(!sale.matches_search("mango"));
    }
}
