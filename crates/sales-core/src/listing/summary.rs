//! Retailer index and the listing summary line.

use std::collections::BTreeSet;

use crate::catalog::{category_label, Sale};
use crate::listing::params::{CategoryFilter, ListingParams, RetailerFilter};

/// Distinct retailer names, sorted, for the retailer picker.
pub fn retailers(sales: &[Sale]) -> Vec<String> {
    sales
        .iter()
        .map(|sale| sale.retailer.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// German summary such as "12 aktive Fashion Deals in Damen bei Zara".
///
/// Empty when nothing is visible.
pub fn listing_summary(count: usize, params: &ListingParams) -> String {
    if count == 0 {
        return String::new();
    }

    let partition = if params.show_expired {
        "abgelaufene"
    } else {
        "aktive"
    };
    let mut summary = format!("{} {} Fashion Deals", count, partition);
    if let CategoryFilter::Tag(tag) = &params.category {
        summary.push_str(" in ");
        summary.push_str(category_label(tag));
    }
    if let RetailerFilter::Name(name) = &params.retailer {
        summary.push_str(" bei ");
        summary.push_str(name);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_retailers_sorted_and_unique() {
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let sales = vec![
            Sale::new("1", "Zara", "t", "10%", end),
            Sale::new("2", "Mango", "t", "10%", end),
            Sale::new("3", "Zara", "t", "10%", end),
        ];
        assert_eq!(retailers(&sales), vec!["Mango", "Zara"]);
    }

    #[test]
    fn test_summary_text() {
        let params = ListingParams::new()
            .category(CategoryFilter::Tag("women".into()))
            .retailer(RetailerFilter::Name("Zara".into()));
        assert_eq!(listing_summary(3, &params), "3 aktive Fashion Deals in Damen bei Zara");
        assert_eq!(
            listing_summary(1, &ListingParams::new().expired(true)),
            "1 abgelaufene Fashion Deals"
        );
        assert_eq!(listing_summary(0, &params), "");
    }
}
