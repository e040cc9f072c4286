//! The listing pipeline: partition, filter, sort.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::catalog::Sale;
use crate::listing::params::{CategoryFilter, ListingParams, RetailerFilter, SortKey};

/// Time zone whose calendar decides when a sale has ended.
pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::Europe::Berlin;

/// Deterministic transformation of all sales into the visible list.
///
/// The reference date is fixed at construction so one pass sees one "today";
/// expiry is derived from it on every call and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingPipeline {
    today: NaiveDate,
}

impl ListingPipeline {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Current calendar date in [`DEFAULT_TIME_ZONE`].
    pub fn today() -> NaiveDate {
        Self::today_in(DEFAULT_TIME_ZONE)
    }

    /// Current calendar date in `tz`, independent of the host's local zone.
    pub fn today_in(tz: Tz) -> NaiveDate {
        Self::date_in(Utc::now(), tz)
    }

    /// Calendar date of `now` in `tz`.
    pub fn date_in(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
        now.with_timezone(&tz).date_naive()
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.today
    }

    /// Apply `params` to `sales`.
    ///
    /// Steps run in a fixed order: expiry partition, search, category,
    /// discount band, retailer, then a stable sort.
    pub fn apply(&self, sales: &[Sale], params: &ListingParams) -> Vec<Sale> {
        let needle = params.search_query.trim().to_lowercase();

        let mut visible: Vec<Sale> = sales
            .iter()
            .filter(|sale| sale.is_expired(self.today) == params.show_expired)
            .filter(|sale| needle.is_empty() || sale.matches_search(&needle))
            .filter(|sale| match &params.category {
                CategoryFilter::All => true,
                CategoryFilter::Tag(tag) => sale.has_category(tag),
            })
            .filter(|sale| params.discount_band.contains(sale.discount_value()))
            .filter(|sale| match &params.retailer {
                RetailerFilter::All => true,
                RetailerFilter::Name(name) => sale.retailer == *name,
            })
            .cloned()
            .collect();

        // slice::sort_by is stable; equal keys keep their input order
        match params.sort_key {
            // None < Some, so reversing puts missing timestamps last
            SortKey::Newest => visible.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortKey::DiscountHigh => {
                visible.sort_by(|a, b| b.discount_value().cmp(&a.discount_value()))
            }
            SortKey::DiscountLow => {
                visible.sort_by(|a, b| a.discount_value().cmp(&b.discount_value()))
            }
            SortKey::EndingSoon => visible.sort_by(|a, b| a.end_date.cmp(&b.end_date)),
        }

        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::params::DiscountBand;
    use chrono::{Duration, TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn sale(id: &str, retailer: &str, discount: &str, end: NaiveDate) -> Sale {
        Sale::new(id, retailer, format!("{} Sale", retailer), discount, end)
    }

    fn ids(sales: &[Sale]) -> Vec<&str> {
        sales.iter().map(|s| s.id.as_str()).collect()
    }

    fn fixture() -> Vec<Sale> {
        let tomorrow = today() + Duration::days(1);
        let yesterday = today() - Duration::days(1);
        vec![
            sale("1", "Zara", "25%", tomorrow)
                .with_categories(["women"])
                .with_created_at(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()),
            sale("2", "Mango", "Bis zu 45%", tomorrow + Duration::days(3))
                .with_categories(["women", "men"])
                .with_created_at(Utc.with_ymd_and_hms(2024, 5, 3, 9, 0, 0).unwrap()),
            sale("3", "H&M", "30%", today()).with_categories(["men"]),
            sale("4", "Zara", "60%", yesterday).with_categories(["accessories"]),
            sale("5", "COS", "50%", tomorrow).manually_expired(),
            sale("6", "Asos", "Gratis Versand", tomorrow)
                .with_created_at(Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap()),
        ]
    }

    #[test]
    fn test_reference_date_follows_berlin_calendar() {
        // 22:30 UTC is already the next day in Berlin, in summer and winter
        let summer = Utc.with_ymd_and_hms(2024, 5, 9, 22, 30, 0).unwrap();
        assert_eq!(ListingPipeline::date_in(summer, DEFAULT_TIME_ZONE), today());
        let winter = Utc.with_ymd_and_hms(2024, 1, 9, 23, 30, 0).unwrap();
        assert_eq!(
            ListingPipeline::date_in(winter, DEFAULT_TIME_ZONE),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
        assert_eq!(
            ListingPipeline::date_in(summer, chrono_tz::UTC),
            NaiveDate::from_ymd_opt(2024, 5, 9).unwrap()
        );

        let ended_yesterday = sale("1", "Zara", "30%", NaiveDate::from_ymd_opt(2024, 5, 9).unwrap());
        let pipeline = ListingPipeline::new(ListingPipeline::date_in(summer, DEFAULT_TIME_ZONE));
        assert!(pipeline.apply(&[ended_yesterday], &ListingParams::new()).is_empty());
    }

    #[test]
    fn test_discount_band_scenario() {
        let tomorrow = today() + Duration::days(1);
        let sales = vec![
            sale("1", "A", "25%", tomorrow),
            sale("2", "B", "45%", tomorrow),
        ];
        let params = ListingParams::new().discount(DiscountBand::From40To50);
        let visible = ListingPipeline::new(today()).apply(&sales, &params);
        assert_eq!(ids(&visible), vec!["2"]);
    }

    #[test]
    fn test_expiry_partitions_are_exclusive() {
        let pipeline = ListingPipeline::new(today());
        let sales = fixture();
        let active = pipeline.apply(&sales, &ListingParams::new());
        let expired = pipeline.apply(&sales, &ListingParams::new().expired(true));

        assert!(active.iter().all(|s| !s.is_expired(today())));
        assert!(expired.iter().all(|s| s.is_expired(today())));
        assert_eq!(active.len() + expired.len(), sales.len());

        let mut expired_ids = ids(&expired);
        expired_ids.sort();
        assert_eq!(expired_ids, vec!["4", "5"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let params = ListingParams::new().search("  ZARA ").expired(true);
        let visible = ListingPipeline::new(today()).apply(&fixture(), &params);
        assert_eq!(ids(&visible), vec!["4"]);

        let by_tag = ListingPipeline::new(today())
            .apply(&fixture(), &ListingParams::new().search("men"));
        // "women" contains "men"
        let mut found = ids(&by_tag);
        found.sort();
        assert_eq!(found, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_category_and_retailer_filters() {
        let pipeline = ListingPipeline::new(today());
        let params = ListingParams::new().category(CategoryFilter::Tag("men".into()));
        let sales = fixture();
        let visible = pipeline.apply(&sales, &params);
        let mut found = ids(&visible);
        found.sort();
        assert_eq!(found, vec!["2", "3"]);

        let params = ListingParams::new().retailer(RetailerFilter::Name("zara".into()));
        assert!(pipeline.apply(&fixture(), &params).is_empty());
        let params = ListingParams::new().retailer(RetailerFilter::Name("Zara".into()));
        assert_eq!(ids(&pipeline.apply(&fixture(), &params)), vec!["1"]);
    }

    #[test]
    fn test_band_boundary_is_half_open() {
        let pipeline = ListingPipeline::new(today());
        let low = pipeline.apply(&fixture(), &ListingParams::new().discount(DiscountBand::From20To30));
        assert_eq!(ids(&low), vec!["1"]);
        let mid = pipeline.apply(&fixture(), &ListingParams::new().discount(DiscountBand::From30To40));
        assert_eq!(ids(&mid), vec!["3"]);
    }

    #[test]
    fn test_newest_puts_missing_timestamps_last() {
        let visible = ListingPipeline::new(today()).apply(&fixture(), &ListingParams::new());
        assert_eq!(ids(&visible), vec!["2", "6", "1", "3"]);
    }

    #[test]
    fn test_discount_sorts() {
        let pipeline = ListingPipeline::new(today());
        let high = pipeline.apply(&fixture(), &ListingParams::new().sort(SortKey::DiscountHigh));
        assert_eq!(ids(&high), vec!["2", "3", "1", "6"]);
        let low = pipeline.apply(&fixture(), &ListingParams::new().sort(SortKey::DiscountLow));
        assert_eq!(ids(&low), vec!["6", "1", "3", "2"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let end = today() + Duration::days(2);
        let sales = vec![
            sale("a", "X", "30%", end),
            sale("b", "Y", "30%", end),
            sale("c", "Z", "50%", end),
            sale("d", "W", "30%", end),
        ];
        let pipeline = ListingPipeline::new(today());
        let high = pipeline.apply(&sales, &ListingParams::new().sort(SortKey::DiscountHigh));
        assert_eq!(ids(&high), vec!["c", "a", "b", "d"]);
        let ending = pipeline.apply(&sales, &ListingParams::new().sort(SortKey::EndingSoon));
        assert_eq!(ids(&ending), vec!["a", "b", "c", "d"]);
        let newest = pipeline.apply(&sales, &ListingParams::new());
        assert_eq!(ids(&newest), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_ending_soon() {
        let visible = ListingPipeline::new(today())
            .apply(&fixture(), &ListingParams::new().sort(SortKey::EndingSoon));
        assert_eq!(ids(&visible), vec!["3", "1", "6", "2"]);
    }

    #[test]
    fn test_reapplying_is_idempotent() {
        let pipeline = ListingPipeline::new(today());
        let params = ListingParams::new()
            .search("a")
            .discount(DiscountBand::From20To30)
            .sort(SortKey::EndingSoon);
        let once = pipeline.apply(&fixture(), &params);
        let twice = pipeline.apply(&once, &params);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        assert!(ListingPipeline::new(today())
            .apply(&[], &ListingParams::new())
            .is_empty());
    }
}
