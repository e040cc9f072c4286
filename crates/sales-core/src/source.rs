//! Where sales come from, and the fetch-then-filter entry point.

use async_trait::async_trait;
use edge_observability::StructuredLogger;

use crate::catalog::Sale;
use crate::error::SalesError;
use crate::listing::{ListingParams, ListingPipeline};

/// A readable collection of sales.
#[async_trait(?Send)]
pub trait SaleSource {
    /// All sales, active and expired.
    async fn fetch_sales(&self) -> Result<Vec<Sale>, SalesError>;
}

/// Result of loading a listing.
///
/// An empty listing and an unreachable store are different outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingOutcome {
    /// At least one sale is visible.
    Listed(Vec<Sale>),
    /// The store answered, but nothing matched.
    NoResults,
    /// The store could not be read; the listing degrades to empty.
    Unavailable(SalesError),
}

impl ListingOutcome {
    /// Visible sales; empty for `NoResults` and `Unavailable`.
    pub fn sales(&self) -> &[Sale] {
        match self {
            Self::Listed(sales) => sales,
            Self::NoResults | Self::Unavailable(_) => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Fetch all sales from `source` and run them through `pipeline`.
///
/// Fetch failures are logged and returned as `Unavailable`, never propagated.
pub async fn load_listing(
    source: &dyn SaleSource,
    pipeline: &ListingPipeline,
    params: &ListingParams,
    logger: &StructuredLogger,
) -> ListingOutcome {
    let all = match source.fetch_sales().await {
        Ok(all) => all,
        Err(e) => {
            logger
                .error_builder("Failed to fetch sales")
                .field("error", e.to_string())
                .emit();
            return ListingOutcome::Unavailable(e);
        }
    };

    let visible = pipeline.apply(&all, params);
    logger
        .debug_builder("Listing computed")
        .field_i64("total", all.len() as i64)
        .field_i64("visible", visible.len() as i64)
        .field("sort", params.sort_key.as_str())
        .field_bool("show_expired", params.show_expired)
        .emit();

    if visible.is_empty() {
        ListingOutcome::NoResults
    } else {
        ListingOutcome::Listed(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use edge_observability::{LogLevel, LogSink, RequestId};

    struct FixedSource(Result<Vec<Sale>, SalesError>);

    #[async_trait(?Send)]
    impl SaleSource for FixedSource {
        async fn fetch_sales(&self) -> Result<Vec<Sale>, SalesError> {
            self.0.clone()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[tokio::test]
    async fn test_listed() {
        let source = FixedSource(Ok(vec![Sale::new("1", "Zara", "t", "30%", today())]));
        let logger = StructuredLogger::new(RequestId::from_string("t"));
        let outcome = load_listing(
            &source,
            &ListingPipeline::new(today()),
            &ListingParams::new(),
            &logger,
        )
        .await;
        assert_eq!(outcome.sales().len(), 1);
    }

    #[tokio::test]
    async fn test_no_results_is_not_failure() {
        let source = FixedSource(Ok(Vec::new()));
        let logger = StructuredLogger::new(RequestId::from_string("t"));
        let outcome = load_listing(
            &source,
            &ListingPipeline::new(today()),
            &ListingParams::new(),
            &logger,
        )
        .await;
        assert_eq!(outcome, ListingOutcome::NoResults);
        assert!(!outcome.is_unavailable());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_logged_and_degrades() {
        let source = FixedSource(Err(SalesError::Fetch("connection refused".into())));
        let (sink, captured) = LogSink::capture();
        let logger = StructuredLogger::new(RequestId::from_string("t")).with_sink(sink);

        let outcome = load_listing(
            &source,
            &ListingPipeline::new(today()),
            &ListingParams::new(),
            &logger,
        )
        .await;

        assert!(outcome.is_unavailable());
        assert!(outcome.sales().is_empty());
        let entries = captured.lock().unwrap();
        assert!(entries
            .iter()
            .any(|e| e.level == LogLevel::Error && e.message == "Failed to fetch sales"));
    }
}
