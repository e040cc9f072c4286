//! Listing command.

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use sales_core::catalog::Sale;
use sales_core::listing::{
    listing_summary, CategoryFilter, DiscountBand, ListingParams, ListingPipeline, RetailerFilter,
    SortKey,
};
use sales_core::source::{load_listing, ListingOutcome, SaleSource};
use sales_core::SalesError;
use sales_rating::Rating;
use serde::{Deserialize, Serialize};

use super::rating::{fetch_ratings, open_aggregator};
use super::ListArgs;
use crate::context::Context;
use crate::output::{clip, rating_badge};

/// Run the list command.
pub async fn run(args: ListArgs, ctx: &Context) -> Result<()> {
    let params = params_from_args(&args)?;
    let logger = ctx.logger("list")?;
    ctx.output.debug(&format!("Listing params: {:?}", params.to_query_string()));

    let source = open_source(args.file.as_deref(), ctx)?;
    let pipeline = ListingPipeline::new(ctx.today());
    let sales = match load_listing(source.as_ref(), &pipeline, &params, &logger).await {
        ListingOutcome::Listed(sales) => sales,
        ListingOutcome::NoResults => Vec::new(),
        ListingOutcome::Unavailable(e) => bail!("Sales are unavailable: {}", e),
    };

    let ratings = if args.ratings && !sales.is_empty() {
        let aggregator = open_aggregator(ctx, ctx.supabase()?, logger.clone())?;
        let ids: Vec<_> = sales.iter().map(|sale| sale.id.clone()).collect();
        Some(fetch_ratings(&aggregator, &ids).await)
    } else {
        None
    };

    let summary = listing_summary(sales.len(), &params);

    if ctx.output.is_json() {
        ctx.output.json(&ListingReport {
            count: sales.len(),
            summary: &summary,
            params: params.to_query_string(),
            sales: &sales,
            ratings: ratings.as_deref(),
        });
        return Ok(());
    }

    if sales.is_empty() {
        ctx.output.info("Keine Sales gefunden");
        if params.is_filtered() {
            ctx.output.info("Versuche es mit anderen Filtern");
        }
        return Ok(());
    }

    ctx.output.header(&summary);
    ctx.output.debug(&format!("Sorted by: {}", params.sort_key.label()));
    print_table(&sales, ratings.as_deref(), ctx);

    Ok(())
}

#[derive(Serialize)]
struct ListingReport<'a> {
    count: usize,
    summary: &'a str,
    params: String,
    sales: &'a [Sale],
    #[serde(skip_serializing_if = "Option::is_none")]
    ratings: Option<&'a [Rating]>,
}

fn params_from_args(args: &ListArgs) -> Result<ListingParams> {
    let mut params = ListingParams::new()
        .category(CategoryFilter::parse(&args.category))
        .discount(DiscountBand::parse(&args.discount)?)
        .retailer(RetailerFilter::parse(&args.retailer))
        .sort(SortKey::parse(&args.sort)?)
        .expired(args.expired);
    if let Some(q) = &args.q {
        params = params.search(q.as_str());
    }
    Ok(params)
}

/// The sales file when one is given, Supabase otherwise.
pub fn open_source(file: Option<&str>, ctx: &Context) -> Result<Rc<dyn SaleSource>> {
    match file {
        Some(path) => {
            let path = ctx.resolve_path(path);
            ctx.output.debug(&format!("Reading sales from {}", path.display()));
            Ok(Rc::new(FileSource::new(path)))
        }
        None => Ok(Rc::new(ctx.supabase()?)),
    }
}

fn print_table(sales: &[Sale], ratings: Option<&[Rating]>, ctx: &Context) {
    let title_width = ctx.output.term_width().saturating_sub(70).clamp(20, 60);
    let widths = [16, title_width, 8, 10, 12, 20];
    ctx.output.table_row(
        &["Händler", "Titel", "Rabatt", "Endet", "Code", "Kategorien"],
        &widths,
    );

    for (i, sale) in sales.iter().enumerate() {
        let end_date = sale.end_date.format("%d.%m.%Y").to_string();
        let title = clip(&sale.title, title_width);
        let categories = sale.categories.join(", ");
        ctx.output.table_row(
            &[
                &sale.retailer,
                &title,
                &sale.discount,
                &end_date,
                sale.code.as_deref().unwrap_or("-"),
                &categories,
            ],
            &widths,
        );
        if let Some(rating) = ratings.and_then(|r| r.get(i)) {
            ctx.output.kv(
                "Rating",
                &format!("{} ({} Stimmen)", rating_badge(rating), rating.total_votes()),
            );
        }
    }
}

/// Sales read from a JSON file: a bare array, or an object with a `sales`
/// array as served by `/api/sales`.
pub struct FileSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SalesFile {
    Bare(Vec<Sale>),
    Wrapped { sales: Vec<Sale> },
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait(?Send)]
impl SaleSource for FileSource {
    async fn fetch_sales(&self) -> Result<Vec<Sale>, SalesError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SalesError::Fetch(format!("{}: {}", self.path.display(), e)))?;
        match serde_json::from_str::<SalesFile>(&content)? {
            SalesFile::Bare(sales) | SalesFile::Wrapped { sales } => Ok(sales),
        }
    }
}
