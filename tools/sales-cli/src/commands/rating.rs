//! Rating command.

use std::rc::Rc;

use anyhow::{Context as _, Result};
use edge_observability::StructuredLogger;
use futures::future::join_all;
use sales_cache::Cache;
use sales_core::SaleId;
use sales_rating::{CacheMarkerStore, Rating, RatingAggregator, VoteDirection};
use sales_store::SupabaseClient;
use serde::Serialize;

use super::RatingArgs;
use crate::context::Context;
use crate::output::rating_badge;

/// Run the rating command.
pub async fn run(args: RatingArgs, ctx: &Context) -> Result<()> {
    let logger = ctx.logger("rating")?;
    let aggregator = open_aggregator(ctx, ctx.supabase()?, logger)?;

    let ids: Vec<SaleId> = args.ids.iter().map(|id| SaleId::new(id.trim())).collect();
    let ratings = fetch_ratings(&aggregator, &ids).await;

    let rows: Vec<RatingRow<'_>> = ids
        .iter()
        .zip(ratings)
        .map(|(id, rating)| RatingRow {
            sale_id: id.as_str(),
            my_vote: aggregator.my_vote(id).direction(),
            rating,
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&rows);
        return Ok(());
    }

    for row in &rows {
        ctx.output.header(row.sale_id);
        ctx.output.kv("Score", &rating_badge(&row.rating));
        ctx.output.kv(
            "Stimmen",
            &format!(
                "{} hot / {} cold",
                row.rating.hot_votes(),
                row.rating.cold_votes()
            ),
        );
        if row.rating.total_votes() > 0 {
            ctx.output
                .kv("Hot", &format!("{:.0}%", row.rating.hot_percentage()));
        }
        if let Some(direction) = row.my_vote {
            ctx.output.kv("Deine Stimme", direction.as_str());
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct RatingRow<'a> {
    sale_id: &'a str,
    my_vote: Option<VoteDirection>,
    #[serde(flatten)]
    rating: Rating,
}

/// Aggregator over Supabase with this machine's marker file.
pub fn open_aggregator(
    ctx: &Context,
    store: SupabaseClient,
    logger: StructuredLogger,
) -> Result<RatingAggregator> {
    let marker_path = ctx.marker_path();
    ctx.output
        .debug(&format!("Vote markers: {}", marker_path.display()));
    let markers = Cache::open_file(&marker_path)
        .with_context(|| format!("Failed to open vote markers: {}", marker_path.display()))?;

    Ok(
        RatingAggregator::new(Rc::new(store), Rc::new(CacheMarkerStore::new(markers)), logger)
            .with_today(ctx.today())
            .with_vote_timeout(ctx.vote_timeout()),
    )
}

/// Ratings for `ids`, fetched concurrently, in the same order.
pub async fn fetch_ratings(aggregator: &RatingAggregator, ids: &[SaleId]) -> Vec<Rating> {
    join_all(ids.iter().map(|id| aggregator.get_rating(id))).await
}
