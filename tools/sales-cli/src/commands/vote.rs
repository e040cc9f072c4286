//! Vote command.

use anyhow::{anyhow, bail, Context as _, Result};
use sales_core::SaleId;
use serde_json::json;

use super::rating::open_aggregator;
use super::VoteArgs;
use crate::context::Context;
use crate::output::rating_badge;

/// Run the vote command.
pub async fn run(args: VoteArgs, ctx: &Context) -> Result<()> {
    let logger = ctx.logger("vote")?;
    let store = ctx.supabase()?;

    let id = SaleId::new(args.id.trim());
    let sale = store
        .get_sale(&id)
        .await
        .with_context(|| format!("Failed to load sale {}", id))?
        .ok_or_else(|| anyhow!("Sale not found: {}", id))?;
    ctx.output
        .debug(&format!("{} · {} (endet {})", sale.retailer, sale.title, sale.end_date));

    let aggregator = open_aggregator(ctx, store, logger)?;

    match aggregator.vote(&sale, args.direction).await {
        Ok(receipt) => {
            if ctx.output.is_json() {
                ctx.output.json(&receipt);
                return Ok(());
            }
            ctx.output.success(receipt.confirmation());
            ctx.output.kv("Score", &rating_badge(&receipt.rating));
            ctx.output.kv(
                "Stimmen",
                &format!(
                    "{} hot / {} cold",
                    receipt.rating.hot_votes(),
                    receipt.rating.cold_votes()
                ),
            );
            Ok(())
        }
        Err(e) if e.is_conflict() => {
            if ctx.output.is_json() {
                ctx.output.json(&json!({
                    "sale_id": id,
                    "counted": false,
                    "notice": e.notice(),
                }));
            } else {
                ctx.output.warn(&e.notice());
            }
            Ok(())
        }
        Err(e) => bail!("{}: {}", e.notice(), e),
    }
}
