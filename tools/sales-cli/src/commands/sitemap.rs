//! Sitemap command.

use std::fs;

use anyhow::{Context as _, Result};
use sales_core::seo::SitemapBuilder;
use sales_core::source::SaleSource as _;
use serde_json::json;

use super::list::open_source;
use super::SitemapArgs;
use crate::context::Context;

/// Run the sitemap command.
pub async fn run(args: SitemapArgs, ctx: &Context) -> Result<()> {
    let source = open_source(args.file.as_deref(), ctx)?;
    let sales = source
        .fetch_sales()
        .await
        .context("Failed to fetch sales for the sitemap")?;

    let base_url = args
        .base_url
        .as_deref()
        .unwrap_or(&ctx.config.site.base_url);
    let builder = SitemapBuilder::new(base_url, ctx.today());
    let entries = builder.entries(&sales);

    let Some(out) = args.out else {
        if ctx.output.is_json() {
            ctx.output.json(&entries);
        } else {
            ctx.output.raw(&builder.render(&sales));
        }
        return Ok(());
    };

    let path = ctx.resolve_path(&out);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, builder.render(&sales))
        .with_context(|| format!("Failed to write sitemap: {}", path.display()))?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "path": path.display().to_string(),
            "urls": entries.len(),
        }));
    } else {
        ctx.output.success(&format!(
            "Wrote {} URLs to {}",
            entries.len(),
            path.display()
        ));
    }

    Ok(())
}
