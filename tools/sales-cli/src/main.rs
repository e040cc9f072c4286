//! ohmysales CLI - browse, rate and publish sale listings from the terminal.
//!
//! Commands:
//! - `ohmysales list` - Filtered, sorted listing of sales
//! - `ohmysales rating` - Hot/cold ratings for one or more sales
//! - `ohmysales vote` - Cast a hot or cold vote
//! - `ohmysales sitemap` - Render sitemap.xml for the active sales
//! - `ohmysales config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{ConfigArgs, ListArgs, RatingArgs, SitemapArgs, VoteArgs};

/// ohmysales CLI - Fashion sales, filtered and rated
#[derive(Parser)]
#[command(name = "ohmysales")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sales through the filter and sort pipeline
    List(ListArgs),

    /// Show ratings for sales
    Rating(RatingArgs),

    /// Vote a sale hot or cold
    Vote(VoteArgs),

    /// Render the sitemap
    Sitemap(SitemapArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    let result = match cli.command {
        Commands::List(args) => commands::list::run(args, &ctx).await,
        Commands::Rating(args) => commands::rating::run(args, &ctx).await,
        Commands::Vote(args) => commands::vote::run(args, &ctx).await,
        Commands::Sitemap(args) => commands::sitemap::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
