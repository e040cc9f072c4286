//! CLI command implementations.

pub mod config;
pub mod list;
pub mod rating;
pub mod sitemap;
pub mod vote;

use clap::{Args, Subcommand};
use sales_rating::VoteDirection;

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Read sales from a JSON file instead of Supabase.
    #[arg(short, long)]
    pub file: Option<String>,

    /// Search retailer, title and category (case-insensitive).
    #[arg(short, long)]
    pub q: Option<String>,

    /// Category tag, or "all".
    #[arg(long, default_value = "all")]
    pub category: String,

    /// Discount band: all, 20-30, 30-40, 40-50 or 50+.
    #[arg(short, long, default_value = "all")]
    pub discount: String,

    /// Exact retailer name, or "all".
    #[arg(short, long, default_value = "all")]
    pub retailer: String,

    /// Sort: newest, discount-high, discount-low or ending-soon.
    #[arg(short, long, default_value = "newest")]
    pub sort: String,

    /// Show expired sales instead of active ones.
    #[arg(long)]
    pub expired: bool,

    /// Also fetch and show ratings.
    #[arg(long)]
    pub ratings: bool,
}

/// Arguments for the rating command.
#[derive(Args)]
pub struct RatingArgs {
    /// Sale ids.
    #[arg(required = true)]
    pub ids: Vec<String>,
}

/// Arguments for the vote command.
#[derive(Args)]
pub struct VoteArgs {
    /// Sale id.
    pub id: String,

    /// hot or cold.
    pub direction: VoteDirection,
}

/// Arguments for the sitemap command.
#[derive(Args)]
pub struct SitemapArgs {
    /// Write to a file instead of stdout.
    #[arg(short, long)]
    pub out: Option<String>,

    /// Override the site base URL.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Read sales from a JSON file instead of Supabase.
    #[arg(short, long)]
    pub file: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the configuration.
    Validate,
}
