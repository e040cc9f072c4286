//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = masked(&ctx.config);

    if ctx.output.is_json() {
        ctx.output.json(&config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    ctx.output.info("[supabase]");
    ctx.output.kv("url", or_unset(&config.supabase.url));
    ctx.output.kv("anon_key", or_unset(&config.supabase.anon_key));

    ctx.output.info("[site]");
    ctx.output.kv("base_url", &config.site.base_url);
    ctx.output.kv("time_zone", &config.site.time_zone);

    ctx.output.info("[votes]");
    ctx.output.kv("marker_file", &config.votes.marker_file);
    ctx.output.kv("timeout_secs", &config.votes.timeout_secs.to_string());

    ctx.output.info("[log]");
    ctx.output.kv("level", &config.log.level);
    ctx.output.kv("format", &config.log.format);

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("ohmysales.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output.success(&format!("Created: {}", config_path.display()));
    ctx.output
        .info("Set [supabase] url and anon_key, or export SUPABASE_URL and SUPABASE_ANON_KEY");

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let errors = problems(&ctx.config);
    if errors.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }
    bail!("Configuration has {} error(s)", errors.len())
}

fn problems(config: &CliConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if let Err(e) = config.supabase.validate() {
        errors.push(format!("supabase: {}", e));
    }
    if !(config.site.base_url.starts_with("http://") || config.site.base_url.starts_with("https://"))
    {
        errors.push(format!(
            "site.base_url must be an absolute URL, got {:?}",
            config.site.base_url
        ));
    }
    if let Err(e) = config.site.time_zone() {
        errors.push(format!("{:#}", e));
    }
    if config.votes.timeout_secs == 0 {
        errors.push("votes.timeout_secs must be at least 1".to_string());
    }
    if config.votes.marker_file.trim().is_empty() {
        errors.push("votes.marker_file is required".to_string());
    }
    if let Err(e) = config.log.level() {
        errors.push(format!("{:#}", e));
    }
    if let Err(e) = config.log.format() {
        errors.push(format!("{:#}", e));
    }

    errors
}

/// Copy of `config` safe to print.
fn masked(config: &CliConfig) -> CliConfig {
    let mut config = config.clone();
    let key = config.supabase.anon_key.trim();
    if !key.is_empty() {
        let visible: String = key.chars().take(6).collect();
        config.supabase.anon_key = format!("{}…", visible);
    }
    config
}

fn or_unset(value: &str) -> &str {
    if value.trim().is_empty() {
        "(unset)"
    } else {
        value
    }
}
