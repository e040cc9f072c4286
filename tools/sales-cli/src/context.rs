//! CLI execution context.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use edge_observability::{RequestId, StructuredLogger};
use sales_core::listing::{ListingPipeline, DEFAULT_TIME_ZONE};
use sales_store::SupabaseClient;

use crate::config::{CliConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration, environment overrides applied.
    pub config: CliConfig,
    /// Where the configuration came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Base for relative state paths such as the vote marker file.
    pub state_dir: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            match find_config_file(&cwd) {
                Some(path) => {
                    let config = CliConfig::load(&path.to_string_lossy())?;
                    (config, Some(path))
                }
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self::from_parts(
            config.with_env_overrides(),
            config_path,
            output,
            cwd,
            home_dir(),
        ))
    }

    /// Assemble a context; relative state paths resolve against the config
    /// file's directory, else `home`, else `cwd`.
    pub fn from_parts(
        config: CliConfig,
        config_path: Option<PathBuf>,
        output: Output,
        cwd: PathBuf,
        home: Option<PathBuf>,
    ) -> Self {
        let state_dir = config_path
            .as_deref()
            .map(|path| absolute(path, &cwd))
            .and_then(|path| path.parent().map(Path::to_path_buf))
            .or(home)
            .unwrap_or_else(|| cwd.clone());

        Self {
            config,
            config_path,
            output,
            cwd,
            state_dir,
        }
    }

    /// Logger for one command invocation.
    pub fn logger(&self, command: &str) -> Result<StructuredLogger> {
        let level = if self.output.is_verbose() {
            edge_observability::LogLevel::Debug
        } else {
            self.config.log.level()?
        };
        Ok(StructuredLogger::new(RequestId::generate())
            .with_component("ohmysales-cli")
            .with_route(command)
            .with_min_level(level)
            .with_format(self.config.log.format()?))
    }

    /// Client for the configured Supabase project.
    pub fn supabase(&self) -> Result<SupabaseClient> {
        self.output
            .debug(&format!("Supabase REST API: {}", self.config.supabase.rest_url()));
        SupabaseClient::new(&self.config.supabase).context(
            "Supabase is not configured; set SUPABASE_URL and SUPABASE_ANON_KEY or run `ohmysales config init`",
        )
    }

    /// Reference date for expiry decisions, in the configured time zone.
    pub fn today(&self) -> NaiveDate {
        ListingPipeline::today_in(self.config.site.time_zone().unwrap_or(DEFAULT_TIME_ZONE))
    }

    pub fn vote_timeout(&self) -> Duration {
        Duration::from_secs(self.config.votes.timeout_secs)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        absolute(Path::new(path), &self.cwd)
    }

    /// The vote marker file, the same for every working directory.
    pub fn marker_path(&self) -> PathBuf {
        absolute(Path::new(&self.config.votes.marker_file), &self.state_dir)
    }
}

fn absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(|name| std::env::var_os(name))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Find a config file in `start` or one of its parents.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_FILE_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}
