//! Service configuration, parsed from command-line flags.

use anyhow::{Context, Result, anyhow};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.4;
pub const DEFAULT_SUGGEST_LIMIT: usize = 5;
pub const DEFAULT_MAX_LIMIT: usize = 100;

/// Tunables of the three search modes.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Ranked search keeps only keys whose trigram similarity to a query token is strictly
    /// greater than this.
    pub similarity_threshold: f64,
    /// Fixed result cap of suggest search.
    pub suggest_limit: usize,
    /// Upper bound applied to the caller-supplied ranked search limit.
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            suggest_limit: DEFAULT_SUGGEST_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub seed_path: Option<PathBuf>,
    pub search: SearchConfig,
}

impl ServiceConfig {
    pub const USAGE: &'static str = "Usage: workday-search --bind <addr:port> \
        [--database-url <url>] [--seed <employees.json>] \
        [--similarity-threshold <0..1>] [--max-limit <n>]";

    /// Parses flags in the form `--flag value`. Unknown flags are ignored.
    /// `DATABASE_URL` is used when `--database-url` is absent.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut bind_addr: Option<SocketAddr> = None;
        let mut database_url: Option<String> = None;
        let mut seed_path: Option<PathBuf> = None;
        let mut search = SearchConfig::default();

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            let value = || {
                args.get(i + 1)
                    .ok_or_else(|| anyhow!("missing value for {}", flag))
            };

            match flag {
                "--bind" => {
                    bind_addr = Some(value()?.parse().context("invalid --bind address")?);
                    i += 2;
                }
                "--database-url" => {
                    database_url = Some(value()?.clone());
                    i += 2;
                }
                "--seed" => {
                    seed_path = Some(PathBuf::from(value()?));
                    i += 2;
                }
                "--similarity-threshold" => {
                    let threshold: f64 = value()?
                        .parse()
                        .context("invalid --similarity-threshold")?;
                    if !(0.0..=1.0).contains(&threshold) {
                        return Err(anyhow!("--similarity-threshold must be within [0, 1]"));
                    }
                    search.similarity_threshold = threshold;
                    i += 2;
                }
                "--max-limit" => {
                    let max_limit: usize = value()?.parse().context("invalid --max-limit")?;
                    if max_limit == 0 {
                        return Err(anyhow!("--max-limit must be positive"));
                    }
                    search.max_limit = max_limit;
                    i += 2;
                }
                _ => {
                    i += 1;
                }
            }
        }

        let bind_addr = bind_addr.ok_or_else(|| anyhow!("--bind is required"))?;
        let database_url = database_url.or_else(|| std::env::var("DATABASE_URL").ok());

        Ok(Self {
            bind_addr,
            database_url,
            seed_path,
            search,
        })
    }
}
