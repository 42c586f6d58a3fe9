// src/config.rs
// =============================================================================
// Validated crawl settings.
//
// The Cli struct holds whatever the user typed. Before any request is made
// it is turned into a CrawlConfig here, so the rest of the program can rely
// on a parsed seed URL and sane numbers.
// =============================================================================

use anyhow::{anyhow, bail, Result};
use std::time::Duration;
use url::Url;

use crate::cli::Cli;

// Delay before the first retry; doubles on each further attempt
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// The starting URL; its host is the crawl boundary
    pub seed: Url,
    /// Size of the worker pool
    pub workers: usize,
    /// Deepest page to fetch (seed = 1), None = unlimited
    pub max_depth: Option<usize>,
    /// Print a line per page as it is fetched
    pub print_progress: bool,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub retries: u32,
    pub backoff: Duration,
    pub verify_certs: bool,
}

impl CrawlConfig {
    pub fn from_cli(cli: &Cli) -> Result<CrawlConfig> {
        let seed = parse_seed(&cli.url)?;

        if cli.workers == 0 {
            bail!("--workers must be greater than 0");
        }
        if cli.timeout == 0 {
            bail!("--timeout must be greater than 0");
        }
        if cli.max_depth == Some(0) {
            bail!("--max-depth must be at least 1");
        }

        Ok(CrawlConfig {
            seed,
            workers: cli.workers,
            max_depth: cli.max_depth,
            print_progress: !cli.json,
            fetch: FetchConfig {
                timeout: Duration::from_secs(cli.timeout),
                retries: cli.retries,
                backoff: RETRY_BACKOFF,
                verify_certs: cli.verify_certs,
            },
        })
    }
}

// Parses and checks the starting URL
//
// Only http(s) URLs with a host can be crawled. The fragment is dropped so
// the seed compares equal to links that point back at it.
fn parse_seed(raw: &str) -> Result<Url> {
    let mut seed = Url::parse(raw).map_err(|e| anyhow!("Invalid URL '{}': {}", raw, e))?;

    if seed.scheme() != "http" && seed.scheme() != "https" {
        bail!("Unsupported scheme '{}' in {}", seed.scheme(), raw);
    }
    if seed.host_str().is_none() {
        bail!("URL has no host: {}", raw);
    }

    seed.set_fragment(None);
    Ok(seed)
}
