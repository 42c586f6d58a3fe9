// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes. Values are checked again when the Cli is
// turned into a CrawlConfig (see config.rs).
// =============================================================================

use clap::{ArgAction, Parser};

// The whole CLI: one positional URL plus tuning flags
#[derive(Parser, Debug)]
#[command(
    name = "site-crawler",
    version,
    about = "Crawl every page of a single website",
    long_about = "site-crawler starts from one URL and follows every link that stays on the same \
                  host, visiting each page once. Progress is printed as pages are fetched and a \
                  summary is printed at the end."
)]
pub struct Cli {
    /// URL to start crawling from (e.g., https://example.com)
    pub url: String,

    /// Number of pages fetched at the same time
    #[arg(short, long, default_value_t = 8)]
    pub workers: usize,

    /// Maximum crawl depth (unlimited if not given)
    ///
    /// Depth 1 = just the starting page
    /// Depth 2 = starting page + all pages it links to
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Extra attempts for timeouts, connection failures and 5xx/429 responses
    #[arg(long, default_value_t = 2)]
    pub retries: u32,

    /// Validate TLS certificates (invalid certificates are accepted by default)
    #[arg(long)]
    pub verify_certs: bool,

    /// Print the final report as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
