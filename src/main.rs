// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and validate them
// 2. Build the HTTP fetcher and run the crawl
// 3. Print the report (table or JSON)
// 4. Exit with proper code (0 = all pages fetched, 1 = some failed, 2 = error)
// =============================================================================

mod cli;
mod config;
mod crawl;
mod page;
mod tracer;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use cli::Cli;
use config::CrawlConfig;
use crawl::{CrawlReport, PageReport};
use page::{Fetcher, PageStatus};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    tracer::init_tracing(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every page was fetched
//   Ok(1) = at least one page failed
//   Err = bad arguments or the crawl could not start
async fn run(cli: Cli) -> Result<i32> {
    let config = CrawlConfig::from_cli(&cli)?;
    let fetcher = Fetcher::new(&config.fetch)?;

    if !cli.json {
        println!("🔍 Crawling website: {}", config.seed);
        match config.max_depth {
            Some(depth) => println!("📊 Max crawl depth: {}", depth),
            None => println!("📊 Max crawl depth: unlimited"),
        }
    }

    let report = crawl::crawl_website(&config, Arc::new(fetcher), shutdown_signal()).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }

    if report.failed_count() > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Resolves on Ctrl-C. If the handler can't be installed the crawl just
// runs to completion.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn print_table(report: &CrawlReport) {
    println!();
    println!("{:<60} {:<6} {:<20} {:<6}", "URL", "DEPTH", "STATUS", "LINKS");
    println!("{}", "=".repeat(95));

    for page in &report.pages {
        // Truncate URL if too long for display
        let url_display = if page.url.chars().count() > 57 {
            format!("{}...", page.url.chars().take(57).collect::<String>())
        } else {
            page.url.clone()
        };

        println!(
            "{:<60} {:<6} {:<20} {:<6}",
            url_display,
            page.depth,
            format_status(page),
            page.links_found
        );
    }

    println!();
    if report.interrupted {
        println!("⚠️  Interrupted, {} discovered page(s) not fetched", report.unvisited);
    }
    println!("📊 Summary:");
    println!("   ✅ Fetched: {}", report.ok_count());
    println!("   ❌ Failed: {}", report.failed_count());
    println!("   📋 Total: {}", report.pages.len());
}

fn format_status(page: &PageReport) -> String {
    match page.status {
        PageStatus::Ok => "✅ OK".to_string(),
        PageStatus::AlreadySeen => "🔀 ALREADY SEEN".to_string(),
        PageStatus::OffSite => "🔀 OFF SITE".to_string(),
        PageStatus::HttpError { code } => format!("❌ HTTP {}", code),
        PageStatus::Timeout => "⏱️  TIMEOUT".to_string(),
        PageStatus::TlsError => "🔒 TLS ERROR".to_string(),
        PageStatus::ConnectError => "🌐 CONNECT ERROR".to_string(),
        PageStatus::Error => "⚠️  ERROR".to_string(),
    }
}
