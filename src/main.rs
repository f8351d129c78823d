// src/main.rs
// =============================================================================
// Entry point of the seo-guardian CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Install the tracing subscriber (logs go to stderr, reports to stdout)
// 3. Dispatch to the subcommand handler
// 4. Exit with proper code (0 = ok, 1 = score below --min-score, 2 = error)
// =============================================================================

mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{AuditOptions, Cli, Commands};
use seo_guardian::{report, AuditConfig, AuditReport, Auditor};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Audit { url, options } => handle_audit(&url, &options).await,
        Commands::Batch { file, options } => handle_batch(&file, &options).await,
        Commands::Config => handle_config(),
    }
}

// RUST_LOG wins when set; otherwise --verbose picks between info and debug
// for our own crate and keeps dependencies at warn.
fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "warn,seo_guardian=debug"
    } else {
        "warn,seo_guardian=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_auditor(options: &AuditOptions) -> Result<Auditor> {
    let config = options.load_config().context("invalid configuration")?;
    debug!(?config, "configuration loaded");
    Auditor::new(config).context("failed to set up network clients")
}

async fn handle_audit(url: &str, options: &AuditOptions) -> Result<i32> {
    let auditor = build_auditor(options)?;
    let report = auditor.audit(url).await;

    if options.json {
        println!("{}", report::to_json(&report)?);
    } else {
        report::print_table(&report)?;
    }

    if report.is_failed() {
        Ok(2)
    } else if options.below_minimum(report.overall_score) {
        Ok(1)
    } else {
        Ok(0)
    }
}

async fn handle_batch(file: &Path, options: &AuditOptions) -> Result<i32> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read URL list {}", file.display()))?;
    let urls = seed_urls(&content);

    if urls.is_empty() {
        println!("⚠️  No URLs found in {}", file.display());
        return Ok(0);
    }

    let auditor = build_auditor(options)?;
    info!(count = urls.len(), "starting batch audit");

    let mut reports: Vec<AuditReport> = Vec::with_capacity(urls.len());
    for url in urls {
        reports.push(auditor.audit(url).await);
    }

    if options.json {
        println!("{}", report::batch_to_json(&reports)?);
    } else {
        report::print_batch_table(&reports)?;
    }

    if reports.iter().all(AuditReport::is_failed) {
        Ok(2)
    } else if reports.iter().any(|r| options.below_minimum(r.overall_score)) {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn handle_config() -> Result<i32> {
    let text = toml::to_string_pretty(&AuditConfig::default())
        .context("failed to serialize the default configuration")?;
    print!("{}", text);
    Ok(0)
}

/// Non-empty lines that are not `#` comments, in file order.
fn seed_urls(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}
