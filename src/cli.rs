// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Subcommands:
// - audit <URL>    audit one page
// - batch <FILE>   audit every URL listed in a file, one per line
// - config         print the default configuration as TOML
//
// Tuning flags shared by audit and batch live in AuditOptions and are
// flattened into both subcommands.
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use seo_guardian::{AuditConfig, ConfigError};

#[derive(Parser, Debug)]
#[command(
    name = "seo-guardian",
    version,
    about = "Audit a web page's on-site SEO health",
    long_about = "seo-guardian fetches a page and checks its title, meta description, headings, \
                  content length, image alt text, TLS certificate, links, redirects, sitemap and \
                  robots.txt, then scores the page from 0 to 100 with a ranked list of fixes."
)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit a single page
    ///
    /// Example: seo-guardian audit https://example.com --min-score 70
    Audit {
        /// Page URL (a bare host gets http:// prepended)
        url: String,

        #[command(flatten)]
        options: AuditOptions,
    },

    /// Audit every URL in a file (one per line, '#' starts a comment)
    ///
    /// Example: seo-guardian batch sites.txt --json
    Batch {
        /// File with one URL per line
        file: PathBuf,

        #[command(flatten)]
        options: AuditOptions,
    },

    /// Print the default configuration as TOML
    ///
    /// Example: seo-guardian config > seo-guardian.toml
    Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AuditOptions {
    /// Output the full report as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// TOML configuration file; flags below override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Link probes in flight at once
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Per-link timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub link_timeout: Option<u64>,

    /// Maximum same-origin links probed per page
    #[arg(long, value_name = "N")]
    pub max_links: Option<usize>,

    /// Overall network budget per audit in seconds (0 disables it)
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Exit with code 1 when a score falls below this
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_score: Option<u8>,
}

impl AuditOptions {
    /// Defaults, then the config file, then flags.
    pub fn load_config(&self) -> Result<AuditConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AuditConfig::from_file(path)?,
            None => AuditConfig::default(),
        };

        if let Some(workers) = self.workers {
            config.link_worker_count = workers;
        }
        if let Some(secs) = self.link_timeout {
            config.link_timeout_secs = secs;
        }
        if let Some(max_links) = self.max_links {
            config.max_links_checked = max_links;
        }
        if let Some(secs) = self.deadline {
            config.audit_deadline_secs = Some(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Whether `score` is below the `--min-score` gate.
    pub fn below_minimum(&self, score: u8) -> bool {
        self.min_score.is_some_and(|min| score < min)
    }
}
