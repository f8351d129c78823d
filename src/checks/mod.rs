// src/checks/mod.rs
// =============================================================================
// The fixed battery of SEO checks.
//
// Submodules (one per signal):
// - title, meta, headings, word_count, images: read the parsed HTML document
// - ssl, redirects, sitemap, robots: talk to the audited site
// - broken_links: collects links from the document, then probes them
// - keywords: lexical keyword density summary (not a scored check)
//
// Every checker is total. Whatever goes wrong inside a checker ends up as a
// CheckResult with an `error` field and safe defaults, never as an Err.
// =============================================================================

mod broken_links;
mod headings;
mod images;
mod keywords;
mod meta;
mod redirects;
mod robots;
mod sitemap;
mod ssl;
mod title;
mod word_count;

pub use broken_links::{BrokenLinkCheck, BrokenLinkMetrics};
pub use headings::{HeadingCheck, HeadingMetrics};
pub use images::{ImageAltCheck, ImageAltMetrics};
pub use keywords::{summarize_keywords, KeywordDensity, KeywordSummary};
pub use meta::{MetaDescriptionCheck, MetaDescriptionMetrics};
pub use redirects::{RedirectCheck, RedirectMetrics};
pub use robots::{RobotsCheck, RobotsMetrics};
pub use sitemap::{SitemapCheck, SitemapMetrics};
pub use ssl::{SslCheck, SslMetrics};
pub use title::{TitleCheck, TitleMetrics};
pub use word_count::{WordCountCheck, WordCountMetrics};

use std::fmt;

use async_trait::async_trait;
use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::audit::AuditInput;

/// Stable names of the ten checks, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    Title,
    MetaDescription,
    H1,
    WordCount,
    ImageAlt,
    Ssl,
    BrokenLinks,
    Redirects,
    Sitemap,
    RobotsTxt,
}

impl CheckName {
    pub const ALL: [CheckName; 10] = [
        CheckName::Title,
        CheckName::MetaDescription,
        CheckName::H1,
        CheckName::WordCount,
        CheckName::ImageAlt,
        CheckName::Ssl,
        CheckName::BrokenLinks,
        CheckName::Redirects,
        CheckName::Sitemap,
        CheckName::RobotsTxt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckName::Title => "title",
            CheckName::MetaDescription => "meta_description",
            CheckName::H1 => "h1",
            CheckName::WordCount => "word_count",
            CheckName::ImageAlt => "image_alt",
            CheckName::Ssl => "ssl",
            CheckName::BrokenLinks => "broken_links",
            CheckName::Redirects => "redirects",
            CheckName::Sitemap => "sitemap",
            CheckName::RobotsTxt => "robots_txt",
        }
    }

    /// Recommendation attached to a result when the check itself failed.
    pub fn error_recommendation(&self) -> &'static str {
        match self {
            CheckName::Title => "Error analyzing title tag",
            CheckName::MetaDescription => "Error analyzing meta description",
            CheckName::H1 => "Error analyzing H1 tags",
            CheckName::WordCount => "Error analyzing word count",
            CheckName::ImageAlt => "Error analyzing image alt text",
            CheckName::Ssl => "Error checking SSL certificate",
            CheckName::BrokenLinks => "Error checking broken links",
            CheckName::Redirects => "Error checking redirects",
            CheckName::Sitemap => "Error checking sitemap",
            CheckName::RobotsTxt => "Error checking robots.txt",
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checker-specific metrics.
///
/// `Default` must produce the safe defaults used when a checker fails:
/// zero counts, `false` flags, empty lists.
pub trait CheckMetrics: Default {
    /// Whether the signal is healthy enough to need no recommendation
    /// in the overall report.
    fn passed(&self) -> bool;
}

/// The output of one checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult<M> {
    #[serde(flatten)]
    pub metrics: M,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<M: CheckMetrics> CheckResult<M> {
    pub fn new(metrics: M, recommendations: Vec<String>) -> Self {
        Self {
            metrics,
            recommendations,
            error: None,
        }
    }

    /// Safe-default result for a checker that could not do its job.
    pub fn failed(error: impl fmt::Display, recommendation: impl Into<String>) -> Self {
        Self {
            metrics: M::default(),
            recommendations: vec![recommendation.into()],
            error: Some(error.to_string()),
        }
    }

    pub fn passed(&self) -> bool {
        self.error.is_none() && self.metrics.passed()
    }

    /// The most important recommendation (checkers push them in priority order).
    pub fn top_recommendation(&self) -> Option<&str> {
        self.recommendations.first().map(String::as_str)
    }
}

/// A check that only needs the parsed document.
///
/// `scraper::Html` is not `Send`, so these run synchronously before the
/// orchestrator starts awaiting network work.
pub trait DocumentCheck {
    type Metrics: CheckMetrics;

    fn run(&self, document: &Html) -> CheckResult<Self::Metrics>;
}

/// A check that talks to the audited site.
#[async_trait]
pub trait SiteCheck: Send + Sync {
    type Metrics: CheckMetrics + Send;

    async fn run(&self, input: &AuditInput) -> CheckResult<Self::Metrics>;
}
