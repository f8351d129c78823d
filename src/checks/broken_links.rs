// src/checks/broken_links.rs
// =============================================================================
// Broken same-origin links.
//
// Two steps because the parsed DOM can't cross an .await:
// 1. collect(): pull candidate URLs out of the document (sync)
// 2. run():     probe them through the LinkValidator (async)
// =============================================================================

use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use super::{CheckMetrics, CheckResult};
use crate::links::{extract_same_origin_links, LinkValidator};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLinkMetrics {
    pub checked_links_count: usize,
    pub broken_links_count: usize,
    /// Broken URLs in document order
    pub broken_links: Vec<String>,
}

impl CheckMetrics for BrokenLinkMetrics {
    fn passed(&self) -> bool {
        self.broken_links_count == 0
    }
}

pub struct BrokenLinkCheck {
    validator: LinkValidator,
    max_links: usize,
}

impl BrokenLinkCheck {
    pub fn new(validator: LinkValidator, max_links: usize) -> Self {
        Self {
            validator,
            max_links,
        }
    }

    pub fn collect(&self, document: &Html, base: &Url) -> Vec<Url> {
        extract_same_origin_links(document, base, self.max_links)
    }

    pub async fn run(&self, links: Vec<Url>) -> CheckResult<BrokenLinkMetrics> {
        let checked_links_count = links.len();
        let outcomes = self.validator.validate(links).await;

        let broken_links: Vec<String> = outcomes
            .into_iter()
            .filter(|outcome| !outcome.is_reachable())
            .map(|outcome| {
                info!(url = %outcome.url, status = %outcome.status, "broken link");
                outcome.url.to_string()
            })
            .collect();

        let mut recommendations = Vec::new();
        if !broken_links.is_empty() {
            recommendations.push(format!("Fix {} broken links", broken_links.len()));
        }

        CheckResult::new(
            BrokenLinkMetrics {
                checked_links_count,
                broken_links_count: broken_links.len(),
                broken_links,
            },
            recommendations,
        )
    }
}
