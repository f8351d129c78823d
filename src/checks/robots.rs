// src/checks/robots.rs
// =============================================================================
// robots.txt presence and basic directives.
//
// Line-oriented and case-insensitive. This is not a robots.txt parser: it only
// answers "is this directive present" questions, one recommendation per
// missing or suspicious element.
// =============================================================================

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{CheckMetrics, CheckName, CheckResult, SiteCheck};
use crate::audit::AuditInput;
use crate::fetch::DocumentFetcher;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotsMetrics {
    pub exists: bool,
    pub url: Option<String>,
    pub has_sitemap: bool,
    pub has_user_agent: bool,
    pub has_disallow: bool,
    pub has_wildcard_user_agent: bool,
    pub has_empty_rules: bool,
}

impl CheckMetrics for RobotsMetrics {
    fn passed(&self) -> bool {
        self.exists
            && self.has_sitemap
            && self.has_user_agent
            && self.has_wildcard_user_agent
            && !self.has_empty_rules
    }
}

struct Directives {
    sitemap: Regex,
    user_agent: Regex,
    wildcard_user_agent: Regex,
    disallow: Regex,
    empty_disallow: Regex,
    empty_allow: Regex,
}

fn directives() -> &'static Directives {
    static DIRECTIVES: OnceLock<Directives> = OnceLock::new();
    DIRECTIVES.get_or_init(|| Directives {
        sitemap: Regex::new(r"(?im)^[ \t]*sitemap:[ \t]*https?://").unwrap(),
        user_agent: Regex::new(r"(?im)^[ \t]*user-agent:").unwrap(),
        wildcard_user_agent: Regex::new(r"(?im)^[ \t]*user-agent:[ \t]*\*").unwrap(),
        disallow: Regex::new(r"(?im)^[ \t]*disallow:").unwrap(),
        // Anchored at line start so "Disallow:" never counts as "Allow:"
        empty_disallow: Regex::new(r"(?im)^[ \t]*disallow:[ \t]*\r?$").unwrap(),
        empty_allow: Regex::new(r"(?im)^[ \t]*allow:[ \t]*\r?$").unwrap(),
    })
}

pub struct RobotsCheck {
    fetcher: Arc<dyn DocumentFetcher>,
}

impl RobotsCheck {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { fetcher }
    }
}

/// Grades the content of a robots.txt that was found at `url`.
pub(crate) fn analyze_robots(url: String, content: &str) -> CheckResult<RobotsMetrics> {
    let d = directives();
    let empty_disallow = d.empty_disallow.is_match(content);
    let empty_allow = d.empty_allow.is_match(content);

    let metrics = RobotsMetrics {
        exists: true,
        url: Some(url),
        has_sitemap: d.sitemap.is_match(content),
        has_user_agent: d.user_agent.is_match(content),
        has_disallow: d.disallow.is_match(content),
        has_wildcard_user_agent: d.wildcard_user_agent.is_match(content),
        has_empty_rules: empty_disallow || empty_allow,
    };

    let mut recommendations = Vec::new();
    if !metrics.has_sitemap {
        recommendations.push("Add Sitemap directive to robots.txt".to_string());
    }
    if !metrics.has_user_agent {
        recommendations.push("Add User-agent directive to robots.txt".to_string());
    }
    if !metrics.has_disallow {
        recommendations.push("Consider adding Disallow rules to robots.txt".to_string());
    }
    if empty_disallow {
        recommendations.push("Fix empty Disallow rules".to_string());
    }
    if empty_allow {
        recommendations.push("Fix empty Allow rules".to_string());
    }
    if !metrics.has_wildcard_user_agent {
        recommendations.push("Add wildcard User-agent rule".to_string());
    }

    CheckResult::new(metrics, recommendations)
}

#[async_trait]
impl SiteCheck for RobotsCheck {
    type Metrics = RobotsMetrics;

    async fn run(&self, input: &AuditInput) -> CheckResult<RobotsMetrics> {
        let missing = || {
            CheckResult::new(
                RobotsMetrics::default(),
                vec!["Add a robots.txt file to your website".to_string()],
            )
        };

        let robots_url = match input.base_url.join("/robots.txt") {
            Ok(url) => url,
            Err(e) => return CheckResult::failed(e, CheckName::RobotsTxt.error_recommendation()),
        };

        match self.fetcher.fetch(&robots_url).await {
            Ok(page) if page.is_success() => {
                info!(url = %robots_url, "robots.txt found");
                analyze_robots(robots_url.to_string(), &page.body)
            }
            Ok(page) => {
                debug!(url = %robots_url, status = page.status, "robots.txt missing");
                missing()
            }
            Err(e) => {
                debug!(url = %robots_url, error = %e, "robots.txt unreachable");
                missing()
            }
        }
    }
}
