// src/checks/redirects.rs
// =============================================================================
// Redirect chain of the audited URL.
//
// The chain is every URL that answered with a redirect followed by the final
// URL, or empty when the URL answered directly. An empty chain is optimal and
// www-consistent, and produces no recommendations.
// =============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::{CheckMetrics, CheckName, CheckResult, SiteCheck};
use crate::audit::AuditInput;
use crate::fetch::DocumentFetcher;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectMetrics {
    pub has_redirects: bool,
    pub redirect_chain: Vec<String>,
    pub final_url: String,
    pub is_optimal: bool,
    pub is_www_consistent: bool,
}

impl CheckMetrics for RedirectMetrics {
    fn passed(&self) -> bool {
        self.is_optimal
    }
}

pub struct RedirectCheck {
    fetcher: Arc<dyn DocumentFetcher>,
    max_redirects: usize,
}

impl RedirectCheck {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, max_redirects: usize) -> Self {
        Self {
            fetcher,
            max_redirects,
        }
    }

    fn evaluate(&self, chain: Vec<Url>, final_url: &Url) -> CheckResult<RedirectMetrics> {
        let has_redirects = !chain.is_empty();
        let too_long = chain.len() > self.max_redirects;
        let insecure = has_redirects && final_url.scheme() != "https";
        let is_www_consistent = www_consistent(&chain);

        let mut recommendations = Vec::new();
        if has_redirects {
            if too_long {
                recommendations.push(format!(
                    "Too many redirects ({}). Keep it to at most {}",
                    chain.len(),
                    self.max_redirects
                ));
            }
            if insecure {
                recommendations.push("Redirect to HTTPS instead of HTTP".to_string());
            }
            if !is_www_consistent {
                recommendations.push("Make www/non-www redirects consistent".to_string());
            }
        }

        CheckResult::new(
            RedirectMetrics {
                has_redirects,
                redirect_chain: chain.iter().map(Url::to_string).collect(),
                final_url: final_url.to_string(),
                is_optimal: !too_long && !insecure && is_www_consistent,
                is_www_consistent,
            },
            recommendations,
        )
    }
}

#[async_trait]
impl SiteCheck for RedirectCheck {
    type Metrics = RedirectMetrics;

    async fn run(&self, input: &AuditInput) -> CheckResult<RedirectMetrics> {
        match self.fetcher.trace_redirects(&input.base_url).await {
            Ok(trace) => {
                debug!(url = %input.base_url, hops = trace.hops.len(), "redirects traced");
                let mut chain = trace.hops;
                if !chain.is_empty() {
                    chain.push(trace.final_url.clone());
                }
                self.evaluate(chain, &trace.final_url)
            }
            Err(e) => {
                warn!(url = %input.base_url, error = %e, "redirect trace failed");
                CheckResult::failed(e, CheckName::Redirects.error_recommendation())
            }
        }
    }
}

/// All hosts in the chain agree on the `www.` prefix.
fn www_consistent(chain: &[Url]) -> bool {
    let mut prefixed = chain
        .iter()
        .map(|url| url.host_str().unwrap_or_default().starts_with("www."));
    match prefixed.next() {
        Some(first) => prefixed.all(|p| p == first),
        None => true,
    }
}
