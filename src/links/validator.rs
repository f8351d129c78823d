// src/links/validator.rs
// =============================================================================
// Probes many links concurrently with a fixed-size worker pool.
//
// Guarantees:
// - at most `workers` probes are in flight at any moment
// - every input URL gets exactly one outcome
// - a hanging probe is cut off by its own timeout and counted as broken;
//   it never holds up the other probes beyond that budget
// - outcomes come back in input order, whatever order the probes finished in
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};
use url::Url;

use super::probe::{LinkProber, LinkStatus};

/// Verdict for one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkProbeOutcome {
    pub url: Url,
    pub status: LinkStatus,
}

impl LinkProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        self.status.is_ok()
    }
}

pub struct LinkValidator {
    prober: Arc<dyn LinkProber>,
    workers: usize,
    timeout: Duration,
}

impl LinkValidator {
    pub fn new(prober: Arc<dyn LinkProber>, workers: usize, timeout: Duration) -> Self {
        Self {
            prober,
            workers: workers.max(1),
            timeout,
        }
    }

    /// Probes every URL and returns one outcome per URL, in input order.
    pub async fn validate(&self, urls: Vec<Url>) -> Vec<LinkProbeOutcome> {
        let total = urls.len();
        info!(links = total, workers = self.workers, "validating links");

        let probes = urls.into_iter().enumerate().map(|(index, url)| {
            let prober = Arc::clone(&self.prober);
            let timeout = self.timeout;
            async move {
                // The prober has its own request timeout; this one also covers
                // a prober that never returns at all.
                let status = match tokio::time::timeout(timeout, prober.probe(&url)).await {
                    Ok(status) => status,
                    Err(_) => LinkStatus::Timeout,
                };
                (index, LinkProbeOutcome { url, status })
            }
        });

        // buffer_unordered(N) keeps at most N probes running and yields each
        // result as soon as it is ready.
        let mut outcomes: Vec<(usize, LinkProbeOutcome)> = stream::iter(probes)
            .buffer_unordered(self.workers)
            .collect()
            .await;

        outcomes.sort_by_key(|(index, _)| *index);

        let broken = outcomes.iter().filter(|(_, o)| !o.is_reachable()).count();
        debug!(links = total, broken, "link validation finished");

        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }
}
