// src/fetch/http.rs
// =============================================================================
// HTTP fetching for the audit: the page itself, robots.txt, sitemaps, and the
// redirect chain of the audited URL.
//
// Two clients are kept:
// - `client` follows redirects (page, robots.txt, sitemaps)
// - `manual` never follows them, so trace_redirects can walk the chain and
//   record each hop itself
// =============================================================================

use async_trait::async_trait;
use reqwest::{header::LOCATION, redirect::Policy, Client};
use tracing::debug;
use url::Url;

use super::{DocumentFetcher, FetchedPage, RedirectTrace};
use crate::config::AuditConfig;
use crate::error::AuditError;

// Hard stop for trace_redirects; chains longer than the configured maximum
// are still reported, this only guards against loops.
const REDIRECT_FOLLOW_LIMIT: usize = 20;

pub struct HttpFetcher {
    client: Client,
    manual: Client,
}

impl HttpFetcher {
    pub fn new(config: &AuditConfig) -> Result<Self, AuditError> {
        let client = build_client(config, Policy::limited(REDIRECT_FOLLOW_LIMIT))?;
        let manual = build_client(config, Policy::none())?;
        Ok(Self { client, manual })
    }
}

fn build_client(config: &AuditConfig, policy: Policy) -> Result<Client, AuditError> {
    Client::builder()
        .timeout(config.request_timeout())
        .user_agent(config.user_agent.as_str())
        .redirect(policy)
        .build()
        .map_err(|e| AuditError::Validation(format!("failed to build HTTP client: {}", e)))
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, AuditError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AuditError::network(url.as_str(), describe_error(&e)))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        // Error pages still carry a body worth parsing
        let body = response
            .text()
            .await
            .map_err(|e| AuditError::network(url.as_str(), describe_error(&e)))?;

        debug!(url = %url, status, bytes = body.len(), "fetched");
        Ok(FetchedPage {
            status,
            body,
            final_url,
        })
    }

    async fn trace_redirects(&self, url: &Url) -> Result<RedirectTrace, AuditError> {
        let mut hops = Vec::new();
        let mut current = url.clone();

        loop {
            let response = self
                .manual
                .get(current.clone())
                .send()
                .await
                .map_err(|e| AuditError::network(current.as_str(), describe_error(&e)))?;

            if !response.status().is_redirection() {
                // Dropping the response closes it without reading the body
                return Ok(RedirectTrace {
                    hops,
                    final_url: current,
                });
            }

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let Some(location) = location else {
                // A 3xx without Location is where the chain ends
                return Ok(RedirectTrace {
                    hops,
                    final_url: current,
                });
            };

            let next = current.join(&location).map_err(|e| {
                AuditError::network(
                    current.as_str(),
                    format!("invalid redirect target '{}': {}", location, e),
                )
            })?;

            hops.push(current);
            if hops.len() >= REDIRECT_FOLLOW_LIMIT {
                return Err(AuditError::network(url.as_str(), "Too many redirects"));
            }
            current = next;
        }
    }
}

/// Human-readable reason for a failed request.
pub fn describe_error(error: &reqwest::Error) -> String {
    let error_string = error.to_string();

    if error.is_timeout() {
        "Request timed out".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else if error.is_connect() {
        if error_string.contains("dns") {
            "Could not resolve hostname".to_string()
        } else {
            "Connection failed".to_string()
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error_string
    }
}
