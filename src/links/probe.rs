// src/links/probe.rs
// =============================================================================
// Probes a single link and classifies the outcome.
//
// A probe is a GET that follows redirects (HEAD is answered inconsistently by
// real servers). The body is streamed and thrown away chunk by chunk so a
// worker never holds a whole page in memory.
//
// HTTP status codes:
// - 200-399: reachable (redirects are followed, so 3xx is rare here)
// - 400-599: broken
// =============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::AuditError;

// Redirect hops a probe will follow before giving up
const PROBE_REDIRECT_LIMIT: usize = 10;

/// Classification of one probed link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum LinkStatus {
    /// Final response below 400
    Ok(u16),
    /// Final response 400 or above
    HttpError(u16),
    /// Request (or the whole probe) timed out
    Timeout,
    /// SSL/TLS certificate error
    SslError,
    /// Redirect loop or too many hops
    TooManyRedirects,
    /// Could not resolve hostname
    DnsError,
    /// Other error
    Error(String),
}

impl LinkStatus {
    pub fn from_status(code: u16) -> Self {
        if code >= 400 {
            LinkStatus::HttpError(code)
        } else {
            LinkStatus::Ok(code)
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, LinkStatus::Ok(_))
    }

    // Categorizes the different ways a reqwest request can fail
    fn from_error(error: &reqwest::Error) -> Self {
        let error_string = error.to_string();

        if error.is_timeout() {
            LinkStatus::Timeout
        } else if error.is_redirect() {
            LinkStatus::TooManyRedirects
        } else if error.is_connect() && error_string.contains("dns") {
            LinkStatus::DnsError
        } else if error_string.contains("certificate") || error_string.contains("ssl") {
            LinkStatus::SslError
        } else {
            LinkStatus::Error(error_string)
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStatus::Ok(code) | LinkStatus::HttpError(code) => write!(f, "HTTP {}", code),
            LinkStatus::Timeout => f.write_str("Request timed out"),
            LinkStatus::SslError => f.write_str("SSL certificate error"),
            LinkStatus::TooManyRedirects => f.write_str("Too many redirects"),
            LinkStatus::DnsError => f.write_str("Could not resolve hostname"),
            LinkStatus::Error(message) => f.write_str(message),
        }
    }
}

/// Something that can tell whether a URL is reachable.
#[async_trait]
pub trait LinkProber: Send + Sync {
    async fn probe(&self, url: &Url) -> LinkStatus;
}

pub struct HttpLinkProber {
    client: Client,
}

impl HttpLinkProber {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, AuditError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(PROBE_REDIRECT_LIMIT))
            .build()
            .map_err(|e| AuditError::Validation(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LinkProber for HttpLinkProber {
    async fn probe(&self, url: &Url) -> LinkStatus {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return LinkStatus::from_error(&e),
        };

        let status = LinkStatus::from_status(response.status().as_u16());
        if !status.is_ok() {
            debug!(url = %url, %status, "link broken");
            return status;
        }

        // Drain the body so the connection is released cleanly
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            if let Err(e) = chunk {
                return LinkStatus::from_error(&e);
            }
        }

        status
    }
}
