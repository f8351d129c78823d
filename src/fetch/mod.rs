// src/fetch/mod.rs
// =============================================================================
// Collaborators that pull raw material off the network.
//
// Submodules:
// - http: reqwest-backed page fetcher and redirect tracer
// - tls: TLS handshake + certificate metadata for the SSL check
//
// The audit pipeline only sees the traits below, so tests can swap in fakes.
// =============================================================================

mod http;
mod tls;

pub use http::{describe_error, HttpFetcher};
pub use tls::TlsCertificateProbe;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use url::Url;

use crate::error::AuditError;

/// Raw response for one GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
    /// URL after following redirects
    pub final_url: Url,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Redirects observed while resolving a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTrace {
    /// Every URL that answered with a redirect, starting with the requested one
    pub hops: Vec<Url>,
    pub final_url: Url,
}

/// Metadata of the certificate a server presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    pub not_after: DateTime<Utc>,
    pub issuer: String,
    pub subject: String,
}

#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// GET `url`, following redirects. HTTP error statuses are returned as
    /// pages, not errors; only transport failures are `Err`.
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, AuditError>;

    /// Follow redirects from `url` hop by hop without downloading bodies.
    async fn trace_redirects(&self, url: &Url) -> Result<RedirectTrace, AuditError>;
}

#[async_trait]
pub trait CertificateProbe: Send + Sync {
    /// Handshake with `host:port` and return the leaf certificate.
    /// Handshake/certificate problems are `AuditError::TlsHandshake`,
    /// everything else `AuditError::Network`.
    async fn peer_certificate(&self, host: &str, port: u16) -> Result<CertificateInfo, AuditError>;
}
