// src/fetch/tls.rs
// =============================================================================
// Opens a TLS connection and reads the leaf certificate's validity window.
//
// Failure split (the SSL check depends on it):
// - TCP connect failure or timeout          -> AuditError::Network
// - handshake rejected, bad/unparsable cert -> AuditError::TlsHandshake
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::debug;

use super::{CertificateInfo, CertificateProbe};
use crate::error::AuditError;

pub struct TlsCertificateProbe {
    connector: TlsConnector,
    timeout: Duration,
}

impl TlsCertificateProbe {
    pub fn new(timeout: Duration) -> Result<Self, AuditError> {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        let config = ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .map_err(|e| AuditError::Validation(format!("TLS configuration: {}", e)))?
        .with_root_certificates(roots)
        .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout,
        })
    }
}

#[async_trait]
impl CertificateProbe for TlsCertificateProbe {
    async fn peer_certificate(&self, host: &str, port: u16) -> Result<CertificateInfo, AuditError> {
        let target = format!("{}:{}", host, port);

        let tcp = match timeout(self.timeout, TcpStream::connect(&target)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(AuditError::network(&target, e.to_string())),
            Err(_) => return Err(AuditError::network(&target, "Connection timed out")),
        };

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| AuditError::Validation(format!("invalid TLS server name '{}': {}", host, e)))?;

        let tls = match timeout(self.timeout, self.connector.connect(server_name, tcp)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(AuditError::tls(host, e.to_string())),
            Err(_) => return Err(AuditError::network(&target, "TLS handshake timed out")),
        };

        let (_, connection) = tls.get_ref();
        let leaf = connection
            .peer_certificates()
            .and_then(|certs| certs.first())
            .ok_or_else(|| AuditError::tls(host, "server presented no certificate"))?;

        let (_, cert) = x509_parser::parse_x509_certificate(leaf.as_ref())
            .map_err(|e| AuditError::tls(host, format!("unparsable certificate: {}", e)))?;

        let not_after = DateTime::<Utc>::from_timestamp(cert.validity().not_after.timestamp(), 0)
            .ok_or_else(|| AuditError::Parse("certificate expiry out of range".to_string()))?;

        debug!(host, %not_after, "peer certificate");
        Ok(CertificateInfo {
            not_after,
            issuer: cert.issuer().to_string(),
            subject: cert.subject().to_string(),
        })
    }
}
