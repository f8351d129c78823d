// src/checks/ssl.rs
// =============================================================================
// HTTPS usage and certificate expiry.
//
// Outcomes:
// - URL is not https             -> is_secure=false, no network access
// - handshake/certificate broken -> is_secure=true,  has_valid_cert=false
// - host unreachable over TLS    -> is_secure=false
// - certificate fine             -> days_remaining, warning under threshold
//
// This is the only check whose output depends on the wall clock.
// =============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{CheckMetrics, CheckName, CheckResult, SiteCheck};
use crate::audit::AuditInput;
use crate::fetch::{CertificateInfo, CertificateProbe};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SslMetrics {
    pub is_secure: bool,
    pub has_valid_cert: bool,
    /// RFC 3339 expiry timestamp
    pub cert_expiry: Option<String>,
    pub days_remaining: Option<i64>,
    pub expires_soon: bool,
    pub issuer: Option<String>,
}

impl CheckMetrics for SslMetrics {
    fn passed(&self) -> bool {
        self.is_secure && self.has_valid_cert && !self.expires_soon
    }
}

pub struct SslCheck {
    probe: Arc<dyn CertificateProbe>,
    warning_days: i64,
}

impl SslCheck {
    pub fn new(probe: Arc<dyn CertificateProbe>, warning_days: i64) -> Self {
        Self {
            probe,
            warning_days,
        }
    }

    /// Grades a certificate against `now`.
    pub fn evaluate(&self, cert: &CertificateInfo, now: DateTime<Utc>) -> CheckResult<SslMetrics> {
        let days_remaining = (cert.not_after - now).num_days();
        let expired = cert.not_after <= now;

        let mut recommendations = Vec::new();
        if expired {
            recommendations.push(format!(
                "SSL certificate expired {} days ago. Renew it immediately",
                -days_remaining
            ));
        } else if days_remaining < self.warning_days {
            recommendations.push(format!("SSL certificate expires in {} days", days_remaining));
        }

        CheckResult::new(
            SslMetrics {
                is_secure: true,
                has_valid_cert: !expired,
                cert_expiry: Some(cert.not_after.to_rfc3339()),
                days_remaining: Some(days_remaining),
                expires_soon: !expired && days_remaining < self.warning_days,
                issuer: Some(cert.issuer.clone()),
            },
            recommendations,
        )
    }
}

#[async_trait]
impl SiteCheck for SslCheck {
    type Metrics = SslMetrics;

    async fn run(&self, input: &AuditInput) -> CheckResult<SslMetrics> {
        let url = &input.base_url;
        if url.scheme() != "https" {
            return CheckResult::new(
                SslMetrics::default(),
                vec!["Enable HTTPS for your website".to_string()],
            );
        }

        let Some(host) = url.host_str() else {
            return CheckResult::failed("URL has no host", CheckName::Ssl.error_recommendation());
        };
        let port = url.port_or_known_default().unwrap_or(443);

        match self.probe.peer_certificate(host, port).await {
            Ok(cert) => self.evaluate(&cert, Utc::now()),
            Err(e) if e.is_tls_handshake() => {
                warn!(host, error = %e, "certificate rejected");
                CheckResult {
                    metrics: SslMetrics {
                        is_secure: true,
                        ..SslMetrics::default()
                    },
                    recommendations: vec!["Fix SSL certificate issues".to_string()],
                    error: Some(e.to_string()),
                }
            }
            Err(e) => {
                warn!(host, error = %e, "TLS endpoint unreachable");
                CheckResult::failed(e, CheckName::Ssl.error_recommendation())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;
    use crate::fetch::FetchedPage;
    use chrono::Duration;
    use url::Url;

    enum Scripted {
        Expires(DateTime<Utc>),
        Handshake,
        Unreachable,
    }

    struct FakeProbe(Scripted);

    #[async_trait]
    impl CertificateProbe for FakeProbe {
        async fn peer_certificate(&self, host: &str, _port: u16) -> Result<CertificateInfo, AuditError> {
            match self.0 {
                Scripted::Expires(not_after) => Ok(CertificateInfo {
                    not_after,
                    issuer: "CN=Test CA".to_string(),
                    subject: format!("CN={}", host),
                }),
                Scripted::Handshake => Err(AuditError::tls(host, "invalid peer certificate")),
                Scripted::Unreachable => Err(AuditError::network(host, "Connection refused")),
            }
        }
    }

    fn input(url: &str) -> AuditInput {
        let url = Url::parse(url).unwrap();
        AuditInput::new(
            url.clone(),
            FetchedPage {
                status: 200,
                body: String::new(),
                final_url: url,
            },
        )
    }

    fn check(scripted: Scripted) -> SslCheck {
        SslCheck::new(Arc::new(FakeProbe(scripted)), 30)
    }

    #[tokio::test]
    async fn test_plain_http_short_circuits() {
        let result = check(Scripted::Unreachable).run(&input("http://example.com")).await;
        assert!(!result.metrics.is_secure);
        assert!(result.error.is_none());
        assert_eq!(result.recommendations, vec!["Enable HTTPS for your website"]);
    }

    #[tokio::test]
    async fn test_healthy_certificate() {
        let not_after = Utc::now() + Duration::days(200);
        let result = check(Scripted::Expires(not_after)).run(&input("https://example.com")).await;
        assert!(result.metrics.is_secure);
        assert!(result.metrics.has_valid_cert);
        assert!(result.recommendations.is_empty());
        assert!(result.passed());
    }

    #[tokio::test]
    async fn test_handshake_failure_is_still_secure() {
        let result = check(Scripted::Handshake).run(&input("https://example.com")).await;
        assert!(result.metrics.is_secure);
        assert!(!result.metrics.has_valid_cert);
        assert_eq!(result.top_recommendation(), Some("Fix SSL certificate issues"));
    }

    #[tokio::test]
    async fn test_network_failure_is_insecure() {
        let result = check(Scripted::Unreachable).run(&input("https://example.com")).await;
        assert!(!result.metrics.is_secure);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_expiry_warning_threshold() {
        let now = Utc::now();
        let ssl = check(Scripted::Unreachable);
        let cert = |days: i64| CertificateInfo {
            not_after: now + Duration::days(days) + Duration::hours(1),
            issuer: "CN=Test CA".to_string(),
            subject: "CN=example.com".to_string(),
        };

        let soon = ssl.evaluate(&cert(10), now);
        assert_eq!(soon.metrics.days_remaining, Some(10));
        assert!(soon.metrics.expires_soon);
        assert_eq!(soon.recommendations, vec!["SSL certificate expires in 10 days"]);

        let fine = ssl.evaluate(&cert(30), now);
        assert!(!fine.metrics.expires_soon);
        assert!(fine.recommendations.is_empty());
    }

    #[test]
    fn test_expired_certificate() {
        let now = Utc::now();
        let cert = CertificateInfo {
            not_after: now - Duration::days(3) - Duration::hours(1),
            issuer: "CN=Test CA".to_string(),
            subject: "CN=example.com".to_string(),
        };
        let result = check(Scripted::Unreachable).evaluate(&cert, now);
        assert!(!result.metrics.has_valid_cert);
        assert!(result.recommendations[0].starts_with("SSL certificate expired 3 days ago"));
    }
}
