// src/audit/mod.rs
// =============================================================================
// The audit pipeline: one URL in, one AuditReport out.
//
// What happens in audit():
// 1. Validate the URL and fetch the page (the only steps that can fail the
//    whole audit). An error status still gets audited when it came with a
//    body; only an empty error page is fatal.
// 2. Parse the HTML once and run every document check on it, plus the
//    keyword summary and link collection
// 3. Drop the parsed document, then run the site checks and link validation
//    concurrently
// 4. Score the results
//
// A check that fails or runs past the audit deadline gets an error-carrying
// default result; the rest of the report is unaffected.
//
// BEGINNER NOTES:
// - scraper::Html is not Send, and a value held across .await would make the
//   whole audit future !Send. Keeping the document inside a block that ends
//   before the first .await of step 3 avoids that.
// - tokio::join! polls all five futures on the current task. Nothing is
//   spawned, so the checks can borrow `input` instead of cloning it.
// =============================================================================

pub mod score;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use scraper::Html;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, warn};
use url::Url;

use crate::checks::{
    summarize_keywords, BrokenLinkCheck, BrokenLinkMetrics, CheckMetrics, CheckName, CheckResult,
    DocumentCheck, HeadingCheck, HeadingMetrics, ImageAltCheck, ImageAltMetrics, KeywordSummary,
    MetaDescriptionCheck, MetaDescriptionMetrics, RedirectCheck, RedirectMetrics, RobotsCheck,
    RobotsMetrics, SiteCheck, SitemapCheck, SitemapMetrics, SslCheck, SslMetrics, TitleCheck,
    TitleMetrics, WordCountCheck, WordCountMetrics,
};
use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::fetch::{
    CertificateProbe, DocumentFetcher, FetchedPage, HttpFetcher, TlsCertificateProbe,
};
use crate::links::{HttpLinkProber, LinkProber, LinkValidator};

/// The fetched page plus the URL the audit was asked for.
#[derive(Debug, Clone)]
pub struct AuditInput {
    pub base_url: Url,
    pub page: FetchedPage,
}

impl AuditInput {
    pub fn new(base_url: Url, page: FetchedPage) -> Self {
        Self { base_url, page }
    }

    /// Parses the page body. Not `Send`; keep it away from `.await`s.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.page.body)
    }
}

/// One result per check, always all ten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditChecks {
    pub title: CheckResult<TitleMetrics>,
    pub meta_description: CheckResult<MetaDescriptionMetrics>,
    pub h1: CheckResult<HeadingMetrics>,
    pub word_count: CheckResult<WordCountMetrics>,
    pub image_alt: CheckResult<ImageAltMetrics>,
    pub ssl: CheckResult<SslMetrics>,
    pub broken_links: CheckResult<BrokenLinkMetrics>,
    pub redirects: CheckResult<RedirectMetrics>,
    pub sitemap: CheckResult<SitemapMetrics>,
    pub robots_txt: CheckResult<RobotsMetrics>,
}

impl AuditChecks {
    /// Every slot set to its safe default carrying `error`.
    pub fn all_failed(error: &str) -> Self {
        fn failed<M: CheckMetrics>(error: &str, name: CheckName) -> CheckResult<M> {
            CheckResult::failed(error, name.error_recommendation())
        }

        Self {
            title: failed(error, CheckName::Title),
            meta_description: failed(error, CheckName::MetaDescription),
            h1: failed(error, CheckName::H1),
            word_count: failed(error, CheckName::WordCount),
            image_alt: failed(error, CheckName::ImageAlt),
            ssl: failed(error, CheckName::Ssl),
            broken_links: failed(error, CheckName::BrokenLinks),
            redirects: failed(error, CheckName::Redirects),
            sitemap: failed(error, CheckName::Sitemap),
            robots_txt: failed(error, CheckName::RobotsTxt),
        }
    }

    /// Pass flag and top recommendation of one check, for summaries.
    pub fn summary(&self, name: CheckName) -> (bool, Option<&str>) {
        fn pick<M: CheckMetrics>(result: &CheckResult<M>) -> (bool, Option<&str>) {
            (result.passed(), result.top_recommendation())
        }

        match name {
            CheckName::Title => pick(&self.title),
            CheckName::MetaDescription => pick(&self.meta_description),
            CheckName::H1 => pick(&self.h1),
            CheckName::WordCount => pick(&self.word_count),
            CheckName::ImageAlt => pick(&self.image_alt),
            CheckName::Ssl => pick(&self.ssl),
            CheckName::BrokenLinks => pick(&self.broken_links),
            CheckName::Redirects => pick(&self.redirects),
            CheckName::Sitemap => pick(&self.sitemap),
            CheckName::RobotsTxt => pick(&self.robots_txt),
        }
    }
}

/// Letter grade shown next to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Grade::APlus,
            80..=89 => Grade::A,
            70..=79 => Grade::B,
            60..=69 => Grade::C,
            _ => Grade::D,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        };
        f.write_str(letter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub url: String,
    /// HTTP status of the audited page; absent when it was never obtained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_status: Option<u16>,
    pub checks: AuditChecks,
    pub keywords: KeywordSummary,
    pub overall_score: u8,
    pub grade: Grade,
    pub recommendations: Vec<String>,
}

impl AuditReport {
    /// Report for an audit that could not get as far as running the checks.
    pub fn failed(url: &str, error: &AuditError) -> Self {
        let message = error.to_string();
        Self {
            url: url.to_string(),
            page_status: None,
            checks: AuditChecks::all_failed(&message),
            keywords: KeywordSummary::default(),
            overall_score: 0,
            grade: Grade::from_score(0),
            recommendations: vec![format!("Unable to audit {}: {}", url, message)],
        }
    }

    /// True when the report came from the fatal path.
    pub fn is_failed(&self) -> bool {
        self.overall_score == 0 && self.checks.title.error.is_some()
    }
}

/// Runs audits with one configuration and one set of collaborators.
pub struct Auditor {
    config: AuditConfig,
    fetcher: Arc<dyn DocumentFetcher>,
    certs: Arc<dyn CertificateProbe>,
    prober: Arc<dyn LinkProber>,
}

impl Auditor {
    /// Auditor backed by the real network clients.
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        let fetcher = Arc::new(HttpFetcher::new(&config)?);
        let certs = Arc::new(TlsCertificateProbe::new(config.request_timeout())?);
        let prober = Arc::new(HttpLinkProber::new(config.link_timeout(), &config.user_agent)?);
        Ok(Self::with_collaborators(config, fetcher, certs, prober))
    }

    pub fn with_collaborators(
        config: AuditConfig,
        fetcher: Arc<dyn DocumentFetcher>,
        certs: Arc<dyn CertificateProbe>,
        prober: Arc<dyn LinkProber>,
    ) -> Self {
        Self {
            config,
            fetcher,
            certs,
            prober,
        }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Audits one URL. Never fails: problems end up inside the report.
    pub async fn audit(&self, url: &str) -> AuditReport {
        info!(url, "starting audit");
        let deadline = self.config.audit_deadline().map(|budget| Instant::now() + budget);

        let base_url = match parse_audit_url(url) {
            Ok(base_url) => base_url,
            Err(e) => {
                warn!(url, error = %e, "rejected URL");
                return AuditReport::failed(url, &e);
            }
        };

        let page = match within(deadline, self.fetcher.fetch(&base_url)).await {
            Some(Ok(page)) if page.is_success() => page,
            Some(Ok(page)) if page.body.trim().is_empty() => {
                let e = AuditError::network(base_url.as_str(), format!("HTTP {}", page.status));
                warn!(url = %base_url, status = page.status, "page fetch returned an empty error page");
                return AuditReport::failed(base_url.as_str(), &e);
            }
            Some(Ok(page)) => {
                warn!(url = %base_url, status = page.status, "auditing a page served with an error status");
                page
            }
            Some(Err(e)) => {
                warn!(url = %base_url, error = %e, "page fetch failed");
                return AuditReport::failed(base_url.as_str(), &e);
            }
            None => {
                let e = AuditError::network(base_url.as_str(), "audit deadline exceeded");
                warn!(url = %base_url, "page fetch ran past the audit deadline");
                return AuditReport::failed(base_url.as_str(), &e);
            }
        };
        let input = AuditInput::new(base_url, page);

        let validator = LinkValidator::new(
            Arc::clone(&self.prober),
            self.config.link_worker_count,
            self.config.link_timeout(),
        );
        let broken_link_check = BrokenLinkCheck::new(validator, self.config.max_links_checked);

        let (title, meta_description, h1, word_count, image_alt, keywords, links) = {
            let document = input.document();
            (
                TitleCheck::new(self.config.title_length).run(&document),
                MetaDescriptionCheck::new(self.config.meta_description_length).run(&document),
                HeadingCheck::new(self.config.max_h1).run(&document),
                WordCountCheck::new(self.config.word_count).run(&document),
                ImageAltCheck::new(self.config.min_alt_length).run(&document),
                summarize_keywords(&document),
                broken_link_check.collect(&document, &input.page.final_url),
            )
        };

        let ssl_check = SslCheck::new(Arc::clone(&self.certs), self.config.cert_expiry_warning_days);
        let redirect_check = RedirectCheck::new(Arc::clone(&self.fetcher), self.config.max_redirects);
        let sitemap_check = SitemapCheck::new(
            Arc::clone(&self.fetcher),
            self.config.sitemap_staleness_days,
            self.config.sitemap_url_ceiling,
        );
        let robots_check = RobotsCheck::new(Arc::clone(&self.fetcher));

        let (ssl, redirects, sitemap, robots_txt, broken_links) = tokio::join!(
            bounded(deadline, CheckName::Ssl, ssl_check.run(&input)),
            bounded(deadline, CheckName::Redirects, redirect_check.run(&input)),
            bounded(deadline, CheckName::Sitemap, sitemap_check.run(&input)),
            bounded(deadline, CheckName::RobotsTxt, robots_check.run(&input)),
            bounded(deadline, CheckName::BrokenLinks, broken_link_check.run(links)),
        );

        let checks = AuditChecks {
            title,
            meta_description,
            h1,
            word_count,
            image_alt,
            ssl,
            broken_links,
            redirects,
            sitemap,
            robots_txt,
        };
        let (overall_score, recommendations) = score::aggregate(&checks);
        let grade = Grade::from_score(overall_score);
        info!(url = %input.base_url, score = overall_score, %grade, "audit finished");

        AuditReport {
            url: input.base_url.to_string(),
            page_status: Some(input.page.status),
            checks,
            keywords,
            overall_score,
            grade,
            recommendations,
        }
    }
}

/// Accepts absolute http(s) URLs; a bare host gets `http://` prepended.
pub fn parse_audit_url(raw: &str) -> Result<Url, AuditError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AuditError::Validation("URL is empty".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| AuditError::Validation(format!("'{}' is not a valid URL: {}", trimmed, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AuditError::Validation(format!(
            "unsupported scheme '{}' in {}",
            url.scheme(),
            trimmed
        )));
    }
    if url.host_str().unwrap_or_default().is_empty() {
        return Err(AuditError::Validation(format!("{} has no host", trimmed)));
    }

    Ok(url)
}

/// `None` when the deadline passed first.
async fn within<T>(deadline: Option<Instant>, work: impl Future<Output = T>) -> Option<T> {
    match deadline {
        Some(at) => tokio::time::timeout_at(at, work).await.ok(),
        None => Some(work.await),
    }
}

/// Runs one site check under the audit deadline and logs its failures.
async fn bounded<M: CheckMetrics>(
    deadline: Option<Instant>,
    name: CheckName,
    check: impl Future<Output = CheckResult<M>>,
) -> CheckResult<M> {
    match within(deadline, check).await {
        Some(result) => {
            if let Some(error) = &result.error {
                warn!(check = %name, error = %error, "check failed");
            }
            result
        }
        None => {
            warn!(check = %name, "check cut off by the audit deadline");
            CheckResult::failed("audit deadline exceeded", name.error_recommendation())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::FakeFetcher;
    use crate::fetch::CertificateInfo;
    use crate::links::LinkStatus;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use std::collections::HashSet;

    struct FakeCertificates {
        not_after: DateTime<Utc>,
        hang: bool,
    }

    impl FakeCertificates {
        fn valid_for(days: i64) -> Self {
            Self {
                not_after: Utc::now() + Duration::days(days) + Duration::hours(1),
                hang: false,
            }
        }

        fn hanging() -> Self {
            Self {
                hang: true,
                ..Self::valid_for(365)
            }
        }
    }

    #[async_trait]
    impl CertificateProbe for FakeCertificates {
        async fn peer_certificate(&self, host: &str, _port: u16) -> Result<CertificateInfo, AuditError> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            Ok(CertificateInfo {
                not_after: self.not_after,
                issuer: "CN=Fake CA".to_string(),
                subject: format!("CN={}", host),
            })
        }
    }

    /// 404s every URL whose path is listed.
    struct FakeLinks {
        broken: HashSet<String>,
    }

    #[async_trait]
    impl LinkProber for FakeLinks {
        async fn probe(&self, url: &Url) -> LinkStatus {
            if self.broken.contains(url.path()) {
                LinkStatus::from_status(404)
            } else {
                LinkStatus::from_status(200)
            }
        }
    }

    fn auditor(fetcher: FakeFetcher, certs: FakeCertificates, broken: &[&str]) -> Auditor {
        auditor_with(AuditConfig::default(), fetcher, certs, broken)
    }

    fn auditor_with(
        config: AuditConfig,
        fetcher: FakeFetcher,
        certs: FakeCertificates,
        broken: &[&str],
    ) -> Auditor {
        let links = FakeLinks {
            broken: broken.iter().map(|p| p.to_string()).collect(),
        };
        Auditor::with_collaborators(config, Arc::new(fetcher), Arc::new(certs), Arc::new(links))
    }

    fn scenario_page() -> String {
        let title = format!("Garden tools {}", "x".repeat(67));
        let links: String = (0..20)
            .map(|i| format!(r#"<li><a href="/page{}">Page {}</a></li>"#, i, i))
            .collect();
        format!(
            "<html><head><title>{}</title></head><body><h1>Garden tools</h1><p>{}</p><ul>{}</ul></body></html>",
            title,
            "soil ".repeat(500),
            links
        )
    }

    #[tokio::test]
    async fn test_scenario_scores_75() {
        let fetcher = FakeFetcher::new().with_page("https://example.com/", 200, &scenario_page());
        let auditor = auditor(
            fetcher,
            FakeCertificates::valid_for(10),
            &["/page3", "/page7", "/page11"],
        );

        let report = auditor.audit("https://example.com").await;
        let checks = &report.checks;

        assert_eq!(checks.title.metrics.length, 80);
        assert!(!checks.meta_description.metrics.has_meta_description);
        assert_eq!(checks.h1.metrics.h1_count, 1);
        assert!(checks.word_count.metrics.is_optimal_length);
        assert!(checks.ssl.metrics.is_secure);
        assert_eq!(checks.ssl.metrics.days_remaining, Some(10));
        assert_eq!(checks.broken_links.metrics.checked_links_count, 20);
        assert_eq!(checks.broken_links.metrics.broken_links_count, 3);
        assert_eq!(
            checks.broken_links.metrics.broken_links,
            vec![
                "https://example.com/page3",
                "https://example.com/page7",
                "https://example.com/page11",
            ]
        );

        assert_eq!(report.overall_score, 75);
        assert_eq!(report.grade, Grade::B);
        assert_eq!(
            report.recommendations,
            vec![
                "Title is too long (80 chars). Keep it to at most 70 characters".to_string(),
                "Add a meta description to your page".to_string(),
                "SSL certificate expires in 10 days".to_string(),
                "Fix 3 broken links".to_string(),
                "Add a sitemap.xml file to your website".to_string(),
                "Add a robots.txt file to your website".to_string(),
            ]
        );
        assert_eq!(report.keywords.primary_keywords[0], "soil");
    }

    #[tokio::test]
    async fn test_empty_document_scores_60() {
        let fetcher = FakeFetcher::new().with_page("https://example.com/", 200, "<html></html>");
        let report = auditor(fetcher, FakeCertificates::valid_for(365), &[])
            .audit("https://example.com/")
            .await;

        assert_eq!(report.overall_score, 60);
        assert_eq!(report.grade, Grade::C);
        assert!(!report.checks.title.metrics.exists);
        assert_eq!(report.checks.broken_links.metrics.checked_links_count, 0);
        assert!(report.checks.redirects.metrics.is_optimal);
    }

    #[tokio::test]
    async fn test_unreachable_page_is_fatal() {
        let report = auditor(FakeFetcher::new(), FakeCertificates::valid_for(365), &[])
            .audit("https://example.com/")
            .await;

        assert_eq!(report.overall_score, 0);
        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].contains("Connection refused"));
        assert!(report.is_failed());
        for name in CheckName::ALL {
            let (passed, top) = report.checks.summary(name);
            assert!(!passed, "{} should carry the failure", name);
            assert_eq!(top, Some(name.error_recommendation()));
        }
    }

    #[tokio::test]
    async fn test_error_status_with_body_is_still_audited() {
        let body = format!(
            "<html><head><title>{}</title></head><body><h1>Not found</h1><p>{}</p></body></html>",
            "t".repeat(40),
            "word ".repeat(400)
        );
        let fetcher = FakeFetcher::new().with_page("https://example.com/", 404, &body);
        let report = auditor(fetcher, FakeCertificates::valid_for(365), &[])
            .audit("https://example.com/")
            .await;

        assert!(!report.is_failed());
        assert_eq!(report.page_status, Some(404));
        assert!(report.checks.title.metrics.exists);
        assert!(report.checks.title.error.is_none());
        assert_eq!(report.checks.h1.metrics.h1_count, 1);
        assert!(report.checks.word_count.metrics.is_optimal_length);
        assert!(report.overall_score > 0);
    }

    #[tokio::test]
    async fn test_empty_error_page_is_fatal() {
        let fetcher = FakeFetcher::new().with_page("https://example.com/", 503, "  \n");
        let report = auditor(fetcher, FakeCertificates::valid_for(365), &[])
            .audit("https://example.com/")
            .await;
        assert_eq!(report.overall_score, 0);
        assert_eq!(report.page_status, None);
        assert!(report.recommendations[0].contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_fatal_without_network() {
        let fetcher = Arc::new(FakeFetcher::new());
        let links = FakeLinks {
            broken: HashSet::new(),
        };
        let auditor = Auditor::with_collaborators(
            AuditConfig::default(),
            fetcher.clone(),
            Arc::new(FakeCertificates::valid_for(365)),
            Arc::new(links),
        );

        for bad in ["", "ftp://example.com/file", "http://"] {
            let report = auditor.audit(bad).await;
            assert_eq!(report.overall_score, 0, "{:?}", bad);
            assert_eq!(report.recommendations.len(), 1);
        }
        assert!(fetcher.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deadline_cuts_off_a_hanging_check() {
        let config = AuditConfig {
            audit_deadline_secs: Some(1),
            ..AuditConfig::default()
        };
        let fetcher = FakeFetcher::new().with_page("https://example.com/", 200, "<html></html>");
        let report = auditor_with(config, fetcher, FakeCertificates::hanging(), &[])
            .audit("https://example.com/")
            .await;

        assert_eq!(report.checks.ssl.error.as_deref(), Some("audit deadline exceeded"));
        assert!(!report.checks.ssl.metrics.is_secure);
        // The other checks finished on their own
        assert!(report.checks.robots_txt.error.is_none());
        assert_eq!(report.overall_score, 40);
    }

    #[tokio::test]
    async fn test_zero_deadline_does_not_fail_the_audit() {
        let config = AuditConfig {
            audit_deadline_secs: Some(0),
            ..AuditConfig::default()
        };
        let fetcher = FakeFetcher::new().with_page("https://example.com/", 200, "<html></html>");
        let report = auditor_with(config, fetcher, FakeCertificates::valid_for(365), &[])
            .audit("https://example.com/")
            .await;

        assert!(!report.is_failed());
        assert!(report.checks.ssl.error.is_none());
        assert_eq!(report.overall_score, 60);
    }

    #[test]
    fn test_parse_audit_url() {
        assert_eq!(
            parse_audit_url("example.com").unwrap().as_str(),
            "http://example.com/"
        );
        assert_eq!(
            parse_audit_url("  https://example.com/a?b=1 ").unwrap().as_str(),
            "https://example.com/a?b=1"
        );
        assert!(matches!(
            parse_audit_url("javascript://alert(1)"),
            Err(AuditError::Validation(_))
        ));
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(Grade::from_score(100), Grade::APlus);
        assert_eq!(Grade::from_score(90), Grade::APlus);
        assert_eq!(Grade::from_score(89), Grade::A);
        assert_eq!(Grade::from_score(70), Grade::B);
        assert_eq!(Grade::from_score(60), Grade::C);
        assert_eq!(Grade::from_score(59), Grade::D);
        assert_eq!(serde_json::to_value(Grade::APlus).unwrap(), "A+");
    }

    #[test]
    fn test_report_serializes_every_check_name() {
        let report = AuditReport::failed("https://example.com/", &AuditError::Validation("x".into()));
        let json = serde_json::to_value(&report).unwrap();
        for name in CheckName::ALL {
            assert!(json["checks"].get(name.as_str()).is_some(), "missing {}", name);
        }
    }
}
