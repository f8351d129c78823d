// src/checks/sitemap.rs
// =============================================================================
// XML sitemap discovery and analysis.
//
// Flow:
// 1. Probe the well-known locations on the site origin; first 2xx wins
// 2. Parse it with quick-xml's streaming reader
//    - <urlset>:       count <url> entries, track the newest <lastmod>
//    - <sitemapindex>: fetch every child <sitemap><loc> breadth-first and sum
// 3. Grade the totals: empty, oversized, stale
//
// Children that fail to download or parse are skipped. The total is whatever
// could be read.
//
// BEGINNER NOTES:
// - quick-xml does not build a tree. It hands us one Event at a time
//   (Start, Text, End, ...) and we keep just enough state (the stack of open
//   element names and the text of the current leaf) to pull out what we need.
// - Entities like &amp; arrive as separate GeneralRef events, so leaf text is
//   assembled from Text and GeneralRef pieces.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use super::{CheckMetrics, CheckResult, SiteCheck};
use crate::audit::AuditInput;
use crate::error::AuditError;
use crate::fetch::DocumentFetcher;

const SITEMAP_LOCATIONS: [&str; 3] = ["/sitemap.xml", "/sitemap_index.xml", "/sitemap/sitemap.xml"];

/// How many levels of nested sitemap indexes are followed.
const MAX_INDEX_DEPTH: usize = 3;

/// Upper bound on child sitemaps downloaded for one audit.
const MAX_CHILD_SITEMAPS: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapMetrics {
    pub exists: bool,
    pub url: Option<String>,
    pub url_count: usize,
    pub is_index: bool,
    /// Newest <lastmod>, as YYYY-MM-DD
    pub last_modified: Option<String>,
    pub is_stale: bool,
    pub exceeds_url_limit: bool,
}

impl CheckMetrics for SitemapMetrics {
    fn passed(&self) -> bool {
        self.exists && self.url_count > 0 && !self.is_stale && !self.exceeds_url_limit
    }
}

pub struct SitemapCheck {
    fetcher: Arc<dyn DocumentFetcher>,
    staleness_days: i64,
    url_ceiling: usize,
    today: Option<NaiveDate>,
}

impl SitemapCheck {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, staleness_days: i64, url_ceiling: usize) -> Self {
        Self {
            fetcher,
            staleness_days,
            url_ceiling,
            today: None,
        }
    }

    /// Pin the date staleness is measured against (defaults to today, UTC).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// First well-known location that answers 2xx, with its body.
    async fn locate(&self, base: &Url) -> Option<(Url, String)> {
        for path in SITEMAP_LOCATIONS {
            let Ok(candidate) = base.join(path) else {
                continue;
            };
            match self.fetcher.fetch(&candidate).await {
                Ok(page) if page.is_success() => return Some((candidate, page.body)),
                Ok(page) => debug!(url = %candidate, status = page.status, "no sitemap here"),
                Err(e) => debug!(url = %candidate, error = %e, "sitemap probe failed"),
            }
        }
        None
    }

    /// Walks an index breadth-first and sums the URL counts of its children.
    async fn expand_index(&self, index_url: &Url, index: ParsedSitemap) -> (usize, Option<NaiveDate>) {
        let mut url_count = 0;
        let mut newest = index.last_modified;

        let mut visited: HashSet<String> = HashSet::from([index_url.to_string()]);
        let mut queue: VecDeque<(String, usize)> =
            index.children.into_iter().map(|loc| (loc, 1)).collect();
        let mut fetched = 0;

        while let Some((loc, depth)) = queue.pop_front() {
            if !visited.insert(loc.clone()) {
                continue;
            }
            if fetched == MAX_CHILD_SITEMAPS {
                warn!(index = %index_url, "child sitemap limit reached, total is partial");
                break;
            }

            let Ok(child_url) = index_url.join(&loc) else {
                warn!(index = %index_url, loc = %loc, "invalid child sitemap URL");
                continue;
            };
            fetched += 1;

            let body = match self.fetcher.fetch(&child_url).await {
                Ok(page) if page.is_success() => page.body,
                Ok(page) => {
                    warn!(url = %child_url, status = page.status, "child sitemap unavailable");
                    continue;
                }
                Err(e) => {
                    warn!(url = %child_url, error = %e, "child sitemap unavailable");
                    continue;
                }
            };

            let child = match parse_sitemap(&body) {
                Ok(child) => child,
                Err(e) => {
                    warn!(url = %child_url, error = %e, "skipping malformed child sitemap");
                    continue;
                }
            };

            newest = newest.max(child.last_modified);
            match child.kind {
                SitemapKind::UrlSet => url_count += child.url_count,
                SitemapKind::Index if depth < MAX_INDEX_DEPTH => {
                    queue.extend(child.children.into_iter().map(|loc| (loc, depth + 1)));
                }
                SitemapKind::Index => {
                    warn!(url = %child_url, "sitemap index nested too deep, not followed");
                }
            }
        }

        (url_count, newest)
    }

    fn grade(&self, mut metrics: SitemapMetrics, newest: Option<NaiveDate>) -> CheckResult<SitemapMetrics> {
        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());

        let mut recommendations = Vec::new();
        if metrics.url_count == 0 {
            recommendations.push("Add URLs to your sitemap".to_string());
        } else if metrics.url_count > self.url_ceiling {
            metrics.exceeds_url_limit = true;
            recommendations.push(format!(
                "Consider splitting your sitemap (over {} URLs)",
                group_thousands(self.url_ceiling)
            ));
        }

        if let Some(date) = newest {
            let age = (today - date).num_days();
            if age > self.staleness_days {
                metrics.is_stale = true;
                recommendations.push(format!("Update your sitemap (last updated {} days ago)", age));
            }
            metrics.last_modified = Some(date.format("%Y-%m-%d").to_string());
        }

        CheckResult::new(metrics, recommendations)
    }
}

#[async_trait]
impl SiteCheck for SitemapCheck {
    type Metrics = SitemapMetrics;

    async fn run(&self, input: &AuditInput) -> CheckResult<SitemapMetrics> {
        let Some((sitemap_url, body)) = self.locate(&input.base_url).await else {
            return CheckResult::new(
                SitemapMetrics::default(),
                vec!["Add a sitemap.xml file to your website".to_string()],
            );
        };

        let mut metrics = SitemapMetrics {
            exists: true,
            url: Some(sitemap_url.to_string()),
            ..SitemapMetrics::default()
        };

        let parsed = match parse_sitemap(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(url = %sitemap_url, error = %e, "malformed sitemap");
                return CheckResult::new(metrics, vec!["Fix sitemap XML format".to_string()]);
            }
        };

        let newest = match parsed.kind {
            SitemapKind::UrlSet => {
                metrics.url_count = parsed.url_count;
                parsed.last_modified
            }
            SitemapKind::Index => {
                metrics.is_index = true;
                let (url_count, newest) = self.expand_index(&sitemap_url, parsed).await;
                metrics.url_count = url_count;
                newest
            }
        };

        info!(url = %sitemap_url, urls = metrics.url_count, index = metrics.is_index, "sitemap analyzed");
        self.grade(metrics, newest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SitemapKind {
    UrlSet,
    Index,
}

#[derive(Debug)]
struct ParsedSitemap {
    kind: SitemapKind,
    url_count: usize,
    /// <loc> of each <sitemap> entry, index documents only
    children: Vec<String>,
    last_modified: Option<NaiveDate>,
}

fn parse_sitemap(xml: &str) -> Result<ParsedSitemap, AuditError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut kind = None;
    let mut open: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut url_count = 0;
    let mut children = Vec::new();
    let mut last_modified: Option<NaiveDate> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| AuditError::Parse(format!("sitemap XML at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if open.is_empty() {
                    kind = Some(root_kind(&name)?);
                }
                open.push(name);
                text.clear();
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if open.is_empty() {
                    kind = Some(root_kind(&name)?);
                } else if open.len() == 1 && name == "url" {
                    url_count += 1;
                }
            }
            Event::Text(e) => {
                let chunk = e
                    .decode()
                    .map_err(|e| AuditError::Parse(format!("sitemap text: {}", e)))?;
                text.push_str(&chunk);
            }
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::GeneralRef(e) => {
                let name = e
                    .decode()
                    .map_err(|e| AuditError::Parse(format!("sitemap entity: {}", e)))?;
                match resolve_entity(&name) {
                    Some(c) => text.push(c),
                    None => return Err(AuditError::Parse(format!("unknown entity &{};", name))),
                }
            }
            Event::End(_) => {
                let Some(name) = open.pop() else {
                    return Err(AuditError::Parse("unbalanced closing tag".to_string()));
                };
                let parent = open.last().map(String::as_str);

                match (name.as_str(), parent) {
                    ("url", _) if open.len() == 1 => url_count += 1,
                    ("loc", Some("sitemap")) => children.push(text.trim().to_string()),
                    ("lastmod", _) => last_modified = last_modified.max(parse_lastmod(text.trim())),
                    _ => {}
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !open.is_empty() {
        return Err(AuditError::Parse(format!("unclosed <{}> at end of sitemap", open[0])));
    }
    let kind = kind.ok_or_else(|| AuditError::Parse("sitemap has no root element".to_string()))?;

    Ok(ParsedSitemap {
        kind,
        url_count,
        children,
        last_modified,
    })
}

fn root_kind(name: &str) -> Result<SitemapKind, AuditError> {
    match name {
        "urlset" => Ok(SitemapKind::UrlSet),
        "sitemapindex" => Ok(SitemapKind::Index),
        other => Err(AuditError::Parse(format!("unexpected root element <{}>", other))),
    }
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// W3C datetime (`2024-05-01T10:00:00+00:00`) or plain date. Anything else is ignored.
fn parse_lastmod(value: &str) -> Option<NaiveDate> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc).date_naive());
    }
    // Covers the minute-precision W3C forms too (2024-05-01T10:00+01:00)
    value
        .get(..10)
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
}

fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
