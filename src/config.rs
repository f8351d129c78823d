// src/config.rs
// =============================================================================
// Audit configuration.
//
// Every threshold, timeout and pool size the pipeline uses lives here and is
// handed to the Auditor at construction. Values come from (lowest to highest
// precedence): built-in defaults, an optional TOML file, CLI flags.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Browser-like user agent; some hosts answer bot user agents with 403s,
/// which would show up as broken links.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Inclusive `[min, max]` range used for length checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBand {
    pub min: usize,
    pub max: usize,
}

impl LengthBand {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Both ends are inclusive.
    pub fn contains(&self, value: usize) -> bool {
        self.min <= value && value <= self.max
    }
}

/// All tunables for one audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Maximum link probes in flight at once
    pub link_worker_count: usize,
    /// Per-link probe timeout
    pub link_timeout_secs: u64,
    /// Cap on same-origin links probed per page
    pub max_links_checked: usize,
    /// Warn when the certificate expires in fewer days than this
    pub cert_expiry_warning_days: i64,
    /// Warn when the newest sitemap lastmod is older than this
    pub sitemap_staleness_days: i64,
    /// Timeout for page, robots.txt, sitemap and TLS fetches
    pub request_timeout_secs: u64,
    /// Longest acceptable redirect chain
    pub max_redirects: usize,
    pub max_h1: usize,
    /// Alt text shorter than this (after trimming) is not meaningful
    pub min_alt_length: usize,
    /// URL count above which a sitemap should be split
    pub sitemap_url_ceiling: usize,
    /// Overall budget for the network phase of one audit; `0` (or `None`)
    /// disables it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_deadline_secs: Option<u64>,
    pub user_agent: String,
    pub title_length: LengthBand,
    pub meta_description_length: LengthBand,
    pub word_count: LengthBand,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            link_worker_count: 10,
            link_timeout_secs: 10,
            max_links_checked: 100,
            cert_expiry_warning_days: 30,
            sitemap_staleness_days: 30,
            request_timeout_secs: 10,
            max_redirects: 5,
            max_h1: 1,
            min_alt_length: 3,
            sitemap_url_ceiling: 50_000,
            audit_deadline_secs: Some(120),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            title_length: LengthBand::new(30, 70),
            meta_description_length: LengthBand::new(120, 160),
            word_count: LengthBand::new(300, 2000),
        }
    }
}

impl AuditConfig {
    /// Loads a TOML file; missing keys fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AuditConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn link_timeout(&self) -> Duration {
        Duration::from_secs(self.link_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// TOML has no null, so a zero budget is how a file turns the deadline off.
    pub fn audit_deadline(&self) -> Option<Duration> {
        self.audit_deadline_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.link_worker_count == 0 {
            return Err(invalid("link_worker_count", 0, "must be at least 1"));
        }
        if self.link_timeout_secs == 0 {
            return Err(invalid("link_timeout_secs", 0, "must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", 0, "must be at least 1"));
        }
        for (field, band) in [
            ("title_length", self.title_length),
            ("meta_description_length", self.meta_description_length),
            ("word_count", self.word_count),
        ] {
            if band.min > band.max {
                return Err(ConfigError::InvalidValue {
                    field,
                    value: format!("{}-{}", band.min, band.max),
                    reason: "min must not exceed max",
                });
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, value: impl ToString, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        value: value.to_string(),
        reason,
    }
}
