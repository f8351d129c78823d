// src/lib.rs
// =============================================================================
// seo-guardian: audit a single web page's on-site SEO health.
//
// Modules:
// - audit: the orchestrator (Auditor), the report types and scoring
// - checks: the ten checks and their result types
// - fetch: page fetcher, redirect tracer and TLS certificate probe
// - links: same-origin link extraction and the bounded link validator
// - config: every threshold and pool size, loadable from TOML
// - error: AuditError / ConfigError
// - report: table and JSON rendering
//
// Typical use:
//
//     let auditor = Auditor::new(AuditConfig::default())?;
//     let report = auditor.audit("https://example.com").await;
//     println!("{}", report.overall_score);
// =============================================================================

pub mod audit;
pub mod checks;
pub mod config;
pub mod error;
pub mod fetch;
pub mod links;
pub mod report;

pub use audit::{AuditChecks, AuditInput, AuditReport, Auditor, Grade};
pub use checks::{CheckName, CheckResult};
pub use config::AuditConfig;
pub use error::{AuditError, ConfigError};
