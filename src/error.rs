// src/error.rs
// =============================================================================
// Error types for the audit pipeline.
//
// Checkers never hand these to the orchestrator: every checker converts its
// own failures into an error-carrying CheckResult. These types exist so the
// collaborators (fetcher, certificate probe) can report *why* something failed
// and so the SSL check can tell a broken certificate from an unreachable host.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Failure modes of the audit collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuditError {
    /// Timeout, connection refused, DNS failure, too many redirects
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    /// The TLS handshake or the presented certificate was rejected
    #[error("TLS handshake with {host} failed: {message}")]
    TlsHandshake { host: String, message: String },

    /// Malformed XML/HTML or certificate structure
    #[error("parse error: {0}")]
    Parse(String),

    /// Caller-supplied input is unusable (e.g. not an absolute http(s) URL)
    #[error("invalid input: {0}")]
    Validation(String),
}

impl AuditError {
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn tls(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TlsHandshake {
            host: host.into(),
            message: message.into(),
        }
    }

    pub fn is_tls_handshake(&self) -> bool {
        matches!(self, Self::TlsHandshake { .. })
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration format: {0}")]
    Format(#[from] toml::de::Error),

    #[error("invalid configuration value: {field} = {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}
