//! Error types for the audit collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of the vulnerability-data fetch.
///
/// A tool that exits non-zero often still prints its findings, so the
/// captured output travels with the error.
#[derive(Error, Debug)]
pub enum AuditFetchError {
    #[error("failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}")]
    Exited {
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error("failed to read audit report {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AuditFetchError {
    /// Output captured from a failed run: stdout when it has content,
    /// otherwise stderr.
    pub fn diagnostic_output(&self) -> Option<&str> {
        match self {
            AuditFetchError::Exited { stdout, stderr, .. } => [stdout, stderr]
                .into_iter()
                .map(|s| s.as_str())
                .find(|s| !s.trim().is_empty()),
            _ => None,
        }
    }
}

/// Failure of the outdated-package probe.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to read {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid package manifest {path}: {source}")]
    InvalidManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("registry request failed: {0}")]
    Registry(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}
