//! Collaborators that gather raw audit data and outdated-package data.

mod npm;
mod version;

pub use npm::{FileAudit, NpmAudit};
pub use version::{is_newer, RegistryProbe, DEFAULT_REGISTRY};

use crate::error::{AuditFetchError, ProbeError};
use crate::model::OutdatedMap;
use async_trait::async_trait;
use std::path::Path;

/// Source of raw vulnerability findings for a project.
#[async_trait]
pub trait AuditSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the raw report text.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool could not run or exited unsuccessfully;
    /// in the latter case the error still carries its captured output.
    async fn fetch(&self, project: &Path) -> Result<String, AuditFetchError>;
}

/// Source of newer-version information for a project's dependencies.
#[async_trait]
pub trait OutdatedProbe: Send + Sync {
    fn name(&self) -> &'static str;

    async fn outdated(&self, project: &Path) -> Result<OutdatedMap, ProbeError>;
}
