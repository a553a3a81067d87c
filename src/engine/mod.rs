//! Aggregation of audit data into a pass/fail outcome.
//!
//! [`run`] fetches the audit report and the outdated-package data
//! concurrently, applies exclusions, and hands the result to [`aggregate`].
//! Neither step returns an error: a missing report becomes
//! [`AuditRun::NoResult`] and a failed probe becomes an empty map.

mod annotation;
mod badge;

pub use annotation::{Annotation, AnnotationLevel};
pub use badge::{Badge, FALLBACK_COLOR};

use crate::checker::{AuditSource, OutdatedProbe};
use crate::filter::ExclusionSet;
use crate::model::{OutdatedMap, Severity, Vulnerability};
use crate::normalize::report_from_output;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Emit CI annotation lines.
    pub annotations: bool,
    /// Lowest severity that fails the run.
    pub fail_on: Severity,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            annotations: false,
            fail_on: Severity::High,
        }
    }
}

/// Everything decided about one audit run.
#[derive(Debug, Clone, Serialize)]
pub struct AuditOutcome {
    pub audited_at: DateTime<Utc>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub max_severity: Severity,
    pub outdated: OutdatedMap,
    pub dependencies_badge: Badge,
    pub vulnerabilities_badge: Badge,
    pub annotations: Vec<Annotation>,
    pub fail_on: Severity,
    pub failed: bool,
}

impl AuditOutcome {
    pub fn result_code(&self) -> u8 {
        if self.failed {
            EXIT_FAILURE
        } else {
            EXIT_SUCCESS
        }
    }

    /// Vulnerabilities at or above the failure threshold.
    pub fn blocking(&self) -> impl Iterator<Item = &Vulnerability> {
        self.vulnerabilities
            .iter()
            .filter(|v| v.severity >= self.fail_on)
    }
}

/// Combines already-filtered vulnerabilities with outdated-package data.
///
/// `outdated` of `None` means no data was available, which counts as up to
/// date. Outdated packages never fail a run.
pub fn aggregate(
    vulnerabilities: Vec<Vulnerability>,
    outdated: Option<&OutdatedMap>,
    options: &AggregateOptions,
) -> AuditOutcome {
    let outdated = outdated.cloned().unwrap_or_default();
    let max_severity = Severity::max_of(vulnerabilities.iter().map(|v| v.severity));

    let annotations = if options.annotations {
        vulnerabilities.iter().map(Annotation::for_vulnerability).collect()
    } else {
        Vec::new()
    };

    let failed = vulnerabilities
        .iter()
        .any(|v| v.severity >= options.fail_on);

    AuditOutcome {
        audited_at: Utc::now(),
        dependencies_badge: Badge::dependencies(outdated.is_empty()),
        vulnerabilities_badge: Badge::vulnerabilities(max_severity),
        vulnerabilities,
        max_severity,
        outdated,
        annotations,
        fail_on: options.fail_on,
        failed,
    }
}

/// Result of a full audit run.
#[derive(Debug, Clone)]
pub enum AuditRun {
    /// No usable report could be obtained; always a failure.
    NoResult,
    Completed(AuditOutcome),
}

impl AuditRun {
    pub fn result_code(&self) -> u8 {
        match self {
            AuditRun::NoResult => EXIT_FAILURE,
            AuditRun::Completed(outcome) => outcome.result_code(),
        }
    }

    pub fn outcome(&self) -> Option<&AuditOutcome> {
        match self {
            AuditRun::NoResult => None,
            AuditRun::Completed(outcome) => Some(outcome),
        }
    }
}

/// Audits `project` using the given collaborators.
///
/// The audit fetch and the outdated probe run concurrently. Pass `None` as
/// `probe` to skip the outdated check.
pub async fn run(
    project: &Path,
    source: &dyn AuditSource,
    probe: Option<&dyn OutdatedProbe>,
    exclusions: &ExclusionSet,
    options: &AggregateOptions,
) -> AuditRun {
    let outdated_check = async {
        let probe = probe?;
        match probe.outdated(project).await {
            Ok(outdated) => Some(outdated),
            Err(e) => {
                warn!("Failed to check outdated dependencies with {}: {}", probe.name(), e);
                Some(OutdatedMap::new())
            }
        }
    };

    let (fetched, outdated) = tokio::join!(source.fetch(project), outdated_check);

    let Some(report) = report_from_output(fetched) else {
        return AuditRun::NoResult;
    };
    debug!("{} reported {} vulnerable packages", source.name(), report.len());

    let filtered = exclusions.apply(&report);
    if filtered.len() < report.len() {
        debug!("Excluded {} packages", report.len() - filtered.len());
    }

    AuditRun::Completed(aggregate(filtered, outdated.as_ref(), options))
}
