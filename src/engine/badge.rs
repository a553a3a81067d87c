use crate::model::Severity;
use serde::Serialize;
use std::str::FromStr;

const BADGE_SERVICE: &str = "https://img.shields.io/badge";

/// Colour used for a vulnerabilities label that is not on the severity scale.
pub const FALLBACK_COLOR: &str = "lightgrey";

/// A shields.io status badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: &'static str,
    pub message: String,
    pub color: &'static str,
}

impl Badge {
    /// Dependency freshness, decided only by whether anything is outdated.
    pub fn dependencies(up_to_date: bool) -> Self {
        let (message, color) = if up_to_date {
            ("up_to_date", "brightgreen")
        } else {
            ("out_of_date", "yellow")
        };
        Self {
            label: "dependencies",
            message: message.to_string(),
            color,
        }
    }

    pub fn vulnerabilities(max_severity: Severity) -> Self {
        Self::vulnerabilities_labeled(max_severity.as_str())
    }

    /// Vulnerabilities badge for a raw severity label.
    ///
    /// Labels outside the scale get [`FALLBACK_COLOR`]. Severities are
    /// normalized before aggregation, so [`Badge::vulnerabilities`] never
    /// reaches the fallback.
    pub fn vulnerabilities_labeled(label: &str) -> Self {
        let color = Severity::from_str(label)
            .map(|severity| severity.badge_color())
            .unwrap_or(FALLBACK_COLOR);
        Self {
            label: "vulnerabilities",
            message: label.to_string(),
            color,
        }
    }

    pub fn url(&self) -> String {
        format!("{}/{}-{}-{}", BADGE_SERVICE, self.label, self.message, self.color)
    }
}
