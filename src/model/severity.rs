use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a vulnerability, ordered from least to most severe.
///
/// The derived `Ord` follows the declaration order, so comparisons and
/// [`Severity::max_of`] use the fixed scale `none < low < moderate < high < critical`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    /// All levels in scale order.
    pub const SCALE: [Severity; 5] = [
        Severity::None,
        Severity::Low,
        Severity::Moderate,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Position on the scale, `0` for none through `4` for critical.
    pub fn rank(&self) -> usize {
        *self as usize
    }

    /// Parses a severity reported by an audit tool.
    ///
    /// Matching is case-insensitive; anything outside the scale ranks as
    /// [`Severity::None`].
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Severity::None)
    }

    /// Highest severity in `severities`, or [`Severity::None`] when empty.
    pub fn max_of<I>(severities: I) -> Self
    where
        I: IntoIterator<Item = Severity>,
    {
        severities.into_iter().max().unwrap_or(Severity::None)
    }

    /// Returns true for the levels that fail a run by default.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }

    /// Shields.io colour for the vulnerabilities badge.
    pub fn badge_color(&self) -> &'static str {
        match self {
            Severity::None => "brightgreen",
            Severity::Low => "yellowgreen",
            Severity::Moderate => "orange",
            Severity::High => "red",
            Severity::Critical => "red",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Severity::None),
            "low" => Ok(Severity::Low),
            "moderate" => Ok(Severity::Moderate),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!(
                "Unknown severity: {}. Use 'none', 'low', 'moderate', 'high' or 'critical'",
                s
            )),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
