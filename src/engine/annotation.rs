use crate::model::{Severity, Vulnerability};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationLevel {
    Error,
    Warning,
}

impl AnnotationLevel {
    pub fn for_severity(severity: Severity) -> Self {
        if severity.is_blocking() {
            AnnotationLevel::Error
        } else {
            AnnotationLevel::Warning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationLevel::Error => "error",
            AnnotationLevel::Warning => "warning",
        }
    }
}

/// A CI status line for one vulnerable package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub level: AnnotationLevel,
    pub message: String,
}

impl Annotation {
    pub fn for_vulnerability(vulnerability: &Vulnerability) -> Self {
        Self {
            level: AnnotationLevel::for_severity(vulnerability.severity),
            message: format!(
                "Vulnerability in {}: severity={}",
                vulnerability.name, vulnerability.severity
            ),
        }
    }
}

/// Renders the GitHub Actions workflow command, e.g. `::error ::message`.
impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "::{} ::{}", self.level.as_str(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(AnnotationLevel::for_severity(Severity::Critical), AnnotationLevel::Error);
        assert_eq!(AnnotationLevel::for_severity(Severity::High), AnnotationLevel::Error);
        assert_eq!(AnnotationLevel::for_severity(Severity::Moderate), AnnotationLevel::Warning);
        assert_eq!(AnnotationLevel::for_severity(Severity::None), AnnotationLevel::Warning);
    }

    #[test]
    fn test_rendering() {
        let annotation = Annotation::for_vulnerability(&Vulnerability::new("bad-pkg", Severity::High));
        assert_eq!(annotation.level, AnnotationLevel::Error);
        assert_eq!(annotation.to_string(), "::error ::Vulnerability in bad-pkg: severity=high");
    }
}
