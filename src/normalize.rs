//! Conversion of raw `npm audit --json` output into an [`AuditReport`].
//!
//! Two report layouts are understood:
//!
//! - the current layout (npm 7+), a `vulnerabilities` object keyed by
//!   package name, optionally with a `metadata` summary;
//! - the legacy layout (npm 6), an `advisories` object whose entries are
//!   flattened into one vulnerability per module.
//!
//! Anything else is unrecognized and yields no report at all, which is
//! different from an empty report.

use crate::error::AuditFetchError;
use crate::model::{Advisory, AuditReport, FixAvailable, Severity, Vulnerability};
use serde_json::{Map, Value};
use tracing::{debug, error};

/// The layout a raw report was recognized as.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecognizedShape<'a> {
    Current {
        vulnerabilities: &'a Map<String, Value>,
        metadata: Option<&'a Value>,
    },
    Legacy {
        advisories: &'a Map<String, Value>,
    },
    Unrecognized,
}

type ShapeDetector = for<'a> fn(&'a Value) -> Option<RecognizedShape<'a>>;

/// Detectors in the order they are tried.
const SHAPES: &[ShapeDetector] = &[detect_current, detect_legacy];

fn detect_current(raw: &Value) -> Option<RecognizedShape<'_>> {
    let vulnerabilities = raw.get("vulnerabilities")?.as_object()?;
    Some(RecognizedShape::Current {
        vulnerabilities,
        metadata: raw.get("metadata").filter(|m| !m.is_null()),
    })
}

fn detect_legacy(raw: &Value) -> Option<RecognizedShape<'_>> {
    let advisories = raw.get("advisories")?.as_object()?;
    Some(RecognizedShape::Legacy { advisories })
}

impl<'a> RecognizedShape<'a> {
    pub fn recognize(raw: &'a Value) -> Self {
        SHAPES
            .iter()
            .find_map(|detect| detect(raw))
            .unwrap_or(RecognizedShape::Unrecognized)
    }

    pub fn into_report(self) -> Option<AuditReport> {
        match self {
            RecognizedShape::Current {
                vulnerabilities,
                metadata,
            } => {
                let report: AuditReport = vulnerabilities
                    .iter()
                    .map(|(name, entry)| current_entry(name, entry))
                    .collect();
                Some(match metadata {
                    Some(metadata) => report.with_metadata(metadata.clone()),
                    None => report,
                })
            }
            RecognizedShape::Legacy { advisories } => {
                Some(advisories.values().map(legacy_advisory).collect())
            }
            RecognizedShape::Unrecognized => None,
        }
    }
}

/// Normalizes a parsed audit report. Returns `None` for unrecognized input.
pub fn normalize(raw: &Value) -> Option<AuditReport> {
    RecognizedShape::recognize(raw).into_report()
}

/// Parses and normalizes audit tool output.
fn parse_output(output: &str) -> Result<Option<AuditReport>, serde_json::Error> {
    let raw: Value = serde_json::from_str(output)?;
    Ok(normalize(&raw))
}

/// Turns the result of an audit fetch into a report.
///
/// A failed fetch still has its captured output parsed, since audit tools
/// exit non-zero when they find vulnerabilities. Every failure ends as
/// `None` and is logged; nothing is returned to the caller as an error.
pub fn report_from_output(fetched: Result<String, AuditFetchError>) -> Option<AuditReport> {
    let (output, failure) = match fetched {
        Ok(output) => (output, None),
        Err(err) => match err.diagnostic_output().map(str::to_string) {
            Some(output) => (output, Some(err)),
            None => {
                error!("Failed to run audit: {}", err);
                return None;
            }
        },
    };

    if let Some(err) = &failure {
        debug!("Audit exited unsuccessfully ({}), parsing its output", err);
    }

    match parse_output(&output) {
        Ok(Some(report)) => Some(report),
        Ok(None) => {
            error!("Audit output did not match a known report format");
            None
        }
        Err(parse_err) => {
            match failure {
                Some(err) => error!("Failed to run audit: {}", err),
                None => error!("Failed to parse audit output: {}", parse_err),
            }
            None
        }
    }
}

fn current_entry(name: &str, entry: &Value) -> Vulnerability {
    let severity = entry
        .get("severity")
        .and_then(Value::as_str)
        .map(Severity::parse_lenient)
        .unwrap_or(Severity::None);

    let via: Vec<Advisory> = entry
        .get("via")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(advisory_from_value).collect())
        .unwrap_or_default();

    let effects: Vec<String> = entry
        .get("effects")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Vulnerability {
        name: name.to_string(),
        severity,
        via,
        effects,
        range: string_field(entry, "range"),
        fix_available: fix_from_value(entry.get("fixAvailable")),
    }
}

fn legacy_advisory(advisory: &Value) -> Vulnerability {
    let name = ["module_name", "name"]
        .iter()
        .find_map(|key| string_field(advisory, key).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "unknown".to_string());

    let severity = match advisory.get("severity").and_then(Value::as_str) {
        Some(severity) if !severity.is_empty() => Severity::parse_lenient(severity),
        _ => Severity::Moderate,
    };

    let via = vec![Advisory::Detail {
        title: Some(string_field(advisory, "title").unwrap_or_default()),
        source: None,
        url: Some(string_field(advisory, "url").unwrap_or_default()),
    }];

    Vulnerability {
        name,
        severity,
        via,
        effects: Vec::new(),
        range: string_field(advisory, "vulnerable_versions"),
        fix_available: FixAvailable::Flag(advisory.get("fixAvailable").is_some_and(truthy)),
    }
}

fn advisory_from_value(value: &Value) -> Option<Advisory> {
    match value {
        Value::String(text) => Some(Advisory::Text(text.clone())),
        Value::Object(_) => Some(Advisory::Detail {
            title: string_field(value, "title"),
            source: string_field(value, "source"),
            url: string_field(value, "url"),
        }),
        _ => None,
    }
}

fn fix_from_value(value: Option<&Value>) -> FixAvailable {
    match value {
        Some(Value::Object(target)) => {
            let field = |key: &str| {
                target
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            FixAvailable::Target {
                name: field("name"),
                version: field("version"),
            }
        }
        Some(other) => FixAvailable::Flag(truthy(other)),
        None => FixAvailable::Flag(false),
    }
}

/// Reads a field as a string, stringifying numbers (npm reports advisory
/// sources as numeric ids).
fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// JavaScript truthiness, as npm writes these flags in loosely typed JSON.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
