use super::Vulnerability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Package name to the newer version (or rewritten range) available for it.
pub type OutdatedMap = BTreeMap<String, String>;

/// Canonical audit report: vulnerabilities keyed by package name, in the
/// order the audit tool listed them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    entries: Vec<Vulnerability>,
    /// Tool-provided summary block, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl AuditReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a vulnerability under its package name.
    ///
    /// A second entry for the same name replaces the first but keeps the
    /// first one's position.
    pub fn insert(&mut self, vulnerability: Vulnerability) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.name == vulnerability.name)
        {
            Some(existing) => *existing = vulnerability,
            None => self.entries.push(vulnerability),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Vulnerability> {
        self.entries.iter().find(|v| v.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vulnerability> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|v| v.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl FromIterator<Vulnerability> for AuditReport {
    fn from_iter<I: IntoIterator<Item = Vulnerability>>(iter: I) -> Self {
        let mut report = AuditReport::new();
        for vulnerability in iter {
            report.insert(vulnerability);
        }
        report
    }
}
