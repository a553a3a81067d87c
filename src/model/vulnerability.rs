use super::Severity;
use serde::{Deserialize, Serialize};

/// One entry of a vulnerability's `via` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Advisory {
    /// Name of another vulnerable package this one is affected through.
    Text(String),
    Detail {
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl Advisory {
    /// Short description shown in reports: the text itself, else the title,
    /// else the source. Returns `None` when nothing printable is present.
    pub fn summary(&self) -> Option<&str> {
        let summary = match self {
            Advisory::Text(text) => Some(text.as_str()),
            Advisory::Detail { title, source, .. } => title
                .as_deref()
                .filter(|t| !t.is_empty())
                .or(source.as_deref()),
        };
        summary.filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixAvailable {
    Flag(bool),
    Target { name: String, version: String },
}

impl FixAvailable {
    pub fn is_available(&self) -> bool {
        match self {
            FixAvailable::Flag(flag) => *flag,
            FixAvailable::Target { .. } => true,
        }
    }
}

impl Default for FixAvailable {
    fn default() -> Self {
        FixAvailable::Flag(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub name: String,
    pub severity: Severity,
    #[serde(default)]
    pub via: Vec<Advisory>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, rename = "fixAvailable")]
    pub fix_available: FixAvailable,
}

impl Vulnerability {
    pub fn new(name: impl Into<String>, severity: Severity) -> Self {
        Self {
            name: name.into(),
            severity,
            via: Vec::new(),
            effects: Vec::new(),
            range: None,
            fix_available: FixAvailable::default(),
        }
    }

    pub fn with_via(mut self, via: Vec<Advisory>) -> Self {
        self.via = via;
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn with_fix(mut self, fix_available: FixAvailable) -> Self {
        self.fix_available = fix_available;
        self
    }

    /// Up to `limit` advisory summaries, in `via` order.
    pub fn advisory_summaries(&self, limit: usize) -> Vec<&str> {
        self.via
            .iter()
            .filter_map(Advisory::summary)
            .take(limit)
            .collect()
    }
}
