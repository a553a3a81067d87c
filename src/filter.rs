//! Package exclusions applied before any severity decision.

use crate::model::{AuditReport, Vulnerability};
use std::collections::HashSet;

/// Package names left out of an audit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    names: HashSet<String>,
}

impl ExclusionSet {
    /// Builds the set from raw names, trimming each and discarding empties.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    /// Parses a comma-separated list such as `"lodash, minimist"`.
    pub fn parse_list(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Vulnerabilities of `report` whose package is not excluded, in report order.
    pub fn apply(&self, report: &AuditReport) -> Vec<Vulnerability> {
        report
            .iter()
            .filter(|vulnerability| !self.contains(&vulnerability.name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    fn report(names: &[&str]) -> AuditReport {
        names
            .iter()
            .map(|name| Vulnerability::new(*name, Severity::High))
            .collect()
    }

    fn names(vulns: &[Vulnerability]) -> Vec<&str> {
        vulns.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn test_new_trims_and_drops_empty() {
        let set = ExclusionSet::new(["  lodash ", "", "   ", "minimist"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("lodash"));
        assert!(set.contains("minimist"));
        assert!(!set.contains(""));
    }

    #[test]
    fn test_parse_list() {
        let set = ExclusionSet::parse_list("a, b,,c ,");
        assert_eq!(set.len(), 3);
        assert!(ExclusionSet::parse_list("").is_empty());
    }

    #[test]
    fn test_apply_removes_exact_names_and_keeps_order() {
        let report = report(&["d", "a", "c", "b"]);
        let set = ExclusionSet::new(["a", "b", "not-present"]);
        assert_eq!(names(&set.apply(&report)), vec!["d", "c"]);
    }

    #[test]
    fn test_apply_matches_whole_names_only() {
        let report = report(&["lodash", "lodash.merge"]);
        let set = ExclusionSet::new(["lodash"]);
        assert_eq!(names(&set.apply(&report)), vec!["lodash.merge"]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let report = report(&["x", "y", "z"]);
        let set = ExclusionSet::new(["y"]);

        let once = set.apply(&report);
        let twice = set.apply(&once.iter().cloned().collect());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_set_keeps_everything() {
        let report = report(&["x", "y"]);
        assert_eq!(ExclusionSet::default().apply(&report).len(), 2);
    }
}
