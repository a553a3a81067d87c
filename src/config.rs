//! Project configuration.
//!
//! The configuration is looked up in the audited project's directory, in
//! this order:
//!
//! 1. `dep-audit.toml`
//! 2. `dep-audit.json`
//! 3. `dep-audit.yaml`
//! 4. `dep-audit.yml`
//! 5. `.dep-auditrc` (JSON, or TOML if it is not JSON)
//!
//! The first file that parses wins. Files that fail to parse are skipped
//! with a warning. Command-line flags override any value read here.
//!
//! # Example Configuration
//!
//! ```toml
//! severity = "moderate"
//! fail_on = "high"
//! exclude = ["lodash", "minimist"]
//! github_annotations = true
//! check_outdated = true
//! registry = "https://registry.npmjs.org"
//! cache_ttl_hours = 24
//! format = "table"
//! ```

use crate::cache::DEFAULT_TTL_HOURS;
use crate::checker::DEFAULT_REGISTRY;
use crate::error::ConfigError;
use crate::model::Severity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Config file names, in lookup order.
pub const CONFIG_FILES: [&str; 5] = [
    "dep-audit.toml",
    "dep-audit.json",
    "dep-audit.yaml",
    "dep-audit.yml",
    ".dep-auditrc",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lowest severity shown in the vulnerability table.
    ///
    /// Does not affect the failure decision, annotations or badges.
    /// Default: low
    pub severity: Severity,

    /// Lowest severity that fails the run.
    ///
    /// Default: high
    pub fail_on: Severity,

    /// Packages to leave out of the audit entirely.
    pub exclude: Vec<String>,

    /// Emit GitHub Actions annotations.
    ///
    /// Default: false
    pub github_annotations: bool,

    /// Whether to look for outdated dependencies.
    ///
    /// Default: true
    pub check_outdated: bool,

    /// npm registry used for latest-version lookups.
    pub registry: String,

    /// How long registry answers are cached, in hours.
    ///
    /// Default: 24
    pub cache_ttl_hours: u64,

    /// Output format: "table" or "json".
    ///
    /// Default: "table"
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            severity: Severity::Low,
            fail_on: Severity::High,
            exclude: Vec::new(),
            github_annotations: false,
            check_outdated: true,
            registry: DEFAULT_REGISTRY.to_string(),
            cache_ttl_hours: DEFAULT_TTL_HOURS,
            format: "table".to_string(),
        }
    }
}

impl Config {
    /// Finds the project's config file, falling back to defaults.
    pub fn discover(project: &Path) -> Self {
        for path in Self::candidate_paths(project) {
            if !path.is_file() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    debug!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => warn!("Ignoring config file: {}", e),
            }
        }
        Self::default()
    }

    pub fn candidate_paths(project: &Path) -> Vec<PathBuf> {
        CONFIG_FILES.iter().map(|name| project.join(name)).collect()
    }

    /// Loads a specific config file. The format follows the extension;
    /// files without one are tried as JSON, then TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
            Some("json") => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))
            }
            _ => serde_json::from_str(&content).or_else(|json_err| {
                toml::from_str(&content)
                    .map_err(|toml_err| parse_error(format!("{}; {}", json_err, toml_err)))
            }),
        }
    }

    /// The default configuration rendered as TOML.
    pub fn generate_default_config() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.severity, Severity::Low);
        assert_eq!(config.fail_on, Severity::High);
        assert!(config.exclude.is_empty());
        assert!(!config.github_annotations);
        assert!(config.check_outdated);
        assert_eq!(config.registry, DEFAULT_REGISTRY);
        assert_eq!(config.format, "table");
    }

    #[test]
    fn test_discover_without_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::discover(dir.path()), Config::default());
    }

    #[test]
    fn test_discover_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("dep-audit.toml"),
            "severity = \"moderate\"\nexclude = [\"lodash\"]\ngithub_annotations = true\n",
        )
        .unwrap();

        let config = Config::discover(dir.path());
        assert_eq!(config.severity, Severity::Moderate);
        assert_eq!(config.exclude, vec!["lodash".to_string()]);
        assert!(config.github_annotations);
        assert_eq!(config.fail_on, Severity::High);
    }

    #[test]
    fn test_discover_json_rc() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".dep-auditrc"),
            r#"{ "fail_on": "critical", "check_outdated": false }"#,
        )
        .unwrap();

        let config = Config::discover(dir.path());
        assert_eq!(config.fail_on, Severity::Critical);
        assert!(!config.check_outdated);
    }

    #[test]
    fn test_discover_toml_rc() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".dep-auditrc"), "format = \"json\"\n").unwrap();
        assert_eq!(Config::discover(dir.path()).format, "json");
    }

    #[test]
    fn test_discover_yaml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("dep-audit.yaml"),
            "exclude:\n  - bad-pkg\nfail_on: critical\n",
        )
        .unwrap();

        let config = Config::discover(dir.path());
        assert_eq!(config.exclude, vec!["bad-pkg".to_string()]);
        assert_eq!(config.fail_on, Severity::Critical);
        assert_eq!(config.severity, Severity::Low);
    }

    #[test]
    fn test_discover_yml_after_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dep-audit.yml"), "exclude: [from-yml]\n").unwrap();
        assert_eq!(Config::discover(dir.path()).exclude, vec!["from-yml".to_string()]);

        fs::write(dir.path().join("dep-audit.json"), r#"{ "exclude": ["from-json"] }"#).unwrap();
        assert_eq!(Config::discover(dir.path()).exclude, vec!["from-json".to_string()]);
    }

    #[test]
    fn test_discover_skips_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dep-audit.toml"), "severity = [").unwrap();
        fs::write(dir.path().join("dep-audit.json"), r#"{ "exclude": ["a"] }"#).unwrap();

        let config = Config::discover(dir.path());
        assert_eq!(config.exclude, vec!["a".to_string()]);
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(Config::from_file(&missing), Err(ConfigError::Read { .. })));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"{ "severity": "medium" }"#).unwrap();
        assert!(matches!(Config::from_file(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_generate_default_config_round_trips() {
        let rendered = Config::generate_default_config();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
