use crate::cache::Cache;
use crate::error::ProbeError;
use crate::model::OutdatedMap;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Dependency sections of `package.json` that are checked.
const DEPENDENCY_SECTIONS: [&str; 3] = ["dependencies", "devDependencies", "optionalDependencies"];

/// Registry requests in flight at once.
const MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Looks up the latest published version of each declared dependency on
/// the npm registry.
pub struct RegistryProbe {
    client: reqwest::Client,
    registry: String,
    cache: Option<Cache>,
}

#[derive(Deserialize)]
struct RegistryPackage {
    #[serde(rename = "dist-tags")]
    dist_tags: Option<DistTags>,
}

#[derive(Deserialize)]
struct DistTags {
    latest: Option<String>,
}

/// A declared dependency range reduced to its operator and base version.
#[derive(Debug, PartialEq, Eq)]
struct DeclaredRange<'a> {
    operator: &'a str,
    version: String,
}

impl RegistryProbe {
    pub fn new(registry: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            registry: registry.into().trim_end_matches('/').to_string(),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn latest_version(&self, name: &str) -> Result<Option<String>, ProbeError> {
        let cache_key = format!("npm_latest_{}", name);
        if let Some(version) = self.cache.as_ref().and_then(|c| c.get::<String>(&cache_key)) {
            return Ok(Some(version));
        }

        // Scoped names keep their '@' but the separating slash is encoded
        let url = format!("{}/{}", self.registry, name.replace('/', "%2f"));
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            debug!("Registry returned {} for {}", response.status(), name);
            return Ok(None);
        }

        let package: RegistryPackage = response.json().await?;
        let latest = package.dist_tags.and_then(|tags| tags.latest);

        if let (Some(cache), Some(version)) = (&self.cache, &latest) {
            if let Err(e) = cache.set(&cache_key, version) {
                debug!("Could not cache {}: {}", cache_key, e);
            }
        }

        Ok(latest)
    }
}

impl Default for RegistryProbe {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY)
    }
}

#[async_trait]
impl super::OutdatedProbe for RegistryProbe {
    fn name(&self) -> &'static str {
        "npm registry"
    }

    async fn outdated(&self, project: &Path) -> Result<OutdatedMap, ProbeError> {
        let dependencies = read_dependencies(project)?;

        let lookups: Vec<_> = dependencies.iter().filter_map(|(name, spec)| {
            let declared = parse_declared_range(spec)?;
            Some(async move { (name, declared, self.latest_version(name).await) })
        })
        .collect();

        let results: Vec<_> = stream::iter(lookups)
            .buffer_unordered(MAX_CONCURRENT_LOOKUPS)
            .collect()
            .await;

        let mut outdated = OutdatedMap::new();
        for (name, declared, latest) in results {
            match latest {
                Ok(Some(latest)) if is_newer(&latest, &declared.version) => {
                    outdated.insert(name.clone(), format!("{}{}", declared.operator, latest));
                }
                Ok(_) => {}
                Err(e) => warn!("Could not check {} for updates: {}", name, e),
            }
        }

        Ok(outdated)
    }
}

/// Reads every checked dependency section of `project/package.json`.
/// Later sections override earlier ones for the same package.
fn read_dependencies(project: &Path) -> Result<BTreeMap<String, String>, ProbeError> {
    let path = project.join("package.json");
    let content = std::fs::read_to_string(&path).map_err(|source| ProbeError::Manifest {
        path: path.clone(),
        source,
    })?;
    let manifest: serde_json::Value = serde_json::from_str(&content)
        .map_err(|source| ProbeError::InvalidManifest { path, source })?;

    let mut dependencies = BTreeMap::new();
    for section in DEPENDENCY_SECTIONS {
        let Some(entries) = manifest.get(section).and_then(|s| s.as_object()) else {
            continue;
        };
        for (name, spec) in entries {
            if let Some(spec) = spec.as_str() {
                dependencies.insert(name.clone(), spec.to_string());
            }
        }
    }
    Ok(dependencies)
}

/// Splits a simple range such as `^1.2.0`, `~2.1` or `>=3` into operator
/// and a full `major.minor.patch` version. Returns `None` for anything else
/// (tags, URLs, `file:` specs, wildcards, compound ranges).
fn parse_declared_range(spec: &str) -> Option<DeclaredRange<'_>> {
    let spec = spec.trim();
    if spec.contains(char::is_whitespace) || spec.contains("||") {
        return None;
    }

    let version_start = spec.find(|c: char| c.is_ascii_digit())?;
    let operator = &spec[..version_start];
    if !matches!(operator, "" | "^" | "~" | "=" | ">=" | "v" | "^v" | "~v" | "=v") {
        return None;
    }

    let base = &spec[version_start..];
    let core_len = base
        .find(|c: char| c == '-' || c == '+')
        .unwrap_or(base.len());
    let core = &base[..core_len];
    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.parse::<u64>().is_err()) {
        return None;
    }

    let mut version = core.to_string();
    for _ in parts.len()..3 {
        version.push_str(".0");
    }
    version.push_str(&base[core_len..]);

    Some(DeclaredRange {
        operator: operator.trim_end_matches('v'),
        version,
    })
}

/// Returns true if `latest` is a newer version than `current`.
pub fn is_newer(latest: &str, current: &str) -> bool {
    match (
        semver::Version::parse(latest.trim_start_matches('v')),
        semver::Version::parse(current.trim_start_matches('v')),
    ) {
        (Ok(latest), Ok(current)) => latest > current,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::OutdatedProbe;

    fn declared(operator: &'static str, version: &str) -> Option<DeclaredRange<'static>> {
        Some(DeclaredRange {
            operator,
            version: version.to_string(),
        })
    }

    #[test]
    fn test_is_newer() {
        assert!(is_newer("1.3.0", "1.2.9"));
        assert!(is_newer("v2.0.0", "1.9.9"));
        assert!(!is_newer("1.2.0", "1.2.0"));
        assert!(!is_newer("1.0.0", "1.2.0"));
        assert!(!is_newer("latest", "1.0.0"));
    }

    #[test]
    fn test_parse_declared_range() {
        assert_eq!(parse_declared_range("^1.2.0"), declared("^", "1.2.0"));
        assert_eq!(parse_declared_range("~2.1"), declared("~", "2.1.0"));
        assert_eq!(parse_declared_range(">=3"), declared(">=", "3.0.0"));
        assert_eq!(parse_declared_range("4.0.0-beta.1"), declared("", "4.0.0-beta.1"));
        assert_eq!(parse_declared_range("v1.0.0"), declared("", "1.0.0"));
    }

    #[test]
    fn test_parse_declared_range_skips_complex_specs() {
        for spec in [
            "latest",
            "*",
            "1.x",
            "^1.2.x",
            "file:../lib",
            "github:user/repo",
            "git+https://example.com/repo.git#1.0.0",
            "npm:other@1.0.0",
            ">=1.0.0 <2.0.0",
            "1.0.0 || 2.0.0",
            "<2.0.0",
        ] {
            assert_eq!(parse_declared_range(spec), None, "{}", spec);
        }
    }

    #[test]
    fn test_read_dependencies_merges_sections() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{
                "dependencies": { "left-pad": "^1.1.0", "shared": "1.0.0" },
                "devDependencies": { "jest": "^29.0.0", "shared": "2.0.0" },
                "peerDependencies": { "react": "^18.0.0" }
            }"#,
        )
        .unwrap();

        let deps = read_dependencies(dir.path()).unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(deps["shared"], "2.0.0");
        assert!(!deps.contains_key("react"));
    }

    #[test]
    fn test_read_dependencies_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_dependencies(dir.path()),
            Err(ProbeError::Manifest { .. })
        ));

        std::fs::write(dir.path().join("package.json"), "{ nope").unwrap();
        assert!(matches!(
            read_dependencies(dir.path()),
            Err(ProbeError::InvalidManifest { .. })
        ));
    }

    #[tokio::test]
    async fn test_outdated_against_registry() {
        let mut server = mockito::Server::new_async().await;
        let _left_pad = server
            .mock("GET", "/left-pad")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"dist-tags":{"latest":"1.3.0"}}"#)
            .create_async()
            .await;
        let _current = server
            .mock("GET", "/current-pkg")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"dist-tags":{"latest":"2.0.0"}}"#)
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/unpublished")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{
                "dependencies": {
                    "left-pad": "^1.1.0",
                    "current-pkg": "~2.0.0",
                    "unpublished": "1.0.0",
                    "local": "file:../local"
                }
            }"#,
        )
        .unwrap();

        let probe = RegistryProbe::new(server.url());
        let outdated = probe.outdated(dir.path()).await.unwrap();

        assert_eq!(outdated.len(), 1);
        assert_eq!(outdated["left-pad"], "^1.3.0");
    }

    #[tokio::test]
    async fn test_outdated_checks_every_dependency_past_the_lookup_limit() {
        let mut server = mockito::Server::new_async().await;
        let count = MAX_CONCURRENT_LOOKUPS * 3 + 1;
        let mut mocks = Vec::new();
        let mut dependencies = serde_json::Map::new();
        for i in 0..count {
            let name = format!("pkg-{:02}", i);
            mocks.push(
                server
                    .mock("GET", format!("/{}", name).as_str())
                    .with_status(200)
                    .with_header("content-type", "application/json")
                    .with_body(r#"{"dist-tags":{"latest":"2.0.0"}}"#)
                    .expect(1)
                    .create_async()
                    .await,
            );
            dependencies.insert(name, serde_json::Value::from("^1.0.0"));
        }

        let dir = tempfile::tempdir().unwrap();
        let manifest = serde_json::json!({ "dependencies": dependencies });
        std::fs::write(dir.path().join("package.json"), manifest.to_string()).unwrap();

        let probe = RegistryProbe::new(server.url());
        let outdated = probe.outdated(dir.path()).await.unwrap();

        assert_eq!(outdated.len(), count);
        assert!(outdated.values().all(|range| range == "^2.0.0"));
        assert_eq!(outdated.keys().next().map(String::as_str), Some("pkg-00"));
        for mock in &mocks {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_outdated_uses_cache() {
        let cache_dir = tempfile::tempdir().unwrap();
        let cache = Cache::in_dir(cache_dir.path(), 1);
        cache.set("npm_latest_cached-pkg", &"5.0.0".to_string()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{ "dependencies": { "cached-pkg": "^4.0.0" } }"#,
        )
        .unwrap();

        // Unroutable registry: only the cache can answer
        let probe = RegistryProbe::new("http://127.0.0.1:9").with_cache(cache);
        let outdated = probe.outdated(dir.path()).await.unwrap();
        assert_eq!(outdated["cached-pkg"], "^5.0.0");
    }
}
