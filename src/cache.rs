//! File cache for registry lookups.
//!
//! Each entry is a JSON file named after its key, stored under
//! `dirs::cache_dir()/dep-audit/` (for example `~/.cache/dep-audit/` on
//! Linux). Entries older than the TTL are treated as missing and removed.
//!
//! # Example
//!
//! ```no_run
//! use dep_audit::Cache;
//!
//! let cache = Cache::new(24);
//! cache.set("npm_latest_lodash", &"4.17.21".to_string())?;
//!
//! let latest: Option<String> = cache.get("npm_latest_lodash");
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub const DEFAULT_TTL_HOURS: u64 = 24;

pub struct Cache {
    dir: PathBuf,
    ttl: Duration,
}

impl Cache {
    /// Cache in the platform cache directory with a TTL in hours.
    pub fn new(ttl_hours: u64) -> Self {
        Self::in_dir(Self::default_dir(), ttl_hours)
    }

    pub fn in_dir(dir: impl Into<PathBuf>, ttl_hours: u64) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::from_secs(ttl_hours.saturating_mul(3600)),
        }
    }

    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("dep-audit")
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| match c {
                c if c.is_alphanumeric() || c == '-' || c == '_' => c,
                _ => '_',
            })
            .collect();
        self.dir.join(format!("{}.json", file_stem))
    }

    fn is_expired(&self, path: &Path) -> bool {
        fs::metadata(path)
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .is_some_and(|age| age > self.ttl)
    }

    /// Returns the cached value, or `None` when missing, expired or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.entry_path(key);
        if !path.exists() {
            return None;
        }

        if self.is_expired(&path) {
            let _ = fs::remove_file(&path);
            return None;
        }

        let content = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Stores `value` under `key`, creating the cache directory if needed.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string(value)?;
        fs::write(self.entry_path(key), content)?;
        Ok(())
    }

    /// Removes every cached entry.
    pub fn clear(&self) -> Result<()> {
        if !self.dir.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(&self.dir)?.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_HOURS)
    }
}
