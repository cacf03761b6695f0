//! Scan result cache — trait + file-backed implementation.
//!
//! Key = address spec, value = the last filtered host list. Entries older
//! than the TTL are misses.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use nmap_inventory_core::DiscoveredHost;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One cached scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub address: String,
    pub cached_at: DateTime<Utc>,
    pub hosts: Vec<DiscoveredHost>,
}

impl CacheEntry {
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.cached_at
    }

    /// Fresh while `0 <= age < ttl`. Entries from the future are stale.
    pub fn is_fresh(&self, ttl: TimeDelta, now: DateTime<Utc>) -> bool {
        let age = self.age(now);
        age >= TimeDelta::zero() && age < ttl
    }
}

/// Trait for scan cache backends.
pub trait ScanCache {
    /// Fresh entry for `address`, if any.
    fn get(&self, address: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Store the hosts discovered for `address`, replacing any previous entry.
    fn put(&self, address: &str, hosts: &[DiscoveredHost]) -> Result<CacheEntry, CacheError>;

    /// Drop the entry for `address`. Returns whether one existed.
    fn invalidate(&self, address: &str) -> Result<bool, CacheError>;
}

/// File-system backed cache.
///
/// One pretty-printed JSON file per address, named by the BLAKE3 digest of
/// the address spec:
/// ```text
/// {root}/
///   {blake3(address)}.json
/// ```
pub struct FileScanCache {
    root: PathBuf,
    ttl: TimeDelta,
}

impl FileScanCache {
    /// Create a cache rooted at the given directory.
    /// Creates the directory if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>, ttl: TimeDelta) -> Result<Self, CacheError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, ttl })
    }

    fn entry_path(&self, address: &str) -> PathBuf {
        let digest = blake3::hash(address.as_bytes()).to_hex();
        self.root.join(format!("{digest}.json"))
    }

    /// Like `get`, evaluated at `now`.
    pub fn get_at(
        &self,
        address: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.entry_path(address);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: CacheEntry = match serde_json::from_str(&json) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt cache entry");
                return Ok(None);
            }
        };

        if entry.address != address {
            tracing::warn!(path = %path.display(), "Cache entry belongs to another address");
            return Ok(None);
        }

        if !entry.is_fresh(self.ttl, now) {
            tracing::debug!(
                address = %address,
                age_secs = entry.age(now).num_seconds(),
                "Cache entry expired"
            );
            return Ok(None);
        }

        Ok(Some(entry))
    }

    /// Like `put`, stamped with `now`.
    pub fn put_at(
        &self,
        address: &str,
        hosts: &[DiscoveredHost],
        now: DateTime<Utc>,
    ) -> Result<CacheEntry, CacheError> {
        let entry = CacheEntry {
            address: address.to_string(),
            cached_at: now,
            hosts: hosts.to_vec(),
        };

        let path = self.entry_path(address);
        let json = serde_json::to_string_pretty(&entry)?;
        fs::write(&path, json)?;

        tracing::debug!(
            address = %address,
            hosts = entry.hosts.len(),
            path = %path.display(),
            "Scan cached"
        );

        Ok(entry)
    }
}

impl ScanCache for FileScanCache {
    fn get(&self, address: &str) -> Result<Option<CacheEntry>, CacheError> {
        self.get_at(address, Utc::now())
    }

    fn put(&self, address: &str, hosts: &[DiscoveredHost]) -> Result<CacheEntry, CacheError> {
        self.put_at(address, hosts, Utc::now())
    }

    fn invalidate(&self, address: &str) -> Result<bool, CacheError> {
        match fs::remove_file(self.entry_path(address)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn hosts() -> Vec<DiscoveredHost> {
        vec![
            DiscoveredHost::new("raspberrypi", Some("192.168.1.11".to_string())),
            DiscoveredHost::new("ghost", None),
        ]
    }

    fn cache(dir: &Path) -> FileScanCache {
        FileScanCache::new(dir.join("cache"), TimeDelta::seconds(60)).unwrap()
    }

    #[test]
    fn put_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        assert!(dir.path().join("cache").is_dir());

        cache.put("192.168.1.0/24", &hosts()).unwrap();
        let entry = cache.get("192.168.1.0/24").unwrap().unwrap();

        assert_eq!(entry.address, "192.168.1.0/24");
        assert_eq!(entry.hosts, hosts());
    }

    #[test]
    fn miss_for_other_address() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());

        cache.put("192.168.1.0/24", &hosts()).unwrap();
        assert!(cache.get("10.0.0.0/8").unwrap().is_none());
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        let then = Utc::now() - TimeDelta::seconds(120);

        cache.put_at("192.168.1.0/24", &hosts(), then).unwrap();
        assert!(cache.get("192.168.1.0/24").unwrap().is_none());
        assert!(cache
            .get_at("192.168.1.0/24", then + TimeDelta::seconds(59))
            .unwrap()
            .is_some());
    }

    #[test]
    fn future_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());
        let later = Utc::now() + TimeDelta::seconds(30);

        cache.put_at("192.168.1.0/24", &hosts(), later).unwrap();
        assert!(cache.get("192.168.1.0/24").unwrap().is_none());
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());

        fs::write(cache.entry_path("192.168.1.0/24"), "{not json").unwrap();
        assert!(cache.get("192.168.1.0/24").unwrap().is_none());
    }

    #[test]
    fn invalidate_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());

        cache.put("192.168.1.0/24", &hosts()).unwrap();
        assert!(cache.invalidate("192.168.1.0/24").unwrap());
        assert!(cache.get("192.168.1.0/24").unwrap().is_none());
        assert!(!cache.invalidate("192.168.1.0/24").unwrap());
    }

    #[test]
    fn stored_hosts_use_pair_form() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path());

        cache.put("192.168.1.0/24", &hosts()).unwrap();
        let raw = fs::read_to_string(cache.entry_path("192.168.1.0/24")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value["hosts"],
            serde_json::json!([{"raspberrypi": "192.168.1.11"}, {"ghost": null}])
        );
    }
}
