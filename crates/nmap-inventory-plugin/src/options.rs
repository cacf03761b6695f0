//! Plugin configuration file.
//!
//! ```yaml
//! plugin: nmap_plugin
//! address: 192.168.1.0/24
//! cache: true
//! cache_timeout: 3600
//! ```

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use directories::BaseDirs;
use serde::Deserialize;

use nmap_inventory_discover::config::default_nmap_path;

use crate::error::{PluginError, Result};

/// Value the `plugin` option must carry.
pub const PLUGIN_NAME: &str = "nmap_plugin";

/// Environment variable prefix, e.g. `NMAP_PLUGIN__ADDRESS`.
pub const ENV_PREFIX: &str = "NMAP_PLUGIN";

/// Options as they appear in the file, before validation.
#[derive(Debug, Clone, Deserialize)]
struct RawOptions {
    plugin: Option<String>,
    address: Option<String>,
    #[serde(default = "default_nmap_path")]
    nmap_path: String,
    #[serde(default)]
    cache: bool,
    #[serde(default = "default_cache_timeout")]
    cache_timeout: u64,
    cache_connection: Option<String>,
}

fn default_cache_timeout() -> u64 {
    3600
}

/// Where and for how long scan results are cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub dir: PathBuf,
    pub ttl: TimeDelta,
}

/// Validated plugin options.
#[derive(Debug, Clone)]
pub struct PluginOptions {
    /// Nmap target expression to scan.
    pub address: String,
    /// Path to the nmap binary.
    pub nmap_path: String,
    /// Cache settings; `None` when caching is disabled.
    pub cache: Option<CacheSettings>,
}

/// Whether `path` looks like a configuration file for this plugin.
pub fn verify_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.is_file() && (name.ends_with("yaml") || name.ends_with("yml"))
}

/// Default cache directory: `<cache dir>/nmap_inventory`.
pub fn default_cache_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.cache_dir().join("nmap_inventory"))
        .unwrap_or_else(|| PathBuf::from(".nmap_inventory_cache"))
}

impl PluginOptions {
    /// Load and validate options from a YAML file, with environment
    /// overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !verify_file(path) {
            return Err(PluginError::UnsupportedFile {
                path: path.display().to_string(),
            });
        }

        let cfg = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let raw: RawOptions = cfg.try_deserialize()?;
        Self::validate(raw, path)
    }

    fn validate(raw: RawOptions, path: &Path) -> Result<Self> {
        let invalid = |reason: String| PluginError::InvalidOption {
            path: path.display().to_string(),
            reason,
        };

        match raw.plugin.as_deref() {
            Some(PLUGIN_NAME) => {}
            Some(other) => {
                return Err(invalid(format!(
                    "plugin must be \"{PLUGIN_NAME}\", got \"{other}\""
                )))
            }
            None => return Err(invalid("option \"plugin\" is required".to_string())),
        }

        let address = raw
            .address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| invalid("option \"address\" is required".to_string()))?
            .to_string();

        let cache = if raw.cache {
            let ttl = i64::try_from(raw.cache_timeout)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .ok_or_else(|| invalid(format!("cache_timeout out of range: {}", raw.cache_timeout)))?;
            Some(CacheSettings {
                dir: raw
                    .cache_connection
                    .map(PathBuf::from)
                    .unwrap_or_else(default_cache_dir),
                ttl,
            })
        } else {
            None
        };

        Ok(Self {
            address,
            nmap_path: raw.nmap_path,
            cache,
        })
    }
}
