//! Configuration for the nmap-inventory script.

use std::path::PathBuf;

use directories::BaseDirs;
use serde::Deserialize;

use crate::error::{DiscoverError, Result};

/// File name (without extension) looked up in the user's config directory.
pub const CONFIG_FILE_STEM: &str = "nmap_inventory";

/// Environment variable prefix, e.g. `NMAP_INVENTORY__ADDRESSES`.
pub const ENV_PREFIX: &str = "NMAP_INVENTORY";

/// Inventory script configuration.
///
/// Loaded from `~/.config/nmap_inventory.{ini,toml,yaml,...}`, the legacy
/// `~/.config/nmap_inventory.cfg`, or `NMAP_INVENTORY__` environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    /// Nmap target expression to scan (e.g., "192.168.1.0/24").
    #[serde(default)]
    pub addresses: Option<String>,

    /// Path to the nmap binary (default: "nmap").
    #[serde(default = "default_nmap_path")]
    pub nmap_path: String,

    /// `[DEFAULT]` section of a legacy `.cfg` file.
    #[serde(default, alias = "DEFAULT")]
    pub default: Option<LegacySection>,
}

/// The INI section older installs keep their settings in:
///
/// ```ini
/// [DEFAULT]
/// Addresses = 192.168.1.0/24
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacySection {
    #[serde(default, alias = "Addresses")]
    pub addresses: Option<String>,
}

pub fn default_nmap_path() -> String {
    "nmap".to_string()
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            addresses: None,
            nmap_path: default_nmap_path(),
            default: None,
        }
    }
}

impl InventoryConfig {
    /// Load from an optional config file plus the environment.
    ///
    /// `file_prefix` is passed to `config::File::with_name`, so the
    /// extension picks the format. A `<file_prefix>.cfg` INI file is read
    /// first; the named file and the environment override it.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let legacy = PathBuf::from(format!("{file_prefix}.cfg"));
        let cfg = config::Config::builder()
            .add_source(
                config::File::from(legacy.as_path())
                    .format(config::FileFormat::Ini)
                    .required(false),
            )
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| DiscoverError::Config(e.to_string()))?;

        cfg.try_deserialize::<InventoryConfig>()
            .map_err(|e| DiscoverError::Config(format!("{file_prefix}: {e}")))
    }

    /// The configured scan target; required for `--list`.
    ///
    /// A top-level `addresses` wins over the legacy `[DEFAULT]` section.
    pub fn addresses(&self) -> Result<&str> {
        let legacy = self.default.as_ref().and_then(|d| d.addresses.as_deref());
        [self.addresses.as_deref(), legacy]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|a| !a.is_empty())
            .ok_or_else(|| {
                DiscoverError::Config("Missing configuration option: addresses".to_string())
            })
    }
}

/// Default config file prefix: `<config dir>/nmap_inventory`.
pub fn default_config_prefix() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_STEM))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_STEM))
}
