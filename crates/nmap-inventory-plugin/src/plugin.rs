//! The inventory plugin: options + cache + scanner, composed.

use std::path::Path;

use nmap_inventory_core::{DiscoveredHost, Inventory};
use nmap_inventory_discover::NmapScanner;

use crate::cache::{FileScanCache, ScanCache};
use crate::error::{PluginError, Result};
use crate::options::{PluginOptions, PLUGIN_NAME};

/// Builds an inventory from an nmap scan of the configured address.
pub struct NmapInventoryPlugin {
    options: PluginOptions,
    scanner: NmapScanner,
    cache: Option<FileScanCache>,
}

impl NmapInventoryPlugin {
    pub const NAME: &'static str = PLUGIN_NAME;

    /// Load options from a plugin configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let options = PluginOptions::load(path)?;
        Self::new(options)
    }

    pub fn new(options: PluginOptions) -> Result<Self> {
        let cache = match &options.cache {
            Some(settings) => Some(FileScanCache::new(settings.dir.clone(), settings.ttl)?),
            None => None,
        };
        let scanner = NmapScanner::new(&options.nmap_path);

        Ok(Self {
            options,
            scanner,
            cache,
        })
    }

    /// Discover hosts, from the cache when a fresh entry exists.
    ///
    /// `refresh` skips the cache lookup but still stores the new result.
    /// An empty result is an error here; nothing gets cached for it.
    pub async fn discover(&self, refresh: bool) -> Result<Vec<DiscoveredHost>> {
        let address = self.options.address.as_str();

        if let (Some(cache), false) = (&self.cache, refresh) {
            match cache.get(address) {
                Ok(Some(entry)) if !entry.hosts.is_empty() => {
                    tracing::info!(
                        address = %address,
                        hosts = entry.hosts.len(),
                        cached_at = %entry.cached_at,
                        "Using cached scan"
                    );
                    return Ok(entry.hosts);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Cache lookup failed, scanning"),
            }
        }

        let result = self.scanner.scan(address).await?;
        if result.hosts.is_empty() {
            return Err(PluginError::NoHostsFound {
                address: address.to_string(),
            });
        }

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(address, &result.hosts) {
                tracing::warn!(error = %e, "Failed to cache scan result");
            }
        }

        Ok(result.hosts)
    }

    /// Discover hosts and render them as an inventory document.
    pub async fn parse(&self, refresh: bool) -> Result<Inventory> {
        let hosts = self.discover(refresh).await?;
        let inventory = Inventory::from_hosts(&hosts);

        tracing::info!(
            plugin = Self::NAME,
            address = %self.options.address,
            hosts = inventory.host_count(),
            "Inventory parsed"
        );

        Ok(inventory)
    }
}
