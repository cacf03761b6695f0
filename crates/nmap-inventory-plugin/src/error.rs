//! Error types for the nmap-inventory-plugin crate.

use nmap_inventory_discover::DiscoverError;
use thiserror::Error;

use crate::cache::CacheError;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Unsupported inventory file (expected *.yaml or *.yml): {path}")]
    UnsupportedFile { path: String },

    #[error("Invalid option on the configuration file {path}: {reason}")]
    InvalidOption { path: String, reason: String },

    #[error("Unable to get data for Nmap scan of {address}: no hosts found")]
    NoHostsFound { address: String },

    #[error("Error while calling Nmap: {0}")]
    Discover(#[from] DiscoverError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

pub type Result<T> = std::result::Result<T, PluginError>;
