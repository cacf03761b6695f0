//! nmap-inventory-plugin: Inventory plugin adapter around the nmap scanner.
//!
//! Reads a YAML plugin configuration, serves repeated scans of the same
//! address from a TTL cache, and renders the discovered hosts as an
//! Ansible inventory document. Unlike the script, an empty scan is fatal.

pub mod cache;
pub mod error;
pub mod options;
pub mod plugin;

pub use error::PluginError;
pub use plugin::NmapInventoryPlugin;
