//! nmap-inventory-core: Shared types for the nmap-inventory tools.
//!
//! This crate provides the types every integration surface agrees on:
//! - `DiscoveredHost`, the name/address pair that survives the scan filter
//! - `HostAddresses`, the per-name aggregation of discovered addresses
//! - `Inventory`, the dynamic-inventory JSON document handed to Ansible
//! - Common error types

pub mod error;
pub mod types;

pub use error::InventoryError;
pub use types::{DiscoveredHost, HostAddresses, HostVars, Inventory};
