//! nmap-inventory-discover: Nmap-backed host discovery.
//!
//! Wraps nmap to scan an address range for hosts reachable over SSH and
//! filters the XML report down to name/address pairs that can be rendered
//! as an Ansible dynamic inventory.

pub mod config;
pub mod error;
pub mod filter;
pub mod nmap_xml;
pub mod request;
pub mod scanner;

pub use error::DiscoverError;
pub use filter::{discover_hosts, filter_hosts};
pub use request::{ScanRequest, ScanTarget};
pub use scanner::NmapScanner;
