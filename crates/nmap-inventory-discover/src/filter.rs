//! Result filter: turn an nmap report into inventory host entries.
//!
//! A host is kept only when it has a name, is not reported down, and has
//! TCP 22 open. Hosts are returned in document order.

use std::fmt;

use nmap_inventory_core::DiscoveredHost;

use crate::error::Result;
use crate::nmap_xml::{self, NmapHost, NmapRun, SSH_PORT};

/// Why a host record was left out of the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    NoName,
    Down,
    PortNotOpen,
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NoName => "no hostname",
            Self::Down => "host down",
            Self::PortNotOpen => "port 22 not open",
        };
        f.write_str(reason)
    }
}

/// Decide whether a single host record makes it into the inventory.
///
/// Checks run in order and stop at the first failure. A host without any
/// address is still kept, with an absent address.
pub fn classify(host: &NmapHost) -> std::result::Result<DiscoveredHost, ExclusionReason> {
    let name = host.hostname().ok_or(ExclusionReason::NoName)?;

    if host.is_down() {
        return Err(ExclusionReason::Down);
    }

    // Up is not the same as open: we need SSH access.
    if !host.has_open_port(SSH_PORT) {
        return Err(ExclusionReason::PortNotOpen);
    }

    Ok(DiscoveredHost::new(
        name,
        host.first_address().map(String::from),
    ))
}

/// Filter a parsed report down to manageable hosts.
pub fn filter_hosts(nmap_run: &NmapRun) -> Vec<DiscoveredHost> {
    nmap_run
        .hosts
        .iter()
        .filter_map(|host| match classify(host) {
            Ok(discovered) => Some(discovered),
            Err(reason) => {
                tracing::trace!(
                    address = host.first_address().unwrap_or("-"),
                    hostname = host.hostname().unwrap_or("-"),
                    %reason,
                    "Host excluded"
                );
                None
            }
        })
        .collect()
}

/// Parse raw nmap XML and filter it. Malformed XML is an error; a report
/// with no qualifying hosts is an empty list.
pub fn discover_hosts(xml: &[u8]) -> Result<Vec<DiscoveredHost>> {
    let nmap_run = nmap_xml::parse_nmap_xml(xml)?;
    Ok(filter_hosts(&nmap_run))
}
