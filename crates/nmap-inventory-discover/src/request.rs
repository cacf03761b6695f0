//! Scan requests: the target expression plus the fixed nmap flag set.

use std::fmt;
use std::net::IpAddr;

use ipnet::IpNet;

use crate::error::{DiscoverError, Result};

/// Flags passed to nmap on every scan, before the target.
///
/// `-n` is deliberately absent: reverse DNS is what gives hosts their
/// inventory names.
pub const NMAP_FLAGS: &[&str] = &[
    // Port 22 only
    "-p22",
    // Aggressive timing template
    "-T4",
    // ICMP echo discovery, suited to internal networks
    "-PE",
    // No ARP or ND ping
    "--disable-arp-ping",
    // Hosts scanned concurrently per batch
    "--max-hostgroup",
    "50",
    // Probes outstanding per host group
    "--min-parallelism",
    "50",
    // OS detection only on promising targets, one try
    "--osscan-limit",
    "--max-os-tries",
    "1",
    // XML report on stdout, no temp file
    "-oX",
    "-",
];

/// What kind of target expression the caller handed us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    /// A single IP address.
    Address(IpAddr),
    /// A CIDR network, e.g. `192.168.1.0/24`.
    Network(IpNet),
    /// A host name or any other nmap target syntax (`192.168.1.1-20`).
    Name(String),
}

impl ScanTarget {
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(DiscoverError::Config("Scan target is empty".to_string()));
        }

        if let Ok(addr) = spec.parse::<IpAddr>() {
            return Ok(Self::Address(addr));
        }
        if let Ok(net) = spec.parse::<IpNet>() {
            return Ok(Self::Network(net));
        }
        Ok(Self::Name(spec.to_string()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Network(_) => "network",
            Self::Name(_) => "name",
        }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(addr) => write!(f, "{addr}"),
            Self::Network(net) => write!(f, "{net}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// One scan invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    target: ScanTarget,
    spec: String,
}

impl ScanRequest {
    pub fn new(spec: &str) -> Result<Self> {
        let target = ScanTarget::parse(spec)?;
        Ok(Self {
            target,
            spec: spec.trim().to_string(),
        })
    }

    pub fn target(&self) -> &ScanTarget {
        &self.target
    }

    /// The target exactly as the caller wrote it (trimmed). Used as the
    /// nmap argument and as the cache key.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Full nmap argument list: fixed flags followed by the target.
    pub fn args(&self) -> Vec<&str> {
        let mut args: Vec<&str> = NMAP_FLAGS.to_vec();
        args.push(self.spec.as_str());
        args
    }
}
