//! Nmap XML output deserialization.
//!
//! Nmap's `-oX -` flag writes the report as XML to stdout. Only the parts
//! the inventory filter looks at are modelled; everything else in the
//! report (`times`, `extraports`, `hosthint`, task progress) is skipped.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::error::{DiscoverError, Result};

/// The port whose open state makes a host manageable.
pub const SSH_PORT: u16 = 22;

/// Root element: `<nmaprun>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename = "nmaprun")]
pub struct NmapRun {
    #[serde(rename = "@scanner")]
    pub scanner: Option<String>,
    #[serde(rename = "@args")]
    pub args: Option<String>,
    #[serde(rename = "@version")]
    pub version: Option<String>,
    #[serde(rename = "host", default)]
    pub hosts: Vec<NmapHost>,
    pub runstats: Option<RunStats>,
}

/// A single host from scan results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NmapHost {
    pub status: Option<HostStatus>,
    #[serde(rename = "address", default)]
    pub addresses: Vec<Address>,
    pub hostnames: Option<Hostnames>,
    pub ports: Option<Ports>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostStatus {
    #[serde(rename = "@state")]
    pub state: String,
    #[serde(rename = "@reason")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    #[serde(rename = "@addr")]
    pub addr: String,
    #[serde(rename = "@addrtype")]
    pub addr_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hostnames {
    #[serde(rename = "hostname", default)]
    pub hostnames: Vec<Hostname>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hostname {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@type")]
    pub hostname_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ports {
    #[serde(rename = "port", default)]
    pub ports: Vec<NmapPort>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NmapPort {
    #[serde(rename = "@protocol")]
    pub protocol: Option<String>,
    #[serde(rename = "@portid")]
    pub port_id: u16,
    pub state: Option<PortState>,
    pub service: Option<NmapService>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortState {
    #[serde(rename = "@state")]
    pub state: String,
    #[serde(rename = "@reason")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NmapService {
    #[serde(rename = "@name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunStats {
    pub hosts: Option<RunStatsHosts>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunStatsHosts {
    #[serde(rename = "@up")]
    pub up: Option<String>,
    #[serde(rename = "@down")]
    pub down: Option<String>,
    #[serde(rename = "@total")]
    pub total: Option<String>,
}

impl NmapPort {
    pub fn is_open(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.state == "open")
    }
}

impl NmapHost {
    /// First non-empty hostname, if present.
    pub fn hostname(&self) -> Option<&str> {
        self.hostnames
            .as_ref()
            .and_then(|hn| hn.hostnames.first())
            .map(|h| h.name.as_str())
            .filter(|name| !name.is_empty())
    }

    /// First address in document order, regardless of address type.
    pub fn first_address(&self) -> Option<&str> {
        self.addresses.first().map(|a| a.addr.as_str())
    }

    /// Check if the host is up.
    pub fn is_up(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.state == "up")
    }

    /// Check if the host was explicitly reported down.
    ///
    /// A host without a `<status>` element is not considered down.
    pub fn is_down(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.state == "down")
    }

    /// Look up a port record by number.
    pub fn port(&self, port_id: u16) -> Option<&NmapPort> {
        self.ports
            .as_ref()
            .and_then(|p| p.ports.iter().find(|p| p.port_id == port_id))
    }

    /// Check whether any record for `port_id` is reported open.
    pub fn has_open_port(&self, port_id: u16) -> bool {
        self.ports.as_ref().is_some_and(|p| {
            p.ports
                .iter()
                .any(|port| port.port_id == port_id && port.is_open())
        })
    }
}

/// Parse nmap XML bytes into a structured `NmapRun`.
///
/// The whole input must be a single well-formed document: content after
/// the closing `</nmaprun>` is rejected.
pub fn parse_nmap_xml(xml: &[u8]) -> Result<NmapRun> {
    let nmap_run = quick_xml::de::from_reader(xml)
        .map_err(|e| DiscoverError::XmlParse(format!("{e}")))?;
    check_single_root(xml)?;
    Ok(nmap_run)
}

/// Walk the raw events and fail on anything but whitespace, comments or
/// processing instructions once the root element has closed.
fn check_single_root(xml: &[u8]) -> Result<()> {
    let mut reader = Reader::from_reader(xml);
    let mut depth = 0usize;
    let mut root_closed = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| DiscoverError::XmlParse(format!("{e}")))?;

        let junk = match &event {
            Event::Start(_) | Event::Empty(_) | Event::CData(_) => root_closed,
            Event::Text(text) => root_closed && !text.iter().all(u8::is_ascii_whitespace),
            _ => false,
        };
        if junk {
            return Err(DiscoverError::XmlParse(format!(
                "junk after document element at position {}",
                reader.buffer_position()
            )));
        }

        match event {
            Event::Start(_) => depth += 1,
            Event::Empty(_) if depth == 0 => root_closed = true,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    root_closed = true;
                }
            }
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}
