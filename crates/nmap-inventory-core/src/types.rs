//! Host and inventory document types.
//!
//! `DiscoveredHost` is what the scan filter produces; `Inventory` is the
//! JSON document the Ansible dynamic-inventory contract expects.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// Group every discovered host lands in.
pub const UNGROUPED: &str = "ungrouped";

// ── Discovered Hosts ──────────────────────────────────────────────

/// A host that passed the scan filter.
///
/// Serializes as a single-entry map `{name: address}`, with `null` when the
/// scan reported no address for the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveredHost {
    pub name: String,
    pub address: Option<String>,
}

impl DiscoveredHost {
    pub fn new(name: impl Into<String>, address: Option<String>) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }
}

impl Serialize for DiscoveredHost {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.address)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for DiscoveredHost {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PairVisitor;

        impl<'de> Visitor<'de> for PairVisitor {
            type Value = DiscoveredHost;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single-entry map of host name to address")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let (name, address) = map
                    .next_entry::<String, Option<String>>()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;

                if map.next_key::<IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }

                Ok(DiscoveredHost { name, address })
            }
        }

        deserializer.deserialize_map(PairVisitor)
    }
}

/// Every address discovered under one host name.
///
/// A name can resolve to several addresses (multiple PTR records pointing at
/// the same name), so the scan may report the same name more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostAddresses {
    pub name: String,
    pub addresses: Vec<String>,
}

impl HostAddresses {
    /// Group discovered hosts by name.
    ///
    /// Names keep the order in which they were first seen; addresses keep
    /// discovery order. Absent addresses are dropped, but a name whose only
    /// entries had no address is still listed with an empty address list.
    pub fn aggregate(hosts: &[DiscoveredHost]) -> Vec<HostAddresses> {
        let mut grouped: Vec<HostAddresses> = Vec::new();

        for host in hosts {
            let idx = match grouped.iter().position(|g| g.name == host.name) {
                Some(idx) => idx,
                None => {
                    grouped.push(HostAddresses {
                        name: host.name.clone(),
                        addresses: Vec::new(),
                    });
                    grouped.len() - 1
                }
            };

            if let Some(addr) = &host.address {
                if !grouped[idx].addresses.contains(addr) {
                    grouped[idx].addresses.push(addr.clone());
                }
            }
        }

        grouped
    }
}

// ── Inventory Document ────────────────────────────────────────────

/// Variables attached to a host in `_meta.hostvars`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostVars {
    /// First address discovered for the host.
    pub ip: Option<String>,
    /// All addresses discovered for the host, in discovery order.
    #[serde(default)]
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub hostvars: BTreeMap<String, HostVars>,
}

/// An inventory group: member hosts and/or child groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

/// Dynamic inventory document, as printed for `--list`.
///
/// ```json
/// {
///   "_meta": {"hostvars": {"raspberrypi": {"ip": "192.168.1.11", "addresses": ["192.168.1.11"]}}},
///   "all": {"children": ["ungrouped"]},
///   "ungrouped": {"hosts": ["raspberrypi"]}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub all: Group,
    pub ungrouped: Group,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            meta: Meta::default(),
            all: Group {
                hosts: Vec::new(),
                children: vec![UNGROUPED.to_string()],
            },
            ungrouped: Group::default(),
        }
    }
}

impl Inventory {
    /// Render filtered scan results into an inventory document.
    pub fn from_hosts(hosts: &[DiscoveredHost]) -> Self {
        let mut inventory = Self::default();

        for entry in HostAddresses::aggregate(hosts) {
            inventory.ungrouped.hosts.push(entry.name.clone());
            inventory.meta.hostvars.insert(
                entry.name,
                HostVars {
                    ip: entry.addresses.first().cloned(),
                    addresses: entry.addresses,
                },
            );
        }

        inventory
    }

    /// Number of distinct hosts in the document.
    pub fn host_count(&self) -> usize {
        self.ungrouped.hosts.len()
    }

    pub fn host_vars(&self, name: &str) -> Option<&HostVars> {
        self.meta.hostvars.get(name)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, InventoryError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}
