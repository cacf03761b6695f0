//! End-to-end tests for the plugin adapter with a stand-in nmap script.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use nmap_inventory_plugin::{NmapInventoryPlugin, PluginError};

const SSH_HOSTS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nmaprun scanner="nmap">
  <host>
    <status state="up" reason="echo-reply"/>
    <address addr="192.168.1.25" addrtype="ipv4"/>
    <hostnames><hostname name="dmaf5.home" type="PTR"/></hostnames>
    <ports><port protocol="tcp" portid="22"><state state="open" reason="syn-ack"/></port></ports>
  </host>
  <host>
    <status state="up" reason="echo-reply"/>
    <address addr="192.168.1.26" addrtype="ipv4"/>
    <hostnames><hostname name="dmaf5.home" type="PTR"/></hostnames>
    <ports><port protocol="tcp" portid="22"><state state="open" reason="syn-ack"/></port></ports>
  </host>
  <host>
    <status state="up" reason="echo-reply"/>
    <address addr="192.168.1.40" addrtype="ipv4"/>
    <hostnames><hostname name="nas.home" type="PTR"/></hostnames>
    <ports><port protocol="tcp" portid="22"><state state="filtered" reason="no-response"/></port></ports>
  </host>
</nmaprun>"#;

const NO_SSH_XML: &str = r#"<nmaprun scanner="nmap">
  <host>
    <status state="down" reason="no-response"/>
    <address addr="192.168.1.99" addrtype="ipv4"/>
  </host>
</nmaprun>"#;

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn fake_nmap(&self, report: &str) -> PathBuf {
        let xml = self.path("report.xml");
        fs::write(&xml, report).unwrap();

        let script = self.path("nmap");
        fs::write(&script, format!("#!/bin/sh\ncat '{}'\n", xml.display())).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    fn plugin_config(&self, nmap: &Path, cache: bool) -> PathBuf {
        let path = self.path("nmap_plugin.yaml");
        let body = format!(
            "plugin: nmap_plugin\naddress: 192.168.1.0/24\nnmap_path: {}\ncache: {}\ncache_timeout: 600\ncache_connection: {}\n",
            nmap.display(),
            cache,
            self.path("cache").display()
        );
        fs::write(&path, body).unwrap();
        path
    }
}

#[tokio::test]
async fn test_parse_aggregates_addresses() {
    let fx = Fixture::new();
    let nmap = fx.fake_nmap(SSH_HOSTS_XML);
    let config = fx.plugin_config(&nmap, false);

    let plugin = NmapInventoryPlugin::from_file(&config).unwrap();
    let inventory = plugin.parse(false).await.unwrap();

    assert_eq!(inventory.ungrouped.hosts, vec!["dmaf5.home"]);
    let vars = inventory.host_vars("dmaf5.home").unwrap();
    assert_eq!(vars.ip.as_deref(), Some("192.168.1.25"));
    assert_eq!(vars.addresses, vec!["192.168.1.25", "192.168.1.26"]);
    assert!(inventory.host_vars("nas.home").is_none());
}

#[tokio::test]
async fn test_empty_scan_is_fatal() {
    let fx = Fixture::new();
    let nmap = fx.fake_nmap(NO_SSH_XML);
    let config = fx.plugin_config(&nmap, true);

    let plugin = NmapInventoryPlugin::from_file(&config).unwrap();
    match plugin.parse(false).await {
        Err(PluginError::NoHostsFound { address }) => assert_eq!(address, "192.168.1.0/24"),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("empty scan should fail"),
    }

    // Nothing was cached for the empty result.
    let cached = fs::read_dir(fx.path("cache")).unwrap().count();
    assert_eq!(cached, 0);
}

#[tokio::test]
async fn test_second_parse_served_from_cache() {
    let fx = Fixture::new();
    let nmap = fx.fake_nmap(SSH_HOSTS_XML);
    let config = fx.plugin_config(&nmap, true);

    let plugin = NmapInventoryPlugin::from_file(&config).unwrap();
    let first = plugin.parse(false).await.unwrap();

    // Without the scanner, only the cache can answer.
    fs::remove_file(&nmap).unwrap();
    let second = plugin.parse(false).await.unwrap();
    assert_eq!(first, second);

    assert!(matches!(
        plugin.parse(true).await,
        Err(PluginError::Discover(_))
    ));
}

#[tokio::test]
async fn test_unsupported_config_file() {
    let fx = Fixture::new();
    let config = fx.path("nmap_inventory.cfg");
    fs::write(&config, "plugin: nmap_plugin\naddress: 127.0.0.1\n").unwrap();

    assert!(matches!(
        NmapInventoryPlugin::from_file(&config),
        Err(PluginError::UnsupportedFile { .. })
    ));
}
