//! Environment overrides for the script configuration.
//!
//! Kept in its own test binary: it mutates the process environment.

use nmap_inventory_discover::config::InventoryConfig;

#[test]
fn test_environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("nmap_inventory.ini"),
        "addresses = 192.168.1.0/24\nnmap_path = /usr/bin/nmap\n",
    )
    .unwrap();
    let prefix = dir.path().join("nmap_inventory");

    std::env::set_var("NMAP_INVENTORY__ADDRESSES", "10.20.0.0/16");
    let config = InventoryConfig::load(prefix.to_str().unwrap());
    std::env::remove_var("NMAP_INVENTORY__ADDRESSES");

    let config = config.unwrap();
    assert_eq!(config.addresses().unwrap(), "10.20.0.0/16");
    assert_eq!(config.nmap_path, "/usr/bin/nmap");
}
