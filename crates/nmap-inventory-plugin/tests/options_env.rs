//! Environment overrides for the plugin options file.
//!
//! Kept in its own test binary: it mutates the process environment.

use chrono::TimeDelta;
use nmap_inventory_plugin::options::PluginOptions;

#[test]
fn test_environment_overrides_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nmap_plugin.yaml");
    std::fs::write(&path, "plugin: nmap_plugin\naddress: 192.168.1.0/24\n").unwrap();
    let cache_dir = dir.path().join("cache");

    let vars = [
        ("NMAP_PLUGIN__ADDRESS", "172.16.0.0/24".to_string()),
        ("NMAP_PLUGIN__CACHE", "true".to_string()),
        ("NMAP_PLUGIN__CACHE_TIMEOUT", "90".to_string()),
        ("NMAP_PLUGIN__CACHE_CONNECTION", cache_dir.display().to_string()),
    ];
    for (key, value) in &vars {
        std::env::set_var(key, value);
    }
    let options = PluginOptions::load(&path);
    for (key, _) in &vars {
        std::env::remove_var(key);
    }

    let options = options.unwrap();
    assert_eq!(options.address, "172.16.0.0/24");
    let cache = options.cache.expect("cache enabled from the environment");
    assert_eq!(cache.dir, cache_dir);
    assert_eq!(cache.ttl, TimeDelta::seconds(90));
}
