//! CLI entry point for the nmap-inventory dynamic inventory script.
//!
//! Follows the Ansible dynamic inventory protocol: `--list` prints the
//! whole inventory as JSON on stdout, `--host NAME` prints one host's
//! variables. Logs go to stderr so stdout stays parseable.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use nmap_inventory_core::Inventory;
use nmap_inventory_discover::config::{default_config_prefix, InventoryConfig};
use nmap_inventory_discover::scanner::NmapScanner;

#[derive(Parser)]
#[command(name = "nmap-inventory")]
#[command(about = "Generates an Ansible dynamic inventory using Nmap")]
struct Cli {
    /// Show JSON of all managed hosts (default action).
    #[arg(long, conflicts_with = "host")]
    list: bool,

    /// Display vars related to the host.
    #[arg(long)]
    host: Option<String>,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,

    /// Config file prefix (default: ~/.config/nmap_inventory).
    #[arg(short, long)]
    config: Option<String>,

    /// Override the target expression from the config file.
    #[arg(short, long)]
    addresses: Option<String>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    // Host variables are already published under `_meta.hostvars` by --list.
    if let Some(host) = &cli.host {
        tracing::debug!(host = %host, "Host vars requested");
        println!("{}", serde_json::json!({}));
        return Ok(());
    }

    let prefix = cli
        .config
        .clone()
        .unwrap_or_else(|| default_config_prefix().to_string_lossy().into_owned());
    let config = InventoryConfig::load(&prefix)?;
    let addresses = match cli.addresses.as_deref() {
        Some(a) => a,
        None => config.addresses()?,
    };

    let scanner = NmapScanner::new(&config.nmap_path);
    if cli.debug {
        let version = scanner.verify_installation().await?;
        tracing::debug!(nmap_version = %version.trim(), "Nmap verified");
    }

    let result = scanner.scan(addresses).await?;
    let inventory = Inventory::from_hosts(&result.hosts);

    tracing::debug!(
        scan_id = %result.scan_id,
        hosts = inventory.host_count(),
        "Inventory rendered"
    );
    println!("{}", inventory.to_json(cli.pretty)?);

    Ok(())
}
