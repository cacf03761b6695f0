//! CLI entry point for the nmap inventory plugin.
//!
//! Reads a plugin configuration file and prints the inventory document as
//! JSON on stdout. Fails when the scan finds no hosts.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use nmap_inventory_plugin::NmapInventoryPlugin;

#[derive(Parser)]
#[command(name = "nmap-inventory-plugin")]
#[command(about = "Returns a dynamic host inventory from an Nmap scan")]
struct Cli {
    /// Plugin configuration file (*.yaml or *.yml).
    config: PathBuf,

    /// Ignore cached results and scan again.
    #[arg(long)]
    refresh_cache: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let plugin = NmapInventoryPlugin::from_file(&cli.config)?;
    let inventory = plugin.parse(cli.refresh_cache).await?;
    println!("{}", inventory.to_json(cli.pretty)?);

    Ok(())
}
