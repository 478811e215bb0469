use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wifi_locate::{
    config::{self, Config},
    error::LocateError,
    geolocate, locate, probe, scan,
};

#[derive(Parser)]
#[command(name = "wifi-locate")]
#[command(about = "Estimate a network printer's location from the wireless networks it can see")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the target for visible wireless networks and print them
    Scan {
        /// IP address or hostname of the target
        host: String,

        /// Request timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Query the target and estimate its location from what it sees
    Locate {
        /// IP address or hostname of the target
        host: String,

        /// Geolocation API key (uses the saved key if not provided)
        #[arg(short, long)]
        key: Option<String>,

        /// Request timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Save the geolocation API key to the config file
    SetKey {
        /// API key for the geolocation service
        key: String,
    },

    /// Show saved configuration
    ShowConfig,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { host, timeout } => cmd_scan(&host, timeout),
        Commands::Locate { host, key, timeout } => cmd_locate(&host, key.as_deref(), timeout),
        Commands::SetKey { key } => cmd_set_key(&key),
        Commands::ShowConfig => cmd_show_config(),
    }
}

fn cmd_scan(host: &str, timeout: Option<u64>) -> Result<()> {
    let cfg = Config::load().unwrap_or_default();
    let timeout = resolve_timeout(timeout, &cfg);

    let networks = probe_and_display(host, timeout)?;

    if networks.len() < locate::MIN_NETWORKS {
        println!();
        println!(
            "Note: a position fix needs at least {} networks.",
            locate::MIN_NETWORKS
        );
    }

    Ok(())
}

fn cmd_locate(host: &str, key: Option<&str>, timeout: Option<u64>) -> Result<()> {
    let cfg = Config::load().unwrap_or_default();
    let timeout = resolve_timeout(timeout, &cfg);

    // The key is checked before touching the network: a missing key can
    // never be fixed by retrying the probe.
    let key = match key {
        Some(k) => k.to_string(),
        None => cfg.api_key.clone().ok_or(LocateError::MissingApiKey)?,
    };

    let networks = probe_and_display(host, timeout)?;
    println!();

    println!("Sending location query...");
    let estimate = locate::run(&networks, |request| {
        geolocate::send_request(&key, request, timeout)
    })?;

    println!(
        "The target is within {} meters of {},{}",
        estimate.accuracy, estimate.latitude, estimate.longitude
    );
    println!("Map URL: {}", estimate.maps_url());

    Ok(())
}

/// Fetches the scan document, prints the network table, returns the records.
fn probe_and_display(host: &str, timeout: Duration) -> Result<Vec<scan::AccessPoint>> {
    println!("Querying {} for wireless networks...", host);
    println!();

    let raw = probe::fetch_scan(host, timeout)?;
    let networks = scan::parse_networks(&raw);

    println!(
        "The target is aware of {} wireless network(s).",
        networks.len()
    );
    println!();
    scan::display_networks(&networks);

    Ok(networks)
}

fn resolve_timeout(flag: Option<u64>, cfg: &Config) -> Duration {
    Duration::from_secs(
        flag.or(cfg.timeout_secs)
            .unwrap_or(probe::DEFAULT_TIMEOUT_SECS),
    )
}

fn cmd_set_key(key: &str) -> Result<()> {
    let mut cfg = Config::load().unwrap_or_default();
    cfg.api_key = Some(key.to_string());
    cfg.save()?;

    let path = config::config_path()?;
    println!("Saved API key to {}", path.display());

    Ok(())
}

fn cmd_show_config() -> Result<()> {
    let path = config::config_path()?;
    println!("Config file: {}", path.display());
    println!();

    let cfg = Config::load()?;

    match cfg.api_key {
        Some(ref key) => {
            let masked = "*".repeat(key.chars().count().min(24));
            println!("API key:  {}", masked);
        }
        None => println!("API key:  (not set)"),
    }

    match cfg.timeout_secs {
        Some(secs) => println!("Timeout:  {}s", secs),
        None => println!("Timeout:  {}s (default)", probe::DEFAULT_TIMEOUT_SECS),
    }

    Ok(())
}
