//! netsift CLI - run commands on network devices, export parsed output as
//! CSV tables.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use log::{info, warn};
use secrecy::SecretString;

use netsift::{
    classify_devices, collect_tables, export_tables, AuthMethod, DeviceDirectory, EngineChain,
    HttpInventory, SshSessionFactory,
};

#[derive(Parser)]
#[command(name = "netsift")]
#[command(version, about = "Run commands on network devices and export parsed output as CSV tables", long_about = None)]
struct Cli {
    /// Comma separated hostnames, e.g. R1,R2,R3
    #[arg(long)]
    hosts: String,

    /// Comma separated commands, e.g. "show ip int brief,show version"
    #[arg(long)]
    commands: String,

    /// Inventory service base URL, e.g. https://inventory.example.com/api
    #[arg(long)]
    inventory_url: String,

    /// Inventory API token
    #[arg(long)]
    inventory_token: String,

    /// Device login username
    #[arg(long)]
    username: String,

    /// Device login password
    #[arg(long)]
    password: String,

    /// Directory of custom TextFSM templates (auto lookup by platform and
    /// command)
    #[arg(long)]
    templates_dir: Option<PathBuf>,

    /// Output directory for CSV files
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// SSH port
    #[arg(long, default_value_t = 22)]
    port: u16,

    /// Connection and per-command timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

/// Split a comma separated list, trimming entries and dropping empties.
fn parse_comma_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("netsift: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), netsift::Error> {
    let hostnames = parse_comma_list(&cli.hosts);
    let commands = parse_comma_list(&cli.commands);

    if hostnames.is_empty() || commands.is_empty() {
        warn!("nothing to do: empty host or command list");
        return Ok(());
    }

    let inventory = HttpInventory::new(
        cli.inventory_url,
        SecretString::from(cli.inventory_token),
    );
    let records = inventory.fetch_devices(&hostnames).await?;

    for hostname in &hostnames {
        if !records.iter().any(|r| &r.hostname == hostname) {
            warn!("inventory has no record for '{}'", hostname);
        }
    }

    // Classification is all-or-nothing and happens before any session
    // opens; an unmapped (vendor, OS) pair aborts here.
    let devices = classify_devices(records)?;
    info!("classified {} device(s)", devices.len());

    let factory = SshSessionFactory::new(
        cli.username,
        AuthMethod::Password(SecretString::from(cli.password)),
    )
    .port(cli.port)
    .timeout(Duration::from_secs(cli.timeout));

    let chain = EngineChain::standard();
    let tables = collect_tables(
        &factory,
        &devices,
        &commands,
        &chain,
        cli.templates_dir.as_deref(),
    )
    .await;

    let written = export_tables(&tables, &cli.output_dir)?;
    info!(
        "exported {} table(s) to {}",
        written.len(),
        cli.output_dir.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comma_list_trims_and_drops_empties() {
        assert_eq!(
            parse_comma_list(" R1, R2 ,,R3, "),
            vec!["R1".to_string(), "R2".to_string(), "R3".to_string()]
        );
        assert!(parse_comma_list("").is_empty());
        assert!(parse_comma_list(" , ,").is_empty());
    }
}
