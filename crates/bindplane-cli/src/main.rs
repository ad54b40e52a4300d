//! # BindPlane CLI
//!
//! Command-line access to the BindPlane control plane for automation and
//! debugging. Connection settings come from `BINDPLANE_*` environment
//! variables; results are written to stdout as JSON.

use anyhow::{Context, Result};
use bindplane_client::{with_timeout, BindPlane};
use std::env;
use tracing_subscriber::EnvFilter;

mod config;

use config::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    let Some(command) = args.get(1) else {
        print_help();
        return Ok(());
    };

    if matches!(command.as_str(), "help" | "--help" | "-h") {
        print_help();
        return Ok(());
    }

    let config = CliConfig::from_env()?;
    let client = BindPlane::new(config.client, [with_timeout(config.timeout)])
        .context("Failed to create BindPlane client")?;

    tracing::debug!(base_url = client.base_url(), command = %command, "Running command");

    match command.as_str() {
        "version" => {
            let version = client.version().await.context("Failed to query version")?;
            println!("{}", serde_json::to_string_pretty(&version)?);
        }
        "configuration" => {
            let name = required_name(&args, "configuration")?;
            let configuration = client
                .configuration(name)
                .await
                .with_context(|| format!("Failed to get configuration {name}"))?;
            println!("{}", serde_json::to_string_pretty(&configuration)?);
        }
        "raw-configuration" => {
            let name = required_name(&args, "raw-configuration")?;
            let raw = client
                .raw_configuration(name)
                .await
                .with_context(|| format!("Failed to get raw configuration {name}"))?;
            println!("{raw}");
        }
        "start-rollout" => {
            let name = required_name(&args, "start-rollout")?;
            client
                .start_rollout(name)
                .await
                .with_context(|| format!("Failed to start rollout {name}"))?;
            tracing::info!(name, "Rollout started");
        }
        "rollout-status" => {
            let name = required_name(&args, "rollout-status")?;
            let configuration = client
                .rollout_status(name)
                .await
                .with_context(|| format!("Failed to get rollout status {name}"))?;
            println!("{}", serde_json::to_string_pretty(&configuration)?);
        }
        cmd => {
            eprintln!("Unknown command: {cmd}");
            print_help();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn required_name<'a>(args: &'a [String], command: &str) -> Result<&'a str> {
    args.get(2)
        .map(String::as_str)
        .with_context(|| format!("Usage: bindplane {command} <name>"))
}

fn print_help() {
    println!(
        r#"BindPlane CLI

USAGE:
    bindplane <COMMAND> [NAME]

COMMANDS:
    version                    Show the control plane version
    configuration <name>       Show a configuration as JSON
    raw-configuration <name>   Show the raw text of a configuration
    start-rollout <name>       Start a rollout of a configuration
    rollout-status <name>      Show the rollout state of a configuration
    help                       Show this help message

ENVIRONMENT:
    BINDPLANE_REMOTE_URL       Control plane address (default http://localhost:3001)
    BINDPLANE_USERNAME         Basic auth username
    BINDPLANE_PASSWORD         Basic auth password
    BINDPLANE_API_KEY          API key
    BINDPLANE_TLS_CA           PEM bundle of trusted certificate authorities
    BINDPLANE_TIMEOUT_SECS     Request timeout in seconds (default 60)
    RUST_LOG                   Log filter (default info)
"#
    );
}
