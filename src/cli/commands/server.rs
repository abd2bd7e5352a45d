use std::time::Duration;

use clap::Subcommand;
use serde_json::Value;

use crate::cli::utils::{print_json, report_done, report_failure};
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server health status from the /health endpoint")]
    Health {
        #[arg(long, help = "Server base URL (defaults to the configured bind address)")]
        url: Option<String>,
    },

    #[command(about = "Show server information from the API root endpoint")]
    Info {
        #[arg(long, help = "Server base URL (defaults to the configured bind address)")]
        url: Option<String>,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?;

    match cmd {
        ServerCommands::Health { url } => {
            let base = base_url(url);
            match client.get(format!("{}/health", base)).send().await {
                Ok(response) if response.status().is_success() => {
                    let body: Value = response.json().await?;
                    report_done(&output_format, &format!("{} is healthy", base), Some(body))
                }
                Ok(response) => report_failure(
                    &output_format,
                    &format!("{} answered {}", base, response.status()),
                    "SERVICE_UNAVAILABLE",
                ),
                Err(e) => report_failure(&output_format, &format!("{} unreachable: {}", base, e), "UNREACHABLE"),
            }
        }
        ServerCommands::Info { url } => {
            let base = base_url(url);
            let body: Value = client.get(&base).send().await?.error_for_status()?.json().await?;
            match output_format {
                OutputFormat::Json => print_json(&body)?,
                OutputFormat::Text => {
                    println!("Server: {}", base);
                    if let Some(name) = body.get("name").and_then(Value::as_str) {
                        println!("Name: {}", name);
                    }
                    if let Some(version) = body.get("version").and_then(Value::as_str) {
                        println!("Version: {}", version);
                    }
                }
            }
            Ok(())
        }
    }
}

fn base_url(url: Option<String>) -> String {
    url.unwrap_or_else(|| {
        let server = &config().server;
        let host = if server.host == "0.0.0.0" { "127.0.0.1" } else { server.host.as_str() };
        format!("http://{}:{}", host, server.port)
    })
    .trim_end_matches('/')
    .to_string()
}
