use std::path::PathBuf;
use std::sync::Arc;

use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{print_json, report_done, report_empty};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::DatabaseManager;
use crate::services::TenantService;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "Register tenants and their primary domains")]
    Seed {
        #[arg(long, help = "YAML seed file (defaults to the built-in public/YPU/AIU set)")]
        file: Option<PathBuf>,
    },

    #[command(about = "List all tenants with their domains")]
    List,
}

pub async fn handle(cmd: TenantCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let db = Arc::new(DatabaseManager::new(config().database.clone()));
    let service = TenantService::new(db.clone());

    let result = match cmd {
        TenantCommands::Seed { file } => seed(&service, file, &output_format).await,
        TenantCommands::List => list(&service, &output_format).await,
    };

    db.close_all().await;
    result
}

async fn seed(service: &TenantService, file: Option<PathBuf>, output_format: &OutputFormat) -> anyhow::Result<()> {
    let seeds = match file {
        Some(path) => TenantService::load_seeds(&path)?,
        None => TenantService::default_seeds(),
    };
    let report = service.seed(&seeds).await?;

    if let OutputFormat::Text = output_format {
        for code in &report.skipped {
            println!("- {} already registered", code);
        }
    }
    report_done(
        output_format,
        &format!("Created {} tenant(s), skipped {}", report.created.len(), report.skipped.len()),
        Some(json!({ "created": report.created, "skipped": report.skipped })),
    )
}

async fn list(service: &TenantService, output_format: &OutputFormat) -> anyhow::Result<()> {
    let tenants = service.list().await?;
    if tenants.is_empty() {
        return report_empty(output_format, "tenants", "No tenants registered");
    }

    match output_format {
        OutputFormat::Json => {
            print_json(&json!({ "tenants": tenants }))?;
        }
        OutputFormat::Text => {
            println!("{:<32} {:<12} {:<10} {:<8} DOMAINS", "NAME", "CODE", "SCHEMA", "ACTIVE");
            for tenant in &tenants {
                let domains: Vec<&str> = tenant["domains"]
                    .as_array()
                    .map(|hosts| hosts.iter().filter_map(Value::as_str).collect())
                    .unwrap_or_default();
                println!(
                    "{:<32} {:<12} {:<10} {:<8} {}",
                    tenant["name"].as_str().unwrap_or_default(),
                    tenant["university_code"].as_str().unwrap_or_default(),
                    tenant["schema_name"].as_str().unwrap_or_default(),
                    tenant["is_active"].as_bool().unwrap_or_default(),
                    domains.join(", ")
                );
            }
        }
    }
    Ok(())
}
