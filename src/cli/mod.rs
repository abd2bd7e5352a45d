pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "unierp")]
#[command(about = "University ERP operator CLI - server, tokens and tenant registry")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve,

    #[command(about = "Check a running server")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Mint a bearer token with the configured secret")]
    Token {
        #[arg(long, help = "Username carried in the token")]
        username: String,
        #[arg(long, help = "User id (random when omitted)")]
        user_id: Option<uuid::Uuid>,
    },

    #[command(about = "Tenant registry management")]
    Tenant {
        #[command(subcommand)]
        cmd: commands::tenant::TenantCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve => crate::app::serve(crate::config::config().clone()).await,
        Commands::Server { cmd } => commands::server::handle(cmd, output_format).await,
        Commands::Token { username, user_id } => commands::token::handle(username, user_id, output_format),
        Commands::Tenant { cmd } => commands::tenant::handle(cmd, output_format).await,
    }
}
