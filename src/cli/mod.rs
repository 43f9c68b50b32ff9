pub mod commands;
pub mod utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Todo CLI - offline session token tooling")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Private key PEM (defaults to JWT_PRIVATE_KEY_PATH)")]
    pub private_key: Option<PathBuf>,

    #[arg(long, global = true, help = "Public key PEM (defaults to JWT_PUBLIC_KEY_PATH)")]
    pub public_key: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Issue and inspect session tokens")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
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

/// Key locations: command-line flags first, then the loaded configuration
#[derive(Debug, Clone)]
pub struct KeyPaths {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

impl KeyPaths {
    pub fn from_cli(cli: &Cli) -> Self {
        let jwt = &crate::config::config().jwt;
        Self {
            private_key: cli.private_key.clone().unwrap_or_else(|| jwt.private_key_path.clone()),
            public_key: cli.public_key.clone().unwrap_or_else(|| jwt.public_key_path.clone()),
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let keys = KeyPaths::from_cli(&cli);

    match cli.command {
        Commands::Token { cmd } => commands::token::handle(cmd, &keys, output_format).await,
    }
}
