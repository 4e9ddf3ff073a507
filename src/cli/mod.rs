pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "categories")]
#[command(about = "Category CLI - seed and check hierarchical category files")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create every category tree in a JSON or YAML file")]
    Seed {
        #[arg(help = "File holding one category tree or an array of them")]
        file: PathBuf,
        #[arg(long, help = "Collection override (defaults to DATABASE_COLLECTION)")]
        collection: Option<String>,
    },

    #[command(about = "Build category trees offline and report their shape")]
    Validate {
        #[arg(help = "File holding one category tree or an array of them")]
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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
        Commands::Seed { file, collection } => {
            commands::seed::handle(file, collection, output_format).await
        }
        Commands::Validate { file } => commands::validate::handle(file, output_format),
    }
}
