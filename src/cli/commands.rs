//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "careline")]
#[command(about = "Careline CLI for the medical intake chatbot and form extraction")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the configuration file (default: config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind (overrides the config file)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
        /// Enable permissive CORS
        #[arg(long)]
        cors: bool,
    },
    /// Run the intake dialogue interactively on the terminal
    Chat,
    /// OCR a form document and extract its fields as JSON
    Extract {
        /// Path to the document (PDF or image)
        file: PathBuf,
        /// Write the JSON result to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print fields with English keys instead of the form's Hebrew keys
        #[arg(long)]
        english: bool,
    },
    /// Search the knowledge base
    Search {
        /// Search query
        query: String,
        /// Maximum number of passages to return
        #[arg(short, long, default_value = "4")]
        limit: usize,
    },
    /// Show current configuration
    Config,
}
