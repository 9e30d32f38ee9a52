mod ask;
mod init;
mod serve;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "parlbot")]
#[command(about = "Grounded Q&A over National Assembly member and party rankings")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Show detailed progress
    #[arg(long, global = true)]
    verbose: bool,

    /// Send requests to a running parlbot server instead of opening local databases
    #[arg(long, global = true, env = "PARLBOT_SERVER")]
    server: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration
    Init(init::InitArgs),

    /// Ask a question
    Ask(ask::AskArgs),

    /// Show database and lexicon status
    Status(status::StatusArgs),

    /// Run the HTTP server
    Serve(serve::ServeArgs),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let output = OutputConfig {
            json: self.json,
            quiet: self.quiet,
            verbose: self.verbose,
            server: self.server,
        };

        match self.command {
            Commands::Init(args) => init::run(args, output).await,
            Commands::Ask(args) => ask::run(args, output).await,
            Commands::Status(args) => status::run(args, output).await,
            Commands::Serve(args) => serve::run(args, output).await,
        }
    }
}

/// Output configuration passed to all commands
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub server: Option<String>,
}
