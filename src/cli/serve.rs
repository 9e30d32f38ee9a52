use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::OutputConfig;

#[derive(Args)]
pub struct ServeArgs {
    /// Project directory to serve (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// HTTP server port (default: `[server] port` from config, 8000)
    #[arg(long)]
    port: Option<u16>,
}

pub async fn run(args: ServeArgs, output: OutputConfig) -> Result<()> {
    let root = args
        .path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("Invalid path: {}", e))?;

    if output.server.is_some() {
        anyhow::bail!("--server cannot be used with `serve`");
    }

    crate::http::run_server(root, args.port).await
}
