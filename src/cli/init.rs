use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::OutputConfig;
use crate::config::Config;

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Overwrite existing configuration
    #[arg(long)]
    force: bool,
}

#[derive(Serialize)]
struct InitOutput {
    status: String,
    path: String,
    config: String,
    members_db: String,
    parties_db: String,
}

pub async fn run(args: InitArgs, output: OutputConfig) -> Result<()> {
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Invalid path: {}", args.path.display()))?;

    let data_dir = Config::data_dir(&root);
    let config_path = Config::config_path(&root);

    if config_path.exists() && !args.force {
        if output.json {
            let config = Config::load(&config_path)?;
            let json_output = InitOutput {
                status: "already_initialized".to_string(),
                path: data_dir.display().to_string(),
                config: config_path.display().to_string(),
                members_db: config.members_db_path(&root).display().to_string(),
                parties_db: config.parties_db_path(&root).display().to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&json_output)?);
        } else {
            bail!(
                "parlbot already initialized in {}. Use --force to reinitialize.",
                data_dir.display()
            );
        }
        return Ok(());
    }

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let config = Config::default();
    config.save(&config_path)?;

    if output.verbose && !output.quiet && !output.json {
        println!("  Creating config: {}", config_path.display());
    }

    let members_db = config.members_db_path(&root);
    let parties_db = config.parties_db_path(&root);
    let missing: Vec<_> = [&members_db, &parties_db]
        .into_iter()
        .filter(|p| !p.exists())
        .collect();
    for path in &missing {
        tracing::warn!("Ranking database not found yet: {}", path.display());
    }

    // Keep the question log out of version control
    let gitignore_path = root.join(".gitignore");
    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;
        if !content.contains(".parlbot") {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&gitignore_path)?;
            use std::io::Write;
            writeln!(file, "\n# parlbot data\n.parlbot/")?;

            if output.verbose && !output.quiet && !output.json {
                println!("  Updated .gitignore");
            }
        }
    }

    if output.json {
        let json_output = InitOutput {
            status: "initialized".to_string(),
            path: data_dir.display().to_string(),
            config: config_path.display().to_string(),
            members_db: members_db.display().to_string(),
            parties_db: parties_db.display().to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
    } else if !output.quiet {
        println!(
            "{} parlbot initialized in {}",
            "✓".green(),
            data_dir.display()
        );
        println!("  Config:     {}", config_path.display());
        println!("  Members DB: {}", members_db.display());
        println!("  Parties DB: {}", parties_db.display());
        if !missing.is_empty() {
            println!(
                "\n{} Ranking databases not found. Copy them in or set [storage] paths in the config.",
                "!".yellow()
            );
        }
        println!("\nNext steps:");
        println!("  {} to ask a question", "parlbot ask \"국힘 의원수는?\"".cyan());
        println!("  {} to run the HTTP server", "parlbot serve".cyan());
    }

    Ok(())
}
