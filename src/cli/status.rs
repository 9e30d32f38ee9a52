use anyhow::Context;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::OutputConfig;
use crate::config::Config;
use crate::query::load_extractor;
use crate::storage::{StatsSource, StatsStore};
use crate::types::TableCounts;

#[derive(Args)]
pub struct StatusArgs {
    /// Directory to check status in (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,
}

#[derive(Serialize)]
struct StatusOutput {
    status: String,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tables: Option<TableCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lexicon: Option<LexiconOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    questions_logged: Option<usize>,
}

#[derive(Serialize)]
struct LexiconOutput {
    members: usize,
    parties: usize,
    aliases: usize,
}

pub async fn run(args: StatusArgs, output: OutputConfig) -> Result<()> {
    // Thin-client mode: proxy through remote server
    if let Some(ref server_url) = output.server {
        return run_remote(&output, server_url).await;
    }

    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Invalid path: {}", args.path.display()))?;

    let config_path = Config::config_path(&root);

    if !config_path.exists() {
        if output.json {
            let json_output = StatusOutput {
                status: "not_initialized".to_string(),
                path: root.display().to_string(),
                tables: None,
                error: None,
                lexicon: None,
                questions_logged: None,
            };
            println!("{}", serde_json::to_string_pretty(&json_output)?);
        } else if !output.quiet {
            println!(
                "{} parlbot not initialized in {}",
                "!".yellow(),
                root.display()
            );
            println!("Run `parlbot init` to initialize.");
        }
        return Ok(());
    }

    let config = Config::load(&config_path)?;
    let counts = StatsStore::open(&config.members_db_path(&root), &config.parties_db_path(&root))
        .and_then(|store| store.table_counts());
    let extractor = load_extractor(&config, &root);
    let lexicon = LexiconOutput {
        members: extractor.member_count(),
        parties: extractor.parties().len(),
        aliases: extractor.aliases().len(),
    };
    let questions_logged = crate::metrics::read_all(&root).len();

    let (status, tables, error) = match counts {
        Ok(c) => ("ready", Some(c), None),
        Err(e) => ("degraded", None, Some(format!("{e:#}"))),
    };

    if output.json {
        let json_output = StatusOutput {
            status: status.to_string(),
            path: Config::data_dir(&root).display().to_string(),
            tables,
            error,
            lexicon: Some(lexicon),
            questions_logged: Some(questions_logged),
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
    } else if !output.quiet {
        println!("{} parlbot status for {}", "✓".green(), root.display());
        println!();
        match (&tables, &error) {
            (Some(t), _) => {
                println!("  Status:           {}", "Ready".green());
                println!("  Members:          {}", t.members.to_string().cyan());
                println!("  Party scores:     {}", t.party_score.to_string().cyan());
                println!("  Party statistics: {}", t.party_statistics.to_string().cyan());
            }
            (None, Some(e)) => {
                println!("  Status:           {}", "Degraded".yellow());
                println!("  Error:            {}", e);
            }
            (None, None) => {}
        }
        println!(
            "  Lexicon:          {} members, {} parties, {} aliases",
            lexicon.members, lexicon.parties, lexicon.aliases
        );
        println!("  Questions logged: {}", questions_logged);
        if output.verbose {
            println!("  Model:            {}", config.llm.model);
            let key = if config.llm.resolve_api_key().is_some() {
                "configured".green()
            } else {
                "missing".red()
            };
            println!("  API key:          {}", key);
        }
    }

    Ok(())
}

/// Run status via remote HTTP server (thin-client mode).
async fn run_remote(output: &OutputConfig, server_url: &str) -> Result<()> {
    use crate::http::client::Client;

    let client = Client::new(server_url);
    let resp = client.status().await?;

    if output.json {
        let json_output = StatusOutput {
            status: resp.status,
            path: server_url.to_string(),
            tables: resp.tables,
            error: resp.error,
            lexicon: Some(LexiconOutput {
                members: resp.lexicon.members,
                parties: resp.lexicon.parties,
                aliases: resp.lexicon.aliases,
            }),
            questions_logged: None,
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
    } else if !output.quiet {
        println!("{} parlbot status via {}", "✓".green(), server_url);
        println!();
        println!("  Status:           {}", resp.status.green());
        if let Some(t) = resp.tables {
            println!("  Members:          {}", t.members.to_string().cyan());
            println!("  Party scores:     {}", t.party_score.to_string().cyan());
            println!("  Party statistics: {}", t.party_statistics.to_string().cyan());
        }
        if let Some(e) = resp.error {
            println!("  Error:            {}", e);
        }
        println!(
            "  Lexicon:          {} members, {} parties, {} aliases",
            resp.lexicon.members, resp.lexicon.parties, resp.lexicon.aliases
        );
        println!("  Model:            {}", resp.model);
    }

    Ok(())
}
