use anyhow::{bail, Context as _, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use super::OutputConfig;
use crate::config::Config;
use crate::llm::AnswerClient;
use crate::query::{build_context, load_extractor, Context};
use crate::storage::StatsStore;

#[derive(Args)]
pub struct AskArgs {
    /// The question, in Korean
    question: String,

    /// Project directory (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Print the grounding context without calling the answering model
    #[arg(long)]
    context_only: bool,
}

#[derive(Serialize)]
struct AskOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<&'a str>,
    #[serde(flatten)]
    context: &'a Context,
}

pub async fn run(args: AskArgs, output: OutputConfig) -> Result<()> {
    if args.question.trim().is_empty() {
        bail!("Question must not be empty");
    }

    // Thin-client mode: proxy through remote server
    if let Some(ref server_url) = output.server {
        return run_remote(&args, &output, server_url).await;
    }

    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Invalid path: {}", args.path.display()))?;

    let config_path = Config::config_path(&root);
    if !config_path.exists() {
        bail!(
            "parlbot not initialized in {}. Run `parlbot init` first.",
            root.display()
        );
    }
    let config = Config::load(&config_path)?;

    let started = Instant::now();
    let extractor = load_extractor(&config, &root);
    let context = build_context(
        &extractor,
        || StatsStore::open(&config.members_db_path(&root), &config.parties_db_path(&root)),
        &args.question,
        config.context.max_rows,
    );

    if let Some(fault) = context.fault() {
        if !output.quiet && !output.json {
            eprintln!("{} Storage fault: {}", "!".yellow(), fault);
        }
    }

    let answer = if args.context_only {
        None
    } else {
        let client = AnswerClient::new(&config.llm)?;
        Some(client.answer(&context).await)
    };

    crate::metrics::emit(
        &root,
        &crate::metrics::event(
            "cli",
            &context,
            answer.as_ref().is_some_and(|a| a.called_model),
            started.elapsed().as_millis() as u64,
        ),
    );

    let answer_text = answer.as_ref().map(|a| a.text.as_str());
    if output.json {
        let json_output = AskOutput {
            answer: answer_text,
            context: &context,
        };
        println!("{}", serde_json::to_string_pretty(&json_output)?);
        return Ok(());
    }

    if output.verbose && !output.quiet {
        print_context_summary(&context);
    }

    match answer_text {
        Some(text) => println!("{}", text),
        None if context.is_empty() => {
            if !output.quiet {
                println!("{} No matching rows", "!".yellow());
            }
        }
        None => println!("{}", context.render()),
    }

    Ok(())
}

fn print_context_summary(context: &Context) {
    println!("  Intent:    {}", context.intent.kind().cyan());
    println!("  Rows:      {}", context.data.row_count());
    for table in context.data.tables() {
        let labels: Vec<&str> = context.data.get(table).iter().map(|r| r.label()).collect();
        println!("    {}: {}", table.to_string().blue(), labels.join(", "));
    }
    if context.truncated {
        println!(
            "  {} {} rows omitted",
            "Truncated:".yellow(),
            context.omitted_rows
        );
    }
    println!();
}

/// Run ask via remote HTTP server (thin-client mode).
async fn run_remote(args: &AskArgs, output: &OutputConfig, server_url: &str) -> Result<()> {
    use crate::http::client::Client;

    let client = Client::new(server_url);
    let resp = client.ask(&args.question, args.context_only).await?;

    if output.json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
    } else if let Some(ref answer) = resp.answer {
        println!("{}", answer);
    } else {
        println!("{}", serde_json::to_string_pretty(&resp.data)?);
    }

    Ok(())
}
