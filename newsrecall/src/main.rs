/*
newsrecall - command-line front end to the newsletter memory.
Per-category commands go through the agent tool registry, so the output is
exactly what an agent would receive. Tool output goes to stdout, logs to stderr.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::Config;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newsrecall::agent_tools::{ToolRegistry, DEFAULT_LIST_LIMIT};
use newsrecall::extraction::extract_content;
use newsrecall::ingest::record_newsletter;
use newsrecall::memory::MemoryBank;

#[derive(Parser, Debug)]
#[command(name = "newsrecall", about = "Newsletter content memory: check, save and list used news, tools and facts")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override the memory directory
    #[arg(long, value_name = "DIR", global = true)]
    memory_dir: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Has this article URL already been used?
    CheckNews { url: String },
    /// Record an article URL as used
    SaveNews { url: String, title: String },
    /// Most recently used article URLs
    ListNews {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT, allow_negative_numbers = true)]
        limit: i64,
    },
    /// Has this tool already been presented? Checks by name, by URL, or both
    CheckTool {
        #[arg(required_unless_present = "url")]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
    },
    /// Record a tool as presented
    SaveTool {
        name: String,
        #[arg(long)]
        url: Option<String>,
    },
    /// Most recently presented tools
    ListTools {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT, allow_negative_numbers = true)]
        limit: i64,
    },
    /// Has this fun fact (or a similar one) already been told?
    CheckFact { summary: String },
    /// Record a fun fact as told
    SaveFact {
        summary: String,
        #[arg(long)]
        full: Option<String>,
    },
    /// Most recently told fun facts
    ListFacts {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT, allow_negative_numbers = true)]
        limit: i64,
    },
    /// Entry count and health of each memory file
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Record archived newsletter HTML files into memory
    Ingest {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
        /// Only report what would be saved
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the agent tool definitions as JSON
    Tools,
    /// Call an agent tool by name with JSON arguments
    Call {
        tool: String,
        #[arg(value_name = "JSON")]
        args: Option<String>,
    },
}

fn load_config(args: &Args) -> Result<Config> {
    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = &args.config {
        if !p.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p.clone())
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let mut config = Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref(),
    )?;

    if let Some(dir) = &args.memory_dir {
        config.memory.dir = Some(dir.to_string_lossy().to_string());
    }
    Ok(config)
}

fn main() -> Result<()> {
    // Parse CLI args
    let args = Args::parse();

    let config = load_config(&args).context("failed to load configuration")?;

    // Initialize logging: --log-level, then [logging] level, then info
    let level = args
        .log_level
        .as_deref()
        .or(config.log_level())
        .unwrap_or("info");
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!(memory_dir = %config.memory.dir().display(), "configuration loaded");

    let bank = Arc::new(MemoryBank::from_config(&config.memory));
    let registry = ToolRegistry::new(bank.clone());

    let result = run(args.command, &bank, &registry);
    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }
    result
}

fn run(command: Command, bank: &MemoryBank, registry: &ToolRegistry) -> Result<()> {
    match command {
        Command::CheckNews { url } => {
            print(registry.execute("check_news_url", json!({ "url": url }))?)
        }
        Command::SaveNews { url, title } => print(
            registry.execute("save_news_url", json!({ "url": url, "title": title }))?,
        ),
        Command::ListNews { limit } => {
            print(registry.execute("list_used_news_urls", json!({ "limit": limit }))?)
        }
        Command::CheckTool { name, url } => {
            if let Some(name) = name {
                print(registry.execute("check_tool", json!({ "tool_name": name }))?);
            }
            if let Some(url) = url {
                print(registry.execute("check_tool_url", json!({ "url": url }))?);
            }
        }
        Command::SaveTool { name, url } => print(registry.execute(
            "save_tool_url",
            json!({ "tool_name": name, "tool_url": url.unwrap_or_default() }),
        )?),
        Command::ListTools { limit } => {
            print(registry.execute("list_used_tools_urls", json!({ "limit": limit }))?)
        }
        Command::CheckFact { summary } => {
            print(registry.execute("check_fact", json!({ "fact_summary": summary }))?)
        }
        Command::SaveFact { summary, full } => print(registry.execute(
            "save_fact",
            json!({ "fact_summary": summary, "fact_full": full.unwrap_or_default() }),
        )?),
        Command::ListFacts { limit } => {
            print(registry.execute("list_used_facts", json!({ "limit": limit }))?)
        }
        Command::Status { json } => {
            let status = bank.status();
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                for line in &status {
                    println!("{}", line);
                }
            }
        }
        Command::Ingest { files, dry_run } => {
            for file in files {
                let html = std::fs::read_to_string(&file)
                    .with_context(|| format!("failed to read newsletter {}", file.display()))?;
                let content = extract_content(&html);
                let report = record_newsletter(bank, &content, dry_run)
                    .with_context(|| format!("failed to record newsletter {}", file.display()))?;
                println!("{}", file.display());
                for section in &report.sections {
                    println!("  {}", section);
                }
            }
        }
        Command::Tools => {
            println!("{}", serde_json::to_string_pretty(&registry.definitions())?);
        }
        Command::Call { tool, args } => {
            let input: Value = match args {
                Some(raw) => serde_json::from_str(&raw)
                    .with_context(|| format!("invalid JSON arguments for {}", tool))?,
                None => json!({}),
            };
            print(registry.execute(&tool, input)?);
        }
    }
    Ok(())
}

fn print(output: String) {
    println!("{}", output.trim_end());
}
