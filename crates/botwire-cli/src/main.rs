//! botwire CLI
//!
//! Thin command-line front end over `botwire-rpc`:
//! - `me`: show the bot account
//! - `send`: send a text message
//! - `call`: call any method with ad-hoc parameters
//! - `updates`: print pending updates

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use botwire_rpc::methods::SendMessage;
use botwire_rpc::{Bot, Config, ParameterBag};
use botwire_types::{ChatId, InputFile, ParseMode};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Bot API client
#[derive(Parser)]
#[command(name = "botwire")]
#[command(about = "Talk to the Bot API from the command line")]
#[command(version)]
#[command(after_help = "\
Examples:
  botwire me                                   Show the bot account
  botwire send @mychannel 'hello'              Send a text message
  botwire send 12345 '<b>hi</b>' --parse-mode html
  botwire call getChat chat_id=12345           Call any method
  botwire call sendDocument chat_id=12345 --file document=./report.pdf
  botwire updates --offset 100 --limit 10      Print pending updates

The token is read from the config file or BOTWIRE_TOKEN.
")]
struct Cli {
    /// Config file (default: <config dir>/botwire/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the bot account (getMe)
    Me,

    /// Send a text message
    Send {
        /// Chat id or @username
        chat: String,

        /// Message text
        text: String,

        /// Formatting: markdownv2, markdown or html
        #[arg(long)]
        parse_mode: Option<ParseMode>,
    },

    /// Call any method with KEY=VALUE parameters (values parsed as JSON when possible)
    Call {
        /// Method name, e.g. getChat
        method: String,

        /// Parameters as KEY=VALUE
        params: Vec<String>,

        /// File uploads as KEY=PATH
        #[arg(long = "file")]
        files: Vec<String>,
    },

    /// Print pending updates (getUpdates)
    Updates {
        #[arg(long)]
        offset: Option<i64>,

        #[arg(long)]
        limit: Option<i64>,
    },
}

fn setup_logging() {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "botwire={default_level},botwire_rpc={default_level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path.or_else(Config::default_path) {
        Some(path) => {
            debug!("Loading config from {}", path.display());
            Config::load(&path).with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => Config::default(),
    };
    Ok(config.apply_env())
}

/// Split `KEY=VALUE`.
fn split_pair(pair: &str) -> Result<(&str, &str)> {
    pair.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{pair}'"))
}

/// JSON when the text parses as JSON, a plain string otherwise.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn build_params(params: &[String], files: &[String]) -> Result<ParameterBag> {
    let mut bag = ParameterBag::new();
    for pair in params {
        let (key, value) = split_pair(pair)?;
        bag.insert(key, parse_value(value));
    }
    for pair in files {
        let (key, path) = split_pair(pair)?;
        bag.insert(key, InputFile::path(path));
    }
    Ok(bag)
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging();

    let config = load_config(cli.config)?;
    let transport = config
        .transport_config()
        .context("Cannot create client")?;
    let bot = Bot::new(transport).context("Cannot create HTTP client")?;

    match cli.command {
        Commands::Me => run_me(&bot).await,
        Commands::Send {
            chat,
            text,
            parse_mode,
        } => run_send(&bot, &chat, text, parse_mode).await,
        Commands::Call {
            method,
            params,
            files,
        } => run_call(&bot, &method, &params, &files).await,
        Commands::Updates { offset, limit } => run_updates(&bot, offset, limit).await,
    }
}

async fn run_me(bot: &Bot) -> Result<()> {
    let me = bot.get_me().await.context("getMe failed")?;
    print_json(&me)
}

async fn run_send(bot: &Bot, chat: &str, text: String, parse_mode: Option<ParseMode>) -> Result<()> {
    let Ok(chat_id) = chat.parse::<ChatId>();
    let mut op = SendMessage::new(chat_id, text);
    op.parse_mode = parse_mode;

    let sent = bot.execute(op).await.context("sendMessage failed")?;
    println!("Sent message {} to {}", sent.message_id, sent.chat.id);
    Ok(())
}

async fn run_call(bot: &Bot, method: &str, params: &[String], files: &[String]) -> Result<()> {
    let bag = build_params(params, files)?;
    let result = bot
        .call(method, bag)
        .await
        .with_context(|| format!("{method} failed"))?;
    print_json(&result)
}

async fn run_updates(bot: &Bot, offset: Option<i64>, limit: Option<i64>) -> Result<()> {
    let updates = bot
        .get_updates(offset, limit)
        .await
        .context("getUpdates failed")?;
    if updates.is_empty() {
        eprintln!("No pending updates");
        return Ok(());
    }
    print_json(&updates)
}
