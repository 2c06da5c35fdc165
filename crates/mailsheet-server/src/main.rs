//! Mailsheet CLI
//!
//! Starts the webhook server, or looks up the bot identity.

use anyhow::Context;
use clap::Parser;
use mailsheet_lark::LarkClient;
use mailsheet_server::cli::{Cli, Command, ServeArgs};
use mailsheet_server::config::{ServerConfig, ENV_BIND};
use mailsheet_server::start_server;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => {
            if let Some(bind) = args.bind {
                config
                    .apply_overrides(|key| (key == ENV_BIND).then(|| bind.clone()))
                    .context("invalid --bind")?;
            }
            if let Some(output) = args.output {
                config.sheet.output_path = output;
            }
            start_server(config).await?;
        }
        Command::BotInfo => {
            let client = LarkClient::new(config.lark)?;
            let bot = client.bot_info().await?;
            println!("Lark bot open_id: {}", bot.open_id);
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    config.apply_env()?;
    Ok(config)
}
