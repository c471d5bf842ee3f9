//! Run one bot command against the live sources and print the reply.
//!
//! ```text
//! bme-query --config bme-bot.toml price
//! bme-query /emissions
//! ```

use anyhow::Context;
use bme_bot::core::router::parse_command;
use bme_bot::utils::{logger, validation::Validate};
use bme_bot::{BotConfig, LiveRouter};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "bme-query")]
#[command(about = "Answer a single bot command on stdout")]
struct QueryArgs {
    /// Command to run, with or without the leading slash (e.g. `price`)
    command: String,

    #[arg(long, short, default_value = "bme-bot.toml", env = "BME_BOT_CONFIG")]
    config: String,

    #[arg(long, help = "Enable verbose output")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = QueryArgs::parse();
    logger::init_cli_logger(args.verbose);

    let config = BotConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config))?;
    config.validate().context("validating configuration")?;

    let text = if args.command.starts_with('/') {
        args.command.clone()
    } else {
        format!("/{}", args.command)
    };

    let command = match parse_command(&text) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("{}", bme_bot::core::formatter::help_text());
            std::process::exit(2);
        }
    };

    let router = LiveRouter::from_config(&config)?;
    println!("{}", router.execute(command).await);

    Ok(())
}
