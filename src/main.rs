use bme_bot::adapters::telegram;
use bme_bot::utils::{logger, validation::Validate};
use bme_bot::{BotConfig, CliArgs, LiveRouter};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_logger(args.verbose, args.json_logs);

    tracing::info!("Starting bme-bot");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match BotConfig::load(&args.config).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let bot_token = match config.bot_token() {
        Ok(token) => token.to_string(),
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if config.burns.api_key().is_none() {
        tracing::info!("🔕 /burns will reply with the fallback link (no indexer API key)");
    }

    let router = Arc::new(LiveRouter::from_config(&config)?);
    telegram::run_polling(&bot_token, router).await;

    tracing::info!("bme-bot stopped");
    Ok(())
}
