pub mod toml_config;

pub use toml_config::{
    BotConfig, BreakdownShare, BurnsConfig, EmissionsConfig, EpochConfig, HttpConfig,
    PricingConfig, TelegramConfig,
};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "bme-bot")]
#[command(about = "Telegram bot answering BME pricing, emissions and burn queries")]
pub struct CliArgs {
    #[arg(long, short, default_value = "bme-bot.toml", env = "BME_BOT_CONFIG")]
    pub config: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}
