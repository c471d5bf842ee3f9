use crate::app::fetchers::{BurnsFetcher, EmissionsFetcher, PriceFetcher};
use crate::config::BotConfig;
use crate::core::formatter;
use crate::core::http;
use crate::domain::ports::{BurnsSource, EmissionsSource, PriceSource};
use crate::utils::error::{BotError, Result};

/// Chat commands the bot answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Price,
    Emissions,
    Burns,
    NextEpoch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    NotACommand,
    UnknownCommand(String),
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotACommand => write!(f, "message is not a command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command `{cmd}`"),
        }
    }
}

impl std::error::Error for CommandParseError {}

/// Parse a chat message into a command. `/price@SomeBot` is accepted;
/// trailing arguments are ignored.
pub fn parse_command(text: &str) -> std::result::Result<BotCommand, CommandParseError> {
    let Some(raw_command) = text.split_whitespace().next() else {
        return Err(CommandParseError::NotACommand);
    };
    if !raw_command.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    match command.to_lowercase().as_str() {
        "/start" => Ok(BotCommand::Start),
        "/help" => Ok(BotCommand::Help),
        "/price" => Ok(BotCommand::Price),
        "/emissions" => Ok(BotCommand::Emissions),
        "/burns" => Ok(BotCommand::Burns),
        "/next_epoch" => Ok(BotCommand::NextEpoch),
        _ => Err(CommandParseError::UnknownCommand(command.to_string())),
    }
}

/// Bot commands for the Telegram "/" menu.
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("price", "Current compute pricing tiers"),
        ("emissions", "This month's scheduled emissions"),
        ("burns", "Recent token burns"),
        ("next_epoch", "Epoch schedule link"),
        ("help", "List commands"),
    ]
}

/// 路由器需要的靜態設定
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub burn_limit: usize,
    pub explorer_tx_url: String,
    pub epoch_link: String,
}

impl RouterSettings {
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            burn_limit: config.burns.limit,
            explorer_tx_url: config.burns.explorer_tx_url.clone(),
            epoch_link: config.epoch.link.clone(),
        }
    }
}

/// Maps commands to sources and turns every outcome into reply text.
///
/// Holds no mutable state; share it behind an `Arc` across concurrent
/// handlers.
pub struct CommandRouter<P: PriceSource, E: EmissionsSource, B: BurnsSource> {
    prices: P,
    emissions: E,
    burns: B,
    settings: RouterSettings,
}

pub type LiveRouter = CommandRouter<PriceFetcher, EmissionsFetcher, BurnsFetcher>;

impl LiveRouter {
    /// Build the fetchers over one shared HTTP client.
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let client = http::build_client(&config.http)?;

        Ok(CommandRouter::new(
            PriceFetcher::new(client.clone(), config.pricing.clone()),
            EmissionsFetcher::new(client.clone(), config.emissions.clone()),
            BurnsFetcher::new(client, config.burns.clone()),
            RouterSettings::from_config(config),
        ))
    }
}

impl<P: PriceSource, E: EmissionsSource, B: BurnsSource> CommandRouter<P, E, B> {
    pub fn new(prices: P, emissions: E, burns: B, settings: RouterSettings) -> Self {
        Self {
            prices,
            emissions,
            burns,
            settings,
        }
    }

    /// Reply for a raw chat message, or `None` when it isn't a command.
    pub async fn handle_message(&self, text: &str) -> Option<String> {
        match parse_command(text) {
            Ok(command) => Some(self.execute(command).await),
            Err(CommandParseError::NotACommand) => None,
            Err(err) => {
                tracing::debug!("Rejected message: {}", err);
                Some(format!("❓ {}\n\n{}", capitalize(&err.to_string()), formatter::help_text()))
            }
        }
    }

    pub async fn execute(&self, command: BotCommand) -> String {
        tracing::info!("📨 Handling {:?}", command);

        let reply = match command {
            BotCommand::Start | BotCommand::Help => Ok(formatter::help_text().to_string()),
            BotCommand::NextEpoch => Ok(formatter::format_next_epoch(&self.settings.epoch_link)),
            BotCommand::Price => self
                .prices
                .fetch_prices()
                .await
                .map(|quotes| formatter::format_prices(&quotes)),
            BotCommand::Emissions => self
                .emissions
                .fetch_emissions()
                .await
                .map(|snapshot| formatter::format_emissions(&snapshot)),
            BotCommand::Burns => self
                .burns
                .fetch_burns(self.settings.burn_limit)
                .await
                .map(|outcome| formatter::format_burns(&outcome, &self.settings.explorer_tx_url)),
        };

        reply.unwrap_or_else(|e| self.failure_reply(command, &e))
    }

    fn failure_reply(&self, command: BotCommand, error: &BotError) -> String {
        tracing::warn!(
            "❌ {:?} failed: {} (Category: {:?})",
            command,
            error,
            error.category()
        );
        tracing::debug!("💡 Recovery suggestion: {}", error.recovery_suggestion());
        formatter::format_error(error)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
