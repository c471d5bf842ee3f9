pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use app::fetchers::{BurnsFetcher, EmissionsFetcher, PriceFetcher};
pub use config::BotConfig;
pub use crate::core::router::{BotCommand, CommandRouter, LiveRouter, RouterSettings};
pub use utils::error::{BotError, Result};
