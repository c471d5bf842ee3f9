//! Telegram long-polling transport for the command router.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::BotCommand as MenuCommand;
use tracing::{error, info, warn};

use crate::core::router::{bot_commands, CommandRouter};
use crate::domain::ports::{BurnsSource, EmissionsSource, PriceSource};

/// Listen for messages until the process is interrupted. Each message is
/// answered independently; a failed send is logged and dropped.
pub async fn run_polling<P, E, B>(bot_token: &str, router: Arc<CommandRouter<P, E, B>>)
where
    P: PriceSource + 'static,
    E: EmissionsSource + 'static,
    B: BurnsSource + 'static,
{
    let bot = Bot::new(bot_token);

    // Register commands with Telegram so they appear in the "/" menu
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "Failed to register bot commands with Telegram");
    }

    info!("🤖 Telegram command listener started");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let router = Arc::clone(&router);
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };

            if let Some(reply) = router.handle_message(text).await {
                if let Err(e) = bot.send_message(msg.chat.id, reply).await {
                    error!(error = %e, chat_id = msg.chat.id.0, "Failed to send command reply");
                }
            }

            respond(())
        }
    })
    .await;

    warn!("Telegram command listener stopped");
}

async fn register_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<MenuCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| MenuCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}
