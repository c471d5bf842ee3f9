//! Reply text for every command outcome.
//!
//! All functions are pure and total: any input, including empty lists and
//! the disabled / not-yet-published cases, yields a non-empty message.

use crate::domain::model::{BurnsOutcome, EmissionsSnapshot, PriceQuote};
use crate::utils::error::{BotError, ErrorCategory};
use crate::utils::number::format_grouped;
use rust_decimal::Decimal;

pub const TOKEN_SYMBOL: &str = "RENDER";

const PRICE_HEADERS: [&str; 3] = ["Tier", "EUR / 200", "EUR / unit"];

/// Help text returned by `/start` and `/help`.
pub const fn help_text() -> &'static str {
    "📋 Commands\n\n\
    /price - 💶 Current compute pricing tiers\n\
    /emissions - 📅 This month's scheduled emissions\n\
    /burns - 🔥 Recent token burns\n\
    /next_epoch - ⏳ Epoch schedule link\n\
    /help - ℹ️ Show this message"
}

fn price_text(value: Decimal) -> String {
    let places = value.normalize().scale().clamp(2, 4);
    format_grouped(value, places)
}

pub fn format_prices(quotes: &[PriceQuote]) -> String {
    if quotes.is_empty() {
        return "💶 No pricing tiers are currently listed.".to_string();
    }

    let rows: Vec<[String; 3]> = quotes
        .iter()
        .map(|q| {
            [
                q.tier_name.clone(),
                price_text(q.eur_per_200_units),
                price_text(q.eur_per_unit),
            ]
        })
        .collect();

    let mut widths = PRICE_HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = vec!["💶 Compute pricing".to_string(), String::new()];
    lines.push(format!(
        "{:<w0$}  {:>w1$}  {:>w2$}",
        PRICE_HEADERS[0],
        PRICE_HEADERS[1],
        PRICE_HEADERS[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2]
    ));
    for [tier, per_block, per_unit] in &rows {
        lines.push(format!(
            "{:<w0$}  {:>w1$}  {:>w2$}",
            tier,
            per_block,
            per_unit,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2]
        ));
    }

    lines.join("\n")
}

pub fn format_emissions(snapshot: &EmissionsSnapshot) -> String {
    let summary = format!(
        "📅 Emissions for {}: {} {}",
        snapshot.month,
        format_grouped(snapshot.scheduled_total, 2),
        TOKEN_SYMBOL
    );

    if snapshot.breakdown.is_empty() {
        return summary;
    }

    let mut lines = vec![summary, String::new()];
    for entry in &snapshot.breakdown {
        let share = if snapshot.scheduled_total.is_zero() {
            String::new()
        } else {
            let percent = entry.amount / snapshot.scheduled_total * Decimal::ONE_HUNDRED;
            format!(" ({}%)", format_grouped(percent, 2))
        };
        lines.push(format!(
            "• {}: {} {}{}",
            entry.category,
            format_grouped(entry.amount, 2),
            TOKEN_SYMBOL,
            share
        ));
    }

    lines.join("\n")
}

pub fn format_burns(outcome: &BurnsOutcome, explorer_tx_url: &str) -> String {
    let (records, totals) = match outcome {
        BurnsOutcome::Disabled { fallback_url } => {
            return format!(
                "🔥 Live burn tracking is not enabled on this bot.\nSee recent burns here: {}",
                fallback_url
            );
        }
        BurnsOutcome::Records { records, totals } => (records, totals),
    };

    if records.is_empty() {
        return "🔥 No recent burns found for the burn address.".to_string();
    }

    let mut lines = vec![format!("🔥 Last {} burns", records.len()), String::new()];
    for record in records {
        lines.push(format!(
            "• {} {} · {}",
            format_grouped(record.amount, 2),
            TOKEN_SYMBOL,
            record.timestamp.format("%Y-%m-%d %H:%M UTC")
        ));
        lines.push(format!("  🔗 {}{}", explorer_tx_url, record.transaction_reference));
    }

    lines.push(String::new());
    lines.push(format!("📊 24 hours: {} {}", format_grouped(totals.last_24h, 2), TOKEN_SYMBOL));
    lines.push(format!("📊 7 days: {} {}", format_grouped(totals.last_7d, 2), TOKEN_SYMBOL));
    lines.push(format!("📊 30 days: {} {}", format_grouped(totals.last_30d, 2), TOKEN_SYMBOL));

    lines.join("\n")
}

pub fn format_next_epoch(link: &str) -> String {
    format!("⏳ Epoch timing is not tracked by this bot yet.\nSee the schedule: {}", link)
}

/// User-facing text for a failed command. Never includes the error chain.
pub fn format_error(error: &BotError) -> String {
    match error.category() {
        ErrorCategory::Fetch if error.is_unauthorized() => {
            "⚠️ The data provider rejected our credentials. Please let the bot admin know."
                .to_string()
        }
        ErrorCategory::Fetch => {
            "⚠️ Couldn't reach the data source right now. Please try again in a moment.".to_string()
        }
        ErrorCategory::Parse => {
            "⚠️ The data source changed its format and couldn't be read. The bot admin has been notified in the logs."
                .to_string()
        }
        ErrorCategory::NotYetPublished => match error {
            BotError::NotYetPublished { month } => format!(
                "📅 The emission schedule for {} hasn't been published yet. Check back later.",
                month
            ),
            _ => "📅 This data hasn't been published yet. Check back later.".to_string(),
        },
        ErrorCategory::Config => "⚙️ This command isn't configured correctly on the bot.".to_string(),
        ErrorCategory::System => "⚠️ Something went wrong while handling the command.".to_string(),
    }
}
