use crate::config::BurnsConfig;
use crate::core::http;
use crate::domain::model::{BurnRecord, BurnTotals, BurnsOutcome};
use crate::domain::ports::BurnsSource;
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

const SOURCE: &str = "burn indexer";

/// Queries the indexer for recent deposits into the burn address.
///
/// Without an API key (or burn address) it reports
/// [`BurnsOutcome::Disabled`] and never touches the network.
pub struct BurnsFetcher {
    client: Client,
    config: BurnsConfig,
}

impl BurnsFetcher {
    pub fn new(client: Client, config: BurnsConfig) -> Self {
        Self { client, config }
    }

    fn disabled(&self) -> BurnsOutcome {
        BurnsOutcome::Disabled {
            fallback_url: self.config.fallback_url.clone(),
        }
    }
}

#[async_trait]
impl BurnsSource for BurnsFetcher {
    async fn fetch_burns(&self, limit: usize) -> Result<BurnsOutcome> {
        let Some(api_key) = self.config.api_key() else {
            tracing::info!("🔕 No indexer API key configured, burns lookup disabled");
            return Ok(self.disabled());
        };
        let Some(address) = self.config.burn_address() else {
            tracing::warn!("Indexer API key set without a burn address, burns lookup disabled");
            return Ok(self.disabled());
        };

        let url = format!(
            "{}/v0/addresses/{}/transactions",
            self.config.base_url.trim_end_matches('/'),
            address
        );
        tracing::info!("🔥 Fetching burn transactions for {}", address);
        tracing::debug!("Indexer request: {} (page size {})", url, self.config.page_size);

        let request = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .query(&[("limit", self.config.page_size)]);

        let payload = http::get_json(request, SOURCE).await?;
        let records = parse_burn_transactions(&payload, address)?;
        tracing::info!("✅ Found {} burn records", records.len());

        Ok(recent_burns(records, limit, Utc::now()))
    }
}

/// Totals over the whole page, then keep the newest `limit` records.
pub fn recent_burns(
    mut records: Vec<BurnRecord>,
    limit: usize,
    now: DateTime<Utc>,
) -> BurnsOutcome {
    let totals = BurnTotals::from_records(&records, now);

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records.truncate(limit);

    BurnsOutcome::Records { records, totals }
}

/// Map an enhanced-transaction list into burn records (unsorted).
///
/// Only token transfers whose destination is `address` count; the inbound
/// amounts of one transaction are summed into a single record.
pub fn parse_burn_transactions(payload: &Value, address: &str) -> Result<Vec<BurnRecord>> {
    let transactions = payload
        .as_array()
        .ok_or_else(|| BotError::parse(SOURCE, "expected a JSON array of transactions"))?;

    let mut records = Vec::new();

    for tx in transactions {
        let Some(signature) = tx.get("signature").and_then(Value::as_str) else {
            continue;
        };

        let seconds = tx
            .get("timestamp")
            .and_then(Value::as_i64)
            .or_else(|| tx.get("blockTime").and_then(Value::as_i64));
        let Some(timestamp) = seconds.and_then(|s| DateTime::from_timestamp(s, 0)) else {
            tracing::debug!("Skipping transaction {} without timestamp", signature);
            continue;
        };

        let amount: Decimal = token_transfers(tx)
            .iter()
            .filter(|transfer| destination(transfer) == Some(address))
            .filter_map(transfer_amount)
            .filter(|amount| amount.is_sign_positive() && !amount.is_zero())
            .sum();

        if amount.is_zero() {
            continue;
        }

        records.push(BurnRecord {
            timestamp,
            amount,
            transaction_reference: signature.to_string(),
        });
    }

    Ok(records)
}

/// 轉帳清單可能在頂層或 `events` 底下
fn token_transfers(tx: &Value) -> &[Value] {
    let top_level = tx
        .get("tokenTransfers")
        .and_then(Value::as_array)
        .filter(|transfers| !transfers.is_empty());

    top_level
        .or_else(|| {
            tx.get("events")
                .and_then(|events| events.get("tokenTransfers"))
                .and_then(Value::as_array)
        })
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn destination(transfer: &Value) -> Option<&str> {
    transfer
        .get("toUserAccount")
        .or_else(|| transfer.get("to"))
        .and_then(Value::as_str)
        .map(str::trim)
}

/// `tokenAmount` is already scaled; otherwise `amount` is raw units with
/// `decimals` places.
fn transfer_amount(transfer: &Value) -> Option<Decimal> {
    if let Some(amount) = transfer.get("tokenAmount").and_then(json_decimal) {
        return Some(amount);
    }

    let raw = transfer.get("amount")?;
    match transfer.get("decimals").and_then(Value::as_u64) {
        Some(decimals) if decimals > 0 && decimals <= 28 => {
            let units = raw
                .as_i64()
                .map(i128::from)
                .or_else(|| raw.as_str().and_then(|s| s.trim().parse::<i128>().ok()))?;
            // 超過 96 bits 的數量無法表示，略過而非 panic
            Decimal::try_from_i128_with_scale(units, decimals as u32).ok()
        }
        _ => json_decimal(raw),
    }
}

fn json_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}
