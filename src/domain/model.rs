use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// One row of the official compute pricing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub tier_name: String,
    pub eur_per_200_units: Decimal,
    pub eur_per_unit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub category: String,
    pub amount: Decimal,
}

/// Scheduled emissions for one calendar month.
///
/// `breakdown` amounts add up to `scheduled_total` within
/// [`EmissionsSnapshot::TOLERANCE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionsSnapshot {
    pub month: String,
    pub scheduled_total: Decimal,
    pub breakdown: Vec<BreakdownEntry>,
}

impl EmissionsSnapshot {
    pub const TOLERANCE: Decimal = dec!(0.01);

    pub fn breakdown_sum(&self) -> Decimal {
        self.breakdown.iter().map(|e| e.amount).sum()
    }

    pub fn is_balanced(&self) -> bool {
        (self.breakdown_sum() - self.scheduled_total).abs() <= Self::TOLERANCE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnRecord {
    pub timestamp: DateTime<Utc>,
    pub amount: Decimal,
    pub transaction_reference: String,
}

/// 燒毀查詢結果：有資料，或未設定 indexer 金鑰
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BurnsOutcome {
    /// `records` are newest first, at most the requested limit; `totals`
    /// cover every burn in the fetched page, not just the listed ones.
    Records {
        records: Vec<BurnRecord>,
        totals: BurnTotals,
    },
    Disabled { fallback_url: String },
}

/// Rolling sums over the fetched burn window.
///
/// Records timestamped after `now` are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BurnTotals {
    pub last_24h: Decimal,
    pub last_7d: Decimal,
    pub last_30d: Decimal,
}

impl BurnTotals {
    pub fn from_records(records: &[BurnRecord], now: DateTime<Utc>) -> Self {
        let mut totals = BurnTotals::default();
        for record in records {
            let age = now - record.timestamp;
            if age < Duration::zero() {
                continue;
            }
            if age <= Duration::hours(24) {
                totals.last_24h += record.amount;
            }
            if age <= Duration::days(7) {
                totals.last_7d += record.amount;
            }
            if age <= Duration::days(30) {
                totals.last_30d += record.amount;
            }
        }
        totals
    }
}
