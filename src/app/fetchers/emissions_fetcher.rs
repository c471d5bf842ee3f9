use crate::config::{BreakdownShare, EmissionsConfig};
use crate::core::http;
use crate::domain::model::{BreakdownEntry, EmissionsSnapshot};
use crate::domain::ports::EmissionsSource;
use crate::utils::error::{BotError, Result};
use crate::utils::number::parse_locale_decimal;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use reqwest::Client;
use rust_decimal::Decimal;

const SOURCE: &str = "emissions sheet";

/// Reads the published emission schedule (CSV export of a spreadsheet).
pub struct EmissionsFetcher {
    client: Client,
    config: EmissionsConfig,
}

impl EmissionsFetcher {
    pub fn new(client: Client, config: EmissionsConfig) -> Self {
        Self { client, config }
    }

    /// Same as [`EmissionsSource::fetch_emissions`] for an explicit month.
    pub async fn fetch_emissions_for(&self, month: NaiveDate) -> Result<EmissionsSnapshot> {
        tracing::info!(
            "📅 Fetching emission schedule for {} from {}",
            month.format("%Y-%m"),
            self.config.csv_url
        );

        let csv_text = http::get_text(self.client.get(&self.config.csv_url), SOURCE).await?;
        let snapshot = parse_emissions_csv(&csv_text, month, &self.config.breakdown)?;

        tracing::info!(
            "✅ Emission schedule for {}: total {} across {} categories",
            snapshot.month,
            snapshot.scheduled_total,
            snapshot.breakdown.len()
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl EmissionsSource for EmissionsFetcher {
    async fn fetch_emissions(&self) -> Result<EmissionsSnapshot> {
        self.fetch_emissions_for(Utc::now().date_naive()).await
    }
}

/// 表頭欄位配置
struct SheetLayout {
    total_col: Option<usize>,
    total_header: Option<String>,
    categories: Vec<(usize, String)>,
}

impl SheetLayout {
    fn from_header(header: &StringRecord) -> Self {
        let total_col = header
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, name)| name.to_lowercase().contains("total"))
            .map(|(idx, _)| idx);

        let categories = header
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(idx, name)| Some(*idx) != total_col && !name.is_empty())
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();

        Self {
            total_col,
            total_header: total_col.and_then(|idx| header.get(idx)).map(str::to_string),
            categories,
        }
    }
}

/// Extract the snapshot for `month` from a schedule CSV.
///
/// The header row is the first row, before any month row, naming a "month"
/// or "total" column; without one, the first such row with at least two
/// non-empty cells. Title and metadata rows above it are ignored.
pub fn parse_emissions_csv(
    csv_text: &str,
    month: NaiveDate,
    shares: &[BreakdownShare],
) -> Result<EmissionsSnapshot> {
    let month_label = month.format("%B %Y").to_string();
    let target = (month.year(), month.month());

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(csv_text.as_bytes());

    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, csv::Error>>()?;

    let header_idx = find_header_row(&rows);
    let layout = header_idx.map(|idx| SheetLayout::from_header(&rows[idx]));
    let target_row = header_idx.and_then(|idx| {
        rows[idx + 1..]
            .iter()
            .find(|row| parse_month_label(row.get(0).unwrap_or_default()) == Some(target))
    });

    let layout = layout.ok_or_else(|| BotError::parse(SOURCE, "header row not found"))?;
    if layout.total_col.is_none() && layout.categories.is_empty() {
        return Err(BotError::parse(SOURCE, "no emission columns in header"));
    }

    let row = target_row.ok_or_else(|| BotError::NotYetPublished {
        month: month_label.clone(),
    })?;

    let total = match layout.total_col {
        Some(idx) => match read_amount(&row, idx)? {
            Some(total) => Some(total),
            None => {
                return Err(BotError::NotYetPublished { month: month_label });
            }
        },
        None => None,
    };

    let mut sheet_breakdown = Vec::with_capacity(layout.categories.len());
    let mut any_filled = false;
    for (idx, category) in &layout.categories {
        let amount = read_amount(&row, *idx)?;
        any_filled |= amount.is_some();
        sheet_breakdown.push(BreakdownEntry {
            category: category.clone(),
            amount: amount.unwrap_or(Decimal::ZERO),
        });
    }

    let snapshot = match total {
        Some(total) if sheet_breakdown.is_empty() => {
            let breakdown = if shares.is_empty() {
                vec![BreakdownEntry {
                    category: layout.total_header.unwrap_or_else(|| "Total".to_string()),
                    amount: total,
                }]
            } else {
                apply_shares(total, shares)
            };
            EmissionsSnapshot {
                month: month_label,
                scheduled_total: total,
                breakdown,
            }
        }
        Some(total) => EmissionsSnapshot {
            month: month_label,
            scheduled_total: total,
            breakdown: sheet_breakdown,
        },
        None if !any_filled => {
            return Err(BotError::NotYetPublished { month: month_label });
        }
        None => EmissionsSnapshot {
            month: month_label,
            scheduled_total: sheet_breakdown.iter().map(|e| e.amount).sum(),
            breakdown: sheet_breakdown,
        },
    };

    if !snapshot.is_balanced() {
        return Err(BotError::parse(
            SOURCE,
            format!(
                "breakdown sums to {} but scheduled total is {}",
                snapshot.breakdown_sum(),
                snapshot.scheduled_total
            ),
        ));
    }

    Ok(snapshot)
}

/// 表頭之前的列：遇到第一個月份列就停止
fn find_header_row(rows: &[StringRecord]) -> Option<usize> {
    let candidates: Vec<usize> = rows
        .iter()
        .take_while(|row| parse_month_label(row.get(0).unwrap_or_default()).is_none())
        .enumerate()
        .filter(|(_, row)| row.iter().filter(|c| !c.is_empty()).count() >= 2)
        .map(|(idx, _)| idx)
        .collect();

    candidates
        .iter()
        .copied()
        .find(|&idx| {
            rows[idx].iter().any(|cell| {
                let cell = cell.to_lowercase();
                cell == "month" || cell.contains("total")
            })
        })
        .or_else(|| candidates.first().copied())
}

/// 空白儲存格回傳 None，無法解析的內容視為格式錯誤
fn read_amount(row: &StringRecord, idx: usize) -> Result<Option<Decimal>> {
    let cell = row.get(idx).unwrap_or_default();
    if cell.is_empty() || cell == "-" {
        return Ok(None);
    }
    parse_locale_decimal(cell)
        .map(Some)
        .ok_or_else(|| BotError::parse(SOURCE, format!("unreadable amount '{}'", cell)))
}

/// Split `total` by fixed percentages. Each share is rounded to cents and the
/// last category absorbs the remainder, so the parts always add up exactly.
pub fn apply_shares(total: Decimal, shares: &[BreakdownShare]) -> Vec<BreakdownEntry> {
    let mut breakdown = Vec::with_capacity(shares.len());
    let mut allocated = Decimal::ZERO;

    for (i, share) in shares.iter().enumerate() {
        let amount = if i + 1 == shares.len() {
            total - allocated
        } else {
            (total * share.percent / Decimal::ONE_HUNDRED).round_dp(2)
        };
        allocated += amount;
        breakdown.push(BreakdownEntry {
            category: share.category.clone(),
            amount,
        });
    }

    breakdown
}

/// Recognise `October 2026`, `Oct 2026`, `Oct-2026`, `2026-10`, `10/2026`
/// and `2026/10`.
pub fn parse_month_label(label: &str) -> Option<(i32, u32)> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    let candidates = [
        (format!("01 {}", label.replace('-', " ")), "%d %B %Y"),
        (format!("{}-01", label), "%Y-%m-%d"),
        (format!("01/{}", label), "%d/%m/%Y"),
        (format!("{}/01", label), "%Y/%m/%d"),
    ];

    candidates
        .iter()
        .find_map(|(text, fmt)| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|date| (date.year(), date.month()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn october() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn shares() -> Vec<BreakdownShare> {
        vec![
            BreakdownShare {
                category: "Node operators".to_string(),
                percent: dec!(65),
            },
            BreakdownShare {
                category: "Creators".to_string(),
                percent: dec!(25),
            },
            BreakdownShare {
                category: "Ecosystem".to_string(),
                percent: dec!(10),
            },
        ]
    }

    #[test]
    fn test_parse_month_label() {
        assert_eq!(parse_month_label("October 2026"), Some((2026, 10)));
        assert_eq!(parse_month_label("oct 2026"), Some((2026, 10)));
        assert_eq!(parse_month_label("Oct-2026"), Some((2026, 10)));
        assert_eq!(parse_month_label("2026-10"), Some((2026, 10)));
        assert_eq!(parse_month_label("10/2026"), Some((2026, 10)));
        assert_eq!(parse_month_label("2026/10"), Some((2026, 10)));
        assert_eq!(parse_month_label("Month"), None);
        assert_eq!(parse_month_label(""), None);
    }

    #[test]
    fn test_apply_shares_absorbs_rounding() {
        let breakdown = apply_shares(dec!(1000000.01), &shares());
        let sum: Decimal = breakdown.iter().map(|e| e.amount).sum();

        assert_eq!(sum, dec!(1000000.01));
        assert_eq!(breakdown[0].amount, dec!(650000.01));
        assert_eq!(breakdown[1].amount, dec!(250000.00));
    }

    #[test]
    fn test_metadata_row_above_header_is_skipped() {
        let csv = "\
Last updated:,2026-10-01
Source:,Render Foundation
Month,Total,Node operators,Creators
October 2026,\"1,000,000\",\"650,000\",\"350,000\"
";
        let snapshot = parse_emissions_csv(csv, october(), &[]).unwrap();

        assert_eq!(snapshot.scheduled_total, dec!(1000000));
        let categories: Vec<&str> = snapshot.breakdown.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(categories, vec!["Node operators", "Creators"]);
    }

    #[test]
    fn test_header_without_known_names_falls_back_to_first_row() {
        let csv = "\
Period,Node operators,Creators
October 2026,650,350
";
        let snapshot = parse_emissions_csv(csv, october(), &[]).unwrap();

        assert_eq!(snapshot.scheduled_total, dec!(1000));
        assert_eq!(snapshot.breakdown.len(), 2);
    }

    #[test]
    fn test_sheet_with_category_columns() {
        let csv = "\
Render emission schedule,,,
Month,Total,Node operators,Creators
September 2026,\"1,000,000\",\"650,000\",\"350,000\"
October 2026,\"1,200,000.50\",\"780,000.25\",\"420,000.25\"
";
        let snapshot = parse_emissions_csv(csv, october(), &[]).unwrap();

        assert_eq!(snapshot.month, "October 2026");
        assert_eq!(snapshot.scheduled_total, dec!(1200000.50));
        assert_eq!(snapshot.breakdown.len(), 2);
        assert_eq!(snapshot.breakdown[0].category, "Node operators");
        assert!(snapshot.is_balanced());
    }

    #[test]
    fn test_total_only_sheet_uses_fixed_shares() {
        let csv = "Month,Scheduled total\n2026-10,\"500,000\"\n";
        let snapshot = parse_emissions_csv(csv, october(), &shares()).unwrap();

        assert_eq!(snapshot.scheduled_total, dec!(500000));
        assert_eq!(snapshot.breakdown.len(), 3);
        assert_eq!(snapshot.breakdown[2].amount, dec!(50000));
        assert!(snapshot.is_balanced());
    }

    #[test]
    fn test_blank_total_is_not_yet_published() {
        let csv = "Month,Total,Node operators\nOctober 2026,,\n";
        let result = parse_emissions_csv(csv, october(), &[]);
        assert!(matches!(result, Err(BotError::NotYetPublished { .. })));
    }

    #[test]
    fn test_inconsistent_sheet_is_parse_error() {
        let csv = "Month,Total,Node operators,Creators\nOctober 2026,1000,600,300\n";
        let result = parse_emissions_csv(csv, october(), &[]);
        assert!(matches!(result, Err(BotError::ParseError { .. })));
    }

    #[test]
    fn test_missing_total_column_sums_categories() {
        let csv = "Month,Node operators,Creators\nOctober 2026,600,400\n";
        let snapshot = parse_emissions_csv(csv, october(), &[]).unwrap();
        assert_eq!(snapshot.scheduled_total, dec!(1000));
    }
}
