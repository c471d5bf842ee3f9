use crate::config::PricingConfig;
use crate::core::http;
use crate::domain::model::PriceQuote;
use crate::domain::ports::PriceSource;
use crate::utils::error::{BotError, Result};
use crate::utils::number::parse_locale_decimal;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use scraper::{ElementRef, Html, Selector};

const SOURCE: &str = "pricing page";

/// 價格以每 200 單位報價
const UNITS_PER_BLOCK: Decimal = dec!(200);

/// 往上找標題時最多檢查幾層父節點
const HEADING_SEARCH_DEPTH: usize = 3;

/// Scrapes the official pricing page into one [`PriceQuote`] per tier row.
pub struct PriceFetcher {
    client: Client,
    config: PricingConfig,
}

impl PriceFetcher {
    pub fn new(client: Client, config: PricingConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl PriceSource for PriceFetcher {
    async fn fetch_prices(&self) -> Result<Vec<PriceQuote>> {
        tracing::info!("💶 Fetching pricing page: {}", self.config.url);

        let html = http::get_text(self.client.get(&self.config.url), SOURCE).await?;
        let quotes = parse_pricing_page(&html, self.config.table_marker.as_deref())?;

        tracing::info!("✅ Parsed {} pricing tiers", quotes.len());
        Ok(quotes)
    }
}

/// Locate the pricing table and turn each tier row into a [`PriceQuote`].
///
/// Fails with a parse error when no table matches or when the matching table
/// yields no tier rows, so a changed layout is never reported as "no tiers".
pub fn parse_pricing_page(html: &str, table_marker: Option<&str>) -> Result<Vec<PriceQuote>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;

    let table = find_pricing_table(&document, &table_sel, table_marker)
        .ok_or_else(|| BotError::parse(SOURCE, "pricing table not found"))?;

    let quotes: Vec<PriceQuote> = table
        .select(&row_sel)
        .filter(|row| owning_table(*row) == Some(table))
        .filter_map(|row| {
            let cells: Vec<String> = row_cells(row).map(element_text).collect();
            let quote = parse_price_row(&cells);
            if quote.is_none() {
                tracing::debug!("Skipping pricing row: {:?}", cells);
            }
            quote
        })
        .collect();

    if quotes.is_empty() {
        return Err(BotError::parse(SOURCE, "pricing table contains no tier rows"));
    }

    Ok(quotes)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| BotError::parse(SOURCE, format!("invalid selector '{}': {:?}", css, e)))
}

fn find_pricing_table<'a>(
    document: &'a Html,
    table_sel: &Selector,
    table_marker: Option<&str>,
) -> Option<ElementRef<'a>> {
    let Some(marker) = table_marker.map(str::trim).filter(|m| !m.is_empty()) else {
        return document.select(table_sel).next();
    };

    let needle = marker.to_lowercase();
    document.select(table_sel).find(|table| {
        element_text(*table).to_lowercase().contains(&needle)
            || preceding_heading(*table)
                .map(|heading| heading.to_lowercase().contains(&needle))
                .unwrap_or(false)
    })
}

/// Text of the nearest heading before the table, looking through a few
/// wrapper levels.
fn preceding_heading(table: ElementRef<'_>) -> Option<String> {
    let mut node = Some(*table);

    for _ in 0..HEADING_SEARCH_DEPTH {
        let current = node?;
        for sibling in current.prev_siblings() {
            if let Some(element) = ElementRef::wrap(sibling) {
                if is_heading(element.value().name()) {
                    return Some(element_text(element));
                }
            }
        }
        node = current.parent();
    }

    None
}

/// 巢狀表格的列屬於內層表格，不算方案
fn owning_table(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "table")
}

fn row_cells<'a>(row: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "th" | "td"))
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// 第一欄為方案名稱（可為純數字），其後前兩個數字欄位為價格
fn parse_price_row(cells: &[String]) -> Option<PriceQuote> {
    let (label, rest) = cells.split_first()?;
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    let numbers: Vec<Decimal> = rest
        .iter()
        .filter_map(|cell| parse_locale_decimal(cell))
        .collect();

    let eur_per_200_units = *numbers.first()?;
    let eur_per_unit = numbers
        .get(1)
        .copied()
        .unwrap_or_else(|| (eur_per_200_units / UNITS_PER_BLOCK).normalize());

    Some(PriceQuote {
        tier_name: label.to_string(),
        eur_per_200_units,
        eur_per_unit,
    })
}
