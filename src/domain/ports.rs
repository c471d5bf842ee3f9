use crate::domain::model::{BurnsOutcome, EmissionsSnapshot, PriceQuote};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_prices(&self) -> Result<Vec<PriceQuote>>;
}

#[async_trait]
pub trait EmissionsSource: Send + Sync {
    /// Emissions for the current UTC calendar month.
    async fn fetch_emissions(&self) -> Result<EmissionsSnapshot>;
}

#[async_trait]
pub trait BurnsSource: Send + Sync {
    async fn fetch_burns(&self, limit: usize) -> Result<BurnsOutcome>;
}
