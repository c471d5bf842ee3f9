pub mod burns_fetcher;
pub mod emissions_fetcher;
pub mod price_fetcher;

pub use burns_fetcher::BurnsFetcher;
pub use emissions_fetcher::EmissionsFetcher;
pub use price_fetcher::PriceFetcher;
