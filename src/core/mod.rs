pub mod formatter;
pub mod http;
pub mod router;

pub use crate::domain::model::{
    BreakdownEntry, BurnRecord, BurnTotals, BurnsOutcome, EmissionsSnapshot, PriceQuote,
};
pub use crate::domain::ports::{BurnsSource, EmissionsSource, PriceSource};
pub use crate::utils::error::Result;
