use async_trait::async_trait;
use crate::{AnalysisError, FundamentalsRecord, HistoryPeriod, PriceSeries};

/// Source of prices and fundamentals for a symbol.
///
/// "No data" is an empty series or `AnalysisError::MissingData`; "partial data" is a
/// record with absent fields. Implementations do their own I/O; the scoring core never does.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn history(&self, symbol: &str, period: HistoryPeriod) -> Result<PriceSeries, AnalysisError>;

    async fn fundamentals(&self, symbol: &str) -> Result<FundamentalsRecord, AnalysisError>;
}
