use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// OHLCV bar data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Price history ordered oldest to newest, strictly increasing by timestamp.
///
/// The only way to build one is [`PriceSeries::new`] (serde goes through it too), so every
/// series in the system satisfies the ordering invariant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PriceBar>", into = "Vec<PriceBar>")]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, AnalysisError> {
        if let Some(pos) = bars.windows(2).position(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(AnalysisError::InvalidData(format!(
                "price bars must be strictly increasing by timestamp (bar {} at {} follows {})",
                pos + 1,
                bars[pos + 1].timestamp,
                bars[pos].timestamp
            )));
        }
        Ok(Self { bars })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Fails with `InsufficientHistory` when fewer than `required` bars are present.
    pub fn require(&self, indicator: &'static str, required: usize) -> Result<(), AnalysisError> {
        if self.bars.len() < required {
            return Err(AnalysisError::InsufficientHistory {
                indicator,
                required,
                available: self.bars.len(),
            });
        }
        Ok(())
    }

    /// Bars whose timestamp falls within `window` of the latest bar.
    pub fn trailing_window(&self, window: Duration) -> PriceSeries {
        let Some(last) = self.bars.last() else {
            return PriceSeries::empty();
        };
        let cutoff = last.timestamp - window;
        let start = self.bars.partition_point(|b| b.timestamp < cutoff);
        PriceSeries {
            bars: self.bars[start..].to_vec(),
        }
    }
}

impl TryFrom<Vec<PriceBar>> for PriceSeries {
    type Error = AnalysisError;

    fn try_from(bars: Vec<PriceBar>) -> Result<Self, Self::Error> {
        PriceSeries::new(bars)
    }
}

impl From<PriceSeries> for Vec<PriceBar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}

/// Lookback periods a data provider must be able to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryPeriod {
    OneDay,
    FiveDays,
    OneYear,
    FiveYears,
    Max,
}

impl HistoryPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryPeriod::OneDay => "1d",
            HistoryPeriod::FiveDays => "5d",
            HistoryPeriod::OneYear => "1y",
            HistoryPeriod::FiveYears => "5y",
            HistoryPeriod::Max => "max",
        }
    }
}

/// Company fundamentals. Every field is optional: absent means "unknown", never zero.
///
/// Field names follow snake_case; the camelCase keys common in quote-provider payloads are
/// accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalsRecord {
    #[serde(alias = "longName")]
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    #[serde(alias = "currentPrice", alias = "regularMarketPrice")]
    pub current_price: Option<f64>,
    #[serde(alias = "trailingPE")]
    pub trailing_pe: Option<f64>,
    #[serde(alias = "forwardPE")]
    pub forward_pe: Option<f64>,
    #[serde(alias = "pegRatio")]
    pub peg_ratio: Option<f64>,
    #[serde(alias = "priceToBook")]
    pub price_to_book: Option<f64>,
    #[serde(alias = "priceToSalesTrailing12Months")]
    pub price_to_sales: Option<f64>,
    /// Net margin as a fraction (0.15 = 15%).
    #[serde(alias = "profitMargins")]
    pub profit_margin: Option<f64>,
    /// Fraction (0.15 = 15%).
    #[serde(alias = "returnOnEquity")]
    pub return_on_equity: Option<f64>,
    /// Plain ratio (1.5 = debt is 1.5x equity).
    #[serde(alias = "debtToEquity")]
    pub debt_to_equity: Option<f64>,
    #[serde(alias = "currentRatio")]
    pub current_ratio: Option<f64>,
    /// Year-over-year revenue growth as a fraction.
    #[serde(alias = "revenueGrowth")]
    pub revenue_growth: Option<f64>,
    /// Quarterly year-over-year earnings growth as a fraction.
    #[serde(alias = "earningsQuarterlyGrowth")]
    pub earnings_growth: Option<f64>,
    #[serde(alias = "marketCap")]
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    #[serde(alias = "freeCashflow")]
    pub free_cash_flow: Option<f64>,
    #[serde(alias = "sharesOutstanding")]
    pub shares_outstanding: Option<f64>,
    #[serde(alias = "targetMeanPrice")]
    pub target_mean_price: Option<f64>,
    #[serde(alias = "recommendationKey")]
    pub recommendation_key: Option<String>,
    /// Percent of shares held by institutions, 0-100.
    #[serde(alias = "heldPercentInstitutions")]
    pub institutional_ownership: Option<f64>,
    pub volume: Option<f64>,
    #[serde(alias = "averageVolume")]
    pub average_volume: Option<f64>,
}

impl FundamentalsRecord {
    /// Minimal record used when the provider cannot serve fundamentals but prices exist.
    pub fn from_price_only(symbol: &str, last_close: f64) -> Self {
        Self {
            company_name: Some(symbol.to_uppercase()),
            current_price: Some(last_close),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything the composite scorer needs for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub symbol: String,
    pub fundamentals: FundamentalsRecord,
    /// Daily history, typically one year; drives the indicators and 1-year return.
    pub history: PriceSeries,
    /// Maximum available history; drives the 5-year return and all-time statistics.
    #[serde(default)]
    pub long_history: Option<PriceSeries>,
}
