use analysis_core::FundamentalsRecord;
use serde::{Deserialize, Serialize};

pub const MARKET_PE: f64 = 22.5;
pub const MARKET_PB: f64 = 3.5;
pub const MARKET_PS: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValuationLabel {
    #[serde(rename = "EXPENSIVE")]
    Expensive,
    #[serde(rename = "SLIGHTLY EXPENSIVE")]
    SlightlyExpensive,
    #[serde(rename = "FAIR")]
    Fair,
    #[serde(rename = "SLIGHTLY CHEAP")]
    SlightlyCheap,
    #[serde(rename = "CHEAP")]
    Cheap,
}

impl ValuationLabel {
    pub fn from_premium(premium: f64) -> Self {
        if premium > 20.0 {
            ValuationLabel::Expensive
        } else if premium > 10.0 {
            ValuationLabel::SlightlyExpensive
        } else if premium > -10.0 {
            ValuationLabel::Fair
        } else if premium > -20.0 {
            ValuationLabel::SlightlyCheap
        } else {
            ValuationLabel::Cheap
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationLabel::Expensive => "EXPENSIVE",
            ValuationLabel::SlightlyExpensive => "SLIGHTLY EXPENSIVE",
            ValuationLabel::Fair => "FAIR",
            ValuationLabel::SlightlyCheap => "SLIGHTLY CHEAP",
            ValuationLabel::Cheap => "CHEAP",
        }
    }
}

impl std::fmt::Display for ValuationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multiples compared against broad-market reference levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeValuation {
    /// Each ratio as a percentage of its market reference; absent when the ratio is unknown
    /// or not positive.
    pub pe_vs_market: Option<f64>,
    pub pb_vs_market: Option<f64>,
    pub ps_vs_market: Option<f64>,
    pub premium_discount: f64,
    pub overall: ValuationLabel,
}

fn pct_of_market(ratio: Option<f64>, reference: f64) -> Option<f64> {
    ratio.filter(|r| r.is_finite() && *r > 0.0).map(|r| r / reference * 100.0)
}

pub fn relative_valuation(record: &FundamentalsRecord) -> RelativeValuation {
    let pe_vs_market = pct_of_market(record.trailing_pe, MARKET_PE);
    let pb_vs_market = pct_of_market(record.price_to_book, MARKET_PB);
    let ps_vs_market = pct_of_market(record.price_to_sales, MARKET_PS);

    let premium_discount: f64 = [pe_vs_market, pb_vs_market, ps_vs_market]
        .iter()
        .flatten()
        .map(|pct| (pct - 100.0) / 3.0)
        .sum();

    RelativeValuation {
        pe_vs_market,
        pb_vs_market,
        ps_vs_market,
        premium_discount,
        overall: ValuationLabel::from_premium(premium_discount),
    }
}
