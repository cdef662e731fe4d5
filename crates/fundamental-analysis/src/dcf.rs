use analysis_core::FundamentalsRecord;
use serde::{Deserialize, Serialize};

/// Longest projection horizon accepted from configuration.
pub const MAX_DCF_YEARS: u32 = 50;

/// Rates used for a single DCF run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfAssumptions {
    pub growth_rate: f64,
    pub terminal_growth: f64,
    pub discount_rate: f64,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfResult {
    pub enterprise_value: f64,
    /// Present only when shares outstanding is known and positive.
    pub value_per_share: Option<f64>,
    pub pv_cash_flows: f64,
    pub pv_terminal: f64,
    pub assumptions: DcfAssumptions,
}

/// Discounted cash flow with a Gordon-growth terminal value.
///
/// Returns `None` for non-positive free cash flow, a terminal growth at or above the discount
/// rate, a zero horizon or one that does not fit an `i32` exponent, or non-finite inputs.
pub fn discounted_cash_flow(
    free_cash_flow: f64,
    assumptions: DcfAssumptions,
    shares_outstanding: Option<f64>,
) -> Option<DcfResult> {
    let DcfAssumptions {
        growth_rate,
        terminal_growth,
        discount_rate,
        years,
    } = assumptions;

    let inputs_finite = [free_cash_flow, growth_rate, terminal_growth, discount_rate]
        .iter()
        .all(|v| v.is_finite());
    if !inputs_finite || free_cash_flow <= 0.0 || years == 0 || terminal_growth >= discount_rate {
        return None;
    }
    let horizon = i32::try_from(years).ok()?;

    let mut projected = free_cash_flow;
    let mut pv_cash_flows = 0.0;
    for year in 1..=horizon {
        projected *= 1.0 + growth_rate;
        pv_cash_flows += projected / (1.0 + discount_rate).powi(year);
    }

    let terminal_value = projected * (1.0 + terminal_growth) / (discount_rate - terminal_growth);
    let pv_terminal = terminal_value / (1.0 + discount_rate).powi(horizon);
    let enterprise_value = pv_cash_flows + pv_terminal;
    if !enterprise_value.is_finite() {
        return None;
    }

    let value_per_share = shares_outstanding
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(|shares| enterprise_value / shares);

    Some(DcfResult {
        enterprise_value,
        value_per_share,
        pv_cash_flows,
        pv_terminal,
        assumptions,
    })
}

/// Constants used to derive DCF inputs from a fundamentals record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationAssumptions {
    pub risk_free_rate: f64,
    pub market_premium: f64,
    pub terminal_growth: f64,
    pub years: u32,
    /// Substituted for revenue or earnings growth when the record lacks it.
    pub default_growth: f64,
    pub min_growth: f64,
    pub max_growth: f64,
    pub default_beta: f64,
}

impl Default for ValuationAssumptions {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.03,
            market_premium: 0.07,
            terminal_growth: 0.025,
            years: 5,
            default_growth: 0.05,
            min_growth: 0.02,
            max_growth: 0.15,
            default_beta: 1.0,
        }
    }
}

impl ValuationAssumptions {
    /// Growth is the mean of revenue and earnings growth, clamped; discount rate is CAPM-style
    /// risk-free plus beta times the market premium.
    pub fn derive(&self, record: &FundamentalsRecord) -> DcfAssumptions {
        let revenue_growth = record.revenue_growth.unwrap_or(self.default_growth);
        let earnings_growth = record.earnings_growth.unwrap_or(self.default_growth);
        let growth_rate = ((revenue_growth + earnings_growth) / 2.0).clamp(self.min_growth, self.max_growth);

        let beta = record.beta.unwrap_or(self.default_beta);

        DcfAssumptions {
            growth_rate,
            terminal_growth: self.terminal_growth,
            discount_rate: self.risk_free_rate + beta * self.market_premium,
            years: self.years,
        }
    }
}
