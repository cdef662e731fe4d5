pub mod dcf;
pub mod relative;

pub use dcf::*;
pub use relative::*;

use analysis_core::FundamentalsRecord;
use serde::{Deserialize, Serialize};

/// Outcome of both valuation models for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationReport {
    /// Absent when free cash flow is unknown or the model is undefined for the inputs.
    pub dcf: Option<DcfResult>,
    /// DCF value per share relative to the current price, in percent.
    pub dcf_upside_pct: Option<f64>,
    pub relative: RelativeValuation,
}

impl ValuationReport {
    pub fn intrinsic_value(&self) -> Option<f64> {
        self.dcf.as_ref().and_then(|d| d.value_per_share)
    }
}

pub struct ValuationEngine {
    assumptions: ValuationAssumptions,
}

impl ValuationEngine {
    pub fn new(assumptions: ValuationAssumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &ValuationAssumptions {
        &self.assumptions
    }

    pub fn evaluate(&self, record: &FundamentalsRecord, current_price: Option<f64>) -> ValuationReport {
        let dcf = record.free_cash_flow.and_then(|fcf| {
            let result = discounted_cash_flow(fcf, self.assumptions.derive(record), record.shares_outstanding);
            if result.is_none() {
                tracing::debug!("DCF undefined for free cash flow {}", fcf);
            }
            result
        });

        let dcf_upside_pct = match (dcf.as_ref().and_then(|d| d.value_per_share), current_price) {
            (Some(value), Some(price)) if price > 0.0 => Some((value - price) / price * 100.0),
            _ => None,
        };

        ValuationReport {
            dcf,
            dcf_upside_pct,
            relative: relative_valuation(record),
        }
    }
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new(ValuationAssumptions::default())
    }
}
