use chrono::{DateTime, Utc};
use fundamental_analysis::ValuationReport;
use macro_analysis::MacroOutlook;
use sentiment_analysis::SentimentReport;
use serde::{Deserialize, Serialize};
use technical_analysis::{IndicatorBundle, PerformanceSummary};

use crate::narrative::DetailedReasoning;
use crate::rating::{Outlook, Rating, RatingBand, Recommendation, RiskLevel};
use crate::scoring::{ScoreSet, NEUTRAL_SCORE};

pub const TIME_HORIZON: &str = "12-24 months";
pub const MAX_TECHNICAL_SIGNALS: usize = 10;
pub const MAX_RISKS: usize = 8;
pub const MAX_OPPORTUNITIES: usize = 8;

/// Final, immutable output of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub company_name: String,
    pub as_of: DateTime<Utc>,
    pub current_price: Option<f64>,
    pub scores: ScoreSet,
    pub overall_score: f64,
    pub rating: Rating,
    pub recommendation: Recommendation,
    pub long_term_outlook: Outlook,
    pub risk_level: RiskLevel,
    pub price_target: Option<f64>,
    pub time_horizon: String,
    pub technical_signals: Vec<String>,
    pub fundamental_signals: Vec<String>,
    pub risk_factors: Vec<String>,
    pub opportunities: Vec<String>,
    pub summary: String,
    pub indicators: IndicatorBundle,
    pub performance: Option<PerformanceSummary>,
    pub valuation: Option<ValuationReport>,
    pub macro_outlook: Option<MacroOutlook>,
    pub sentiment: Option<SentimentReport>,
    pub detailed_reasoning: DetailedReasoning,
    /// Set only when scoring hit a computation error and neutral values were substituted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

impl AnalysisResult {
    /// Neutral stand-in returned when the composite scorer cannot produce finite scores.
    pub fn degraded(
        symbol: &str,
        company_name: &str,
        as_of: DateTime<Utc>,
        current_price: Option<f64>,
        indicators: IndicatorBundle,
        reason: &str,
    ) -> Self {
        let band = RatingBand::degraded();
        let note = format!("Analysis completed with limited data: {}", reason);
        Self {
            symbol: symbol.to_string(),
            company_name: company_name.to_string(),
            as_of,
            current_price,
            scores: ScoreSet::neutral(),
            overall_score: NEUTRAL_SCORE,
            rating: band.rating,
            recommendation: band.recommendation,
            long_term_outlook: band.outlook,
            risk_level: band.risk_level,
            price_target: current_price,
            time_horizon: TIME_HORIZON.to_string(),
            technical_signals: Vec::new(),
            fundamental_signals: Vec::new(),
            risk_factors: Vec::new(),
            opportunities: Vec::new(),
            summary: format!(
                "{} ({}) could not be fully scored. {}. Scores default to neutral.",
                company_name, symbol, note
            ),
            indicators,
            performance: None,
            valuation: None,
            macro_outlook: None,
            sentiment: None,
            detailed_reasoning: DetailedReasoning {
                executive_summary: format!(
                    "Analysis for {} encountered an issue and fell back to neutral scores. {}.",
                    symbol, note
                ),
                ..DetailedReasoning::default()
            },
            degraded: Some(reason.to_string()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}
