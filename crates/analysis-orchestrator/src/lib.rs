use analysis_core::{
    AnalysisError, AnalysisInput, FundamentalsRecord, HistoryPeriod, MarketDataProvider, PriceSeries,
};
use fundamental_analysis::{ValuationAssumptions, ValuationEngine};
use rayon::prelude::*;
use sentiment_analysis::SentimentClassifier;
use technical_analysis::{five_year_return, one_year_return, IndicatorBundle, PerformanceSummary};

pub mod narrative;
pub mod rating;
pub mod result;
pub mod scoring;
pub mod tags;

#[cfg(test)]
mod orchestrator_tests;

pub use narrative::DetailedReasoning;
pub use rating::{Outlook, Rating, RatingBand, Recommendation, RiskLevel};
pub use result::AnalysisResult;
pub use scoring::{ScoreSet, ScoringInputs};

use narrative::NarrativeContext;
use result::{MAX_OPPORTUNITIES, MAX_RISKS, MAX_TECHNICAL_SIGNALS, TIME_HORIZON};

/// Runs every analysis library over one input and assembles the scored result.
///
/// Holds only immutable configuration, so one instance can serve concurrent requests.
pub struct AnalysisOrchestrator {
    valuation: ValuationEngine,
    sentiment: SentimentClassifier,
}

impl AnalysisOrchestrator {
    pub fn new(assumptions: ValuationAssumptions) -> Self {
        Self {
            valuation: ValuationEngine::new(assumptions),
            sentiment: SentimentClassifier::new(),
        }
    }

    pub fn assumptions(&self) -> &ValuationAssumptions {
        self.valuation.assumptions()
    }

    /// Analyzes one symbol from already-fetched data.
    ///
    /// Empty history or fundamentals is a `MissingData` error. A computation failure inside
    /// the scorer yields a degraded result instead of an error.
    pub fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisResult, AnalysisError> {
        let symbol = input.symbol.to_uppercase();
        let history = &input.history;

        let Some(latest) = history.last() else {
            return Err(AnalysisError::MissingData(format!("No price history for {}", symbol)));
        };
        if input.fundamentals.is_empty() {
            return Err(AnalysisError::MissingData(format!("No fundamentals for {}", symbol)));
        }

        tracing::info!("Starting analysis for {} with {} bars", symbol, history.len());

        let f = &input.fundamentals;
        let as_of = latest.timestamp;
        let current_price = f.current_price.filter(|p| *p > 0.0).or(Some(latest.close));
        let company_name = f.company_name.clone().unwrap_or_else(|| symbol.clone());

        let indicators = IndicatorBundle::compute(history);
        let long_history = input.long_history.as_ref();
        let performance = PerformanceSummary::compute(history, long_history);
        let one_year = one_year_return(history);
        let five_year = long_history.and_then(five_year_return);

        let valuation = self.valuation.evaluate(f, current_price);
        let macro_outlook = macro_analysis::classify(f);
        let sentiment = self.sentiment.classify(f, history);

        let scored = match scoring::score(&ScoringInputs {
            fundamentals: f,
            indicators: &indicators,
            current_price,
            one_year_return: one_year,
            five_year_return: five_year,
            valuation: &valuation,
            macro_outlook: &macro_outlook,
            sentiment: &sentiment,
        }) {
            Ok(scored) => scored,
            Err(AnalysisError::Computation(reason)) => {
                tracing::warn!("Scoring failed for {}, returning neutral result: {}", symbol, reason);
                return Ok(AnalysisResult::degraded(
                    &symbol,
                    &company_name,
                    as_of,
                    current_price,
                    indicators,
                    &reason,
                ));
            }
            Err(e) => return Err(e),
        };

        let band = RatingBand::from_score(scored.overall);
        let price_target = rating::price_target(scored.overall, f.target_mean_price, current_price);

        let context = NarrativeContext {
            symbol: &symbol,
            company_name: &company_name,
            fundamentals: f,
            indicators: &indicators,
            current_price,
            scores: &scored.scores,
            overall: scored.overall,
            band,
            price_target,
            time_horizon: TIME_HORIZON,
            valuation: &valuation,
            macro_outlook: &macro_outlook,
            sentiment: &sentiment,
            findings: &scored.findings,
        };
        let summary = context.summary();
        let detailed_reasoning = context.reasoning();

        tracing::info!(
            "Analysis for {} complete: overall {:.1} ({})",
            symbol,
            scored.overall,
            band.rating.as_str()
        );

        Ok(AnalysisResult {
            company_name,
            as_of,
            current_price,
            scores: scored.scores,
            overall_score: scored.overall,
            rating: band.rating,
            recommendation: band.recommendation,
            long_term_outlook: band.outlook,
            risk_level: band.risk_level,
            price_target,
            time_horizon: TIME_HORIZON.to_string(),
            technical_signals: scored.findings.signal_texts(MAX_TECHNICAL_SIGNALS),
            fundamental_signals: scored.findings.fundamental_signal_texts(),
            risk_factors: scored.findings.risk_texts(MAX_RISKS),
            opportunities: scored.findings.opportunity_texts(MAX_OPPORTUNITIES),
            summary,
            indicators,
            performance: Some(performance),
            valuation: Some(valuation),
            macro_outlook: Some(macro_outlook),
            sentiment: Some(sentiment),
            detailed_reasoning,
            degraded: None,
            symbol,
        })
    }

    /// Analyzes independent inputs in parallel. Results keep input order.
    pub fn analyze_batch(&self, inputs: &[AnalysisInput]) -> Vec<Result<AnalysisResult, AnalysisError>> {
        tracing::info!("Starting batch analysis of {} symbols", inputs.len());
        inputs.par_iter().map(|input| self.analyze(input)).collect()
    }

    /// Fetches everything the scorer needs from `provider`, then runs [`Self::analyze`].
    pub async fn analyze_symbol<P>(&self, provider: &P, symbol: &str) -> Result<AnalysisResult, AnalysisError>
    where
        P: MarketDataProvider + ?Sized,
    {
        let symbol = symbol.trim().to_uppercase();

        let latest_day = provider.history(&symbol, HistoryPeriod::OneDay).await?;
        if latest_day.is_empty() {
            return Err(AnalysisError::MissingData(format!("No data found for ticker {}", symbol)));
        }

        let fundamentals = match provider.fundamentals(&symbol).await {
            Ok(record) if !record.is_empty() => record,
            Ok(_) => self.price_only_fundamentals(provider, &symbol).await?,
            Err(e) => {
                tracing::warn!("Fundamentals unavailable for {}: {}", symbol, e);
                self.price_only_fundamentals(provider, &symbol).await?
            }
        };

        let (history, long_history) = tokio::join!(
            provider.history(&symbol, HistoryPeriod::OneYear),
            provider.history(&symbol, HistoryPeriod::Max)
        );
        let history = history?;
        let long_history = match long_history {
            Ok(series) if !series.is_empty() => Some(series),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Long history unavailable for {}: {}", symbol, e);
                None
            }
        };

        self.analyze(&AnalysisInput {
            symbol,
            fundamentals,
            history,
            long_history,
        })
    }

    async fn price_only_fundamentals<P>(&self, provider: &P, symbol: &str) -> Result<FundamentalsRecord, AnalysisError>
    where
        P: MarketDataProvider + ?Sized,
    {
        let recent: PriceSeries = provider.history(symbol, HistoryPeriod::FiveDays).await?;
        let last = recent
            .last()
            .ok_or_else(|| AnalysisError::MissingData(format!("No data found for ticker {}", symbol)))?;
        Ok(FundamentalsRecord::from_price_only(symbol, last.close))
    }
}

impl Default for AnalysisOrchestrator {
    fn default() -> Self {
        Self::new(ValuationAssumptions::default())
    }
}
