use super::*;
use analysis_core::PriceBar;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

fn series(days: usize, start_price: f64, daily_drift: f64) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    let bars = (0..days)
        .map(|i| {
            let wobble = if i % 3 == 0 { 0.4 } else { -0.2 };
            let close = start_price + daily_drift * i as f64 + wobble;
            PriceBar {
                timestamp: start + Duration::days(i as i64),
                open: close - 0.1,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 1_000_000.0 + (i % 5) as f64 * 10_000.0,
            }
        })
        .collect();
    PriceSeries::new(bars).unwrap()
}

fn healthy_fundamentals() -> FundamentalsRecord {
    FundamentalsRecord {
        company_name: Some("Acme Corp".to_string()),
        sector: Some("Technology".to_string()),
        industry: Some("Software".to_string()),
        trailing_pe: Some(18.0),
        forward_pe: Some(15.0),
        peg_ratio: Some(1.1),
        price_to_book: Some(2.5),
        price_to_sales: Some(3.0),
        profit_margin: Some(0.22),
        return_on_equity: Some(0.25),
        debt_to_equity: Some(0.6),
        current_ratio: Some(1.8),
        revenue_growth: Some(0.12),
        earnings_growth: Some(0.18),
        market_cap: Some(50_000_000_000.0),
        beta: Some(1.1),
        free_cash_flow: Some(2_000_000_000.0),
        shares_outstanding: Some(500_000_000.0),
        target_mean_price: Some(160.0),
        recommendation_key: Some("buy".to_string()),
        institutional_ownership: Some(75.0),
        volume: Some(1_200_000.0),
        average_volume: Some(1_000_000.0),
        ..Default::default()
    }
}

fn healthy_input() -> AnalysisInput {
    AnalysisInput {
        symbol: "acme".to_string(),
        fundamentals: healthy_fundamentals(),
        history: series(260, 100.0, 0.15),
        long_history: Some(series(1_900, 40.0, 0.05)),
    }
}

#[test]
fn test_analyze_produces_bounded_scores() {
    let result = AnalysisOrchestrator::default().analyze(&healthy_input()).unwrap();

    assert_eq!(result.symbol, "ACME");
    assert_eq!(result.company_name, "Acme Corp");
    assert!(!result.is_degraded());
    for score in [
        result.scores.technical,
        result.scores.fundamental,
        result.scores.momentum,
        result.scores.value,
        result.scores.growth,
    ] {
        assert!((0.0..=100.0).contains(&score), "score out of range: {}", score);
    }
    assert!((0.0..=90.0).contains(&result.overall_score));
    assert_eq!(RatingBand::from_score(result.overall_score).rating, result.rating);
    assert_eq!(result.time_horizon, "12-24 months");
    assert_eq!(result.price_target, Some(160.0));
    assert!(result.technical_signals.len() <= 10);
    assert!(result.risk_factors.len() <= 8);
    assert!(result.opportunities.len() <= 8);
    assert!(result.detailed_reasoning.technical.is_some());
    assert!(result.summary.starts_with("Acme Corp (ACME) shows an overall investment score of"));
}

#[test]
fn test_as_of_and_price_fall_back_to_latest_bar() {
    let input = healthy_input();
    let last = input.history.last().unwrap().clone();
    let result = AnalysisOrchestrator::default().analyze(&input).unwrap();

    assert_eq!(result.as_of, last.timestamp);
    assert_eq!(result.current_price, Some(last.close));
}

#[test]
fn test_fundamentals_price_takes_precedence() {
    let mut input = healthy_input();
    input.fundamentals.current_price = Some(123.45);
    let result = AnalysisOrchestrator::default().analyze(&input).unwrap();
    assert_eq!(result.current_price, Some(123.45));
}

#[test]
fn test_same_input_serializes_identically() {
    let orchestrator = AnalysisOrchestrator::default();
    let input = healthy_input();
    let first = serde_json::to_string(&orchestrator.analyze(&input).unwrap()).unwrap();
    let second = serde_json::to_string(&orchestrator.analyze(&input).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_inputs_are_errors() {
    let orchestrator = AnalysisOrchestrator::default();

    let mut no_history = healthy_input();
    no_history.history = PriceSeries::empty();
    assert!(matches!(orchestrator.analyze(&no_history), Err(AnalysisError::MissingData(_))));

    let mut no_fundamentals = healthy_input();
    no_fundamentals.fundamentals = FundamentalsRecord::default();
    assert!(matches!(orchestrator.analyze(&no_fundamentals), Err(AnalysisError::MissingData(_))));
}

#[test]
fn test_non_finite_metric_degrades() {
    let mut input = healthy_input();
    input.fundamentals.return_on_equity = Some(f64::INFINITY);
    let result = AnalysisOrchestrator::default().analyze(&input).unwrap();

    assert!(result.is_degraded());
    assert_eq!(result.overall_score, 50.0);
    assert_eq!(result.rating, Rating::Neutral);
    assert_eq!(result.recommendation, Recommendation::Hold);
    assert_eq!(result.long_term_outlook, Outlook::Moderate);
    assert_eq!(result.risk_level, RiskLevel::Medium);
}

#[test]
fn test_minimal_input_stays_neutral_where_unknown() {
    let input = AnalysisInput {
        symbol: "tiny".to_string(),
        fundamentals: FundamentalsRecord::from_price_only("tiny", 10.0),
        history: series(5, 10.0, 0.0),
        long_history: None,
    };
    let result = AnalysisOrchestrator::default().analyze(&input).unwrap();

    assert_eq!(result.company_name, "TINY");
    assert_eq!(result.scores.fundamental, 50.0);
    assert_eq!(result.scores.growth, 50.0);
    assert!(result.indicators.rsi.is_none());
    assert!(result.indicators.sma_200.is_none());
}

#[test]
fn test_hold_band_at_fifty_five() {
    let band = RatingBand::from_score(55.0);
    assert_eq!(band.rating, Rating::Hold);
    assert_eq!(band.recommendation, Recommendation::Hold);
}

#[test]
fn test_batch_keeps_input_order() {
    let mut broken = healthy_input();
    broken.symbol = "gone".to_string();
    broken.history = PriceSeries::empty();

    let mut other = healthy_input();
    other.symbol = "beta".to_string();

    let results = AnalysisOrchestrator::default().analyze_batch(&[healthy_input(), broken, other]);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().symbol, "ACME");
    assert!(matches!(results[1], Err(AnalysisError::MissingData(_))));
    assert_eq!(results[2].as_ref().unwrap().symbol, "BETA");
}

struct MockProvider {
    history: PriceSeries,
    long_history: PriceSeries,
    fundamentals: Result<FundamentalsRecord, AnalysisError>,
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn history(&self, _symbol: &str, period: HistoryPeriod) -> Result<PriceSeries, AnalysisError> {
        let bars = self.history.bars();
        let tail = |n: usize| PriceSeries::new(bars[bars.len().saturating_sub(n)..].to_vec());
        match period {
            HistoryPeriod::OneDay => tail(1),
            HistoryPeriod::FiveDays => tail(5),
            HistoryPeriod::OneYear => Ok(self.history.clone()),
            HistoryPeriod::FiveYears | HistoryPeriod::Max => Ok(self.long_history.clone()),
        }
    }

    async fn fundamentals(&self, _symbol: &str) -> Result<FundamentalsRecord, AnalysisError> {
        self.fundamentals.clone()
    }
}

#[tokio::test]
async fn test_analyze_symbol_through_provider() {
    let provider = MockProvider {
        history: series(260, 100.0, 0.15),
        long_history: series(1_900, 40.0, 0.05),
        fundamentals: Ok(healthy_fundamentals()),
    };
    let result = AnalysisOrchestrator::default().analyze_symbol(&provider, " acme ").await.unwrap();

    assert_eq!(result.symbol, "ACME");
    assert!(result.performance.as_ref().unwrap().all_time_high.is_some());
}

#[tokio::test]
async fn test_analyze_symbol_falls_back_to_price_only() {
    let provider = MockProvider {
        history: series(260, 100.0, 0.15),
        long_history: PriceSeries::empty(),
        fundamentals: Err(AnalysisError::Provider("quote service unavailable".to_string())),
    };
    let result = AnalysisOrchestrator::default().analyze_symbol(&provider, "acme").await.unwrap();
    let last_close = provider.history.last().unwrap().close;

    assert_eq!(result.company_name, "ACME");
    assert_eq!(result.current_price, Some(last_close));
    assert!(result.performance.as_ref().unwrap().all_time_high.is_none());
}

#[tokio::test]
async fn test_analyze_symbol_unknown_ticker() {
    let provider = MockProvider {
        history: PriceSeries::empty(),
        long_history: PriceSeries::empty(),
        fundamentals: Ok(healthy_fundamentals()),
    };
    let err = AnalysisOrchestrator::default().analyze_symbol(&provider, "nope").await.unwrap_err();
    match err {
        AnalysisError::MissingData(msg) => assert!(msg.starts_with("No data found for ticker")),
        other => panic!("unexpected error: {other:?}"),
    }
}
