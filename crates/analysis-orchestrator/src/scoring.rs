use analysis_core::{AnalysisError, FundamentalsRecord};
use fundamental_analysis::{ValuationLabel, ValuationReport};
use macro_analysis::{Level, MacroOutlook, SectorOutlook};
use sentiment_analysis::{SentimentLabel, SentimentReport};
use serde::{Deserialize, Serialize};
use technical_analysis::IndicatorBundle;

use crate::tags::{Findings, Opportunity, Risk, Signal};

pub const TECHNICAL_WEIGHT: f64 = 0.20;
pub const FUNDAMENTAL_WEIGHT: f64 = 0.25;
pub const MOMENTUM_WEIGHT: f64 = 0.15;
pub const VALUE_WEIGHT: f64 = 0.20;
pub const GROWTH_WEIGHT: f64 = 0.10;

/// Score used when no factor of a category could be evaluated.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Points earned against points attainable for the factors that had data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreCard {
    earned: f64,
    possible: f64,
}

impl ScoreCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, earned: f64, possible: f64) {
        self.earned += earned;
        self.possible += possible;
    }

    /// Post-hoc adjustment; moves the numerator only.
    pub fn adjust(&mut self, delta: f64) {
        self.earned += delta;
    }

    pub fn score(&self, category: &str) -> Result<f64, AnalysisError> {
        if self.possible == 0.0 {
            return Ok(NEUTRAL_SCORE);
        }
        let raw = self.earned / self.possible * 100.0;
        if !raw.is_finite() {
            return Err(AnalysisError::Computation(format!(
                "{} score is not finite ({} / {})",
                category, self.earned, self.possible
            )));
        }
        Ok(raw.clamp(0.0, 100.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub technical: f64,
    pub fundamental: f64,
    pub momentum: f64,
    pub value: f64,
    pub growth: f64,
}

impl ScoreSet {
    pub fn neutral() -> Self {
        Self {
            technical: NEUTRAL_SCORE,
            fundamental: NEUTRAL_SCORE,
            momentum: NEUTRAL_SCORE,
            value: NEUTRAL_SCORE,
            growth: NEUTRAL_SCORE,
        }
    }

    pub fn overall(&self) -> f64 {
        self.technical * TECHNICAL_WEIGHT
            + self.fundamental * FUNDAMENTAL_WEIGHT
            + self.momentum * MOMENTUM_WEIGHT
            + self.value * VALUE_WEIGHT
            + self.growth * GROWTH_WEIGHT
    }
}

/// Borrowed view of everything the scorer reads.
pub struct ScoringInputs<'a> {
    pub fundamentals: &'a FundamentalsRecord,
    pub indicators: &'a IndicatorBundle,
    pub current_price: Option<f64>,
    pub one_year_return: Option<f64>,
    pub five_year_return: Option<f64>,
    pub valuation: &'a ValuationReport,
    pub macro_outlook: &'a MacroOutlook,
    pub sentiment: &'a SentimentReport,
}

#[derive(Debug, Clone)]
pub struct Scored {
    pub scores: ScoreSet,
    pub overall: f64,
    pub findings: Findings,
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

fn technical(ind: &IndicatorBundle, findings: &mut Findings) -> ScoreCard {
    let mut card = ScoreCard::new();

    if let Some(rsi) = ind.rsi {
        if rsi < 30.0 {
            card.add(20.0, 20.0);
            findings.signal(Signal::RsiOversold);
            findings.opportunity(Opportunity::OversoldRsi);
        } else if rsi <= 70.0 {
            card.add(15.0, 20.0);
            findings.signal(Signal::RsiNeutral);
        } else {
            card.add(5.0, 20.0);
            findings.signal(Signal::RsiOverbought);
            findings.risk(Risk::HighRsi);
        }
    }

    if let Some(distance) = ind.price_vs_sma_200 {
        if distance > 0.0 {
            card.add(10.0, 10.0);
            findings.signal(Signal::AboveSma200);
        } else {
            card.add(2.0, 10.0);
            findings.signal(Signal::BelowSma200);
            findings.risk(Risk::BelowSma200);
        }
    }

    if let Some(distance) = ind.price_vs_sma_50 {
        if distance > 0.0 {
            card.add(8.0, 8.0);
            findings.signal(Signal::AboveSma50);
        } else {
            card.add(3.0, 8.0);
            findings.signal(Signal::BelowSma50);
        }
    }

    if let Some(distance) = ind.price_vs_sma_20 {
        if distance > 0.0 {
            card.add(7.0, 7.0);
            findings.signal(Signal::AboveSma20);
        } else {
            card.add(3.0, 7.0);
        }
    }

    if let Some(macd) = ind.macd {
        if macd.macd > macd.signal {
            card.add(10.0, 10.0);
            findings.signal(Signal::MacdAboveSignal);
        } else {
            card.add(3.0, 10.0);
            findings.signal(Signal::MacdBelowSignal);
            findings.risk(Risk::MacdBearishCrossover);
        }
        card.add(if macd.histogram > 0.0 { 5.0 } else { 1.0 }, 5.0);
    }

    if let Some(bands) = ind.bollinger {
        let pb = bands.percent_b;
        if (20.0..=80.0).contains(&pb) {
            card.add(10.0, 10.0);
            findings.signal(Signal::BollingerMidRange);
        } else if pb < 20.0 {
            card.add(8.0, 10.0);
            findings.signal(Signal::NearLowerBollinger);
            findings.opportunity(Opportunity::NearLowerBollinger);
        } else {
            card.add(5.0, 10.0);
            findings.signal(Signal::NearUpperBollinger);
            findings.risk(Risk::NearUpperBollinger);
        }
    }

    if let Some((k, d)) = ind.stochastic.and_then(|s| s.d.map(|d| (s.k, d))) {
        if k > d && k < 80.0 {
            card.add(8.0, 10.0);
            findings.signal(Signal::StochasticBullish);
        } else if k < d && k > 20.0 {
            card.add(3.0, 10.0);
            findings.signal(Signal::StochasticBearish);
        } else if k < 20.0 {
            card.add(7.0, 10.0);
            findings.opportunity(Opportunity::OversoldStochastic);
        } else {
            card.add(0.0, 10.0);
        }
    }

    if let Some(ratio) = ind.volume_ratio {
        if ratio > 120.0 {
            card.add(8.0, 10.0);
            findings.signal(Signal::AboveAverageVolume);
        } else if ratio < 80.0 {
            card.add(3.0, 10.0);
            findings.signal(Signal::BelowAverageVolume);
        } else {
            card.add(0.0, 10.0);
        }
    }

    if let Some(momentum) = ind.momentum {
        if momentum > 0.0 {
            card.add(8.0, 10.0);
            findings.signal(Signal::PositiveMomentum);
        } else {
            card.add(2.0, 10.0);
            findings.signal(Signal::NegativeMomentum);
            findings.risk(Risk::NegativeMomentum);
        }
    }

    card
}

fn fundamental(f: &FundamentalsRecord, findings: &mut Findings) -> ScoreCard {
    let mut card = ScoreCard::new();

    if let Some(pe) = positive(f.trailing_pe) {
        if (10.0..=25.0).contains(&pe) {
            card.add(15.0, 20.0);
            findings.signal(Signal::PeReasonable);
        } else if pe < 10.0 {
            card.add(18.0, 20.0);
            findings.signal(Signal::PeLow);
            findings.opportunity(Opportunity::AttractivePe);
        } else if pe > 30.0 {
            card.add(5.0, 20.0);
            findings.signal(Signal::PeHigh);
            findings.risk(Risk::ElevatedPe);
        } else {
            card.add(0.0, 20.0);
        }
    }

    if let Some(peg) = positive(f.peg_ratio) {
        if peg < 1.0 {
            card.add(15.0, 15.0);
            findings.signal(Signal::PegBelowOne);
            findings.opportunity(Opportunity::LowPeg);
        } else if peg <= 2.0 {
            card.add(10.0, 15.0);
            findings.signal(Signal::PegAcceptable);
        } else {
            card.add(3.0, 15.0);
            findings.risk(Risk::HighPeg);
        }
    }

    if let Some(margin) = f.profit_margin {
        if margin > 0.15 {
            card.add(8.0, 10.0);
            findings.signal(Signal::StrongMargins);
        } else if margin > 0.0 {
            card.add(5.0, 10.0);
        } else {
            card.add(1.0, 10.0);
            findings.risk(Risk::NegativeMargins);
        }
    }

    if let Some(roe) = f.return_on_equity {
        if roe > 0.15 {
            card.add(6.0, 10.0);
            findings.signal(Signal::HighReturnOnEquity);
        } else if roe > 0.0 {
            card.add(3.0, 10.0);
        } else {
            card.add(1.0, 10.0);
            findings.risk(Risk::NegativeReturnOnEquity);
        }
    }

    if let Some(de) = f.debt_to_equity {
        if de < 1.0 {
            card.add(10.0, 10.0);
            findings.signal(Signal::LowDebt);
        } else if de < 2.0 {
            card.add(7.0, 10.0);
        } else {
            card.add(3.0, 10.0);
            findings.risk(Risk::HighDebt);
        }
    }

    if let Some(cr) = f.current_ratio {
        if (1.5..=3.0).contains(&cr) {
            card.add(10.0, 10.0);
            findings.signal(Signal::HealthyCurrentRatio);
        } else if cr < 1.0 {
            card.add(2.0, 10.0);
            findings.risk(Risk::LowLiquidity);
        } else {
            card.add(0.0, 10.0);
        }
    }

    if let Some(growth) = f.revenue_growth {
        if growth > 0.10 {
            card.add(8.0, 8.0);
            findings.signal(Signal::StrongRevenueGrowth);
            findings.opportunity(Opportunity::HighRevenueGrowth);
        } else if growth > 0.0 {
            card.add(5.0, 8.0);
        } else {
            card.add(1.0, 8.0);
            findings.risk(Risk::DecliningRevenue);
        }
    }

    if let Some(growth) = f.earnings_growth {
        if growth > 0.15 {
            card.add(7.0, 7.0);
            findings.signal(Signal::StrongEarningsGrowth);
            findings.opportunity(Opportunity::HighEarningsGrowth);
        } else if growth > 0.0 {
            card.add(4.0, 7.0);
        } else {
            card.add(1.0, 7.0);
            findings.risk(Risk::NegativeEarningsGrowth);
        }
    }

    if let Some(cap) = f.market_cap {
        if cap > 10_000_000_000.0 {
            card.add(5.0, 5.0);
            findings.signal(Signal::LargeCap);
        } else {
            card.add(0.0, 5.0);
        }
    }

    if let Some(beta) = f.beta {
        if (0.8..=1.2).contains(&beta) {
            card.add(5.0, 5.0);
            findings.signal(Signal::MarketAlignedBeta);
        } else if beta > 1.5 {
            card.add(2.0, 5.0);
            findings.risk(Risk::HighBeta);
        } else {
            card.add(0.0, 5.0);
        }
    }

    card
}

fn momentum(one_year: Option<f64>, five_year: Option<f64>, findings: &mut Findings) -> ScoreCard {
    let mut card = ScoreCard::new();

    if let Some(ret) = one_year {
        if ret > 20.0 {
            card.add(20.0, 30.0);
            findings.signal(Signal::StrongOneYearReturn);
        } else if ret > 0.0 {
            card.add(12.0, 30.0);
        } else {
            card.add(3.0, 30.0);
            findings.risk(Risk::NegativeOneYearReturn);
        }
    }

    if let Some(ret) = five_year {
        if ret > 50.0 {
            card.add(20.0, 20.0);
            findings.signal(Signal::ExcellentFiveYearReturn);
            findings.opportunity(Opportunity::StrongFiveYearRecord);
        } else if ret > 20.0 {
            card.add(15.0, 20.0);
        } else if ret > 0.0 {
            card.add(8.0, 20.0);
        } else {
            card.add(2.0, 20.0);
            findings.risk(Risk::NegativeFiveYearReturn);
        }
    }

    card
}

fn value(f: &FundamentalsRecord, current_price: Option<f64>, findings: &mut Findings) -> ScoreCard {
    let mut card = ScoreCard::new();

    if let Some(pe) = positive(f.trailing_pe) {
        let earned = if pe < 15.0 {
            25.0
        } else if pe < 20.0 {
            18.0
        } else if pe < 25.0 {
            12.0
        } else {
            5.0
        };
        card.add(earned, 25.0);
    }

    if let Some(pb) = positive(f.price_to_book) {
        let earned = if pb < 1.0 {
            findings.opportunity(Opportunity::BelowBookValue);
            25.0
        } else if pb < 2.0 {
            18.0
        } else if pb < 3.0 {
            12.0
        } else {
            5.0
        };
        card.add(earned, 25.0);
    }

    if let Some(peg) = positive(f.peg_ratio) {
        let earned = if peg < 0.8 {
            25.0
        } else if peg < 1.2 {
            18.0
        } else {
            8.0
        };
        card.add(earned, 25.0);
    }

    if let (Some(target), Some(price)) = (f.target_mean_price, positive(current_price)) {
        let upside = (target - price) / price * 100.0;
        let earned = if upside > 20.0 {
            findings.opportunity(Opportunity::AnalystUpside(upside));
            25.0
        } else if upside > 10.0 {
            18.0
        } else if upside > 0.0 {
            12.0
        } else {
            5.0
        };
        card.add(earned, 25.0);
    }

    card
}

fn growth(f: &FundamentalsRecord, findings: &mut Findings) -> ScoreCard {
    let mut card = ScoreCard::new();

    if let Some(g) = f.revenue_growth {
        let earned = if g > 0.20 {
            30.0
        } else if g > 0.10 {
            20.0
        } else if g > 0.0 {
            12.0
        } else {
            3.0
        };
        card.add(earned, 30.0);
    }

    if let Some(g) = f.earnings_growth {
        let earned = if g > 0.25 {
            30.0
        } else if g > 0.15 {
            20.0
        } else if g > 0.0 {
            12.0
        } else {
            3.0
        };
        card.add(earned, 30.0);
    }

    if let Some(peg) = positive(f.peg_ratio) {
        let earned = if peg < 1.0 {
            20.0
        } else if peg < 1.5 {
            15.0
        } else {
            5.0
        };
        card.add(earned, 20.0);
    }

    if let (Some(forward), Some(trailing)) = (positive(f.forward_pe), positive(f.trailing_pe)) {
        if forward < trailing {
            card.add(20.0, 20.0);
            findings.signal(Signal::ForwardPeBelowTrailing);
        } else {
            card.add(8.0, 20.0);
        }
    }

    card
}

/// NaN or infinite metrics would silently fall into a default band, so they are rejected.
fn ensure_finite(inputs: &ScoringInputs<'_>) -> Result<(), AnalysisError> {
    let f = inputs.fundamentals;
    let metrics = [
        ("current price", inputs.current_price),
        ("1-year return", inputs.one_year_return),
        ("5-year return", inputs.five_year_return),
        ("trailing P/E", f.trailing_pe),
        ("forward P/E", f.forward_pe),
        ("PEG ratio", f.peg_ratio),
        ("price to book", f.price_to_book),
        ("profit margin", f.profit_margin),
        ("return on equity", f.return_on_equity),
        ("debt to equity", f.debt_to_equity),
        ("current ratio", f.current_ratio),
        ("revenue growth", f.revenue_growth),
        ("earnings growth", f.earnings_growth),
        ("market cap", f.market_cap),
        ("beta", f.beta),
        ("target mean price", f.target_mean_price),
    ];
    match metrics.iter().find(|(_, value)| value.is_some_and(|v| !v.is_finite())) {
        Some((name, value)) => Err(AnalysisError::Computation(format!(
            "{} is not finite: {:?}",
            name, value
        ))),
        None => Ok(()),
    }
}

/// Scores all five categories, applies the valuation, macro and sentiment adjustments, and
/// returns the weighted overall score together with the collected findings.
pub fn score(inputs: &ScoringInputs<'_>) -> Result<Scored, AnalysisError> {
    let f = inputs.fundamentals;
    ensure_finite(inputs)?;
    let mut findings = Findings::default();

    let technical_card = technical(inputs.indicators, &mut findings);
    let mut fundamental_card = fundamental(f, &mut findings);
    let mut momentum_card = momentum(inputs.one_year_return, inputs.five_year_return, &mut findings);
    let mut value_card = value(f, inputs.current_price, &mut findings);
    let growth_card = growth(f, &mut findings);

    if let (Some(intrinsic), Some(price)) = (inputs.valuation.intrinsic_value(), positive(inputs.current_price)) {
        let change = (intrinsic - price) / price * 100.0;
        if intrinsic > price * 1.15 {
            value_card.adjust(15.0);
            findings.opportunity(Opportunity::DcfUpside(change));
        } else if intrinsic < price * 0.85 {
            value_card.adjust(-10.0);
            findings.risk(Risk::DcfDownside(change));
        }
    }

    match inputs.valuation.relative.overall {
        ValuationLabel::Cheap => {
            value_card.adjust(10.0);
            findings.opportunity(Opportunity::RelativelyCheap);
        }
        ValuationLabel::Expensive => {
            value_card.adjust(-10.0);
            findings.risk(Risk::RelativelyExpensive);
        }
        _ => {}
    }

    let sector = f.sector.clone().unwrap_or_else(|| "This".to_string());
    match inputs.macro_outlook.sector_outlook {
        SectorOutlook::Positive => {
            fundamental_card.adjust(5.0);
            findings.opportunity(Opportunity::SectorTailwinds(sector));
        }
        SectorOutlook::Cautious | SectorOutlook::Volatile => {
            fundamental_card.adjust(-5.0);
            findings.risk(Risk::SectorHeadwinds(sector));
        }
        _ => {}
    }
    match inputs.macro_outlook.recession_resilience {
        Level::High => {
            fundamental_card.adjust(3.0);
            findings.opportunity(Opportunity::DefensiveResilience);
        }
        Level::Low => {
            fundamental_card.adjust(-3.0);
            findings.risk(Risk::RecessionVulnerable);
        }
        _ => {}
    }

    match inputs.sentiment.overall {
        SentimentLabel::Bullish => {
            momentum_card.adjust(10.0);
            findings.opportunity(Opportunity::BullishSentiment);
        }
        SentimentLabel::Bearish => {
            momentum_card.adjust(-10.0);
            findings.risk(Risk::BearishSentiment);
        }
        _ => {}
    }

    let scores = ScoreSet {
        technical: technical_card.score("technical")?,
        fundamental: fundamental_card.score("fundamental")?,
        momentum: momentum_card.score("momentum")?,
        value: value_card.score("value")?,
        growth: growth_card.score("growth")?,
    };

    let overall = scores.overall();
    if !overall.is_finite() {
        return Err(AnalysisError::Computation(format!("overall score is not finite: {}", overall)));
    }

    Ok(Scored {
        scores,
        overall,
        findings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::PriceSeries;
    use fundamental_analysis::{DcfAssumptions, DcfResult, RelativeValuation};
    use sentiment_analysis::SentimentClassifier;
    use technical_analysis::{BollingerValue, MacdValue, StochasticValue};

    fn assert_close(actual: f64, expected: f64, case: &str) {
        assert!((actual - expected).abs() < 1e-9, "{}: expected {}, got {}", case, expected, actual);
    }

    fn valuation(value_per_share: Option<f64>, label: ValuationLabel) -> ValuationReport {
        ValuationReport {
            dcf: value_per_share.map(|v| DcfResult {
                enterprise_value: v * 1_000.0,
                value_per_share: Some(v),
                pv_cash_flows: 0.0,
                pv_terminal: 0.0,
                assumptions: DcfAssumptions {
                    growth_rate: 0.05,
                    terminal_growth: 0.025,
                    discount_rate: 0.10,
                    years: 5,
                },
            }),
            dcf_upside_pct: None,
            relative: RelativeValuation {
                pe_vs_market: None,
                pb_vs_market: None,
                ps_vs_market: None,
                premium_discount: 0.0,
                overall: label,
            },
        }
    }

    /// Owned inputs for driving `score` end to end.
    struct Case {
        record: FundamentalsRecord,
        indicators: IndicatorBundle,
        current_price: Option<f64>,
        one_year_return: Option<f64>,
        five_year_return: Option<f64>,
        valuation: ValuationReport,
        macro_outlook: MacroOutlook,
        sentiment: SentimentReport,
    }

    impl Case {
        /// Value 23/50, fundamental 18/30, momentum 12/30 before any adjustment.
        fn baseline() -> Self {
            let record = FundamentalsRecord {
                trailing_pe: Some(17.0),
                price_to_book: Some(3.0),
                debt_to_equity: Some(2.5),
                ..Default::default()
            };
            let mut sentiment = SentimentClassifier::new().classify(&record, &PriceSeries::empty());
            sentiment.overall = SentimentLabel::Neutral;
            Self {
                record,
                indicators: IndicatorBundle::default(),
                current_price: Some(100.0),
                one_year_return: Some(10.0),
                five_year_return: None,
                valuation: valuation(None, ValuationLabel::Fair),
                macro_outlook: MacroOutlook::default(),
                sentiment,
            }
        }

        fn run(&self) -> Scored {
            score(&ScoringInputs {
                fundamentals: &self.record,
                indicators: &self.indicators,
                current_price: self.current_price,
                one_year_return: self.one_year_return,
                five_year_return: self.five_year_return,
                valuation: &self.valuation,
                macro_outlook: &self.macro_outlook,
                sentiment: &self.sentiment,
            })
            .unwrap()
        }
    }

    #[test]
    fn test_scorecard_empty_is_neutral() {
        assert_eq!(ScoreCard::new().score("x").unwrap(), NEUTRAL_SCORE);
    }

    #[test]
    fn test_scorecard_clamps_adjustments() {
        let mut card = ScoreCard::new();
        card.add(25.0, 25.0);
        card.adjust(15.0);
        assert_eq!(card.score("value").unwrap(), 100.0);

        let mut low = ScoreCard::new();
        low.add(2.0, 30.0);
        low.adjust(-10.0);
        assert_eq!(low.score("momentum").unwrap(), 0.0);
    }

    #[test]
    fn test_scorecard_rejects_nan() {
        let mut card = ScoreCard::new();
        card.add(f64::NAN, 10.0);
        assert!(matches!(card.score("technical"), Err(AnalysisError::Computation(_))));
    }

    #[test]
    fn test_non_finite_metric_is_computation_error() {
        let record = FundamentalsRecord {
            profit_margin: Some(f64::NAN),
            ..Default::default()
        };
        let indicators = IndicatorBundle::default();
        let valuation = fundamental_analysis::ValuationEngine::default().evaluate(&record, Some(10.0));
        let macro_outlook = MacroOutlook::default();
        let sentiment = sentiment_analysis::SentimentClassifier::new()
            .classify(&record, &analysis_core::PriceSeries::empty());
        let inputs = ScoringInputs {
            fundamentals: &record,
            indicators: &indicators,
            current_price: Some(10.0),
            one_year_return: None,
            five_year_return: None,
            valuation: &valuation,
            macro_outlook: &macro_outlook,
            sentiment: &sentiment,
        };
        let err = score(&inputs).unwrap_err();
        assert!(matches!(err, AnalysisError::Computation(ref msg) if msg.contains("profit margin")));
    }

    #[test]
    fn test_weights_cap_overall_at_ninety() {
        let perfect = ScoreSet {
            technical: 100.0,
            fundamental: 100.0,
            momentum: 100.0,
            value: 100.0,
            growth: 100.0,
        };
        assert!((perfect.overall() - 90.0).abs() < 1e-9);
        assert!((ScoreSet::neutral().overall() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_fundamental_dynamic_denominator() {
        let record = FundamentalsRecord {
            debt_to_equity: Some(0.5),
            ..Default::default()
        };
        let mut findings = Findings::default();
        let card = fundamental(&record, &mut findings);
        assert_eq!(card.score("fundamental").unwrap(), 100.0);
        assert_eq!(findings.signal_texts(10), vec![Signal::LowDebt.text()]);
    }

    #[test]
    fn test_neutral_band_counts_toward_possible() {
        // P/E between 25 and 30 earns nothing but is still attainable
        let record = FundamentalsRecord {
            trailing_pe: Some(27.0),
            debt_to_equity: Some(0.5),
            ..Default::default()
        };
        let card = fundamental(&record, &mut Findings::default());
        assert!((card.score("fundamental").unwrap() - 10.0 / 30.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_technical_bands() {
        let rsi = |v: f64| IndicatorBundle { rsi: Some(v), ..Default::default() };
        let sma_200 = |v: f64| IndicatorBundle { price_vs_sma_200: Some(v), ..Default::default() };
        let sma_50 = |v: f64| IndicatorBundle { price_vs_sma_50: Some(v), ..Default::default() };
        let sma_20 = |v: f64| IndicatorBundle { price_vs_sma_20: Some(v), ..Default::default() };
        let macd = |macd: f64, signal: f64, histogram: f64| IndicatorBundle {
            macd: Some(MacdValue { macd, signal, histogram }),
            ..Default::default()
        };
        let percent_b = |v: f64| IndicatorBundle {
            bollinger: Some(BollingerValue {
                upper: 0.0,
                middle: 0.0,
                lower: 0.0,
                percent_b: v,
                bandwidth: None,
            }),
            ..Default::default()
        };
        let stochastic = |k: f64, d: Option<f64>| IndicatorBundle {
            stochastic: Some(StochasticValue { k, d }),
            ..Default::default()
        };
        let volume = |v: f64| IndicatorBundle { volume_ratio: Some(v), ..Default::default() };
        let momentum = |v: f64| IndicatorBundle { momentum: Some(v), ..Default::default() };

        let cases = vec![
            ("rsi oversold", rsi(29.9), 100.0),
            ("rsi at 30", rsi(30.0), 75.0),
            ("rsi at 70", rsi(70.0), 75.0),
            ("rsi overbought", rsi(70.1), 25.0),
            ("above sma200", sma_200(0.1), 100.0),
            ("on sma200", sma_200(0.0), 20.0),
            ("above sma50", sma_50(0.1), 100.0),
            ("on sma50", sma_50(0.0), 37.5),
            ("above sma20", sma_20(0.1), 100.0),
            ("below sma20", sma_20(-2.0), 3.0 / 7.0 * 100.0),
            ("macd bullish", macd(1.0, 0.5, 0.5), 100.0),
            ("macd bullish flat histogram", macd(1.0, 0.5, 0.0), 11.0 / 15.0 * 100.0),
            ("macd on signal", macd(0.5, 0.5, 0.0), 4.0 / 15.0 * 100.0),
            ("percent b at 20", percent_b(20.0), 100.0),
            ("percent b at 80", percent_b(80.0), 100.0),
            ("near lower band", percent_b(19.9), 80.0),
            ("near upper band", percent_b(80.1), 50.0),
            ("stochastic rising", stochastic(50.0, Some(40.0)), 80.0),
            ("stochastic falling", stochastic(50.0, Some(60.0)), 30.0),
            ("stochastic oversold", stochastic(10.0, Some(15.0)), 70.0),
            ("stochastic rising overbought", stochastic(85.0, Some(70.0)), 0.0),
            ("stochastic falling at 20", stochastic(20.0, Some(25.0)), 0.0),
            ("stochastic without %D", stochastic(10.0, None), NEUTRAL_SCORE),
            ("heavy volume", volume(120.1), 80.0),
            ("volume at 120", volume(120.0), 0.0),
            ("volume at 80", volume(80.0), 0.0),
            ("light volume", volume(79.9), 30.0),
            ("positive momentum", momentum(0.1), 80.0),
            ("flat momentum", momentum(0.0), 20.0),
        ];
        for (case, indicators, expected) in cases {
            let card = technical(&indicators, &mut Findings::default());
            assert_close(card.score("technical").unwrap(), expected, case);
        }
    }

    #[test]
    fn test_technical_findings() {
        let indicators = IndicatorBundle {
            rsi: Some(75.0),
            macd: Some(MacdValue {
                macd: -1.0,
                signal: 0.0,
                histogram: -1.0,
            }),
            stochastic: Some(StochasticValue { k: 5.0, d: Some(8.0) }),
            ..Default::default()
        };
        let mut findings = Findings::default();
        technical(&indicators, &mut findings);

        assert_eq!(
            findings.signal_texts(10),
            vec![Signal::RsiOverbought.text(), Signal::MacdBelowSignal.text()]
        );
        assert_eq!(
            findings.risk_texts(10),
            vec![Risk::HighRsi.text(), Risk::MacdBearishCrossover.text()]
        );
        assert_eq!(findings.opportunity_texts(10), vec![Opportunity::OversoldStochastic.text()]);
    }

    #[test]
    fn test_fundamental_pe_bands() {
        let cases = [
            ("low", 9.9, 90.0),
            ("lower edge", 10.0, 75.0),
            ("upper edge", 25.0, 75.0),
            ("gap", 30.0, 0.0),
            ("high", 30.1, 25.0),
        ];
        for (case, pe, expected) in cases {
            let record = FundamentalsRecord {
                trailing_pe: Some(pe),
                ..Default::default()
            };
            let card = fundamental(&record, &mut Findings::default());
            assert_close(card.score("fundamental").unwrap(), expected, case);
        }
    }

    #[test]
    fn test_momentum_return_bands() {
        let cases = [
            ("1y strong", Some(20.1), None, 20.0 / 30.0 * 100.0),
            ("1y at 20", Some(20.0), None, 40.0),
            ("1y flat", Some(0.0), None, 10.0),
            ("5y excellent", None, Some(50.1), 100.0),
            ("5y at 50", None, Some(50.0), 75.0),
            ("5y at 20", None, Some(20.0), 40.0),
            ("5y flat", None, Some(0.0), 10.0),
            ("both", Some(25.0), Some(60.0), 80.0),
            ("neither", None, None, NEUTRAL_SCORE),
        ];
        for (case, one_year, five_year, expected) in cases {
            let card = momentum(one_year, five_year, &mut Findings::default());
            assert_close(card.score("momentum").unwrap(), expected, case);
        }

        let mut findings = Findings::default();
        momentum(Some(-4.0), Some(-1.0), &mut findings);
        assert_eq!(
            findings.risk_texts(10),
            vec![Risk::NegativeOneYearReturn.text(), Risk::NegativeFiveYearReturn.text()]
        );
    }

    #[test]
    fn test_value_bands() {
        let pe = |v: f64| FundamentalsRecord { trailing_pe: Some(v), ..Default::default() };
        let pb = |v: f64| FundamentalsRecord { price_to_book: Some(v), ..Default::default() };
        let peg = |v: f64| FundamentalsRecord { peg_ratio: Some(v), ..Default::default() };
        let target = |v: f64| FundamentalsRecord { target_mean_price: Some(v), ..Default::default() };

        let cases = vec![
            ("pe cheap", pe(14.9), 100.0),
            ("pe at 15", pe(15.0), 72.0),
            ("pe at 20", pe(20.0), 48.0),
            ("pe at 25", pe(25.0), 20.0),
            ("pe negative", pe(-3.0), NEUTRAL_SCORE),
            ("pb below book", pb(0.99), 100.0),
            ("pb at 1", pb(1.0), 72.0),
            ("pb at 2", pb(2.0), 48.0),
            ("pb at 3", pb(3.0), 20.0),
            ("peg low", peg(0.79), 100.0),
            ("peg at 0.8", peg(0.8), 72.0),
            ("peg at 1.2", peg(1.2), 32.0),
            ("upside over 20%", target(121.0), 100.0),
            ("upside 19%", target(119.0), 72.0),
            ("upside 11%", target(111.0), 72.0),
            ("upside 9%", target(109.0), 48.0),
            ("upside 1%", target(101.0), 48.0),
            ("at target", target(100.0), 20.0),
            ("above target", target(90.0), 20.0),
        ];
        for (case, record, expected) in cases {
            let card = value(&record, Some(100.0), &mut Findings::default());
            assert_close(card.score("value").unwrap(), expected, case);
        }

        // Upside needs a positive price
        let card = value(&target(150.0), None, &mut Findings::default());
        assert_eq!(card.score("value").unwrap(), NEUTRAL_SCORE);
        let card = value(&target(150.0), Some(0.0), &mut Findings::default());
        assert_eq!(card.score("value").unwrap(), NEUTRAL_SCORE);

        let mut findings = Findings::default();
        value(&target(130.0), Some(100.0), &mut findings);
        assert_eq!(
            findings.opportunity_texts(10),
            vec!["Analyst target suggests 30.0% upside potential".to_string()]
        );
    }

    #[test]
    fn test_growth_bands() {
        let revenue = |v: f64| FundamentalsRecord { revenue_growth: Some(v), ..Default::default() };
        let earnings = |v: f64| FundamentalsRecord { earnings_growth: Some(v), ..Default::default() };
        let peg = |v: f64| FundamentalsRecord { peg_ratio: Some(v), ..Default::default() };
        let pe_pair = |forward: f64, trailing: f64| FundamentalsRecord {
            forward_pe: Some(forward),
            trailing_pe: Some(trailing),
            ..Default::default()
        };

        let cases = vec![
            ("revenue high", revenue(0.21), 100.0),
            ("revenue at 20%", revenue(0.20), 20.0 / 30.0 * 100.0),
            ("revenue at 10%", revenue(0.10), 40.0),
            ("revenue flat", revenue(0.0), 10.0),
            ("earnings high", earnings(0.26), 100.0),
            ("earnings at 25%", earnings(0.25), 20.0 / 30.0 * 100.0),
            ("earnings at 15%", earnings(0.15), 40.0),
            ("earnings flat", earnings(0.0), 10.0),
            ("peg low", peg(0.99), 100.0),
            ("peg at 1", peg(1.0), 75.0),
            ("peg at 1.5", peg(1.5), 25.0),
            ("forward below trailing", pe_pair(18.0, 20.0), 100.0),
            ("forward equal", pe_pair(20.0, 20.0), 40.0),
            ("forward above trailing", pe_pair(22.0, 20.0), 40.0),
            ("negative forward", pe_pair(-4.0, 20.0), NEUTRAL_SCORE),
        ];
        for (case, record, expected) in cases {
            let card = growth(&record, &mut Findings::default());
            assert_close(card.score("growth").unwrap(), expected, case);
        }

        let mut findings = Findings::default();
        growth(&pe_pair(18.0, 20.0), &mut findings);
        assert_eq!(findings.signal_texts(10), vec![Signal::ForwardPeBelowTrailing.text()]);
    }

    #[test]
    fn test_baseline_has_no_adjustments() {
        let scored = Case::baseline().run();
        assert_close(scored.scores.value, 46.0, "value");
        assert_close(scored.scores.fundamental, 60.0, "fundamental");
        assert_close(scored.scores.momentum, 40.0, "momentum");
        assert!(scored.findings.opportunities.is_empty());
    }

    #[test]
    fn test_dcf_adjustment() {
        let cases = [
            ("upside", Some(116.0), 76.0),
            ("inside upper band", Some(114.0), 46.0),
            ("inside lower band", Some(86.0), 46.0),
            ("downside", Some(84.0), 26.0),
            ("no per-share value", None, 46.0),
        ];
        for (case, intrinsic, expected) in cases {
            let mut input = Case::baseline();
            input.valuation = valuation(intrinsic, ValuationLabel::Fair);
            assert_close(input.run().scores.value, expected, case);
        }

        let mut input = Case::baseline();
        input.valuation = valuation(Some(84.0), ValuationLabel::Fair);
        assert_eq!(
            input.run().findings.risk_texts(10).last().cloned(),
            Some("DCF model suggests -16.0% downside risk".to_string())
        );
    }

    #[test]
    fn test_relative_valuation_adjustment() {
        let cases = [
            (ValuationLabel::Cheap, 66.0),
            (ValuationLabel::SlightlyCheap, 46.0),
            (ValuationLabel::Fair, 46.0),
            (ValuationLabel::SlightlyExpensive, 46.0),
            (ValuationLabel::Expensive, 26.0),
        ];
        for (label, expected) in cases {
            let mut input = Case::baseline();
            input.valuation = valuation(None, label);
            assert_close(input.run().scores.value, expected, &format!("{:?}", label));
        }
    }

    #[test]
    fn test_macro_adjustments() {
        let cases = [
            (SectorOutlook::Positive, Level::Medium, 23.0),
            (SectorOutlook::Cautious, Level::Medium, 13.0),
            (SectorOutlook::Volatile, Level::Medium, 13.0),
            (SectorOutlook::Stable, Level::Medium, 18.0),
            (SectorOutlook::Neutral, Level::High, 21.0),
            (SectorOutlook::Neutral, Level::Low, 15.0),
            (SectorOutlook::Neutral, Level::LowMedium, 18.0),
            (SectorOutlook::Positive, Level::High, 26.0),
        ];
        for (outlook, resilience, earned) in cases {
            let mut input = Case::baseline();
            input.macro_outlook.sector_outlook = outlook;
            input.macro_outlook.recession_resilience = resilience;
            let case = format!("{:?}/{:?}", outlook, resilience);
            assert_close(input.run().scores.fundamental, earned / 30.0 * 100.0, &case);
        }

        let mut input = Case::baseline();
        input.record.sector = Some("Utilities".to_string());
        input.macro_outlook.sector_outlook = SectorOutlook::Cautious;
        input.macro_outlook.recession_resilience = Level::Low;
        let risks = input.run().findings.risk_texts(10);
        assert!(risks.contains(&"Utilities sector faces headwinds".to_string()));
        assert!(risks.contains(&Risk::RecessionVulnerable.text()));
    }

    #[test]
    fn test_sentiment_adjustment() {
        let cases = [
            (SentimentLabel::Bullish, 22.0),
            (SentimentLabel::SlightlyBullish, 12.0),
            (SentimentLabel::Neutral, 12.0),
            (SentimentLabel::SlightlyBearish, 12.0),
            (SentimentLabel::Bearish, 2.0),
        ];
        for (label, earned) in cases {
            let mut input = Case::baseline();
            input.sentiment.overall = label;
            let case = format!("{:?}", label);
            assert_close(input.run().scores.momentum, earned / 30.0 * 100.0, &case);
        }
    }

    #[test]
    fn test_adjustments_stay_within_bounds() {
        let mut best = Case::baseline();
        best.record = FundamentalsRecord {
            trailing_pe: Some(9.0),
            forward_pe: Some(5.0),
            peg_ratio: Some(0.5),
            price_to_book: Some(0.5),
            profit_margin: Some(0.3),
            return_on_equity: Some(0.3),
            debt_to_equity: Some(0.2),
            current_ratio: Some(2.0),
            revenue_growth: Some(0.5),
            earnings_growth: Some(0.5),
            market_cap: Some(1e12),
            beta: Some(1.0),
            target_mean_price: Some(1_000.0),
            ..Default::default()
        };
        best.indicators = IndicatorBundle {
            rsi: Some(25.0),
            price_vs_sma_200: Some(10.0),
            price_vs_sma_50: Some(10.0),
            price_vs_sma_20: Some(10.0),
            momentum: Some(5.0),
            ..Default::default()
        };
        best.one_year_return = Some(500.0);
        best.five_year_return = Some(5_000.0);
        best.valuation = valuation(Some(10_000.0), ValuationLabel::Cheap);
        best.macro_outlook.sector_outlook = SectorOutlook::Positive;
        best.macro_outlook.recession_resilience = Level::High;
        best.sentiment.overall = SentimentLabel::Bullish;

        let top = best.run();
        assert_eq!(top.scores.value, 100.0);
        assert_eq!(top.scores.fundamental, 100.0);
        assert_eq!(top.scores.momentum, 100.0);

        let mut worst = Case::baseline();
        worst.record = FundamentalsRecord {
            trailing_pe: Some(100.0),
            ..Default::default()
        };
        worst.indicators = IndicatorBundle {
            rsi: Some(90.0),
            price_vs_sma_200: Some(-10.0),
            momentum: Some(-5.0),
            ..Default::default()
        };
        worst.one_year_return = Some(-80.0);
        worst.valuation = valuation(Some(1.0), ValuationLabel::Expensive);
        worst.macro_outlook.sector_outlook = SectorOutlook::Volatile;
        worst.macro_outlook.recession_resilience = Level::Low;
        worst.sentiment.overall = SentimentLabel::Bearish;

        let bottom = worst.run();
        assert_eq!(bottom.scores.value, 0.0);
        assert_eq!(bottom.scores.fundamental, 0.0);
        assert_eq!(bottom.scores.momentum, 0.0);

        for scored in [&top, &bottom] {
            let s = scored.scores;
            for sub in [s.technical, s.fundamental, s.momentum, s.value, s.growth] {
                assert!((0.0..=100.0).contains(&sub), "{:?}", s);
            }
            assert!((0.0..=90.0).contains(&scored.overall));
        }
    }
}
