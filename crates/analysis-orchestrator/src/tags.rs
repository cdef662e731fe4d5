use std::mem::discriminant;

/// Observation surfaced while scoring. Rendered to text only at the output boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    RsiNeutral,
    RsiOversold,
    RsiOverbought,
    AboveSma200,
    BelowSma200,
    AboveSma50,
    BelowSma50,
    AboveSma20,
    MacdAboveSignal,
    MacdBelowSignal,
    BollingerMidRange,
    NearLowerBollinger,
    NearUpperBollinger,
    StochasticBullish,
    StochasticBearish,
    AboveAverageVolume,
    BelowAverageVolume,
    PositiveMomentum,
    NegativeMomentum,
    PeReasonable,
    PeLow,
    PeHigh,
    PegBelowOne,
    PegAcceptable,
    StrongMargins,
    HighReturnOnEquity,
    LowDebt,
    HealthyCurrentRatio,
    StrongRevenueGrowth,
    StrongEarningsGrowth,
    LargeCap,
    MarketAlignedBeta,
    StrongOneYearReturn,
    ExcellentFiveYearReturn,
    ForwardPeBelowTrailing,
}

impl Signal {
    pub fn text(&self) -> String {
        let text = match self {
            Signal::RsiNeutral => "RSI indicates neutral momentum (neither overbought nor oversold)",
            Signal::RsiOversold => "RSI shows oversold conditions - potential buying opportunity",
            Signal::RsiOverbought => "RSI indicates overbought conditions - caution advised",
            Signal::AboveSma200 => "Price above 200-day SMA - long-term uptrend confirmed",
            Signal::BelowSma200 => "Price below 200-day SMA - long-term downtrend",
            Signal::AboveSma50 => "Price above 50-day SMA - medium-term bullish",
            Signal::BelowSma50 => "Price below 50-day SMA - medium-term bearish",
            Signal::AboveSma20 => "Price above 20-day SMA - short-term positive momentum",
            Signal::MacdAboveSignal => "MACD above signal line - bullish momentum",
            Signal::MacdBelowSignal => "MACD below signal line - bearish momentum",
            Signal::BollingerMidRange => "Price within normal Bollinger Band range",
            Signal::NearLowerBollinger => "Price near lower Bollinger Band - potential support",
            Signal::NearUpperBollinger => "Price near upper Bollinger Band - potential resistance",
            Signal::StochasticBullish => "Stochastic shows bullish momentum",
            Signal::StochasticBearish => "Stochastic shows bearish momentum",
            Signal::AboveAverageVolume => "Above-average volume indicates strong interest",
            Signal::BelowAverageVolume => "Below-average volume suggests weak conviction",
            Signal::PositiveMomentum => "Positive momentum detected",
            Signal::NegativeMomentum => "Negative momentum - price declining",
            Signal::PeReasonable => "P/E ratio in reasonable range",
            Signal::PeLow => "Low P/E ratio suggests undervaluation",
            Signal::PeHigh => "High P/E ratio suggests overvaluation",
            Signal::PegBelowOne => "PEG ratio below 1 - good growth at reasonable price",
            Signal::PegAcceptable => "PEG ratio in acceptable range",
            Signal::StrongMargins => "Strong profit margins indicate efficient operations",
            Signal::HighReturnOnEquity => "High return on equity shows efficient capital use",
            Signal::LowDebt => "Low debt-to-equity ratio indicates financial stability",
            Signal::HealthyCurrentRatio => "Healthy current ratio indicates good liquidity",
            Signal::StrongRevenueGrowth => "Strong revenue growth indicates expanding business",
            Signal::StrongEarningsGrowth => "Strong earnings growth shows profitability improvement",
            Signal::LargeCap => "Large market cap indicates established company",
            Signal::MarketAlignedBeta => "Beta near 1 - market-aligned volatility",
            Signal::StrongOneYearReturn => "Strong 1-year return indicates positive momentum",
            Signal::ExcellentFiveYearReturn => "Excellent 5-year return shows long-term growth",
            Signal::ForwardPeBelowTrailing => "Forward P/E lower than trailing - earnings expected to grow",
        };
        text.to_string()
    }

    /// Signals about P/E, margins, debt, revenue or earnings. Return on equity, liquidity,
    /// PEG and size signals stay out of the fundamental reasoning section.
    pub fn is_fundamental(&self) -> bool {
        matches!(
            self,
            Signal::PeReasonable
                | Signal::PeLow
                | Signal::PeHigh
                | Signal::StrongMargins
                | Signal::LowDebt
                | Signal::StrongRevenueGrowth
                | Signal::StrongEarningsGrowth
                | Signal::ForwardPeBelowTrailing
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Risk {
    HighRsi,
    BelowSma200,
    MacdBearishCrossover,
    NearUpperBollinger,
    NegativeMomentum,
    ElevatedPe,
    HighPeg,
    NegativeMargins,
    NegativeReturnOnEquity,
    HighDebt,
    LowLiquidity,
    DecliningRevenue,
    NegativeEarningsGrowth,
    HighBeta,
    NegativeOneYearReturn,
    NegativeFiveYearReturn,
    /// Percent by which the DCF value per share sits below the price (negative).
    DcfDownside(f64),
    RelativelyExpensive,
    SectorHeadwinds(String),
    RecessionVulnerable,
    BearishSentiment,
}

impl Risk {
    pub fn text(&self) -> String {
        match self {
            Risk::HighRsi => "High RSI suggests potential pullback".to_string(),
            Risk::BelowSma200 => {
                "Trading below 200-day moving average indicates weak long-term trend".to_string()
            }
            Risk::MacdBearishCrossover => "MACD bearish crossover indicates weakening momentum".to_string(),
            Risk::NearUpperBollinger => "Near upper Bollinger Band suggests potential pullback".to_string(),
            Risk::NegativeMomentum => "Negative momentum indicates downward price pressure".to_string(),
            Risk::ElevatedPe => "Elevated P/E ratio indicates expensive valuation".to_string(),
            Risk::HighPeg => "High PEG ratio suggests overvaluation relative to growth".to_string(),
            Risk::NegativeMargins => "Negative profit margins indicate financial distress".to_string(),
            Risk::NegativeReturnOnEquity => "Negative ROE indicates poor capital efficiency".to_string(),
            Risk::HighDebt => "High debt-to-equity ratio increases financial risk".to_string(),
            Risk::LowLiquidity => "Current ratio below 1 suggests liquidity concerns".to_string(),
            Risk::DecliningRevenue => "Declining revenue indicates business contraction".to_string(),
            Risk::NegativeEarningsGrowth => {
                "Negative earnings growth indicates declining profitability".to_string()
            }
            Risk::HighBeta => "High beta indicates high volatility and market sensitivity".to_string(),
            Risk::NegativeOneYearReturn => {
                "Negative 1-year return indicates poor recent performance".to_string()
            }
            Risk::NegativeFiveYearReturn => {
                "Negative 5-year return indicates long-term underperformance".to_string()
            }
            Risk::DcfDownside(pct) => format!("DCF model suggests {:.1}% downside risk", pct),
            Risk::RelativelyExpensive => {
                "Relative valuation suggests stock is trading at a premium to market".to_string()
            }
            Risk::SectorHeadwinds(sector) => format!("{} sector faces headwinds", sector),
            Risk::RecessionVulnerable => "Company is vulnerable to economic downturns".to_string(),
            Risk::BearishSentiment => "Market sentiment is bearish".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Opportunity {
    OversoldRsi,
    NearLowerBollinger,
    OversoldStochastic,
    AttractivePe,
    LowPeg,
    HighRevenueGrowth,
    HighEarningsGrowth,
    StrongFiveYearRecord,
    BelowBookValue,
    /// Percent upside to the analyst mean target.
    AnalystUpside(f64),
    DcfUpside(f64),
    RelativelyCheap,
    SectorTailwinds(String),
    DefensiveResilience,
    BullishSentiment,
}

impl Opportunity {
    pub fn text(&self) -> String {
        match self {
            Opportunity::OversoldRsi => "Oversold RSI suggests potential rebound".to_string(),
            Opportunity::NearLowerBollinger => {
                "Near lower Bollinger Band suggests potential bounce".to_string()
            }
            Opportunity::OversoldStochastic => "Oversold stochastic suggests potential reversal".to_string(),
            Opportunity::AttractivePe => "Attractive P/E ratio indicates potential value".to_string(),
            Opportunity::LowPeg => "Low PEG ratio suggests growth potential".to_string(),
            Opportunity::HighRevenueGrowth => "High revenue growth suggests market expansion".to_string(),
            Opportunity::HighEarningsGrowth => {
                "High earnings growth indicates improving fundamentals".to_string()
            }
            Opportunity::StrongFiveYearRecord => {
                "Strong 5-year track record indicates quality investment".to_string()
            }
            Opportunity::BelowBookValue => "Price below book value suggests deep value".to_string(),
            Opportunity::AnalystUpside(pct) => format!("Analyst target suggests {:.1}% upside potential", pct),
            Opportunity::DcfUpside(pct) => format!("DCF model suggests {:.1}% upside potential", pct),
            Opportunity::RelativelyCheap => {
                "Relative valuation suggests stock is trading at a discount to market".to_string()
            }
            Opportunity::SectorTailwinds(sector) => format!("{} sector shows positive outlook", sector),
            Opportunity::DefensiveResilience => {
                "Company shows defensive characteristics in economic downturns".to_string()
            }
            Opportunity::BullishSentiment => "Market sentiment is bullish".to_string(),
        }
    }
}

/// Insertion-ordered list that keeps the first occurrence of each tag variant.
#[derive(Debug, Clone)]
pub struct TagSet<T> {
    items: Vec<T>,
}

impl<T> TagSet<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Returns false when a tag of the same variant is already present.
    pub fn push(&mut self, tag: T) -> bool {
        if self.items.iter().any(|t| discriminant(t) == discriminant(&tag)) {
            return false;
        }
        self.items.push(tag);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Default for TagSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the sub-scores noticed, in the order they noticed it.
#[derive(Debug, Clone, Default)]
pub struct Findings {
    pub signals: TagSet<Signal>,
    pub risks: TagSet<Risk>,
    pub opportunities: TagSet<Opportunity>,
}

impl Findings {
    pub fn signal(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    pub fn risk(&mut self, risk: Risk) {
        self.risks.push(risk);
    }

    pub fn opportunity(&mut self, opportunity: Opportunity) {
        self.opportunities.push(opportunity);
    }

    pub fn signal_texts(&self, limit: usize) -> Vec<String> {
        self.signals.iter().take(limit).map(Signal::text).collect()
    }

    pub fn fundamental_signal_texts(&self) -> Vec<String> {
        self.signals.iter().filter(|s| s.is_fundamental()).map(Signal::text).collect()
    }

    pub fn risk_texts(&self, limit: usize) -> Vec<String> {
        self.risks.iter().take(limit).map(Risk::text).collect()
    }

    pub fn opportunity_texts(&self, limit: usize) -> Vec<String> {
        self.opportunities.iter().take(limit).map(Opportunity::text).collect()
    }
}
