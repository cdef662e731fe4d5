use analysis_core::{stats, FundamentalsRecord, PriceSeries};
use serde::{Deserialize, Serialize};

pub const MOMENTUM_LOOKBACK: usize = 20;

/// Interest level inferred from volume or ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Interest {
    High,
    Medium,
    Low,
}

impl Interest {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interest::High => "HIGH",
            Interest::Medium => "MEDIUM",
            Interest::Low => "LOW",
        }
    }
}

/// Five-step directional label shared by the momentum and overall readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "VERY BULLISH")]
    VeryBullish,
    #[serde(rename = "BULLISH")]
    Bullish,
    #[serde(rename = "SLIGHTLY BULLISH")]
    SlightlyBullish,
    #[serde(rename = "NEUTRAL")]
    Neutral,
    #[serde(rename = "SLIGHTLY BEARISH")]
    SlightlyBearish,
    #[serde(rename = "BEARISH")]
    Bearish,
    #[serde(rename = "VERY BEARISH")]
    VeryBearish,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::VeryBullish => "VERY BULLISH",
            SentimentLabel::Bullish => "BULLISH",
            SentimentLabel::SlightlyBullish => "SLIGHTLY BULLISH",
            SentimentLabel::Neutral => "NEUTRAL",
            SentimentLabel::SlightlyBearish => "SLIGHTLY BEARISH",
            SentimentLabel::Bearish => "BEARISH",
            SentimentLabel::VeryBearish => "VERY BEARISH",
        }
    }

    pub fn is_bullish(&self) -> bool {
        matches!(self, SentimentLabel::VeryBullish | SentimentLabel::Bullish)
    }

    pub fn is_bearish(&self) -> bool {
        matches!(self, SentimentLabel::VeryBearish | SentimentLabel::Bearish)
    }

    fn from_score(score: i32) -> Self {
        if score > 40 {
            SentimentLabel::Bullish
        } else if score > 15 {
            SentimentLabel::SlightlyBullish
        } else if score < -40 {
            SentimentLabel::Bearish
        } else if score < -15 {
            SentimentLabel::SlightlyBearish
        } else {
            SentimentLabel::Neutral
        }
    }

    fn from_recent_return(return_pct: f64) -> Self {
        if return_pct > 10.0 {
            SentimentLabel::VeryBullish
        } else if return_pct > 5.0 {
            SentimentLabel::Bullish
        } else if return_pct < -10.0 {
            SentimentLabel::VeryBearish
        } else if return_pct < -5.0 {
            SentimentLabel::Bearish
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub overall: SentimentLabel,
    pub score: i32,
    pub retail_interest: Interest,
    pub institutional_interest: Interest,
    /// Only ever BULLISH, NEUTRAL or BEARISH.
    pub analyst_sentiment: SentimentLabel,
    pub momentum_sentiment: SentimentLabel,
    /// Return over the trailing 20 closes, in percent.
    pub recent_return_pct: Option<f64>,
    pub indicators: Vec<String>,
}

/// Market sentiment read from volume, analyst consensus, recent price action and
/// institutional ownership.
pub struct SentimentClassifier;

impl SentimentClassifier {
    pub fn new() -> Self {
        Self
    }

    fn retail_interest(&self, record: &FundamentalsRecord) -> Interest {
        match (record.volume, record.average_volume) {
            (Some(volume), Some(average)) if average > 0.0 => {
                let ratio = volume / average;
                if ratio > 1.5 {
                    Interest::High
                } else if ratio < 0.7 {
                    Interest::Low
                } else {
                    Interest::Medium
                }
            }
            _ => Interest::Medium,
        }
    }

    fn analyst_sentiment(&self, record: &FundamentalsRecord) -> SentimentLabel {
        let key = record.recommendation_key.as_deref().unwrap_or_default().to_uppercase();
        match key.as_str() {
            "STRONG_BUY" | "BUY" => SentimentLabel::Bullish,
            "STRONG_SELL" | "SELL" => SentimentLabel::Bearish,
            _ => SentimentLabel::Neutral,
        }
    }

    fn institutional_interest(&self, record: &FundamentalsRecord) -> Interest {
        match record.institutional_ownership {
            Some(pct) if pct > 70.0 => Interest::High,
            Some(pct) if pct < 30.0 => Interest::Low,
            _ => Interest::Medium,
        }
    }

    /// close[-1] against close[-20]; needs at least 20 bars.
    fn recent_return(&self, history: &PriceSeries) -> Option<f64> {
        if history.len() < MOMENTUM_LOOKBACK {
            return None;
        }
        let closes = history.closes();
        stats::pct_change(closes[closes.len() - MOMENTUM_LOOKBACK], *closes.last()?)
    }

    pub fn classify(&self, record: &FundamentalsRecord, history: &PriceSeries) -> SentimentReport {
        let mut indicators = Vec::new();
        let mut score = 0;

        let retail_interest = self.retail_interest(record);
        match retail_interest {
            Interest::High => {
                score += 20;
                indicators.push("High trading volume suggests strong market interest");
            }
            Interest::Low => {
                score -= 20;
                indicators.push("Low trading volume suggests weak interest");
            }
            Interest::Medium => {}
        }

        let analyst_sentiment = self.analyst_sentiment(record);
        if analyst_sentiment.is_bullish() {
            score += 30;
            indicators.push("Analyst recommendations are bullish");
        } else if analyst_sentiment.is_bearish() {
            score -= 30;
            indicators.push("Analyst recommendations are bearish");
        }

        let recent_return_pct = self.recent_return(history);
        let momentum_sentiment = recent_return_pct
            .map(SentimentLabel::from_recent_return)
            .unwrap_or(SentimentLabel::Neutral);
        match momentum_sentiment {
            SentimentLabel::VeryBullish => {
                indicators.push("Strong recent price momentum indicates positive sentiment");
            }
            SentimentLabel::Bullish => indicators.push("Recent price gains support positive sentiment"),
            SentimentLabel::VeryBearish => {
                indicators.push("Weak recent price momentum indicates negative sentiment");
            }
            SentimentLabel::Bearish => indicators.push("Recent price declines weigh on sentiment"),
            _ => {}
        }
        if momentum_sentiment.is_bullish() {
            score += 25;
        } else if momentum_sentiment.is_bearish() {
            score -= 25;
        }

        let institutional_interest = self.institutional_interest(record);
        match institutional_interest {
            Interest::High => {
                score += 25;
                indicators.push("High institutional ownership indicates professional confidence");
            }
            Interest::Low => {
                score -= 15;
                indicators.push("Low institutional ownership may indicate lack of professional interest");
            }
            Interest::Medium => {}
        }

        SentimentReport {
            overall: SentimentLabel::from_score(score),
            score,
            retail_interest,
            institutional_interest,
            analyst_sentiment,
            momentum_sentiment,
            recent_return_pct,
            indicators: indicators.into_iter().map(String::from).collect(),
        }
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
