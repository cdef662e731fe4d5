use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "WEAK HOLD")]
    WeakHold,
    #[serde(rename = "SELL")]
    Sell,
    /// Only used by degraded results.
    #[serde(rename = "NEUTRAL")]
    Neutral,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::StrongBuy => "STRONG BUY",
            Rating::Buy => "BUY",
            Rating::Hold => "HOLD",
            Rating::WeakHold => "WEAK HOLD",
            Rating::Sell => "SELL",
            Rating::Neutral => "NEUTRAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY",
            Recommendation::Hold => "HOLD",
            Recommendation::Sell => "SELL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outlook {
    #[serde(rename = "VERY POSITIVE")]
    VeryPositive,
    #[serde(rename = "POSITIVE")]
    Positive,
    #[serde(rename = "NEUTRAL")]
    Neutral,
    #[serde(rename = "CAUTIOUS")]
    Cautious,
    #[serde(rename = "NEGATIVE")]
    Negative,
    #[serde(rename = "MODERATE")]
    Moderate,
}

impl Outlook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outlook::VeryPositive => "VERY POSITIVE",
            Outlook::Positive => "POSITIVE",
            Outlook::Neutral => "NEUTRAL",
            Outlook::Cautious => "CAUTIOUS",
            Outlook::Negative => "NEGATIVE",
            Outlook::Moderate => "MODERATE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "LOW-MEDIUM")]
    LowMedium,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "MEDIUM-HIGH")]
    MediumHigh,
    #[serde(rename = "HIGH")]
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::LowMedium => "LOW-MEDIUM",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::MediumHigh => "MEDIUM-HIGH",
            RiskLevel::High => "HIGH",
        }
    }
}

/// The fixed rating/recommendation/outlook/risk tuple for a score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingBand {
    pub rating: Rating,
    pub recommendation: Recommendation,
    pub outlook: Outlook,
    pub risk_level: RiskLevel,
}

impl RatingBand {
    /// Lower bounds are inclusive.
    pub fn from_score(score: f64) -> Self {
        let (rating, recommendation, outlook, risk_level) = if score >= 75.0 {
            (Rating::StrongBuy, Recommendation::Buy, Outlook::VeryPositive, RiskLevel::LowMedium)
        } else if score >= 65.0 {
            (Rating::Buy, Recommendation::Buy, Outlook::Positive, RiskLevel::Medium)
        } else if score >= 55.0 {
            (Rating::Hold, Recommendation::Hold, Outlook::Neutral, RiskLevel::Medium)
        } else if score >= 45.0 {
            (Rating::WeakHold, Recommendation::Hold, Outlook::Cautious, RiskLevel::MediumHigh)
        } else {
            (Rating::Sell, Recommendation::Sell, Outlook::Negative, RiskLevel::High)
        };
        Self {
            rating,
            recommendation,
            outlook,
            risk_level,
        }
    }

    pub fn degraded() -> Self {
        Self {
            rating: Rating::Neutral,
            recommendation: Recommendation::Hold,
            outlook: Outlook::Moderate,
            risk_level: RiskLevel::Medium,
        }
    }
}

/// Analyst mean target when known, otherwise the current price scaled by score band.
pub fn price_target(score: f64, target_mean: Option<f64>, current_price: Option<f64>) -> Option<f64> {
    if let Some(target) = target_mean.filter(|t| *t > 0.0) {
        return Some(target);
    }
    let price = current_price.filter(|p| *p > 0.0)?;
    let multiplier = if score >= 65.0 {
        1.15
    } else if score >= 55.0 {
        1.05
    } else if score >= 45.0 {
        0.95
    } else {
        0.85
    };
    Some(price * multiplier)
}
