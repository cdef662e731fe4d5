//! Sector and market-regime classification.
//!
//! A fixed table of sector rules maps a company's sector and industry onto an outlook and
//! a set of sensitivities; beta supplies the market-conditions reading.

use analysis_core::FundamentalsRecord;
use serde::{Deserialize, Serialize};

pub const HIGH_BETA: f64 = 1.3;
pub const LOW_BETA: f64 = 0.7;

/// Ordinal sensitivity/impact rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "LOW-MEDIUM")]
    LowMedium,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "VERY HIGH")]
    VeryHigh,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "LOW",
            Level::LowMedium => "LOW-MEDIUM",
            Level::Medium => "MEDIUM",
            Level::High => "HIGH",
            Level::VeryHigh => "VERY HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SectorOutlook {
    Positive,
    Neutral,
    Cautious,
    Stable,
    Volatile,
}

impl SectorOutlook {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectorOutlook::Positive => "POSITIVE",
            SectorOutlook::Neutral => "NEUTRAL",
            SectorOutlook::Cautious => "CAUTIOUS",
            SectorOutlook::Stable => "STABLE",
            SectorOutlook::Volatile => "VOLATILE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketConditions {
    #[serde(rename = "NEUTRAL")]
    Neutral,
    #[serde(rename = "HIGH VOLATILITY")]
    HighVolatility,
    #[serde(rename = "LOW VOLATILITY")]
    LowVolatility,
}

impl MarketConditions {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketConditions::Neutral => "NEUTRAL",
            MarketConditions::HighVolatility => "HIGH VOLATILITY",
            MarketConditions::LowVolatility => "LOW VOLATILITY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroOutlook {
    pub sector_outlook: SectorOutlook,
    pub economic_pressures: Vec<String>,
    pub market_conditions: MarketConditions,
    pub interest_rate_sensitivity: Level,
    pub inflation_impact: Level,
    pub recession_resilience: Level,
}

impl Default for MacroOutlook {
    fn default() -> Self {
        Self {
            sector_outlook: SectorOutlook::Neutral,
            economic_pressures: Vec::new(),
            market_conditions: MarketConditions::Neutral,
            interest_rate_sensitivity: Level::Medium,
            inflation_impact: Level::Medium,
            recession_resilience: Level::Medium,
        }
    }
}

struct SectorRule {
    matches: fn(sector: &str, industry: &str) -> bool,
    outlook: SectorOutlook,
    rate_sensitivity: Level,
    inflation_impact: Level,
    recession_resilience: Level,
    pressure: &'static str,
}

// Checked in order; the first match wins.
const SECTOR_RULES: &[SectorRule] = &[
    SectorRule {
        matches: |s, i| s.contains("technology") || i.contains("software") || i.contains("semiconductor"),
        outlook: SectorOutlook::Positive,
        rate_sensitivity: Level::High,
        inflation_impact: Level::Medium,
        recession_resilience: Level::LowMedium,
        pressure: "Technology sector benefits from digital transformation trends",
    },
    SectorRule {
        matches: |s, i| s.contains("financial") || i.contains("bank"),
        outlook: SectorOutlook::Neutral,
        rate_sensitivity: Level::VeryHigh,
        inflation_impact: Level::Medium,
        recession_resilience: Level::Low,
        pressure: "Financial sector highly sensitive to interest rate changes",
    },
    SectorRule {
        matches: |s, _| s.contains("consumer") && s.contains("discretionary"),
        outlook: SectorOutlook::Cautious,
        rate_sensitivity: Level::Medium,
        inflation_impact: Level::High,
        recession_resilience: Level::Low,
        pressure: "Consumer discretionary sensitive to economic cycles",
    },
    SectorRule {
        matches: |s, _| s.contains("consumer") && s.contains("staples"),
        outlook: SectorOutlook::Stable,
        rate_sensitivity: Level::Medium,
        inflation_impact: Level::Medium,
        recession_resilience: Level::High,
        pressure: "Consumer staples provide defensive characteristics",
    },
    SectorRule {
        matches: |s, _| s.contains("healthcare") || s.contains("health"),
        outlook: SectorOutlook::Positive,
        rate_sensitivity: Level::Medium,
        inflation_impact: Level::LowMedium,
        recession_resilience: Level::High,
        pressure: "Healthcare sector shows defensive characteristics",
    },
    SectorRule {
        matches: |s, i| s.contains("energy") || i.contains("oil"),
        outlook: SectorOutlook::Volatile,
        rate_sensitivity: Level::Medium,
        inflation_impact: Level::High,
        recession_resilience: Level::Medium,
        pressure: "Energy sector subject to commodity price volatility",
    },
    SectorRule {
        matches: |s, _| s.contains("utilities"),
        outlook: SectorOutlook::Stable,
        rate_sensitivity: Level::High,
        inflation_impact: Level::Medium,
        recession_resilience: Level::High,
        pressure: "Utilities provide stable dividends but sensitive to rates",
    },
    SectorRule {
        matches: |s, i| s.contains("real estate") || i.contains("reit"),
        outlook: SectorOutlook::Cautious,
        rate_sensitivity: Level::VeryHigh,
        inflation_impact: Level::Medium,
        recession_resilience: Level::LowMedium,
        pressure: "Real estate highly sensitive to interest rates and economic cycles",
    },
];

pub fn classify(record: &FundamentalsRecord) -> MacroOutlook {
    let sector = record.sector.as_deref().unwrap_or_default().to_lowercase();
    let industry = record.industry.as_deref().unwrap_or_default().to_lowercase();

    let mut outlook = MacroOutlook::default();

    if let Some(rule) = SECTOR_RULES.iter().find(|r| (r.matches)(&sector, &industry)) {
        outlook.sector_outlook = rule.outlook;
        outlook.interest_rate_sensitivity = rule.rate_sensitivity;
        outlook.inflation_impact = rule.inflation_impact;
        outlook.recession_resilience = rule.recession_resilience;
        outlook.economic_pressures.push(rule.pressure.to_string());
    }

    let beta = record.beta.unwrap_or(1.0);
    if beta > HIGH_BETA {
        outlook.market_conditions = MarketConditions::HighVolatility;
        outlook
            .economic_pressures
            .push("High beta indicates high market sensitivity".to_string());
    } else if beta < LOW_BETA {
        outlook.market_conditions = MarketConditions::LowVolatility;
        outlook
            .economic_pressures
            .push("Low beta indicates defensive characteristics".to_string());
    }

    outlook
}
