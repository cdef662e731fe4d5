//! Templated prose built from values the scorer already computed.

use analysis_core::FundamentalsRecord;
use fundamental_analysis::{ValuationLabel, ValuationReport};
use macro_analysis::{Level, MacroOutlook, SectorOutlook};
use sentiment_analysis::{Interest, SentimentLabel, SentimentReport};
use serde::{Deserialize, Serialize};
use technical_analysis::IndicatorBundle;

use crate::rating::RatingBand;
use crate::scoring::ScoreSet;
use crate::tags::Findings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Bullish,
    Neutral,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FinancialHealth {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalNarrative {
    pub score: f64,
    pub key_indicators: Vec<String>,
    pub trend: Trend,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalNarrative {
    pub score: f64,
    pub key_metrics: Vec<String>,
    pub financial_health: FinancialHealth,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationNarrative {
    pub dcf_value: Option<f64>,
    pub relative_valuation: ValuationLabel,
    pub value_score: f64,
    pub details: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroNarrative {
    pub sector_outlook: SectorOutlook,
    pub economic_pressures: Vec<String>,
    pub interest_rate_sensitivity: Level,
    pub recession_resilience: Level,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentNarrative {
    pub overall_sentiment: SentimentLabel,
    pub analyst_sentiment: SentimentLabel,
    pub momentum_sentiment: SentimentLabel,
    pub indicators: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: crate::rating::RiskLevel,
    pub risk_score: u32,
    pub key_risks: Vec<String>,
    pub risk_factors: Vec<String>,
    pub summary: String,
}

/// Per-category explanations. Sections are absent on degraded results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedReasoning {
    pub executive_summary: String,
    pub technical: Option<TechnicalNarrative>,
    pub fundamental: Option<FundamentalNarrative>,
    pub valuation: Option<ValuationNarrative>,
    pub macro_factors: Option<MacroNarrative>,
    pub sentiment: Option<SentimentNarrative>,
    pub risk: Option<RiskAssessment>,
    pub investment_thesis: String,
    pub conclusion: String,
}

pub struct NarrativeContext<'a> {
    pub symbol: &'a str,
    pub company_name: &'a str,
    pub fundamentals: &'a FundamentalsRecord,
    pub indicators: &'a IndicatorBundle,
    pub current_price: Option<f64>,
    pub scores: &'a ScoreSet,
    pub overall: f64,
    pub band: RatingBand,
    pub price_target: Option<f64>,
    pub time_horizon: &'a str,
    pub valuation: &'a ValuationReport,
    pub macro_outlook: &'a MacroOutlook,
    pub sentiment: &'a SentimentReport,
    pub findings: &'a Findings,
}

fn first_n<T>(items: impl Iterator<Item = T>, n: usize) -> Vec<T> {
    items.take(n).collect()
}

impl NarrativeContext<'_> {
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "{} ({}) shows an overall investment score of {:.1}/100. ",
            self.company_name, self.symbol, self.overall
        )];

        if self.overall >= 65.0 {
            parts.push("The analysis indicates a STRONG BUY or BUY recommendation. ".to_string());
            parts.push(
                "Technical indicators are favorable, fundamentals appear solid, and the stock shows positive momentum. "
                    .to_string(),
            );
            let opportunities = self.findings.opportunity_texts(2);
            if !opportunities.is_empty() {
                parts.push(format!("Key opportunities include: {}. ", opportunities.join(", ")));
            }
        } else if self.overall >= 45.0 {
            parts.push("The analysis suggests a HOLD position. ".to_string());
            parts.push(
                "While some positive factors exist, there are also concerns that warrant caution. ".to_string(),
            );
            let risks = self.findings.risk_texts(2);
            if !risks.is_empty() {
                parts.push(format!("Main risks include: {}. ", risks.join(", ")));
            }
        } else {
            parts.push("The analysis indicates a SELL or WEAK HOLD recommendation. ".to_string());
            parts.push("Multiple risk factors and weak fundamentals suggest caution. ".to_string());
            let risks = self.findings.risk_texts(2);
            if !risks.is_empty() {
                parts.push(format!("Critical concerns: {}. ", risks.join(", ")));
            }
        }

        parts.push(format!(
            "Technical score: {:.1}/100, Fundamental score: {:.1}/100. ",
            self.scores.technical, self.scores.fundamental
        ));
        parts.push(format!(
            "For long-term investors, this represents a {} opportunity with {} risk.",
            self.band.outlook.as_str(),
            self.band.risk_level.as_str()
        ));
        parts.concat()
    }

    fn executive_summary(&self) -> String {
        format!(
            "After comprehensive analysis of {} ({}), the evaluation has assigned an overall investment \
             score of {:.1}/100, resulting in a {} recommendation. This assessment integrates technical \
             analysis, fundamental metrics, valuation models (DCF and relative), macroeconomic trends, market \
             sentiment, and risk factors. The analysis indicates a {} long-term outlook with {} risk levels.",
            self.company_name,
            self.symbol,
            self.overall,
            self.band.rating.as_str(),
            self.band.outlook.as_str(),
            self.band.risk_level.as_str()
        )
    }

    fn technical(&self) -> TechnicalNarrative {
        let ind = self.indicators;
        let mut details = Vec::new();

        if let Some(rsi) = ind.rsi {
            details.push(if rsi < 30.0 {
                format!(
                    "RSI of {:.1} indicates oversold conditions, suggesting potential buying opportunity as the stock may be undervalued short-term.",
                    rsi
                )
            } else if rsi > 70.0 {
                format!(
                    "RSI of {:.1} indicates overbought conditions, suggesting the stock may be due for a pullback.",
                    rsi
                )
            } else {
                format!("RSI of {:.1} is in neutral territory, indicating balanced momentum.", rsi)
            });
        }

        if let Some(distance) = ind.price_vs_sma_200 {
            details.push(if distance > 0.0 {
                format!(
                    "Price is {:.1}% above the 200-day moving average, confirming a long-term uptrend.",
                    distance
                )
            } else {
                format!(
                    "Price is {:.1}% below the 200-day moving average, indicating a long-term downtrend.",
                    distance.abs()
                )
            });
        }

        if let Some(macd) = ind.macd {
            let (position, momentum) = if macd.macd > macd.signal {
                ("above", "bullish")
            } else {
                ("below", "bearish")
            };
            details.push(format!(
                "MACD ({:.4}) is {} signal line ({:.4}), indicating {} momentum.",
                macd.macd, position, macd.signal, momentum
            ));
        }

        let score = self.scores.technical;
        let trend = if score > 60.0 {
            Trend::Bullish
        } else if score < 40.0 {
            Trend::Bearish
        } else {
            Trend::Neutral
        };

        TechnicalNarrative {
            score,
            summary: format!(
                "Technical analysis yields a score of {:.1}/100. {}",
                score,
                first_n(details.iter().cloned(), 3).join(" ")
            ),
            key_indicators: details,
            trend,
        }
    }

    fn fundamental(&self) -> FundamentalNarrative {
        let f = self.fundamentals;
        let mut details = Vec::new();

        if let Some(pe) = f.trailing_pe.filter(|pe| *pe > 0.0) {
            details.push(if pe < 15.0 {
                format!(
                    "P/E ratio of {:.1} is attractive, suggesting the stock may be undervalued relative to earnings.",
                    pe
                )
            } else if pe > 30.0 {
                format!(
                    "P/E ratio of {:.1} is elevated, suggesting the stock may be overvalued and pricing in high growth expectations.",
                    pe
                )
            } else {
                format!("P/E ratio of {:.1} is in a reasonable range.", pe)
            });
        }

        if let Some(margin) = f.profit_margin {
            if margin > 0.15 {
                details.push(format!(
                    "Profit margin of {:.1}% is strong, indicating efficient operations and pricing power.",
                    margin * 100.0
                ));
            } else if margin < 0.0 {
                details.push(format!(
                    "Negative profit margin of {:.1}% indicates the company is losing money, a significant concern.",
                    margin * 100.0
                ));
            }
        }

        if let Some(roe) = f.return_on_equity {
            if roe > 0.15 {
                details.push(format!(
                    "Return on Equity of {:.1}% is excellent, showing efficient use of shareholder capital.",
                    roe * 100.0
                ));
            } else if roe < 0.0 {
                details.push(format!("Negative ROE of {:.1}% indicates poor capital efficiency.", roe * 100.0));
            }
        }

        if let Some(growth) = f.revenue_growth {
            if growth > 0.10 {
                details.push(format!(
                    "Revenue growth of {:.1}% is strong, indicating expanding business and market share gains.",
                    growth * 100.0
                ));
            } else if growth < 0.0 {
                details.push(format!(
                    "Declining revenue of {:.1}% indicates business contraction and competitive challenges.",
                    (growth * 100.0).abs()
                ));
            }
        }

        let score = self.scores.fundamental;
        let financial_health = if score > 65.0 {
            FinancialHealth::Strong
        } else if score < 45.0 {
            FinancialHealth::Weak
        } else {
            FinancialHealth::Moderate
        };

        FundamentalNarrative {
            score,
            summary: format!(
                "Fundamental analysis yields a score of {:.1}/100. {}",
                score,
                first_n(details.iter().cloned(), 3).join(" ")
            ),
            key_metrics: details,
            financial_health,
        }
    }

    fn valuation(&self) -> ValuationNarrative {
        let mut details = Vec::new();
        let dcf_value = self.valuation.intrinsic_value();

        if let (Some(dcf), Some(value)) = (self.valuation.dcf.as_ref(), dcf_value) {
            let price = self.current_price.unwrap_or(0.0);
            let change = self.valuation.dcf_upside_pct.unwrap_or(0.0);
            let direction = if change > 0.0 {
                format!("{:.1}% upside potential", change)
            } else {
                format!("{:.1}% downside risk", change.abs())
            };
            details.push(format!(
                "DCF (Discounted Cash Flow) model calculates an intrinsic value of ${:.2} per share, compared to \
                 current price of ${:.2}. This suggests {}. Assumptions: {:.1}% growth rate, {:.1}% discount rate, \
                 {:.1}% terminal growth.",
                value,
                price,
                direction,
                dcf.assumptions.growth_rate * 100.0,
                dcf.assumptions.discount_rate * 100.0,
                dcf.assumptions.terminal_growth * 100.0
            ));
        }

        let relative = &self.valuation.relative;
        let pct = |v: Option<f64>| match v {
            Some(p) => format!("{:.1}%", p),
            None => "N/A".to_string(),
        };
        details.push(format!(
            "Relative valuation analysis indicates the stock is {} compared to market averages. P/E ratio is {} \
             of market average, P/B ratio is {} of market average, and P/S ratio is {} of market average.",
            relative.overall,
            pct(relative.pe_vs_market),
            pct(relative.pb_vs_market),
            pct(relative.ps_vs_market)
        ));

        ValuationNarrative {
            dcf_value,
            relative_valuation: relative.overall,
            value_score: self.scores.value,
            summary: details.join(" "),
            details,
        }
    }

    fn macro_factors(&self) -> MacroNarrative {
        let m = self.macro_outlook;
        let sector = self.fundamentals.sector.as_deref().unwrap_or("Unclassified");
        let sensitivity = match m.interest_rate_sensitivity {
            Level::High | Level::VeryHigh => "highly",
            Level::Medium | Level::LowMedium => "moderately",
            Level::Low => "minimally",
        };

        let mut details = vec![format!(
            "Sector Outlook: {}. {} sector analysis indicates this outlook based on industry trends and economic cycles.",
            m.sector_outlook.as_str(),
            sector
        )];
        if !m.economic_pressures.is_empty() {
            details.push(format!(
                "Economic Pressures: {}",
                first_n(m.economic_pressures.iter().cloned(), 3).join("; ")
            ));
        }
        details.push(format!(
            "Interest Rate Sensitivity: {}. This stock is {} sensitive to interest rate changes.",
            m.interest_rate_sensitivity.as_str(),
            sensitivity
        ));
        details.push(format!(
            "Recession Resilience: {}. This indicates how well the company may perform during economic downturns.",
            m.recession_resilience.as_str()
        ));

        MacroNarrative {
            sector_outlook: m.sector_outlook,
            economic_pressures: m.economic_pressures.clone(),
            interest_rate_sensitivity: m.interest_rate_sensitivity,
            recession_resilience: m.recession_resilience,
            summary: details.join(" "),
        }
    }

    fn sentiment(&self) -> SentimentNarrative {
        let s = self.sentiment;
        let interest = |i: Interest| i.as_str();
        let details = [
            format!(
                "Overall Market Sentiment: {}. This reflects the collective market psychology and investor confidence.",
                s.overall
            ),
            format!(
                "Analyst Sentiment: {}. Professional analysts' recommendations indicate this sentiment.",
                s.analyst_sentiment
            ),
            format!(
                "Price Momentum Sentiment: {}. Recent price action suggests this momentum trend.",
                s.momentum_sentiment
            ),
            format!(
                "Retail Interest: {}. Trading volume patterns indicate this level of retail investor participation.",
                interest(s.retail_interest)
            ),
            format!(
                "Institutional Interest: {}. Institutional ownership levels suggest this level of professional investor confidence.",
                interest(s.institutional_interest)
            ),
        ];

        SentimentNarrative {
            overall_sentiment: s.overall,
            analyst_sentiment: s.analyst_sentiment,
            momentum_sentiment: s.momentum_sentiment,
            indicators: s.indicators.clone(),
            summary: details.join(" "),
        }
    }

    fn risk(&self) -> RiskAssessment {
        let mut factors = Vec::new();
        let mut score = 0u32;
        let risk_count = self.findings.risks.len();

        if risk_count > 5 {
            score += 20;
            factors.push("Multiple significant risk factors identified, indicating elevated investment risk.".to_string());
        } else if risk_count > 3 {
            score += 10;
            factors.push("Several risk factors present that warrant careful consideration.".to_string());
        }
        if self.scores.fundamental < 40.0 {
            score += 15;
            factors.push("Weak fundamental score suggests underlying business challenges.".to_string());
        }
        if self.scores.technical < 40.0 {
            score += 10;
            factors.push("Weak technical indicators suggest negative price momentum.".to_string());
        }
        if self.macro_outlook.recession_resilience == Level::Low {
            score += 10;
            factors.push("Low recession resilience increases vulnerability to economic downturns.".to_string());
        }
        if let Some(beta) = self.fundamentals.beta.filter(|b| *b > 1.5) {
            score += 10;
            factors.push(format!(
                "High beta ({:.2}) indicates high volatility and market sensitivity.",
                beta
            ));
        }

        let key_risks = self.findings.risk_texts(10);
        let mut summary = format!(
            "Risk assessment indicates {} risk level. {}",
            self.band.risk_level.as_str(),
            first_n(factors.iter().cloned(), 2).join(" ")
        );
        if !key_risks.is_empty() {
            summary.push(' ');
            summary.push_str(&first_n(key_risks.iter().cloned(), 3).join("; "));
        }

        RiskAssessment {
            risk_level: self.band.risk_level,
            risk_score: score.min(100),
            key_risks,
            risk_factors: factors,
            summary,
        }
    }

    fn investment_thesis(&self) -> String {
        let name = self.company_name;
        let s = self.scores;
        let mut parts = Vec::new();

        if self.overall >= 65.0 {
            parts.push(format!(
                "{} presents a compelling investment opportunity based on strong fundamentals, favorable technical indicators, and attractive valuation. ",
                name
            ));
            parts.push(format!(
                "The company demonstrates solid financial health with a fundamental score of {:.1}/100. ",
                s.fundamental
            ));
            if s.technical > 60.0 {
                parts.push(format!(
                    "Technical analysis supports a bullish outlook with a score of {:.1}/100. ",
                    s.technical
                ));
            }
            if s.value > 60.0 {
                parts.push(format!(
                    "Valuation metrics suggest the stock is attractively priced with a value score of {:.1}/100. ",
                    s.value
                ));
            }
            if self.sentiment.overall == SentimentLabel::Bullish {
                parts.push("Market sentiment is positive, supporting the investment case. ".to_string());
            }
        } else if self.overall >= 45.0 {
            parts.push(format!(
                "{} presents a mixed investment profile with both positive and negative factors. ",
                name
            ));
            parts.push(format!(
                "While fundamentals score {:.1}/100, there are concerns that limit upside potential. ",
                s.fundamental
            ));
            parts.push(
                "Investors should carefully weigh the opportunities against the risks before making a decision. "
                    .to_string(),
            );
        } else {
            parts.push(format!("{} faces significant challenges that limit its investment appeal. ", name));
            parts.push(format!(
                "With a fundamental score of {:.1}/100 and technical score of {:.1}/100, the stock shows weakness. ",
                s.fundamental, s.technical
            ));
            parts.push("Multiple risk factors and weak fundamentals suggest caution is warranted. ".to_string());
        }

        let opportunities = self.findings.opportunity_texts(3);
        if !opportunities.is_empty() {
            parts.push(format!("Key opportunities include: {}. ", opportunities.join(", ")));
        }
        parts.concat()
    }

    fn conclusion(&self) -> String {
        let s = self.scores;
        let mut parts = vec![
            format!(
                "In conclusion, after comprehensive analysis incorporating technical indicators, fundamental metrics, \
                 DCF and relative valuation models, macroeconomic trends, market sentiment, and risk factors, {} ({}) \
                 receives an overall investment score of {:.1}/100, resulting in a {} recommendation. ",
                self.company_name,
                self.symbol,
                self.overall,
                self.band.rating.as_str()
            ),
            format!(
                "The analysis indicates: Technical Analysis: {:.1}/100, Fundamental Analysis: {:.1}/100, \
                 Momentum: {:.1}/100, Value: {:.1}/100, Growth: {:.1}/100. ",
                s.technical, s.fundamental, s.momentum, s.value, s.growth
            ),
        ];

        if let (Some(target), Some(price)) = (self.price_target, self.current_price.filter(|p| *p > 0.0)) {
            parts.push(format!(
                "Based on this analysis, the price target is ${:.2}, representing {:.1}% {} from the current price of ${:.2}. ",
                target,
                (target - price) / price * 100.0,
                if target > price { "upside" } else { "downside" },
                price
            ));
        }

        parts.push(format!(
            "For investors with a {} time horizon, this represents a {} opportunity with {} risk. ",
            self.time_horizon,
            self.band.outlook.as_str(),
            self.band.risk_level.as_str()
        ));

        let headline = |text: String| match text.split_once(':') {
            Some((head, _)) => head.to_string(),
            None => text.chars().take(50).collect(),
        };
        let risks: Vec<String> = self.findings.risk_texts(3).into_iter().map(headline).collect();
        let opportunities: Vec<String> = self.findings.opportunity_texts(2).into_iter().map(headline).collect();
        parts.push(format!(
            "Investors should monitor key factors including: {}, and consider the opportunities: {}.",
            if risks.is_empty() {
                "general market conditions".to_string()
            } else {
                risks.join(", ")
            },
            if opportunities.is_empty() {
                "market recovery".to_string()
            } else {
                opportunities.join(", ")
            }
        ));

        parts.concat()
    }

    pub fn reasoning(&self) -> DetailedReasoning {
        DetailedReasoning {
            executive_summary: self.executive_summary(),
            technical: Some(self.technical()),
            fundamental: Some(self.fundamental()),
            valuation: Some(self.valuation()),
            macro_factors: Some(self.macro_factors()),
            sentiment: Some(self.sentiment()),
            risk: Some(self.risk()),
            investment_thesis: self.investment_thesis(),
            conclusion: self.conclusion(),
        }
    }
}
