use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::Context;
use fundamental_analysis::{ValuationAssumptions, MAX_DCF_YEARS};

/// Runtime settings read from the environment (and `.env`, if present).
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allow_any: bool,
    pub valuation: ValuationAssumptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            cors_allow_any: true,
            valuation: ValuationAssumptions::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset or blank keys keep their defaults; values that fail to parse are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let v = defaults.valuation;

        let valuation = ValuationAssumptions {
            risk_free_rate: parse_or(&lookup, "DCF_RISK_FREE_RATE", v.risk_free_rate)?,
            market_premium: parse_or(&lookup, "DCF_MARKET_PREMIUM", v.market_premium)?,
            terminal_growth: parse_or(&lookup, "DCF_TERMINAL_GROWTH", v.terminal_growth)?,
            years: parse_or(&lookup, "DCF_YEARS", v.years)?,
            default_growth: parse_or(&lookup, "DCF_DEFAULT_GROWTH", v.default_growth)?,
            min_growth: parse_or(&lookup, "DCF_MIN_GROWTH", v.min_growth)?,
            max_growth: parse_or(&lookup, "DCF_MAX_GROWTH", v.max_growth)?,
            ..v
        };
        if valuation.years == 0 || valuation.years > MAX_DCF_YEARS {
            anyhow::bail!("DCF_YEARS must be between 1 and {}, got {}", MAX_DCF_YEARS, valuation.years);
        }
        if valuation.min_growth > valuation.max_growth {
            anyhow::bail!(
                "DCF_MIN_GROWTH ({}) must not exceed DCF_MAX_GROWTH ({})",
                valuation.min_growth,
                valuation.max_growth
            );
        }

        Ok(Self {
            host: lookup("HOST").filter(|h| !h.trim().is_empty()).unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            cors_allow_any: parse_or(&lookup, "CORS_ALLOW_ANY", defaults.cors_allow_any)?,
            valuation,
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        _ => Ok(default),
    }
}
