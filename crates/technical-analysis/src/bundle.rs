use analysis_core::{stats, AnalysisError, PriceSeries};
use serde::{Deserialize, Serialize};

use crate::indicators::*;

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_K: f64 = 2.0;
pub const STOCHASTIC_PERIOD: usize = 14;
pub const STOCHASTIC_SMOOTHING: usize = 3;
pub const ATR_PERIOD: usize = 14;
pub const MOMENTUM_PERIOD: usize = 10;
pub const VOLUME_AVERAGE_PERIOD: usize = 20;

/// Technical indicator values at the latest point of a price series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBundle {
    pub price: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<MacdValue>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
    pub bollinger: Option<BollingerValue>,
    pub stochastic: Option<StochasticValue>,
    pub atr: Option<f64>,
    pub obv: Option<f64>,
    pub momentum: Option<f64>,
    /// Percent distance of the latest close above (+) or below (-) each SMA.
    pub price_vs_sma_20: Option<f64>,
    pub price_vs_sma_50: Option<f64>,
    pub price_vs_sma_200: Option<f64>,
    /// Latest volume as a percentage of the 20-bar average.
    pub volume_ratio: Option<f64>,
}

/// Runs `compute` only when the series is long enough, logging the shortfall otherwise.
fn gated<T>(series: &PriceSeries, indicator: &'static str, required: usize, compute: impl FnOnce() -> Option<T>) -> Option<T> {
    match series.require(indicator, required) {
        Ok(()) => compute(),
        Err(e @ AnalysisError::InsufficientHistory { .. }) => {
            tracing::debug!("{}", e);
            None
        }
        Err(e) => {
            tracing::warn!("Unexpected indicator error: {}", e);
            None
        }
    }
}

fn distance_pct(price: Option<f64>, average: Option<f64>) -> Option<f64> {
    let (price, average) = (price?, average?);
    stats::pct_change(average, price)
}

impl IndicatorBundle {
    /// Computes every indicator independently; each degrades to `None` on short history.
    pub fn compute(series: &PriceSeries) -> Self {
        let closes = series.closes();
        let volumes = series.volumes();
        let bars = series.bars();
        let price = series.last().map(|b| b.close);

        let sma_20 = gated(series, "SMA(20)", 20, || latest_sma(&closes, 20));
        let sma_50 = gated(series, "SMA(50)", 50, || latest_sma(&closes, 50));
        let sma_200 = gated(series, "SMA(200)", 200, || latest_sma(&closes, 200));

        Self {
            price,
            rsi: gated(series, "RSI", RSI_PERIOD + 1, || rsi(&closes, RSI_PERIOD)),
            macd: gated(series, "MACD", MACD_SLOW, || macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL)),
            sma_20,
            sma_50,
            sma_200,
            ema_12: gated(series, "EMA(12)", 12, || latest_ema(&closes, 12)),
            ema_26: gated(series, "EMA(26)", 26, || latest_ema(&closes, 26)),
            bollinger: gated(series, "Bollinger Bands", BOLLINGER_PERIOD, || {
                bollinger_bands(&closes, BOLLINGER_PERIOD, BOLLINGER_K)
            }),
            stochastic: gated(series, "Stochastic", STOCHASTIC_PERIOD, || {
                stochastic(bars, STOCHASTIC_PERIOD, STOCHASTIC_SMOOTHING)
            }),
            atr: gated(series, "ATR", ATR_PERIOD + 1, || atr(bars, ATR_PERIOD)),
            obv: gated(series, "OBV", 2, || obv(bars)),
            momentum: gated(series, "Momentum", MOMENTUM_PERIOD + 1, || momentum(&closes, MOMENTUM_PERIOD)),
            price_vs_sma_20: distance_pct(price, sma_20),
            price_vs_sma_50: distance_pct(price, sma_50),
            price_vs_sma_200: distance_pct(price, sma_200),
            volume_ratio: gated(series, "Volume ratio", VOLUME_AVERAGE_PERIOD, || {
                volume_ratio(&volumes, VOLUME_AVERAGE_PERIOD)
            }),
        }
    }
}

/// Percent return over the trailing `points` closes: latest close vs the close `points`
/// positions from the end (so `points = 20` compares against `closes[len - 20]`).
pub fn trailing_return(series: &PriceSeries, points: usize) -> Option<f64> {
    if points == 0 || series.len() < points {
        return None;
    }
    let closes = series.closes();
    let latest = *closes.last()?;
    stats::pct_change(closes[closes.len() - points], latest)
}
