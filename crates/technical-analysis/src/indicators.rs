use analysis_core::stats;
use analysis_core::PriceBar;
use serde::{Deserialize, Serialize};

/// Simple Moving Average series; one value per complete window.
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Exponential Moving Average series, seeded by the first value, alpha = 2 / (span + 1).
pub fn ema(data: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || data.is_empty() {
        return vec![];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len());
    result.push(data[0]);

    for i in 1..data.len() {
        let ema_val = alpha * data[i] + (1.0 - alpha) * result[i - 1];
        result.push(ema_val);
    }

    result
}

/// Latest simple moving average over the trailing `period` points.
pub fn latest_sma(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.len() < period {
        return None;
    }
    stats::mean(&data[data.len() - period..])
}

/// Latest EMA value; unavailable until `span` points exist.
pub fn latest_ema(data: &[f64], span: usize) -> Option<f64> {
    if span == 0 || data.len() < span {
        return None;
    }
    ema(data, span).last().copied()
}

/// Relative Strength Index using simple averages over the trailing `period` deltas.
///
/// Unavailable when there are fewer than `period + 1` closes or when the window holds no
/// losses (the ratio is undefined).
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let window = &closes[closes.len() - period - 1..];
    let (gains, losses) = window.windows(2).fold((0.0, 0.0), |(g, l), w| {
        let change = w[1] - w[0];
        if change > 0.0 {
            (g + change, l)
        } else {
            (g, l - change)
        }
    });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return None;
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// MACD (Moving Average Convergence Divergence)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdValue> {
    if fast == 0 || slow == 0 || signal == 0 || slow < fast || closes.len() < slow {
        return None;
    }

    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);
    let macd_line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
    let signal_line = ema(&macd_line, signal);

    let macd = *macd_line.last()?;
    let signal = *signal_line.last()?;
    Some(MacdValue {
        macd,
        signal,
        histogram: macd - signal,
    })
}

/// Bollinger Bands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// Position of the latest close between the bands, in percent.
    pub percent_b: f64,
    /// Band width relative to the middle band, in percent.
    pub bandwidth: Option<f64>,
}

pub fn bollinger_bands(closes: &[f64], period: usize, k: f64) -> Option<BollingerValue> {
    if period < 2 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    let middle = stats::mean(window)?;
    let std = stats::std_dev(window)?;
    let upper = middle + k * std;
    let lower = middle - k * std;
    let price = *closes.last()?;

    let percent_b = if upper != lower {
        (price - lower) / (upper - lower) * 100.0
    } else {
        50.0
    };
    let bandwidth = if middle > 0.0 {
        Some((upper - lower) / middle * 100.0)
    } else {
        None
    };

    Some(BollingerValue {
        upper,
        middle,
        lower,
        percent_b,
        bandwidth,
    })
}

/// Stochastic Oscillator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticValue {
    pub k: f64,
    pub d: Option<f64>,
}

fn stochastic_k_at(bars: &[PriceBar], end: usize, period: usize) -> Option<f64> {
    let window = &bars[end + 1 - period..=end];
    let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    if highest == lowest {
        return None;
    }
    Some(100.0 * (bars[end].close - lowest) / (highest - lowest))
}

/// %K over the trailing `period` bars and %D as the mean of the last `smoothing` %K values.
pub fn stochastic(bars: &[PriceBar], period: usize, smoothing: usize) -> Option<StochasticValue> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let last = bars.len() - 1;
    let k = stochastic_k_at(bars, last, period)?;

    let d = if smoothing > 0 && bars.len() >= period + smoothing - 1 {
        let recent: Option<Vec<f64>> = (last + 1 - smoothing..=last)
            .map(|end| stochastic_k_at(bars, end, period))
            .collect();
        recent.and_then(|values| stats::mean(&values))
    } else {
        None
    };

    Some(StochasticValue { k, d })
}

/// Average True Range: mean of the trailing `period` true ranges.
pub fn atr(bars: &[PriceBar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let window = &bars[bars.len() - period - 1..];
    let true_ranges: Vec<f64> = window
        .windows(2)
        .map(|w| {
            let high_low = w[1].high - w[1].low;
            let high_close = (w[1].high - w[0].close).abs();
            let low_close = (w[1].low - w[0].close).abs();
            high_low.max(high_close).max(low_close)
        })
        .collect();

    stats::mean(&true_ranges)
}

/// On-Balance Volume at the latest bar.
pub fn obv(bars: &[PriceBar]) -> Option<f64> {
    if bars.len() < 2 {
        return None;
    }

    let total = bars.windows(2).fold(0.0, |acc, w| {
        if w[1].close > w[0].close {
            acc + w[1].volume
        } else if w[1].close < w[0].close {
            acc - w[1].volume
        } else {
            acc
        }
    });
    Some(total)
}

/// Price change over `period` bars.
pub fn momentum(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let last = closes.len() - 1;
    Some(closes[last] - closes[last - period])
}

/// Latest volume as a percentage of the trailing `period` average (latest bar included).
pub fn volume_ratio(volumes: &[f64], period: usize) -> Option<f64> {
    let avg = latest_sma(volumes, period)?;
    if avg <= 0.0 {
        return None;
    }
    Some(volumes.last()? / avg * 100.0)
}
