use std::collections::BTreeMap;

use analysis_core::{stats, PriceSeries};
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::bundle::trailing_return;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Open/close/extremes for one calendar year of history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyPerformance {
    pub year: i32,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub return_pct: Option<f64>,
}

/// High, low and first-to-last return over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub high: f64,
    pub low: f64,
    pub return_pct: Option<f64>,
}

impl WindowStats {
    fn of(series: &PriceSeries) -> Option<Self> {
        let first = series.first()?;
        let last = series.last()?;
        let closes = series.closes();
        Some(Self {
            high: closes.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            low: closes.iter().copied().fold(f64::INFINITY, f64::min),
            return_pct: stats::pct_change(first.close, last.close),
        })
    }
}

/// Descriptive statistics over the available history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub data_start: Option<DateTime<Utc>>,
    pub data_end: Option<DateTime<Utc>>,
    pub trading_days: usize,
    pub years_of_data: Option<f64>,
    pub start_price: Option<f64>,
    pub total_return_pct: Option<f64>,
    pub all_time_high: Option<f64>,
    pub all_time_high_date: Option<DateTime<Utc>>,
    pub all_time_low: Option<f64>,
    pub all_time_low_date: Option<DateTime<Utc>>,
    pub all_time_average: Option<f64>,
    pub all_time_median: Option<f64>,
    pub all_time_std_dev: Option<f64>,
    pub one_year: Option<WindowStats>,
    pub five_year: Option<WindowStats>,
    pub change_5d: Option<f64>,
    pub change_20d: Option<f64>,
    pub change_60d: Option<f64>,
    /// Annualised volatility of the last 30 simple returns, in percent.
    pub volatility_30d: Option<f64>,
    pub yearly: Vec<YearlyPerformance>,
}

impl PerformanceSummary {
    /// `recent` is the one-year daily series; `long` the maximum available history.
    pub fn compute(recent: &PriceSeries, long: Option<&PriceSeries>) -> Self {
        let mut summary = Self {
            one_year: one_year_window(recent),
            change_5d: trailing_return(recent, 5),
            change_20d: trailing_return(recent, 20),
            change_60d: trailing_return(recent, 60),
            volatility_30d: annualised_volatility(recent, 30),
            ..Self::default()
        };

        let Some(long) = long.filter(|s| !s.is_empty()) else {
            return summary;
        };

        let bars = long.bars();
        let closes = long.closes();
        summary.data_start = long.first().map(|b| b.timestamp);
        summary.data_end = long.last().map(|b| b.timestamp);
        summary.trading_days = long.len();
        summary.start_price = long.first().map(|b| b.close);
        summary.total_return_pct = match (long.first(), long.last()) {
            (Some(first), Some(last)) => stats::pct_change(first.close, last.close),
            _ => None,
        };
        summary.years_of_data = match (summary.data_start, summary.data_end) {
            (Some(start), Some(end)) => Some((end - start).num_days() as f64 / 365.25),
            _ => None,
        };

        if let Some(high) = bars.iter().max_by(|a, b| a.close.total_cmp(&b.close)) {
            summary.all_time_high = Some(high.close);
            summary.all_time_high_date = Some(high.timestamp);
        }
        if let Some(low) = bars.iter().min_by(|a, b| a.close.total_cmp(&b.close)) {
            summary.all_time_low = Some(low.close);
            summary.all_time_low_date = Some(low.timestamp);
        }
        summary.all_time_average = stats::mean(&closes);
        summary.all_time_median = stats::median(&closes);
        summary.all_time_std_dev = stats::std_dev(&closes);
        summary.five_year = WindowStats::of(&long.trailing_window(Duration::days(5 * 365)));
        summary.yearly = yearly_performance(long);

        summary
    }
}

fn one_year_window(series: &PriceSeries) -> Option<WindowStats> {
    WindowStats::of(&series.trailing_window(Duration::days(365)))
}

/// 1-year return in percent, measured inside the trailing 365 days of `series`.
pub fn one_year_return(series: &PriceSeries) -> Option<f64> {
    one_year_window(series)?.return_pct
}

/// 5-year return in percent, measured inside the trailing 5 x 365 days of `series`.
pub fn five_year_return(series: &PriceSeries) -> Option<f64> {
    WindowStats::of(&series.trailing_window(Duration::days(5 * 365)))?.return_pct
}

fn annualised_volatility(series: &PriceSeries, points: usize) -> Option<f64> {
    let closes = series.closes();
    if closes.len() < points + 1 {
        return None;
    }
    let returns: Vec<f64> = closes[closes.len() - points - 1..]
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    Some(stats::std_dev(&returns)? * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
}

fn yearly_performance(series: &PriceSeries) -> Vec<YearlyPerformance> {
    let mut years: BTreeMap<i32, YearlyPerformance> = BTreeMap::new();
    for bar in series.bars() {
        years
            .entry(bar.timestamp.year())
            .and_modify(|y| {
                y.close = bar.close;
                y.high = y.high.max(bar.high);
                y.low = y.low.min(bar.low);
                y.volume += bar.volume;
            })
            .or_insert(YearlyPerformance {
                year: bar.timestamp.year(),
                open: bar.open,
                close: bar.close,
                high: bar.high,
                low: bar.low,
                volume: bar.volume,
                return_pct: None,
            });
    }

    years
        .into_values()
        .map(|mut y| {
            y.return_pct = stats::pct_change(y.open, y.close);
            y
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::PriceBar;
    use chrono::TimeZone;

    fn daily(start: DateTime<Utc>, closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                timestamp: start + Duration::days(i as i64),
                open: close - 1.0,
                high: close + 1.0,
                low: close - 2.0,
                close,
                volume: 100.0,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn test_yearly_groups_calendar_years() {
        let start = Utc.with_ymd_and_hms(2022, 12, 30, 0, 0, 0).unwrap();
        let series = daily(start, &[10.0, 11.0, 12.0, 13.0]);
        let years = yearly_performance(&series);

        assert_eq!(years.len(), 2);
        assert_eq!(years[0].year, 2022);
        assert_eq!(years[0].open, 9.0);
        assert_eq!(years[0].close, 11.0);
        assert_eq!(years[0].volume, 200.0);
        assert_eq!(years[1].year, 2023);
        assert_eq!(years[1].high, 14.0);
        assert_eq!(years[1].low, 10.0);
    }

    #[test]
    fn test_all_time_extremes_and_returns() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let series = daily(start, &[50.0, 80.0, 40.0, 100.0]);
        let summary = PerformanceSummary::compute(&series, Some(&series));

        assert_eq!(summary.all_time_high, Some(100.0));
        assert_eq!(summary.all_time_low, Some(40.0));
        assert_eq!(summary.all_time_low_date, Some(start + Duration::days(2)));
        assert!((summary.total_return_pct.unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(summary.trading_days, 4);
        assert!(summary.volatility_30d.is_none());
    }

    #[test]
    fn test_five_year_window_ignores_older_bars() {
        let start = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
        let mut bars: Vec<PriceBar> = Vec::new();
        // One bar ten years before the rest, then a flat-to-doubling run.
        bars.push(PriceBar { timestamp: start, open: 1.0, high: 1.0, low: 1.0, close: 1.0, volume: 1.0 });
        let recent_start = start + Duration::days(3650);
        for (i, close) in [50.0, 75.0, 100.0].iter().enumerate() {
            bars.push(PriceBar {
                timestamp: recent_start + Duration::days(i as i64 * 300),
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 1.0,
            });
        }
        let series = PriceSeries::new(bars).unwrap();

        assert!((five_year_return(&series).unwrap() - 100.0).abs() < 1e-9);
        // Only the last two bars fall within 365 days of the end.
        assert!((one_year_return(&series).unwrap() - (100.0 / 75.0 - 1.0) * 100.0).abs() < 1e-9);
    }
}
