//! Historical trend series for chart panels.

use serde::Serialize;

use crate::model::{HistoricalDataPoint, PollutantKind};

/// Durations, in days, offered by the trends selector.
pub const TREND_DURATIONS: [usize; 3] = [7, 14, 30];

pub const DEFAULT_TREND_DURATION: usize = 30;

/// One plotted point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: Option<String>,
    pub value: f64,
}

/// Descriptive statistics over a trend series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendSummary {
    pub count: usize,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
}

/// Takes the last `duration` points of a chronological series and extracts
/// the value for `kind`.
///
/// The selected pollutant's average is used, falling back to its raw
/// reading. Points with neither are skipped. Input order is preserved.
pub fn trend_series(
    points: &[HistoricalDataPoint],
    kind: PollutantKind,
    duration: usize,
) -> Vec<TrendPoint> {
    let start = points.len().saturating_sub(duration);
    points[start..]
        .iter()
        .filter_map(|p| {
            p.value(kind).filter(|v| v.is_finite()).map(|value| TrendPoint {
                date: p.label().map(str::to_string),
                value,
            })
        })
        .collect()
}

/// Summarizes a series; `None` when it is empty.
pub fn summarize(series: &[TrendPoint]) -> Option<TrendSummary> {
    if series.is_empty() {
        return None;
    }
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let avg = mean(&values);

    Some(TrendSummary {
        count: values.len(),
        mean: avg,
        stddev: stddev(&values, avg),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Line color for a pollutant's chart.
pub fn trend_color(kind: PollutantKind) -> &'static str {
    match kind {
        PollutantKind::Aqi => "#3b82f6",
        PollutantKind::Pm25 => "#ef4444",
        PollutantKind::Pm10 => "#f59e0b",
    }
}

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, avg_aqi: f64, avg_pm25: Option<f64>) -> HistoricalDataPoint {
        HistoricalDataPoint {
            date: Some(date.to_string()),
            avg_aqi: Some(avg_aqi),
            avg_pm25,
            ..Default::default()
        }
    }

    #[test]
    fn test_trend_series_takes_tail_in_order() {
        let points: Vec<_> = (1..=10)
            .map(|d| day(&format!("2025-03-{d:02}"), d as f64, None))
            .collect();

        let series = trend_series(&points, PollutantKind::Aqi, 7);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date.as_deref(), Some("2025-03-04"));
        assert_eq!(series[6].value, 10.0);
    }

    #[test]
    fn test_trend_series_shorter_than_duration() {
        let points = vec![day("2025-03-01", 40.0, None)];
        assert_eq!(trend_series(&points, PollutantKind::Aqi, 30).len(), 1);
    }

    #[test]
    fn test_trend_series_uses_selected_pollutant() {
        let points = vec![
            day("2025-03-01", 80.0, Some(22.5)),
            day("2025-03-02", 90.0, None),
            day("2025-03-03", 70.0, Some(18.0)),
        ];

        let series = trend_series(&points, PollutantKind::Pm25, 30);
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![22.5, 18.0]);
    }

    #[test]
    fn test_summarize() {
        let series = vec![
            TrendPoint { date: None, value: 2.0 },
            TrendPoint { date: None, value: 4.0 },
            TrendPoint { date: None, value: 4.0 },
            TrendPoint { date: None, value: 4.0 },
            TrendPoint { date: None, value: 5.0 },
            TrendPoint { date: None, value: 5.0 },
            TrendPoint { date: None, value: 7.0 },
            TrendPoint { date: None, value: 9.0 },
        ];
        let summary = summarize(&series).unwrap();
        assert_eq!(summary.count, 8);
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.stddev, 2.0);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_mean_and_stddev_empty() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(stddev(&[], 0.0), 0.0);
    }

    #[test]
    fn test_trend_colors() {
        assert_eq!(trend_color(PollutantKind::Aqi), "#3b82f6");
        assert_eq!(trend_color(PollutantKind::Pm25), "#ef4444");
        assert_eq!(trend_color(PollutantKind::Pm10), "#f59e0b");
    }
}
