use chrono::{DateTime, Utc};
use vitals_core::{Metric, Reading, TrendDirection, TrendResult};

use crate::stats::round2;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Least-squares trend of `metric` over time.
///
/// Only readings carrying both a timestamp and a usable value take part; they
/// are ordered by timestamp before fitting. Returns `None` with fewer than two
/// such readings. The slope is expressed per hour.
pub fn analyze_trend(readings: &[Reading], metric: Metric) -> Option<TrendResult> {
    let mut points: Vec<(DateTime<Utc>, f64)> = readings
        .iter()
        .filter_map(|reading| Some((reading.timestamp?, reading.numeric(metric)?)))
        .collect();

    if points.len() < 2 {
        return None;
    }

    points.sort_by_key(|(timestamp, _)| *timestamp);

    // x axis: hours since the first sample.
    let origin = points[0].0;
    let hours: Vec<f64> = points
        .iter()
        .map(|(timestamp, _)| {
            timestamp.signed_duration_since(origin).num_milliseconds() as f64 / MILLIS_PER_HOUR
        })
        .collect();
    let values: Vec<f64> = points.iter().map(|(_, value)| *value).collect();

    let slope = least_squares_slope(&hours, &values);
    let direction = if slope > 0.0 {
        TrendDirection::Increasing
    } else if slope < 0.0 {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    let first = values[0];
    let last = values[values.len() - 1];
    let change_over_time = last - first;
    let time_span_hours = hours[hours.len() - 1];

    Some(TrendResult {
        direction,
        slope,
        correlation: calculate_correlation(&hours, &values),
        change_over_time,
        change_rate: if time_span_hours > 0.0 {
            change_over_time / time_span_hours
        } else {
            0.0
        },
        time_span_hours: round2(time_span_hours),
    })
}

/// Pearson correlation of two equally long series.
///
/// Mismatched or empty inputs, and series with zero variance on either side,
/// yield 0.
pub fn calculate_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() || is_constant(x) || is_constant(y) {
        return 0.0;
    }

    let sums = CenteredSums::new(x, y);
    let denominator = (sums.xx * sums.yy).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    (sums.xy / denominator).clamp(-1.0, 1.0)
}

fn least_squares_slope(x: &[f64], y: &[f64]) -> f64 {
    // Identical timestamps leave the slope undefined; treat as flat.
    if is_constant(x) || is_constant(y) {
        return 0.0;
    }

    let sums = CenteredSums::new(x, y);
    if sums.xx == 0.0 {
        0.0
    } else {
        sums.xy / sums.xx
    }
}

fn is_constant(series: &[f64]) -> bool {
    series.windows(2).all(|pair| pair[0] == pair[1])
}

struct CenteredSums {
    xx: f64,
    yy: f64,
    xy: f64,
}

impl CenteredSums {
    fn new(x: &[f64], y: &[f64]) -> Self {
        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;

        x.iter().zip(y).fold(
            CenteredSums {
                xx: 0.0,
                yy: 0.0,
                xy: 0.0,
            },
            |acc, (&xi, &yi)| {
                let dx = xi - mean_x;
                let dy = yi - mean_y;
                CenteredSums {
                    xx: acc.xx + dx * dx,
                    yy: acc.yy + dy * dy,
                    xy: acc.xy + dx * dy,
                }
            },
        )
    }
}
