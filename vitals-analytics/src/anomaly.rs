use tracing::debug;
use vitals_core::{Anomaly, AnomalySeverity, Metric, Reading};

use crate::stats::{calculate_statistics, round2};

pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 2.5;

/// z-score above which an anomaly is critical rather than a warning.
const CRITICAL_Z_SCORE: f64 = 3.0;

/// Flag readings whose `metric` lies more than `threshold` standard deviations
/// from the sample mean, in input order.
///
/// A sample without spread has no outliers, so a zero standard deviation
/// yields an empty list instead of dividing by zero.
pub fn detect_anomalies(readings: &[Reading], metric: Metric, threshold: f64) -> Vec<Anomaly> {
    let values: Vec<f64> = readings
        .iter()
        .filter_map(|reading| reading.numeric(metric))
        .collect();

    let Some(stats) = calculate_statistics(&values) else {
        return Vec::new();
    };

    if stats.standard_deviation == 0.0 {
        debug!(%metric, count = stats.count, "no spread, skipping anomaly detection");
        return Vec::new();
    }

    readings
        .iter()
        .enumerate()
        .filter_map(|(index, reading)| {
            let value = reading.numeric(metric)?;
            let z_score = ((value - stats.mean) / stats.standard_deviation).abs();
            if z_score <= threshold {
                return None;
            }

            let severity = if z_score > CRITICAL_Z_SCORE {
                AnomalySeverity::Critical
            } else {
                AnomalySeverity::Warning
            };

            Some(Anomaly {
                index,
                reading: reading.clone(),
                value,
                z_score: round2(z_score),
                severity,
            })
        })
        .collect()
}
