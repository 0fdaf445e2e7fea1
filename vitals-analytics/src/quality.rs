use chrono::{DateTime, Duration, Utc};
use vitals_core::{DataQuality, Metric, ProcessorConfig, Reading};

use crate::stats::round_half_up;

const MISSING_TIMESTAMP_PENALTY: f64 = 20.0;
const GAP_PENALTY: f64 = 5.0;
const MAX_GAP_PENALTY: f64 = 15.0;
const MISSING_VALUE_WEIGHT: f64 = 0.5;

/// Score the completeness and regularity of a reading set.
pub fn assess_data_quality(readings: &[Reading], config: &ProcessorConfig) -> DataQuality {
    if readings.is_empty() {
        return DataQuality {
            score: 0,
            issues: vec!["No data available".to_string()],
            completeness: None,
        };
    }

    let total = readings.len() as f64;
    let mut issues = Vec::new();
    let mut score = 100.0;

    let missing_timestamps = readings
        .iter()
        .filter(|reading| reading.timestamp.is_none())
        .count();
    if missing_timestamps > 0 {
        issues.push(format!("{missing_timestamps} readings missing timestamps"));
        score -= missing_timestamps as f64 / total * MISSING_TIMESTAMP_PENALTY;
    }

    // Readings without a timestamp cannot open or close a gap.
    let mut timestamps: Vec<DateTime<Utc>> =
        readings.iter().filter_map(|reading| reading.timestamp).collect();
    timestamps.sort();
    let max_gap = Duration::minutes(i64::from(config.max_gap_minutes));
    let gaps = timestamps
        .windows(2)
        .filter(|pair| pair[1] - pair[0] > max_gap)
        .count();
    if gaps > 0 {
        issues.push(format!("{gaps} significant time gaps detected"));
        score -= (gaps as f64 * GAP_PENALTY).min(MAX_GAP_PENALTY);
    }

    for metric in Metric::ALL {
        let missing = readings
            .iter()
            .filter(|reading| reading.value(metric).is_none())
            .count();
        let missing_percent = missing as f64 / total * 100.0;

        if missing_percent > config.missing_value_percent {
            issues.push(format!("{metric}: {missing_percent:.1}% missing values"));
            score -= missing_percent * MISSING_VALUE_WEIGHT;
        }
    }

    // Ten or more issues bottom out at zero.
    let completeness = round_half_up((1.0 - issues.len() as f64 / 10.0) * 100.0).max(0.0);

    DataQuality {
        score: round_half_up(score).max(0.0) as u32,
        issues,
        completeness: Some(completeness as u32),
    }
}
