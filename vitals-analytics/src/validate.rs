use tracing::debug;
use vitals_core::{Metric, Reading, VitalsError};

/// Validate `reading[metric]` against the physiological range table.
///
/// `metric` is the JSON field name (`"heartRate"`, ...). Returns the value when
/// it is present, numeric and within range.
pub fn validate_reading(reading: &Reading, metric: &str) -> Result<f64, VitalsError> {
    let metric: Metric = metric.parse()?;
    validate_metric(reading, metric)
}

pub fn validate_metric(reading: &Reading, metric: Metric) -> Result<f64, VitalsError> {
    let rule = metric.rule();
    let value = reading
        .value(metric)
        .ok_or(VitalsError::MissingValue(metric))?;

    if value.is_nan() {
        return Err(VitalsError::NotANumber(metric));
    }

    if !rule.contains(value) {
        return Err(VitalsError::OutOfRange {
            metric,
            value,
            min: rule.min,
            max: rule.max,
            unit: rule.unit,
        });
    }

    Ok(value)
}

/// Validate every metric the reading carries and return the failures.
pub fn invalid_metrics(reading: &Reading) -> Vec<VitalsError> {
    Metric::ALL
        .into_iter()
        .filter(|metric| reading.value(*metric).is_some())
        .filter_map(|metric| validate_metric(reading, metric).err())
        .inspect(|err| debug!(%err, "rejected measurement"))
        .collect()
}
