//! Descriptive statistics over loosely typed samples.

use vitals_core::Statistics;

/// Summarize the present, non-`NaN` values in `values`.
///
/// Returns `None` when nothing usable remains. Mean, variance and standard
/// deviation are rounded to two decimals; quartiles index straight into the
/// sorted sample (`sorted[floor(n * p)]`) without interpolation.
pub fn calculate_statistics<T>(values: &[T]) -> Option<Statistics>
where
    T: Copy + Into<Option<f64>>,
{
    let valid: Vec<f64> = values
        .iter()
        .filter_map(|&value| value.into())
        .filter(|value: &f64| !value.is_nan())
        .collect();

    if valid.is_empty() {
        return None;
    }

    let count = valid.len();
    let n = count as f64;

    let mut sorted = valid.clone();
    sorted.sort_by(f64::total_cmp);

    let mean = valid.iter().sum::<f64>() / n;
    // Population variance.
    let variance = valid.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / n;
    let standard_deviation = variance.sqrt();

    let at = |fraction: f64| sorted[(n * fraction).floor() as usize];
    let min = sorted[0];
    let max = sorted[count - 1];

    Some(Statistics {
        count,
        mean: round2(mean),
        median: at(0.5),
        min,
        max,
        standard_deviation: round2(standard_deviation),
        variance: round2(variance),
        q1: at(0.25),
        q3: at(0.75),
        range: max - min,
    })
}

/// Round to two decimals, halves towards positive infinity.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
