use chrono::{DateTime, Duration, TimeZone, Utc};
use vitals_analytics::{analyze_trend, calculate_correlation, detect_anomalies};
use vitals_core::{AnomalySeverity, Metric, Reading, TrendDirection};

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn heart_rates(values: &[f64]) -> Vec<Reading> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| Reading::at(at(i as i64 * 15)).with(Metric::HeartRate, *value))
        .collect()
}

#[test]
fn outlier_is_reported_with_input_index() {
    let mut readings = vec![Reading::at(at(-15)).with(Metric::Temperature, 36.6)];
    let mut values = vec![70.0; 9];
    values.push(200.0);
    readings.extend(heart_rates(&values));

    let anomalies = detect_anomalies(&readings, Metric::HeartRate, 2.5);

    // mean 83, sd 39 -> z = 3.0 exactly, which is not above the critical cut-off.
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].index, 10);
    assert_eq!(anomalies[0].value, 200.0);
    assert_eq!(anomalies[0].z_score, 3.0);
    assert_eq!(anomalies[0].severity, AnomalySeverity::Warning);
    assert_eq!(anomalies[0].reading, readings[10]);
}

#[test]
fn far_outlier_is_critical() {
    let mut values = vec![70.0; 19];
    values.push(200.0);
    let readings = heart_rates(&values);

    let anomalies = detect_anomalies(&readings, Metric::HeartRate, 2.5);

    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].index, 19);
    assert_eq!(anomalies[0].z_score, 4.36);
    assert_eq!(anomalies[0].severity, AnomalySeverity::Critical);
}

#[test]
fn higher_threshold_suppresses_anomalies() {
    let mut values = vec![70.0; 19];
    values.push(200.0);
    let readings = heart_rates(&values);

    assert!(detect_anomalies(&readings, Metric::HeartRate, 5.0).is_empty());
}

#[test]
fn constant_series_has_no_anomalies() {
    let readings = heart_rates(&[72.0; 8]);

    for threshold in [0.0, 1.0, 2.5, 10.0] {
        assert!(detect_anomalies(&readings, Metric::HeartRate, threshold).is_empty());
    }
}

#[test]
fn anomalies_on_absent_metric_are_empty() {
    let readings = heart_rates(&[72.0, 80.0]);
    assert!(detect_anomalies(&readings, Metric::GlucoseLevel, 2.5).is_empty());
}

#[test]
fn equal_values_are_stable() {
    let readings = vec![
        Reading::at(at(0)).with(Metric::HeartRate, 72.0),
        Reading::at(at(60)).with(Metric::HeartRate, 72.0),
    ];

    let trend = analyze_trend(&readings, Metric::HeartRate).expect("Phải có xu hướng");

    assert_eq!(trend.direction, TrendDirection::Stable);
    assert_eq!(trend.slope, 0.0);
    assert_eq!(trend.correlation, 0.0);
    assert_eq!(trend.change_over_time, 0.0);
    assert_eq!(trend.change_rate, 0.0);
    assert_eq!(trend.time_span_hours, 1.0);
}

#[test]
fn trend_sorts_readings_by_timestamp() {
    let readings = vec![
        Reading::at(at(120)).with(Metric::BloodPressureSystolic, 80.0),
        Reading::at(at(0)).with(Metric::BloodPressureSystolic, 60.0),
        Reading::at(at(60)).with(Metric::BloodPressureSystolic, 70.0),
    ];

    let trend = analyze_trend(&readings, Metric::BloodPressureSystolic).unwrap();

    assert_eq!(trend.direction, TrendDirection::Increasing);
    assert_eq!(trend.slope, 10.0);
    assert_eq!(trend.correlation, 1.0);
    assert_eq!(trend.change_over_time, 20.0);
    assert_eq!(trend.change_rate, 10.0);
    assert_eq!(trend.time_span_hours, 2.0);
}

#[test]
fn falling_saturation_is_decreasing() {
    let readings = vec![
        Reading::at(at(0)).with(Metric::OxygenSaturation, 98.0),
        Reading::at(at(30)).with(Metric::OxygenSaturation, 95.0),
        Reading::at(at(60)).with(Metric::OxygenSaturation, 92.0),
    ];

    let trend = analyze_trend(&readings, Metric::OxygenSaturation).unwrap();

    assert_eq!(trend.direction, TrendDirection::Decreasing);
    assert_eq!(trend.slope, -6.0);
    assert_eq!(trend.correlation, -1.0);
    assert_eq!(trend.change_over_time, -6.0);
    assert_eq!(trend.change_rate, -6.0);
}

#[test]
fn time_span_is_rounded_to_two_decimals() {
    let readings = vec![
        Reading::at(at(0)).with(Metric::Temperature, 36.5),
        Reading::at(at(80)).with(Metric::Temperature, 37.5),
    ];

    let trend = analyze_trend(&readings, Metric::Temperature).unwrap();
    assert_eq!(trend.time_span_hours, 1.33);
    assert_eq!(trend.direction, TrendDirection::Increasing);
}

#[test]
fn trend_needs_two_timestamped_values() {
    let single = vec![Reading::at(at(0)).with(Metric::HeartRate, 72.0)];
    assert!(analyze_trend(&single, Metric::HeartRate).is_none());

    let undated = Reading::default().with(Metric::HeartRate, 80.0);
    let mixed = vec![Reading::at(at(0)).with(Metric::HeartRate, 72.0), undated];
    assert!(analyze_trend(&mixed, Metric::HeartRate).is_none());

    let missing = vec![Reading::at(at(0)), Reading::at(at(10))];
    assert!(analyze_trend(&missing, Metric::HeartRate).is_none());
}

#[test]
fn simultaneous_readings_are_stable() {
    let readings = vec![
        Reading::at(at(0)).with(Metric::HeartRate, 60.0),
        Reading::at(at(0)).with(Metric::HeartRate, 90.0),
    ];

    let trend = analyze_trend(&readings, Metric::HeartRate).unwrap();
    assert_eq!(trend.direction, TrendDirection::Stable);
    assert_eq!(trend.change_rate, 0.0);
    assert_eq!(trend.correlation, 0.0);
}

#[test]
fn correlation_guards_degenerate_input() {
    assert_eq!(calculate_correlation(&[], &[]), 0.0);
    assert_eq!(calculate_correlation(&[1.0, 2.0], &[1.0]), 0.0);
    assert_eq!(calculate_correlation(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), 0.0);
    assert_eq!(calculate_correlation(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), -1.0);
}
