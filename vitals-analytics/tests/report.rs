use chrono::{DateTime, Duration, TimeZone, Utc};
use vitals_analytics::{assess_data_quality, generate_recommendations, generate_report};
use vitals_core::{
    AlertLevel, Metric, MetricReport, OverallStatus, Priority, ProcessorConfig, Reading,
    ReportOptions,
};

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

/// A reading with every metric inside its normal range.
fn complete_reading(minutes: i64) -> Reading {
    Reading::at(at(minutes))
        .with(Metric::HeartRate, 72.0)
        .with(Metric::BloodPressureSystolic, 130.0)
        .with(Metric::BloodPressureDiastolic, 80.0)
        .with(Metric::OxygenSaturation, 98.0)
        .with(Metric::Temperature, 36.8)
        .with(Metric::RespiratoryRate, 14.0)
        .with(Metric::GlucoseLevel, 110.0)
}

#[test]
fn heart_rate_scenario() {
    let readings = vec![
        Reading::at(at(0)).with(Metric::HeartRate, 70.0),
        Reading::at(at(60)).with(Metric::HeartRate, 160.0),
    ];

    let report = generate_report(&readings, &ReportOptions::default(), &ProcessorConfig::default());

    let heart = report.metric(Metric::HeartRate).expect("Thiếu heartRate");
    assert_eq!(heart.statistics.mean, 115.0);
    assert_eq!(heart.alert_count, 1);
    assert_eq!(heart.last_value, 160.0);
    assert_eq!(heart.anomalies, 0);
    assert!(heart.chart_data.is_none());

    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].level, AlertLevel::Warning);
    assert_eq!(report.alerts[0].value, Some(160.0));
    assert_eq!(report.summary.overall_status, OverallStatus::Warning);
    assert_eq!(report.time_range.start, Some(at(0)));
    assert_eq!(report.time_range.end, Some(at(60)));
    assert_eq!(report.time_range.total_readings, 2);
}

#[test]
fn metrics_without_values_are_no_data() {
    let readings = vec![Reading::at(at(0)).with(Metric::HeartRate, 70.0)];

    let report = generate_report(&readings, &ReportOptions::default(), &ProcessorConfig::default());

    assert_eq!(report.metrics.len(), Metric::ALL.len());
    assert_eq!(
        report.metrics.get(&Metric::GlucoseLevel),
        Some(&MetricReport::no_data())
    );
    // One reading is not enough for a trend, but statistics still exist.
    let heart = report.metric(Metric::HeartRate).unwrap();
    assert!(heart.trend.is_none());
    assert_eq!(heart.statistics.count, 1);
}

#[test]
fn selected_metrics_limit_the_report() {
    let readings = vec![complete_reading(0), complete_reading(15)];
    let options = ReportOptions {
        metrics: Some(vec![Metric::Temperature, Metric::OxygenSaturation]),
        patient_id: Some("P-042".to_string()),
        ..ReportOptions::default()
    };

    let report = generate_report(&readings, &options, &ProcessorConfig::default());

    assert_eq!(report.patient_id.as_deref(), Some("P-042"));
    assert_eq!(
        report.metrics.keys().copied().collect::<Vec<_>>(),
        vec![Metric::OxygenSaturation, Metric::Temperature]
    );
    assert_eq!(report.summary.overall_status, OverallStatus::Normal);
    assert!(report.alerts.is_empty());
}

#[test]
fn charts_carry_raw_series_and_smoothing() {
    let readings = vec![
        Reading::at(at(0)).with(Metric::HeartRate, 70.0),
        Reading::at(at(15)),
        Reading::at(at(30)).with(Metric::HeartRate, 80.0),
        Reading::at(at(45)).with(Metric::HeartRate, 90.0),
    ];
    let options = ReportOptions {
        metrics: Some(vec![Metric::HeartRate]),
        include_charts: true,
        ..ReportOptions::default()
    };

    let report = generate_report(&readings, &options, &ProcessorConfig::default());
    let chart = report
        .metric(Metric::HeartRate)
        .and_then(|analysis| analysis.chart_data.as_ref())
        .expect("Thiếu dữ liệu biểu đồ");

    assert_eq!(chart.timestamps.len(), 4);
    assert_eq!(chart.values, vec![Some(70.0), None, Some(80.0), Some(90.0)]);
    // Smoothing runs over the three present values with a window of 5.
    assert_eq!(chart.moving_average, vec![Some(80.0), Some(80.0), Some(80.0)]);
}

#[test]
fn critical_alert_drives_status_and_first_recommendation() {
    let readings = vec![
        complete_reading(0).with(Metric::HeartRate, 45.0),
        complete_reading(15),
    ];

    let config = ProcessorConfig::default();
    let report = generate_report(&readings, &ReportOptions::default(), &config);

    assert_eq!(report.summary.overall_status, OverallStatus::Critical);
    assert_eq!(report.summary.critical_alerts, 1);
    assert_eq!(report.summary.recommendations[0].priority, Priority::High);
    assert_eq!(
        report.summary.recommendations[0].action,
        "Contact healthcare provider immediately"
    );
    assert_eq!(generate_recommendations(&report, &config), report.summary.recommendations);
}

#[test]
fn many_warnings_recommend_follow_up() {
    let readings: Vec<Reading> = (0..6)
        .map(|i| complete_reading(i * 10).with(Metric::BloodPressureSystolic, 150.0))
        .collect();

    let report = generate_report(&readings, &ReportOptions::default(), &ProcessorConfig::default());

    assert_eq!(report.summary.warning_alerts, 6);
    assert_eq!(report.summary.critical_alerts, 0);
    assert_eq!(report.summary.data_quality.score, 100);
    let priorities: Vec<Priority> = report
        .summary
        .recommendations
        .iter()
        .map(|rec| rec.priority)
        .collect();
    assert_eq!(priorities, vec![Priority::Medium]);
}

#[test]
fn empty_reading_set_still_reports() {
    let report = generate_report(&[], &ReportOptions::default(), &ProcessorConfig::default());

    assert!(report
        .metrics
        .values()
        .all(|section| section.analysis().is_none()));
    assert_eq!(report.time_range.start, None);
    assert_eq!(report.summary.overall_status, OverallStatus::Normal);
    assert_eq!(report.summary.data_quality.score, 0);
    assert_eq!(report.summary.recommendations.len(), 1);
    assert_eq!(report.summary.recommendations[0].priority, Priority::Low);
}

#[test]
fn empty_quality_has_single_issue() {
    let quality = assess_data_quality(&[], &ProcessorConfig::default());

    assert_eq!(quality.score, 0);
    assert_eq!(quality.issues, vec!["No data available".to_string()]);
    assert_eq!(quality.completeness, None);
}

#[test]
fn complete_regular_readings_score_full_marks() {
    let readings: Vec<Reading> = (0..4).map(|i| complete_reading(i * 30)).collect();
    let quality = assess_data_quality(&readings, &ProcessorConfig::default());

    assert_eq!(quality.score, 100);
    assert!(quality.issues.is_empty());
    assert_eq!(quality.completeness, Some(100));
}

#[test]
fn gaps_and_missing_timestamps_lower_the_score() {
    let mut undated = complete_reading(0);
    undated.timestamp = None;
    let readings = vec![
        complete_reading(300),
        complete_reading(0),
        undated,
        complete_reading(150),
        complete_reading(120),
    ];

    let quality = assess_data_quality(&readings, &ProcessorConfig::default());

    // 1/5 undated -> -4, two gaps over an hour -> -10.
    assert_eq!(quality.score, 86);
    assert_eq!(
        quality.issues,
        vec![
            "1 readings missing timestamps".to_string(),
            "2 significant time gaps detected".to_string(),
        ]
    );
    assert_eq!(quality.completeness, Some(80));
}

#[test]
fn gap_penalty_is_capped() {
    let readings: Vec<Reading> = (0..6).map(|i| complete_reading(i * 120)).collect();
    let quality = assess_data_quality(&readings, &ProcessorConfig::default());

    assert_eq!(quality.score, 85);
    assert_eq!(quality.issues, vec!["5 significant time gaps detected".to_string()]);
}

#[test]
fn sparse_metrics_are_penalised() {
    let mut readings: Vec<Reading> = (0..4).map(|i| complete_reading(i * 15)).collect();
    readings[0].glucose_level = None;
    readings[1].glucose_level = None;

    let quality = assess_data_quality(&readings, &ProcessorConfig::default());

    assert_eq!(quality.score, 75);
    assert_eq!(quality.issues, vec!["glucoseLevel: 50.0% missing values".to_string()]);
    assert_eq!(quality.completeness, Some(90));
}

#[test]
fn every_issue_at_once_leaves_ten_percent_completeness() {
    let config = ProcessorConfig {
        missing_value_percent: 0.0,
        ..ProcessorConfig::default()
    };
    // One undated reading, two gaps, and every metric missing on half the readings.
    let readings = vec![
        Reading::at(at(0)),
        complete_reading(180),
        Reading::default(),
        complete_reading(360),
    ];

    let quality = assess_data_quality(&readings, &config);

    assert_eq!(quality.issues.len(), 9);
    assert_eq!(quality.score, 0);
    assert_eq!(quality.completeness, Some(10));
}
