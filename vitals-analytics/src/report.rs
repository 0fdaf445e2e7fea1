use std::collections::BTreeMap;

use chrono::Utc;
use tracing::debug;
use vitals_core::{
    Alert, AlertLevel, ChartData, DataQuality, MetricAnalysis, MetricReport, OverallStatus,
    Priority, ProcessorConfig, Reading, Recommendation, Report, ReportOptions, ReportSummary,
    TimeRange,
};

use crate::alerts::check_alerts;
use crate::anomaly::detect_anomalies;
use crate::quality::assess_data_quality;
use crate::smoothing::moving_average;
use crate::stats::calculate_statistics;
use crate::trend::analyze_trend;

/// Build a full report over `readings`.
///
/// Metrics without usable values are recorded as `no_data` and do not affect
/// the rest of the report.
pub fn generate_report(
    readings: &[Reading],
    options: &ReportOptions,
    config: &ProcessorConfig,
) -> Report {
    let mut metrics = BTreeMap::new();
    let mut alerts: Vec<Alert> = Vec::new();

    for metric in options.selected_metrics() {
        let values: Vec<f64> = readings
            .iter()
            .filter_map(|reading| reading.numeric(metric))
            .collect();

        let (Some(statistics), Some(&last_value)) = (calculate_statistics(&values), values.last())
        else {
            debug!(%metric, "no usable values");
            metrics.insert(metric, MetricReport::no_data());
            continue;
        };

        let trend = analyze_trend(readings, metric);
        let anomalies = detect_anomalies(readings, metric, config.anomaly_threshold).len();

        let metric_alerts: Vec<Alert> = readings
            .iter()
            .map(|reading| check_alerts(reading, metric))
            .filter(Alert::is_actionable)
            .collect();

        let chart_data = options.include_charts.then(|| ChartData {
            timestamps: readings.iter().map(|reading| reading.timestamp).collect(),
            values: readings
                .iter()
                .map(|reading| reading.numeric(metric))
                .collect(),
            moving_average: moving_average(&values, config.moving_average_window),
        });

        debug!(
            %metric,
            count = statistics.count,
            anomalies,
            alerts = metric_alerts.len(),
            "metric analyzed"
        );

        metrics.insert(
            metric,
            MetricReport::Analyzed(Box::new(MetricAnalysis {
                statistics,
                trend,
                anomalies,
                alert_count: metric_alerts.len(),
                last_value,
                rules: metric.rule(),
                chart_data,
            })),
        );
        alerts.extend(metric_alerts);
    }

    let critical_alerts = count_level(&alerts, AlertLevel::Critical);
    let warning_alerts = count_level(&alerts, AlertLevel::Warning);
    let overall_status = if critical_alerts > 0 {
        OverallStatus::Critical
    } else if warning_alerts > 0 {
        OverallStatus::Warning
    } else {
        OverallStatus::Normal
    };

    let data_quality = assess_data_quality(readings, config);
    let recommendations =
        recommendations_for(critical_alerts, warning_alerts, &data_quality, config);

    debug!(
        readings = readings.len(),
        alerts = alerts.len(),
        status = overall_status.as_str(),
        score = data_quality.score,
        "report generated"
    );

    Report {
        patient_id: options.patient_id.clone(),
        generated_at: Utc::now(),
        time_range: TimeRange {
            start: readings.first().and_then(|reading| reading.timestamp),
            end: readings.last().and_then(|reading| reading.timestamp),
            total_readings: readings.len(),
        },
        metrics,
        summary: ReportSummary {
            overall_status,
            total_alerts: alerts.len(),
            critical_alerts,
            warning_alerts,
            data_quality,
            recommendations,
        },
        alerts,
    }
}

/// Follow-up advice derived from a report's summary, most urgent first.
pub fn generate_recommendations(report: &Report, config: &ProcessorConfig) -> Vec<Recommendation> {
    let summary = &report.summary;
    recommendations_for(
        summary.critical_alerts,
        summary.warning_alerts,
        &summary.data_quality,
        config,
    )
}

fn recommendations_for(
    critical_alerts: usize,
    warning_alerts: usize,
    data_quality: &DataQuality,
    config: &ProcessorConfig,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if critical_alerts > 0 {
        recommendations.push(recommendation(
            Priority::High,
            "Immediate medical attention required due to critical alerts",
            "Contact healthcare provider immediately",
        ));
    }

    if warning_alerts > config.warning_alert_limit {
        recommendations.push(recommendation(
            Priority::Medium,
            "Multiple warning alerts detected",
            "Schedule follow-up appointment with healthcare provider",
        ));
    }

    if data_quality.score < config.min_quality_score {
        recommendations.push(recommendation(
            Priority::Low,
            "Data quality could be improved",
            "Check sensor connections and ensure regular measurements",
        ));
    }

    recommendations
}

fn recommendation(priority: Priority, message: &str, action: &str) -> Recommendation {
    Recommendation {
        priority,
        message: message.to_string(),
        action: action.to_string(),
    }
}

fn count_level(alerts: &[Alert], level: AlertLevel) -> usize {
    alerts.iter().filter(|alert| alert.level == level).count()
}
