//! Rendering of reports and reading sets for downstream consumers.

use vitals_core::{ExportFormat, Metric, Reading, Report, VitalsError};

const REPORT_CSV_HEADER: [&str; 6] = [
    "Metric",
    "Mean",
    "Min",
    "Max",
    "Standard Deviation",
    "Alert Count",
];

/// Render `report` as `json`, `csv` or `summary` (case-insensitive).
pub fn export_report(report: &Report, format: &str) -> Result<String, VitalsError> {
    match format.parse::<ExportFormat>()? {
        ExportFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|err| VitalsError::Serialization(err.to_string())),
        ExportFormat::Csv => report_to_csv(report),
        ExportFormat::Summary => Ok(text_summary(report)),
    }
}

/// One row per metric that has statistics.
pub fn report_to_csv(report: &Report) -> Result<String, VitalsError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(REPORT_CSV_HEADER).map_err(csv_error)?;

    for (metric, section) in &report.metrics {
        let Some(analysis) = section.analysis() else {
            continue;
        };
        let stats = &analysis.statistics;
        writer
            .write_record([
                metric.to_string(),
                stats.mean.to_string(),
                stats.min.to_string(),
                stats.max.to_string(),
                stats.standard_deviation.to_string(),
                analysis.alert_count.to_string(),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}

pub fn text_summary(report: &Report) -> String {
    let summary = &report.summary;
    let mut lines = vec![
        "Medical Report Summary".to_string(),
        format!(
            "Generated: {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        format!(
            "Patient ID: {}",
            report.patient_id.as_deref().unwrap_or("N/A")
        ),
        format!("Total Readings: {}", report.time_range.total_readings),
        format!(
            "Overall Status: {}",
            summary.overall_status.as_str().to_uppercase()
        ),
        String::new(),
    ];

    if summary.total_alerts > 0 {
        lines.push(format!(
            "Alerts: {} critical, {} warning",
            summary.critical_alerts, summary.warning_alerts
        ));
        lines.push(String::new());
    }

    lines.push("Metrics Overview:".to_string());
    for (metric, section) in &report.metrics {
        if let Some(analysis) = section.analysis() {
            let stats = &analysis.statistics;
            lines.push(format!(
                "{metric}: {} ({}-{})",
                stats.mean, stats.min, stats.max
            ));
        }
    }

    if !summary.recommendations.is_empty() {
        lines.push(String::new());
        lines.push("Recommendations:".to_string());
        for recommendation in &summary.recommendations {
            lines.push(format!(
                "- {} ({} priority)",
                recommendation.message,
                recommendation.priority.as_str()
            ));
        }
    }

    lines.join("\n")
}

/// Flat table of raw readings, one row per reading.
pub fn export_readings_csv(readings: &[Reading]) -> Result<String, VitalsError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["timestamp", "deviceId", "patientId"];
    header.extend(Metric::ALL.iter().map(|metric| metric.name()));
    header.push("notes");
    writer.write_record(&header).map_err(csv_error)?;

    for reading in readings {
        let mut record = vec![
            reading
                .timestamp
                .map(|timestamp| timestamp.to_rfc3339())
                .unwrap_or_default(),
            reading.device_id.clone().unwrap_or_default(),
            reading.patient_id.clone().unwrap_or_default(),
        ];
        record.extend(Metric::ALL.iter().map(|metric| {
            reading
                .numeric(*metric)
                .map(|value| value.to_string())
                .unwrap_or_default()
        }));
        record.push(reading.notes.clone().unwrap_or_default());
        writer.write_record(&record).map_err(csv_error)?;
    }

    finish(writer)
}

// Output carries no trailing record terminator, like the text summary.
fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, VitalsError> {
    let bytes = writer
        .into_inner()
        .map_err(|err| VitalsError::Serialization(err.to_string()))?;
    let text =
        String::from_utf8(bytes).map_err(|err| VitalsError::Serialization(err.to_string()))?;
    Ok(text.strip_suffix('\n').unwrap_or(&text).to_string())
}

fn csv_error(err: csv::Error) -> VitalsError {
    VitalsError::Serialization(err.to_string())
}
