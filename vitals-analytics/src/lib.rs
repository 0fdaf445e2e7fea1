//! Statistics, anomaly detection, trends, alerts and reporting over vital-sign readings.
//!
//! Every operation is synchronous and works on borrowed input; nothing here
//! mutates the readings it is given.

mod alerts;
mod anomaly;
mod export;
mod ingest;
mod quality;
mod report;
mod smoothing;
mod stats;
mod trend;
mod validate;

pub use alerts::check_alerts;
pub use anomaly::{detect_anomalies, DEFAULT_ANOMALY_THRESHOLD};
pub use export::{export_readings_csv, export_report, report_to_csv, text_summary};
pub use ingest::{
    parse_device_line, parse_device_log, parse_readings_str, readings_between,
    readings_for_patient,
};
pub use quality::assess_data_quality;
pub use report::{generate_recommendations, generate_report};
pub use smoothing::{moving_average, DEFAULT_WINDOW};
pub use stats::calculate_statistics;
pub use trend::{analyze_trend, calculate_correlation};
pub use validate::{invalid_metrics, validate_metric, validate_reading};
