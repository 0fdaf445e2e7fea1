use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use vitals_analytics::{
    export_report, generate_report, invalid_metrics, parse_device_log, parse_readings_str,
};
use vitals_core::{Metric, ProcessorConfig, ReportOptions};

#[derive(Parser, Debug)]
#[command(
    name = "vitals-cli",
    about = "Tạo báo cáo phân tích chỉ số sống từ file JSON hoặc log thiết bị."
)]
struct Args {
    /// Đường dẫn tới file JSON (mảng readings) hoặc log thiết bị.
    #[arg(short, long)]
    input: PathBuf,

    /// Định dạng xuất: json, csv hoặc summary.
    #[arg(short, long, default_value = "summary")]
    format: String,

    /// Chỉ phân tích các metric này (ví dụ: heartRate,oxygenSaturation).
    #[arg(short, long, value_delimiter = ',')]
    metrics: Vec<String>,

    #[arg(short, long)]
    patient_id: Option<String>,

    /// Đính kèm dữ liệu biểu đồ vào báo cáo.
    #[arg(long)]
    charts: bool,

    /// Ngưỡng z-score để đánh dấu bất thường.
    #[arg(long)]
    anomaly_threshold: Option<f64>,

    /// Đọc input theo từng dòng JSON của thiết bị.
    #[arg(long)]
    device_log: bool,

    #[arg(long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Không đọc được file {:?}", args.input))?;

    let readings = if args.device_log {
        parse_device_log(&data)
    } else {
        parse_readings_str(&data).context("File không phải mảng readings hợp lệ")?
    };
    debug!(count = readings.len(), "readings loaded");

    for (index, reading) in readings.iter().enumerate() {
        for err in invalid_metrics(reading) {
            warn!(index, %err, "reading outside valid range");
        }
    }

    let metrics = if args.metrics.is_empty() {
        None
    } else {
        Some(
            args.metrics
                .iter()
                .map(|name| name.trim().parse::<Metric>())
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    let options = ReportOptions {
        metrics,
        include_charts: args.charts,
        patient_id: args.patient_id,
    };

    let mut config = ProcessorConfig::default();
    if let Some(threshold) = args.anomaly_threshold {
        config.anomaly_threshold = threshold;
    }

    let report = generate_report(&readings, &options, &config);
    let output = export_report(&report, &args.format)?;

    println!("{output}");

    Ok(())
}
