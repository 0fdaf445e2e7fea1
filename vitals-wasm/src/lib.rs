//! Bridge WASM <-> JavaScript cho bộ phân tích chỉ số sống.

use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, Serializer};
use vitals_core::{Metric, ProcessorConfig, Reading, Report, ReportOptions, VitalsError};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsProcessorConfig {
    #[serde(default)]
    anomaly_threshold: Option<f64>,
    #[serde(default)]
    moving_average_window: Option<usize>,
    #[serde(default)]
    max_gap_minutes: Option<u32>,
    #[serde(default)]
    missing_value_percent: Option<f64>,
    #[serde(default)]
    warning_alert_limit: Option<usize>,
    #[serde(default)]
    min_quality_score: Option<u32>,
}

impl From<JsProcessorConfig> for ProcessorConfig {
    fn from(cfg: JsProcessorConfig) -> Self {
        let mut base = ProcessorConfig::default();
        if let Some(threshold) = cfg.anomaly_threshold {
            base.anomaly_threshold = threshold;
        }
        if let Some(window) = cfg.moving_average_window {
            base.moving_average_window = window;
        }
        if let Some(minutes) = cfg.max_gap_minutes {
            base.max_gap_minutes = minutes;
        }
        if let Some(percent) = cfg.missing_value_percent {
            base.missing_value_percent = percent;
        }
        if let Some(limit) = cfg.warning_alert_limit {
            base.warning_alert_limit = limit;
        }
        if let Some(score) = cfg.min_quality_score {
            base.min_quality_score = score;
        }
        base
    }
}

#[derive(Serialize)]
struct ValidationOutcome {
    valid: bool,
    message: String,
}

#[wasm_bindgen(js_name = generateReport)]
pub fn generate_report(
    readings: JsValue,
    options: Option<JsValue>,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let readings: Vec<Reading> = from_value(readings)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được danh sách chỉ số: {err}")))?;

    let options = match options {
        Some(js_options) => from_value::<ReportOptions>(js_options)
            .map_err(|err| JsValue::from_str(&format!("Không đọc được tùy chọn: {err}")))?,
        None => ReportOptions::default(),
    };

    let cfg = match config {
        Some(js_cfg) => {
            let cfg: JsProcessorConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            ProcessorConfig::from(cfg)
        }
        None => ProcessorConfig::default(),
    };

    let report = vitals_analytics::generate_report(&readings, &options, &cfg);
    to_js(&report)
}

#[wasm_bindgen(js_name = exportReport)]
pub fn export_report(report: JsValue, format: &str) -> Result<String, JsValue> {
    let report: Report = from_value(report)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được report: {err}")))?;

    vitals_analytics::export_report(&report, format)
        .map_err(|err| JsValue::from_str(&format_vitals_error(err)))
}

#[wasm_bindgen(js_name = validateReading)]
pub fn validate_reading(reading: JsValue, metric: &str) -> Result<JsValue, JsValue> {
    let reading: Reading = from_value(reading)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được chỉ số: {err}")))?;

    let outcome = match vitals_analytics::validate_reading(&reading, metric) {
        Ok(_) => ValidationOutcome {
            valid: true,
            message: "Valid reading".to_string(),
        },
        Err(err) => ValidationOutcome {
            valid: false,
            message: err.to_string(),
        },
    };
    to_js(&outcome)
}

#[wasm_bindgen(js_name = checkAlerts)]
pub fn check_alerts(reading: JsValue, metric: &str) -> Result<JsValue, JsValue> {
    let reading: Reading = from_value(reading)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được chỉ số: {err}")))?;
    let metric: Metric = metric
        .parse()
        .map_err(|err| JsValue::from_str(&format_vitals_error(err)))?;

    to_js(&vitals_analytics::check_alerts(&reading, metric))
}

// Plain objects instead of `Map` so hosts can index report sections by name.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

fn format_vitals_error(err: VitalsError) -> String {
    format!("Vitals error: {err}")
}
