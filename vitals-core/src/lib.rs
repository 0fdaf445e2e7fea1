//! Mô hình dữ liệu lõi cho phân tích chỉ số sống: bản ghi đo, bảng ngưỡng và cấu trúc báo cáo.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Cấu hình các ngưỡng dùng chung cho pipeline phân tích.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessorConfig {
    /// Ngưỡng z-score, vượt quá thì coi là bất thường.
    pub anomaly_threshold: f64,
    /// Kích thước cửa sổ làm mượt dữ liệu biểu đồ.
    pub moving_average_window: usize,
    /// Khoảng trống (phút) giữa hai lần đo liên tiếp bị trừ điểm chất lượng.
    pub max_gap_minutes: u32,
    /// Tỉ lệ thiếu dữ liệu (%) mà vượt quá thì metric bị trừ điểm.
    pub missing_value_percent: f64,
    /// Số cảnh báo warning mà vượt quá thì khuyến nghị tái khám.
    pub warning_alert_limit: usize,
    /// Điểm chất lượng dưới mức này thì khuyến nghị kiểm tra cảm biến.
    pub min_quality_score: u32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: 2.5,
            moving_average_window: 5,
            max_gap_minutes: 60,
            missing_value_percent: 20.0,
            warning_alert_limit: 5,
            min_quality_score: 70,
        }
    }
}

/// Các chỉ số sống mà một bản ghi có thể mang.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    HeartRate,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    OxygenSaturation,
    Temperature,
    RespiratoryRate,
    GlucoseLevel,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::HeartRate,
        Metric::BloodPressureSystolic,
        Metric::BloodPressureDiastolic,
        Metric::OxygenSaturation,
        Metric::Temperature,
        Metric::RespiratoryRate,
        Metric::GlucoseLevel,
    ];

    /// Tên trường dùng trong JSON và khi xuất dữ liệu.
    pub fn name(self) -> &'static str {
        match self {
            Metric::HeartRate => "heartRate",
            Metric::BloodPressureSystolic => "bloodPressureSystolic",
            Metric::BloodPressureDiastolic => "bloodPressureDiastolic",
            Metric::OxygenSaturation => "oxygenSaturation",
            Metric::Temperature => "temperature",
            Metric::RespiratoryRate => "respiratoryRate",
            Metric::GlucoseLevel => "glucoseLevel",
        }
    }

    /// Khoảng giá trị hợp lệ về mặt sinh lý.
    pub fn rule(self) -> MetricRule {
        VALIDATION_RULES[self as usize].clone()
    }

    pub fn critical_band(self) -> Option<Band> {
        lookup_band(CRITICAL_BANDS, self)
    }

    pub fn warning_band(self) -> Option<Band> {
        lookup_band(WARNING_BANDS, self)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = VitalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.name() == s)
            .ok_or_else(|| VitalsError::UnknownMetric(s.to_string()))
    }
}

/// Khoảng đo hợp lệ của một metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRule {
    pub min: f64,
    pub max: f64,
    pub unit: Cow<'static, str>,
}

impl MetricRule {
    const fn new(min: f64, max: f64, unit: &'static str) -> Self {
        Self {
            min,
            max,
            unit: Cow::Borrowed(unit),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

// Truy cập theo `Metric as usize`.
const VALIDATION_RULES: [MetricRule; 7] = [
    MetricRule::new(40.0, 200.0, "bpm"),
    MetricRule::new(70.0, 250.0, "mmHg"),
    MetricRule::new(40.0, 150.0, "mmHg"),
    MetricRule::new(70.0, 100.0, "%"),
    MetricRule::new(32.0, 42.0, "°C"),
    MetricRule::new(8.0, 40.0, "breaths/min"),
    MetricRule::new(50.0, 600.0, "mg/dL"),
];

/// Dải ngưỡng cảnh báo (bao gồm hai đầu).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Ngoài dải này thì giá trị ở mức nguy cấp.
pub const CRITICAL_BANDS: &[(Metric, Band)] = &[
    (Metric::HeartRate, Band::new(50.0, 180.0)),
    (Metric::BloodPressureSystolic, Band::new(90.0, 180.0)),
    (Metric::OxygenSaturation, Band::new(90.0, 100.0)),
];

/// Ngoài dải này thì giá trị cần chú ý.
pub const WARNING_BANDS: &[(Metric, Band)] = &[
    (Metric::HeartRate, Band::new(60.0, 150.0)),
    (Metric::BloodPressureSystolic, Band::new(120.0, 140.0)),
    (Metric::OxygenSaturation, Band::new(95.0, 100.0)),
];

fn lookup_band(table: &[(Metric, Band)], metric: Metric) -> Option<Band> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == metric)
        .map(|(_, band)| *band)
}

/// Một lần đo từ monitor đầu giường hoặc thiết bị đeo.
///
/// Trường metric là `None` khi không đo. Giá trị không phải số JSON được giữ
/// dưới dạng `NaN` để bước kiểm tra hợp lệ báo lỗi.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "device_id")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "patient_id")]
    pub patient_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", alias = "heart_rate")]
    pub heart_rate: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        alias = "bp_systolic",
        alias = "blood_pressure_systolic"
    )]
    pub blood_pressure_systolic: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        alias = "bp_diastolic",
        alias = "blood_pressure_diastolic"
    )]
    pub blood_pressure_diastolic: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        alias = "spo2",
        alias = "oxygen_saturation"
    )]
    pub oxygen_saturation: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", alias = "respiratory_rate")]
    pub respiratory_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", alias = "glucose_level")]
    pub glucose_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Reading {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..Self::default()
        }
    }

    /// Setter kiểu builder, chủ yếu cho dữ liệu test.
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        *self.slot_mut(metric) = Some(value);
        self
    }

    /// Giá trị thô đã lưu. Có thể là `NaN` nếu input lỗi.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::HeartRate => self.heart_rate,
            Metric::BloodPressureSystolic => self.blood_pressure_systolic,
            Metric::BloodPressureDiastolic => self.blood_pressure_diastolic,
            Metric::OxygenSaturation => self.oxygen_saturation,
            Metric::Temperature => self.temperature,
            Metric::RespiratoryRate => self.respiratory_rate,
            Metric::GlucoseLevel => self.glucose_level,
        }
    }

    /// Giá trị dùng được để tính toán: có mặt và không phải `NaN`.
    pub fn numeric(&self, metric: Metric) -> Option<f64> {
        self.value(metric).filter(|value| !value.is_nan())
    }

    fn slot_mut(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::HeartRate => &mut self.heart_rate,
            Metric::BloodPressureSystolic => &mut self.blood_pressure_systolic,
            Metric::BloodPressureDiastolic => &mut self.blood_pressure_diastolic,
            Metric::OxygenSaturation => &mut self.oxygen_saturation,
            Metric::Temperature => &mut self.temperature,
            Metric::RespiratoryRate => &mut self.respiratory_rate,
            Metric::GlucoseLevel => &mut self.glucose_level,
        }
    }
}

/// Đọc RFC 3339, nếu không được thì thử ISO-8601 không múi giờ (coi là UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientNumber)
}

struct LenientNumber;

impl<'de> Visitor<'de> for LenientNumber {
    type Value = Option<f64>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a numeric measurement or null")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(Some(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value as f64))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(value as f64))
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Self::Value, E> {
        Ok(Some(f64::NAN))
    }

    fn visit_str<E: de::Error>(self, _value: &str) -> Result<Self::Value, E> {
        Ok(Some(f64::NAN))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Some(f64::NAN))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Some(f64::NAN))
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(LenientTimestamp)
}

struct LenientTimestamp;

impl<'de> Visitor<'de> for LenientTimestamp {
    type Value = Option<DateTime<Utc>>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an ISO-8601 timestamp, epoch milliseconds or null")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(parse_timestamp(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(DateTime::from_timestamp_millis(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(value)
            .ok()
            .and_then(DateTime::from_timestamp_millis))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if value.is_finite() {
            Ok(DateTime::from_timestamp_millis(value as i64))
        } else {
            Ok(None)
        }
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(None)
    }
}

/// Thống kê mô tả của một mẫu số liệu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub standard_deviation: f64,
    pub variance: f64,
    pub q1: f64,
    pub q3: f64,
    pub range: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    Critical,
    Warning,
}

/// Bản ghi có giá trị lệch xa trung bình mẫu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub index: usize,
    pub reading: Reading,
    pub value: f64,
    pub z_score: f64,
    pub severity: AnomalySeverity,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Kết quả hồi quy tuyến tính của một metric theo thời gian.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    pub direction: TrendDirection,
    /// Đơn vị mỗi giờ.
    pub slope: f64,
    pub correlation: f64,
    pub change_over_time: f64,
    pub change_rate: f64,
    pub time_span_hours: f64,
}

/// Mức cảnh báo của một giá trị.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Không có giá trị để kiểm tra.
    #[serde(rename = "none")]
    Missing,
    Normal,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub metric: Metric,
    pub level: AlertLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Band>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Alert {
    /// Warning hoặc critical.
    pub fn is_actionable(&self) -> bool {
        matches!(self.level, AlertLevel::Warning | AlertLevel::Critical)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Normal,
    Warning,
    Critical,
}

impl OverallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OverallStatus::Normal => "normal",
            OverallStatus::Warning => "warning",
            OverallStatus::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub priority: Priority,
    pub message: String,
    pub action: String,
}

/// Điểm (0-100) và các vấn đề làm giảm điểm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataQuality {
    pub score: u32,
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completeness: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub overall_status: OverallStatus,
    pub total_alerts: usize,
    pub critical_alerts: usize,
    pub warning_alerts: usize,
    pub data_quality: DataQuality,
    pub recommendations: Vec<Recommendation>,
}

/// Chuỗi dữ liệu thô đính kèm khi yêu cầu biểu đồ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub timestamps: Vec<Option<DateTime<Utc>>>,
    pub values: Vec<Option<f64>>,
    pub moving_average: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricAnalysis {
    pub statistics: Statistics,
    pub trend: Option<TrendResult>,
    pub anomalies: usize,
    pub alert_count: usize,
    pub last_value: f64,
    pub rules: MetricRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<ChartData>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataStatus {
    NoData,
}

/// Phần báo cáo cho từng metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetricReport {
    Analyzed(Box<MetricAnalysis>),
    NoData { status: DataStatus },
}

impl MetricReport {
    pub fn no_data() -> Self {
        MetricReport::NoData {
            status: DataStatus::NoData,
        }
    }

    pub fn analysis(&self) -> Option<&MetricAnalysis> {
        match self {
            MetricReport::Analyzed(analysis) => Some(analysis),
            MetricReport::NoData { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub total_readings: usize,
}

/// Kết quả phân tích tổng hợp của một tập bản ghi.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default)]
    pub patient_id: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub time_range: TimeRange,
    pub metrics: BTreeMap<Metric, MetricReport>,
    pub alerts: Vec<Alert>,
    pub summary: ReportSummary,
}

impl Report {
    pub fn metric(&self, metric: Metric) -> Option<&MetricAnalysis> {
        self.metrics.get(&metric).and_then(MetricReport::analysis)
    }
}

/// Phạm vi mà `generate_report` cần phân tích.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportOptions {
    /// Mặc định là mọi metric đã biết.
    #[serde(default)]
    pub metrics: Option<Vec<Metric>>,
    #[serde(default)]
    pub include_charts: bool,
    #[serde(default)]
    pub patient_id: Option<String>,
}

impl ReportOptions {
    pub fn selected_metrics(&self) -> Vec<Metric> {
        self.metrics
            .clone()
            .unwrap_or_else(|| Metric::ALL.to_vec())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Summary,
}

impl FromStr for ExportFormat {
    type Err = VitalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "summary" => Ok(ExportFormat::Summary),
            _ => Err(VitalsError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Lỗi chung của API phân tích.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VitalsError {
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
    #[error("Missing value for {0}")]
    MissingValue(Metric),
    #[error("Invalid number for {0}")]
    NotANumber(Metric),
    #[error("{metric} value {value} is outside valid range [{min}, {max}] {unit}")]
    OutOfRange {
        metric: Metric,
        value: f64,
        min: f64,
        max: f64,
        unit: Cow<'static, str>,
    },
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
    #[error("Could not read input: {0}")]
    Parse(String),
    #[error("Could not serialize report: {0}")]
    Serialization(String),
}
