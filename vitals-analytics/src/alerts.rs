use vitals_core::{Alert, AlertLevel, Metric, Reading};

/// Classify one reading against the two-tier alert bands.
///
/// The critical band is checked first and wins; metrics without bands are
/// always `Normal`. A missing or unreadable value yields `AlertLevel::Missing`.
pub fn check_alerts(reading: &Reading, metric: Metric) -> Alert {
    let mut alert = Alert {
        metric,
        level: AlertLevel::Missing,
        message: None,
        value: None,
        threshold: None,
        timestamp: reading.timestamp,
    };

    let Some(value) = reading.numeric(metric) else {
        return alert;
    };

    if let Some(band) = metric.critical_band().filter(|band| !band.contains(value)) {
        alert.level = AlertLevel::Critical;
        alert.message = Some(format!(
            "CRITICAL: {metric} value {value} is outside safe range"
        ));
        alert.threshold = Some(band);
        alert.value = Some(value);
    } else if let Some(band) = metric.warning_band().filter(|band| !band.contains(value)) {
        alert.level = AlertLevel::Warning;
        alert.message = Some(format!("WARNING: {metric} value {value} requires attention"));
        alert.threshold = Some(band);
        alert.value = Some(value);
    } else {
        alert.level = AlertLevel::Normal;
    }

    alert
}
