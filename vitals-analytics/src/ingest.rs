//! Loading readings from JSON payloads and device logs.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};
use vitals_core::{Reading, VitalsError};

/// Parse a JSON array of readings.
pub fn parse_readings_str(json: &str) -> Result<Vec<Reading>, VitalsError> {
    serde_json::from_str(json).map_err(|err| VitalsError::Parse(err.to_string()))
}

/// Parse one JSON line emitted by a device.
///
/// Accepts the device field names (`heart_rate`, `bp_systolic`, `spo2`, ...).
/// A line without a timestamp (absent or `null`) is stamped with the receive
/// time; a timestamp that is present but unreadable rejects the line.
pub fn parse_device_line(line: &str) -> Result<Reading, VitalsError> {
    let value: Value = serde_json::from_str(line.trim()).map_err(|err| {
        warn!(error = %err, "failed to parse device data");
        VitalsError::Parse(err.to_string())
    })?;

    let stamped = value
        .get("timestamp")
        .is_some_and(|timestamp| !timestamp.is_null());

    let mut reading: Reading = serde_json::from_value(value).map_err(|err| {
        warn!(error = %err, "failed to parse device data");
        VitalsError::Parse(err.to_string())
    })?;

    match reading.timestamp {
        Some(_) => {}
        None if stamped => {
            warn!("failed to parse device data: unreadable timestamp");
            return Err(VitalsError::Parse("unreadable timestamp".to_string()));
        }
        None => reading.timestamp = Some(Utc::now()),
    }

    Ok(reading)
}

/// Parse every non-empty line of a device log, skipping lines that fail.
pub fn parse_device_log(log: &str) -> Vec<Reading> {
    let readings: Vec<Reading> = log
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_device_line(line).ok())
        .collect();
    debug!(count = readings.len(), "device log parsed");
    readings
}

/// Readings stamped within `[start, end]`, oldest first.
pub fn readings_between(
    readings: &[Reading],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<Reading> {
    let mut selected: Vec<Reading> = readings
        .iter()
        .filter(|reading| {
            reading
                .timestamp
                .is_some_and(|timestamp| timestamp >= start && timestamp <= end)
        })
        .cloned()
        .collect();
    selected.sort_by_key(|reading| reading.timestamp);
    selected
}

pub fn readings_for_patient(readings: &[Reading], patient_id: &str) -> Vec<Reading> {
    readings
        .iter()
        .filter(|reading| reading.patient_id.as_deref() == Some(patient_id))
        .cloned()
        .collect()
}
