// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Raw payload normalization
//!
//! Turns one wire message into a [`Reading`]. Only a missing or unusable `id`
//! rejects the message; every other bad field falls back to its default.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use super::{BedStatus, BloodPressure, Reading};

const HEART_RATE_RANGE: RangeInclusive<i64> = 0..=300;
const SPO2_RANGE: RangeInclusive<i64> = 0..=100;
const RESPIRATORY_RANGE: RangeInclusive<i64> = 0..=80;
const SYSTOLIC_RANGE: RangeInclusive<i64> = 0..=300;
const DIASTOLIC_RANGE: RangeInclusive<i64> = 0..=250;
const FLUID_RANGE: RangeInclusive<i64> = 0..=100;
const TEMPERATURE_RANGE: RangeInclusive<f64> = 25.0..=45.0;

/// Why a payload was dropped
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(String),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("payload has no `id` field")]
    MissingId,

    #[error("`id` must be a non-empty string")]
    InvalidId,
}

/// Parse and normalize a raw wire payload
pub fn normalize(raw: &str, received_at: DateTime<Utc>) -> Result<Reading, NormalizeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| NormalizeError::Malformed(e.to_string()))?;
    normalize_value(&value, received_at)
}

/// Normalize an already-decoded payload
pub fn normalize_value(value: &Value, received_at: DateTime<Utc>) -> Result<Reading, NormalizeError> {
    let fields = value.as_object().ok_or(NormalizeError::NotAnObject)?;

    let bed_id = match fields.get("id") {
        None | Some(Value::Null) => return Err(NormalizeError::MissingId),
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
        Some(_) => return Err(NormalizeError::InvalidId),
    };

    let mut reading = Reading::with_defaults(&bed_id, received_at);

    if let Some(hr) = int_field(fields, "hr", HEART_RATE_RANGE) {
        reading.heart_rate = hr;
    }
    reading.pulse = int_field(fields, "pulse", HEART_RATE_RANGE).unwrap_or(reading.heart_rate);

    if let Some(spo2) = int_field(fields, "spo2", SPO2_RANGE) {
        reading.spo2 = spo2;
    }
    if let Some(rr) = int_field(fields, "rr", RESPIRATORY_RANGE) {
        reading.respiratory_rate = rr;
    }
    if let Some(temp) = number(fields.get("temp")).filter(|t| TEMPERATURE_RANGE.contains(t)) {
        reading.temperature = temp;
    }

    reading.blood_pressure = fields
        .get("bp")
        .and_then(Value::as_str)
        .and_then(parse_blood_pressure)
        .unwrap_or_default();

    reading.fluid_level = int_field(fields, "fluid", FLUID_RANGE);
    reading.status = fields
        .get("status")
        .and_then(Value::as_str)
        .and_then(BedStatus::parse);
    reading.reported_at = number(fields.get("timestamp")).and_then(epoch_seconds);

    Ok(reading)
}

/// Parse `"sys/dia"` text. Anything else yields `None`.
pub fn parse_blood_pressure(text: &str) -> Option<BloodPressure> {
    let (sys, dia) = text.split_once('/')?;
    let sys: i64 = sys.trim().parse().ok()?;
    let dia: i64 = dia.trim().parse().ok()?;

    if !SYSTOLIC_RANGE.contains(&sys) || !DIASTOLIC_RANGE.contains(&dia) {
        return None;
    }

    Some(BloodPressure::new(sys as u32, dia as u32))
}

fn int_field(fields: &Map<String, Value>, key: &str, range: RangeInclusive<i64>) -> Option<u32> {
    let value = number(fields.get(key))?.round();
    if !value.is_finite() {
        return None;
    }
    let value = value as i64;
    range.contains(&value).then_some(value as u32)
}

/// Accepts JSON numbers and numeric strings
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if secs < 0.0 {
        return None;
    }
    let whole = secs.trunc();
    let nanos = ((secs - whole) * 1e9) as u32;
    DateTime::<Utc>::from_timestamp(whole as i64, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Reading, NormalizeError> {
        normalize(raw, Utc::now())
    }

    #[test]
    fn test_full_payload() {
        let reading = parse(
            r#"{"id":"BED-001","hr":160,"pulse":150,"spo2":85,"rr":30,"bp":"80/50",
                "temp":38.5,"fluid":42,"status":"CRITICAL","timestamp":1700000000.5}"#,
        )
        .unwrap();

        assert_eq!(reading.bed_id, "BED-001");
        assert_eq!(reading.heart_rate, 160);
        assert_eq!(reading.pulse, 150);
        assert_eq!(reading.spo2, 85);
        assert_eq!(reading.respiratory_rate, 30);
        assert_eq!(reading.blood_pressure, BloodPressure::new(80, 50));
        assert_eq!(reading.temperature, 38.5);
        assert_eq!(reading.fluid_level, Some(42));
        assert_eq!(reading.status, Some(BedStatus::Critical));
        assert_eq!(reading.reported_at.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let reading = parse(r#"{"id":"BED-003"}"#).unwrap();

        assert_eq!(reading.heart_rate, 0);
        assert_eq!(reading.pulse, 0);
        assert_eq!(reading.spo2, 98);
        assert_eq!(reading.respiratory_rate, 16);
        assert_eq!(reading.blood_pressure.systolic, 120);
        assert_eq!(reading.blood_pressure.diastolic, None);
        assert_eq!(reading.temperature, 37.0);
        assert_eq!(reading.fluid_level, None);
        assert_eq!(reading.status, None);
        assert_eq!(reading.reported_at, None);
    }

    #[test]
    fn test_pulse_follows_heart_rate() {
        let reading = parse(r#"{"id":"BED-004","hr":72}"#).unwrap();
        assert_eq!(reading.pulse, 72);
    }

    #[test]
    fn test_malformed_blood_pressure() {
        for bp in [r#""high""#, r#""120""#, r#""abc/80""#, r#""120/""#, "12080"] {
            let raw = format!(r#"{{"id":"BED-005","bp":{}}}"#, bp);
            let reading = parse(&raw).unwrap();
            assert_eq!(reading.blood_pressure.systolic, 120, "bp {}", bp);
            assert_eq!(reading.blood_pressure.diastolic, None, "bp {}", bp);
        }
    }

    #[test]
    fn test_bad_fields_fall_back() {
        let reading = parse(
            r#"{"id":"BED-006","hr":"fast","spo2":140,"temp":null,"rr":-3,"fluid":"lots"}"#,
        )
        .unwrap();

        assert_eq!(reading.heart_rate, 0);
        assert_eq!(reading.spo2, 98);
        assert_eq!(reading.temperature, 37.0);
        assert_eq!(reading.respiratory_rate, 16);
        assert_eq!(reading.fluid_level, None);
    }

    #[test]
    fn test_out_of_range_values_take_defaults() {
        for temp in ["50.0", "20.0", "45.1", "24.9"] {
            let raw = format!(r#"{{"id":"BED-010","temp":{}}}"#, temp);
            assert_eq!(parse(&raw).unwrap().temperature, 37.0, "temp {}", temp);
        }
        let edge = parse(r#"{"id":"BED-010","temp":45.0}"#).unwrap();
        assert_eq!(edge.temperature, 45.0);

        let reading = parse(r#"{"id":"BED-011","hr":301}"#).unwrap();
        assert_eq!(reading.heart_rate, 0);
        assert_eq!(reading.pulse, 0);

        let reading = parse(r#"{"id":"BED-011","hr":80,"pulse":400}"#).unwrap();
        assert_eq!(reading.pulse, 80);

        let reading = parse(r#"{"id":"BED-012","bp":"120/300"}"#).unwrap();
        assert_eq!(reading.blood_pressure, BloodPressure::unknown());

        let reading = parse(r#"{"id":"BED-013","fluid":101}"#).unwrap();
        assert_eq!(reading.fluid_level, None);
    }

    #[test]
    fn test_invalid_timestamp_is_absent() {
        for ts in [r#""abc""#, "-5", "null", "[1]"] {
            let raw = format!(r#"{{"id":"BED-014","timestamp":{}}}"#, ts);
            assert_eq!(parse(&raw).unwrap().reported_at, None, "timestamp {}", ts);
        }
        let reading = parse(r#"{"id":"BED-014","timestamp":"1700000000"}"#).unwrap();
        assert_eq!(reading.reported_at.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_numeric_strings_and_floats() {
        let reading = parse(r#"{"id":"BED-008","hr":"88","spo2":95.6,"temp":"36.4"}"#).unwrap();
        assert_eq!(reading.heart_rate, 88);
        assert_eq!(reading.spo2, 96);
        assert_eq!(reading.temperature, 36.4);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let reading = parse(r#"{"id":"BED-009","hr":70,"firmware":"2.1","extra":[1,2]}"#).unwrap();
        assert_eq!(reading.heart_rate, 70);
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(parse("not json"), Err(NormalizeError::Malformed(_))));
        assert_eq!(parse("[1,2,3]"), Err(NormalizeError::NotAnObject));
        assert_eq!(parse(r#"{"hr":80}"#), Err(NormalizeError::MissingId));
        assert_eq!(parse(r#"{"id":null}"#), Err(NormalizeError::MissingId));
        assert_eq!(parse(r#"{"id":""}"#), Err(NormalizeError::InvalidId));
        assert_eq!(parse(r#"{"id":17}"#), Err(NormalizeError::InvalidId));
    }

    #[test]
    fn test_parse_blood_pressure() {
        assert_eq!(parse_blood_pressure("118/76"), Some(BloodPressure::new(118, 76)));
        assert_eq!(parse_blood_pressure(" 90 / 60 "), Some(BloodPressure::new(90, 60)));
        assert_eq!(parse_blood_pressure("900/60"), None);
        assert_eq!(parse_blood_pressure("1/2/3"), None);
    }
}
