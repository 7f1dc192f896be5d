// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Typed bedside reading and its component values

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Explicit status tag sent by a bed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BedStatus {
    Normal,
    Critical,
    /// Any other tag, upper-cased (e.g. `SEPSIS`, `SHOCK`)
    Other(String),
}

impl BedStatus {
    /// Parse a status tag case-insensitively. Blank tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }

        let upper = tag.to_ascii_uppercase();
        Some(match upper.as_str() {
            "NORMAL" => BedStatus::Normal,
            "CRITICAL" => BedStatus::Critical,
            _ => BedStatus::Other(upper),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            BedStatus::Normal => "NORMAL",
            BedStatus::Critical => "CRITICAL",
            BedStatus::Other(tag) => tag,
        }
    }
}

impl fmt::Display for BedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blood pressure pair. Diastolic is unknown when the wire text was malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: Option<u32>,
}

impl BloodPressure {
    pub const DEFAULT_SYSTOLIC: u32 = 120;

    pub fn new(systolic: u32, diastolic: u32) -> Self {
        Self {
            systolic,
            diastolic: Some(diastolic),
        }
    }

    /// Systolic default with no diastolic value
    pub fn unknown() -> Self {
        Self {
            systolic: Self::DEFAULT_SYSTOLIC,
            diastolic: None,
        }
    }
}

impl Default for BloodPressure {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.diastolic {
            Some(dia) => write!(f, "{}/{}", self.systolic, dia),
            None => write!(f, "{}", self.systolic),
        }
    }
}

/// One normalized report from a bed. Every field already carries its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub bed_id: String,

    /// Electrical heart rate (bpm)
    pub heart_rate: u32,

    /// Mechanical pulse rate (bpm), equals heart rate when not reported
    pub pulse: u32,

    /// Oxygen saturation (%)
    pub spo2: u32,

    /// Breaths per minute
    pub respiratory_rate: u32,

    pub blood_pressure: BloodPressure,

    /// Core temperature (°C)
    pub temperature: f64,

    /// Infusion reservoir level (%)
    pub fluid_level: Option<u32>,

    pub status: Option<BedStatus>,

    /// Time stamped by the bed, if it sent one
    pub reported_at: Option<DateTime<Utc>>,

    pub received_at: DateTime<Utc>,
}

impl Reading {
    pub const DEFAULT_HEART_RATE: u32 = 0;
    pub const DEFAULT_SPO2: u32 = 98;
    pub const DEFAULT_RESPIRATORY_RATE: u32 = 16;
    pub const DEFAULT_TEMPERATURE: f64 = 37.0;

    /// A reading with every vital at its default
    pub fn with_defaults(bed_id: &str, received_at: DateTime<Utc>) -> Self {
        Self {
            bed_id: bed_id.to_string(),
            heart_rate: Self::DEFAULT_HEART_RATE,
            pulse: Self::DEFAULT_HEART_RATE,
            spo2: Self::DEFAULT_SPO2,
            respiratory_rate: Self::DEFAULT_RESPIRATORY_RATE,
            blood_pressure: BloodPressure::unknown(),
            temperature: Self::DEFAULT_TEMPERATURE,
            fluid_level: None,
            status: None,
            reported_at: None,
            received_at,
        }
    }

    pub fn has_critical_status(&self) -> bool {
        matches!(self.status, Some(BedStatus::Critical))
    }
}
