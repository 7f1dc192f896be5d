//! Vitals module - typed readings and wire normalization

mod reading;
mod normalizer;

pub use reading::{BedStatus, BloodPressure, Reading};
pub use normalizer::{normalize, normalize_value, parse_blood_pressure, NormalizeError};
