// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! NEWS-style early-warning score
//!
//! Six banded parameters, each worth 0-3 points, summed without weighting.
//! Every function here is pure so a live score always matches an offline replay.

use serde::{Deserialize, Serialize};

use crate::vitals::Reading;

/// Per-parameter contributions to a total score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub respiratory_rate: u32,
    pub spo2: u32,
    pub temperature: u32,
    pub systolic: u32,
    pub heart_rate: u32,
    pub pulse: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.respiratory_rate
            + self.spo2
            + self.temperature
            + self.systolic
            + self.heart_rate
            + self.pulse
    }

    /// Name and points of the parameter contributing most (first wins on ties)
    pub fn dominant(&self) -> Option<(&'static str, u32)> {
        let parts = [
            ("respiratory_rate", self.respiratory_rate),
            ("spo2", self.spo2),
            ("temperature", self.temperature),
            ("systolic", self.systolic),
            ("heart_rate", self.heart_rate),
            ("pulse", self.pulse),
        ];

        parts
            .into_iter()
            .filter(|(_, points)| *points > 0)
            .fold(None, |best: Option<(&'static str, u32)>, part| match best {
                Some(b) if b.1 >= part.1 => Some(b),
                _ => Some(part),
            })
    }
}

/// Score a full reading
pub fn score(reading: &Reading) -> u32 {
    breakdown(reading).total()
}

/// Score each parameter of a reading
pub fn breakdown(reading: &Reading) -> ScoreBreakdown {
    ScoreBreakdown {
        respiratory_rate: respiratory_rate_points(reading.respiratory_rate),
        spo2: spo2_points(reading.spo2),
        temperature: temperature_points(reading.temperature),
        systolic: systolic_points(reading.blood_pressure.systolic),
        heart_rate: heart_rate_points(reading.heart_rate),
        pulse: heart_rate_points(reading.pulse),
    }
}

pub fn respiratory_rate_points(rr: u32) -> u32 {
    match rr {
        0..=8 => 3,
        9..=11 => 1,
        12..=20 => 0,
        21..=24 => 2,
        _ => 3,
    }
}

pub fn spo2_points(spo2: u32) -> u32 {
    match spo2 {
        0..=91 => 3,
        92..=93 => 2,
        94..=95 => 1,
        _ => 0,
    }
}

/// Bands are contiguous: a value scores by the first upper bound it does not exceed.
pub fn temperature_points(temp: f64) -> u32 {
    if temp <= 35.0 {
        3
    } else if temp <= 36.0 {
        1
    } else if temp <= 38.0 {
        0
    } else if temp <= 39.0 {
        1
    } else {
        2
    }
}

pub fn systolic_points(systolic: u32) -> u32 {
    match systolic {
        0..=90 => 3,
        91..=100 => 2,
        101..=110 => 1,
        111..=219 => 0,
        _ => 3,
    }
}

/// Shared by electrical heart rate and mechanical pulse
pub fn heart_rate_points(bpm: u32) -> u32 {
    match bpm {
        0..=40 => 3,
        41..=50 => 1,
        51..=90 => 0,
        91..=110 => 1,
        111..=130 => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vitals::BloodPressure;
    use chrono::Utc;

    fn reading(hr: u32, spo2: u32, sys: u32, temp: f64, rr: u32) -> Reading {
        let mut r = Reading::with_defaults("BED-T", Utc::now());
        r.heart_rate = hr;
        r.pulse = hr;
        r.spo2 = spo2;
        r.blood_pressure = BloodPressure::new(sys, 80);
        r.temperature = temp;
        r.respiratory_rate = rr;
        r
    }

    #[test]
    fn test_respiratory_boundaries() {
        let cases = [(8, 3), (9, 1), (11, 1), (12, 0), (20, 0), (21, 2), (24, 2), (25, 3)];
        for (rr, points) in cases {
            assert_eq!(respiratory_rate_points(rr), points, "rr {}", rr);
        }
    }

    #[test]
    fn test_spo2_boundaries() {
        let cases = [(91, 3), (92, 2), (93, 2), (94, 1), (95, 1), (96, 0), (100, 0)];
        for (spo2, points) in cases {
            assert_eq!(spo2_points(spo2), points, "spo2 {}", spo2);
        }
    }

    #[test]
    fn test_temperature_boundaries() {
        let cases = [
            (35.0, 3),
            (35.05, 1),
            (35.1, 1),
            (36.0, 1),
            (36.1, 0),
            (38.0, 0),
            (38.1, 1),
            (39.0, 1),
            (39.1, 2),
        ];
        for (temp, points) in cases {
            assert_eq!(temperature_points(temp), points, "temp {}", temp);
        }
    }

    #[test]
    fn test_systolic_boundaries() {
        let cases = [(90, 3), (91, 2), (100, 2), (101, 1), (110, 1), (111, 0), (219, 0), (220, 3)];
        for (sys, points) in cases {
            assert_eq!(systolic_points(sys), points, "systolic {}", sys);
        }
    }

    #[test]
    fn test_heart_rate_boundaries() {
        let cases = [
            (40, 3),
            (41, 1),
            (50, 1),
            (51, 0),
            (90, 0),
            (91, 1),
            (110, 1),
            (111, 2),
            (130, 2),
            (131, 3),
        ];
        for (bpm, points) in cases {
            assert_eq!(heart_rate_points(bpm), points, "bpm {}", bpm);
        }
    }

    #[test]
    fn test_healthy_reading_scores_zero() {
        let r = reading(75, 98, 120, 36.8, 14);
        assert_eq!(score(&r), 0);
        assert_eq!(breakdown(&r).dominant(), None);
    }

    #[test]
    fn test_deteriorating_reading() {
        let r = reading(160, 85, 80, 38.5, 30);
        let parts = breakdown(&r);

        assert_eq!(parts.respiratory_rate, 3);
        assert_eq!(parts.spo2, 3);
        assert_eq!(parts.temperature, 1);
        assert_eq!(parts.systolic, 3);
        assert_eq!(parts.heart_rate, 3);
        assert_eq!(parts.pulse, 3);
        assert_eq!(score(&r), 16);
        assert_eq!(parts.dominant(), Some(("respiratory_rate", 3)));
    }

    #[test]
    fn test_pulse_scored_separately() {
        let mut r = reading(75, 98, 120, 36.8, 14);
        r.pulse = 45;
        assert_eq!(breakdown(&r).pulse, 1);
        assert_eq!(score(&r), 1);
    }

    #[test]
    fn test_score_is_deterministic() {
        let r = reading(112, 93, 99, 35.5, 22);
        let first = score(&r);
        for _ in 0..10 {
            assert_eq!(score(&r), first);
        }
    }
}
