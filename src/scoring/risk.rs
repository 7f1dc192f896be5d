// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Risk bands derived from the early-warning score

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordinal risk band, ascending in severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    Stable,
    Monitor,
    Urgent,
    Critical,
}

impl RiskBand {
    pub const ALL: [RiskBand; 4] = [
        RiskBand::Stable,
        RiskBand::Monitor,
        RiskBand::Urgent,
        RiskBand::Critical,
    ];

    /// Lowest score that falls into this band
    pub fn min_score(self) -> u32 {
        match self {
            RiskBand::Stable => 0,
            RiskBand::Monitor => 1,
            RiskBand::Urgent => 5,
            RiskBand::Critical => 7,
        }
    }

    pub fn color(self) -> DisplayColor {
        match self {
            RiskBand::Stable => DisplayColor::Green,
            RiskBand::Monitor => DisplayColor::Yellow,
            RiskBand::Urgent => DisplayColor::Orange,
            RiskBand::Critical => DisplayColor::Red,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RiskBand::Stable => "STABLE",
            RiskBand::Monitor => "MONITOR",
            RiskBand::Urgent => "URGENT",
            RiskBand::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical renderer color for a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayColor {
    Green,
    Yellow,
    Orange,
    Red,
}

impl DisplayColor {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayColor::Green => "GREEN",
            DisplayColor::Yellow => "YELLOW",
            DisplayColor::Orange => "ORANGE",
            DisplayColor::Red => "RED",
        }
    }
}

/// Band, color and human label for one score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub band: RiskBand,
    pub color: DisplayColor,
    pub label: String,
}

/// Map a score to its band
pub fn classify(score: u32) -> RiskBand {
    RiskBand::ALL
        .into_iter()
        .rev()
        .find(|band| score >= band.min_score())
        .unwrap_or(RiskBand::Stable)
}

/// Map a score to its band, color and label
pub fn assess(score: u32) -> RiskAssessment {
    let band = classify(score);
    RiskAssessment {
        score,
        band,
        color: band.color(),
        label: risk_label(band, score),
    }
}

/// Human label, e.g. `"URGENT (NEWS: 5)"`
pub fn risk_label(band: RiskBand, score: u32) -> String {
    format!("{} (NEWS: {})", band.name(), score)
}
