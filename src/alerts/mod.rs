// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Alert derivation - ordered bed list and critical subset
//!
//! Recomputed from a registry snapshot on every tick. Ordering is:
//! critical beds first, then descending score, then ascending bed id, so equal
//! scores never swap places between ticks.

use std::cmp::Ordering;

use serde::Serialize;

use crate::registry::{RegistrySnapshot, ScoredState};
use crate::scoring::RiskBand;
use crate::vitals::BedStatus;

/// A bed is critical when it says so or when its score puts it in the top band.
///
/// An explicit non-critical status never clears a critical score.
pub fn is_critical(status: Option<&BedStatus>, band: RiskBand) -> bool {
    matches!(status, Some(BedStatus::Critical)) || band >= RiskBand::Critical
}

/// Display ordering for two beds
pub fn alert_order(a: &ScoredState, b: &ScoredState) -> Ordering {
    b.is_critical
        .cmp(&a.is_critical)
        .then_with(|| b.score().cmp(&a.score()))
        .then_with(|| a.bed_id.cmp(&b.bed_id))
}

/// Number of beds in each risk band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BandCounts {
    pub stable: usize,
    pub monitor: usize,
    pub urgent: usize,
    pub critical: usize,
}

impl BandCounts {
    fn add(&mut self, band: RiskBand) {
        match band {
            RiskBand::Stable => self.stable += 1,
            RiskBand::Monitor => self.monitor += 1,
            RiskBand::Urgent => self.urgent += 1,
            RiskBand::Critical => self.critical += 1,
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Default, Serialize)]
pub struct AlertBoard {
    /// All beds in alert order
    pub beds: Vec<ScoredState>,
    /// Length of the critical prefix of `beds`
    pub critical_count: usize,
    pub band_counts: BandCounts,
    pub offline_count: usize,
    /// Expected number of beds on the ward
    pub capacity: usize,
}

impl AlertBoard {
    /// Critical beds, most severe first
    pub fn critical(&self) -> &[ScoredState] {
        self.beds.get(..self.critical_count).unwrap_or(&[])
    }

    pub fn active_count(&self) -> usize {
        self.beds.len()
    }

    pub fn critical_ids(&self) -> Vec<&str> {
        self.critical().iter().map(|s| s.bed_id.as_str()).collect()
    }

    /// `"active/capacity"` metric for the ward header
    pub fn occupancy(&self) -> String {
        format!("{}/{}", self.active_count(), self.capacity)
    }
}

/// Build the board from a snapshot
pub fn derive(snapshot: &RegistrySnapshot, capacity: usize) -> AlertBoard {
    let mut beds = snapshot.beds.clone();
    beds.sort_by(alert_order);

    let critical_count = beds.iter().take_while(|s| s.is_critical).count();
    let offline_count = beds.iter().filter(|s| s.offline).count();

    let mut band_counts = BandCounts::default();
    for state in &beds {
        band_counts.add(state.band());
    }

    AlertBoard {
        beds,
        critical_count,
        band_counts,
        offline_count,
        capacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BedRegistry;
    use crate::vitals::Reading;
    use chrono::Utc;
    use std::time::Instant;

    fn reading(id: &str, hr: u32, spo2: u32, status: Option<BedStatus>) -> Reading {
        let mut r = Reading::with_defaults(id, Utc::now());
        r.heart_rate = hr;
        r.pulse = hr;
        r.spo2 = spo2;
        r.status = status;
        r
    }

    fn registry(readings: Vec<Reading>) -> BedRegistry {
        let now = Instant::now();
        let mut registry = BedRegistry::new();
        for r in readings {
            let id = r.bed_id.clone();
            registry.upsert(&id, r, now);
        }
        registry
    }

    fn ids(board: &AlertBoard) -> Vec<&str> {
        board.beds.iter().map(|s| s.bed_id.as_str()).collect()
    }

    #[test]
    fn test_is_critical() {
        assert!(is_critical(Some(&BedStatus::Critical), RiskBand::Stable));
        assert!(is_critical(None, RiskBand::Critical));
        assert!(is_critical(Some(&BedStatus::Normal), RiskBand::Critical));
        assert!(!is_critical(Some(&BedStatus::Normal), RiskBand::Urgent));
        assert!(!is_critical(Some(&BedStatus::Other("SEPSIS".into())), RiskBand::Monitor));
    }

    #[test]
    fn test_critical_first_then_score_then_id() {
        let registry = registry(vec![
            reading("BED-004", 75, 98, None),                        // 0
            reading("BED-003", 75, 98, Some(BedStatus::Critical)),   // flagged, 0
            reading("BED-002", 160, 85, None),                       // 9
            reading("BED-001", 115, 98, None),                       // 4
            reading("BED-005", 115, 98, None),                       // 4
        ]);

        let board = derive(&registry.snapshot(), 50);

        assert_eq!(ids(&board), vec!["BED-002", "BED-003", "BED-001", "BED-005", "BED-004"]);
        assert_eq!(board.critical_ids(), vec!["BED-002", "BED-003"]);
        assert_eq!(board.critical_count, 2);
    }

    #[test]
    fn test_equal_scores_order_by_id() {
        let registry = registry(vec![
            reading("BED-009", 160, 85, None),
            reading("BED-001", 160, 85, None),
            reading("BED-005", 160, 85, None),
        ]);

        let board = derive(&registry.snapshot(), 50);
        assert_eq!(ids(&board), vec!["BED-001", "BED-005", "BED-009"]);
    }

    #[test]
    fn test_derivation_is_repeatable() {
        let registry = registry(vec![
            reading("BED-003", 100, 93, None),
            reading("BED-001", 100, 93, None),
            reading("BED-002", 45, 99, None),
        ]);

        let snapshot = registry.snapshot();
        let first: Vec<String> = derive(&snapshot, 50).beds.into_iter().map(|s| s.bed_id).collect();
        for _ in 0..5 {
            let again: Vec<String> =
                derive(&snapshot, 50).beds.into_iter().map(|s| s.bed_id).collect();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_board_counts() {
        let registry = registry(vec![
            reading("BED-001", 75, 98, None),
            reading("BED-002", 160, 85, None),
            reading("BED-003", 100, 98, None),
        ]);

        let board = derive(&registry.snapshot(), 50);
        assert_eq!(
            board.band_counts,
            BandCounts {
                stable: 1,
                monitor: 1,
                urgent: 0,
                critical: 1
            }
        );
        assert_eq!(board.offline_count, 0);
        assert_eq!(board.occupancy(), "3/50");
    }

    #[test]
    fn test_inconsistent_board_does_not_panic() {
        let board = AlertBoard {
            critical_count: 3,
            ..Default::default()
        };
        assert!(board.critical().is_empty());
        assert!(board.critical_ids().is_empty());
    }

    #[test]
    fn test_empty_board() {
        let board = derive(&RegistrySnapshot::default(), 10);
        assert!(board.critical().is_empty());
        assert_eq!(board.occupancy(), "0/10");
    }
}
