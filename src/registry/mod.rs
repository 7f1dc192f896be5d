// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Bed registry - latest scored state per bed, liveness and eviction
//!
//! The registry has a single owner (the processing engine). Listener threads
//! never see it; they only feed the mailbox.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::alerts::is_critical;
use crate::scoring::{self, RiskAssessment, RiskBand, ScoreBreakdown};
use crate::vitals::Reading;

/// Current state of one bed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredState {
    pub bed_id: String,
    pub reading: Reading,
    pub breakdown: ScoreBreakdown,
    pub assessment: RiskAssessment,
    pub is_critical: bool,
    pub offline: bool,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub last_update: Instant,
}

impl ScoredState {
    /// Score and classify a reading in one step
    pub fn new(bed_id: &str, reading: Reading, now: Instant) -> Self {
        let breakdown = scoring::breakdown(&reading);
        let assessment = scoring::assess(breakdown.total());
        let is_critical = is_critical(reading.status.as_ref(), assessment.band);

        Self {
            bed_id: bed_id.to_string(),
            updated_at: reading.received_at,
            reading,
            breakdown,
            assessment,
            is_critical,
            offline: false,
            last_update: now,
        }
    }

    pub fn score(&self) -> u32 {
        self.assessment.score
    }

    pub fn band(&self) -> RiskBand {
        self.assessment.band
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_update)
    }
}

/// Point-in-time copy of every bed, ordered by id
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrySnapshot {
    pub beds: Vec<ScoredState>,
}

impl RegistrySnapshot {
    pub fn len(&self) -> usize {
        self.beds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beds.is_empty()
    }

    pub fn get(&self, bed_id: &str) -> Option<&ScoredState> {
        self.beds.iter().find(|s| s.bed_id == bed_id)
    }
}

/// Authoritative bed id → state map
#[derive(Debug, Default)]
pub struct BedRegistry {
    beds: HashMap<String, ScoredState>,
}

impl BedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the state for `bed_id` with a freshly scored one.
    ///
    /// Returns the state it replaced, or `None` for a newly admitted bed.
    pub fn upsert(&mut self, bed_id: &str, reading: Reading, now: Instant) -> Option<ScoredState> {
        let state = ScoredState::new(bed_id, reading, now);
        self.beds.insert(bed_id.to_string(), state)
    }

    /// Remove every bed silent for longer than `eviction_timeout`
    pub fn sweep(&mut self, now: Instant, eviction_timeout: Duration) -> Vec<ScoredState> {
        let stale: Vec<String> = self
            .beds
            .iter()
            .filter(|(_, state)| state.age(now) > eviction_timeout)
            .map(|(id, _)| id.clone())
            .collect();

        let mut evicted: Vec<ScoredState> = stale
            .iter()
            .filter_map(|id| self.beds.remove(id))
            .collect();
        evicted.sort_by(|a, b| a.bed_id.cmp(&b.bed_id));

        for state in &evicted {
            debug!("Evicted {} after {:?} of silence", state.bed_id, state.age(now));
        }

        evicted
    }

    /// Flag beds silent for longer than `liveness_timeout` as offline.
    ///
    /// Returns the ids that went offline on this call.
    pub fn mark_offline(&mut self, now: Instant, liveness_timeout: Duration) -> Vec<String> {
        let mut newly_offline = Vec::new();

        for (id, state) in self.beds.iter_mut() {
            let offline = state.age(now) > liveness_timeout;
            if offline && !state.offline {
                newly_offline.push(id.clone());
            }
            state.offline = offline;
        }

        newly_offline.sort();
        newly_offline
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut beds: Vec<ScoredState> = self.beds.values().cloned().collect();
        beds.sort_by(|a, b| a.bed_id.cmp(&b.bed_id));
        RegistrySnapshot { beds }
    }

    pub fn get(&self, bed_id: &str) -> Option<&ScoredState> {
        self.beds.get(bed_id)
    }

    pub fn contains(&self, bed_id: &str) -> bool {
        self.beds.contains_key(bed_id)
    }

    pub fn len(&self) -> usize {
        self.beds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beds.is_empty()
    }

    /// Drop all state, as after a restart
    pub fn clear(&mut self) {
        self.beds.clear();
    }
}
