// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Bounded in-memory history, used when the database is disabled

use std::collections::{HashMap, VecDeque};

use anyhow::Result;
use parking_lot::Mutex;

use super::{HistoryRecord, ReadingSink};
use crate::scoring::RiskBand;
use crate::vitals::Reading;

/// Keeps the latest `per_bed` records for each bed
pub struct MemorySink {
    per_bed: usize,
    records: Mutex<HashMap<String, VecDeque<HistoryRecord>>>,
}

impl MemorySink {
    pub fn new(per_bed: usize) -> Self {
        Self {
            per_bed: per_bed.max(1),
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Total records held across all beds
    pub fn len(&self) -> usize {
        self.records.lock().values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReadingSink for MemorySink {
    fn record_reading(&self, bed_id: &str, reading: &Reading, score: u32, band: RiskBand) -> Result<()> {
        let mut records = self.records.lock();
        let ring = records.entry(bed_id.to_string()).or_default();

        ring.push_back(HistoryRecord::new(bed_id, reading, score, band));
        while ring.len() > self.per_bed {
            ring.pop_front();
        }
        Ok(())
    }

    fn history(&self, bed_id: &str, limit: usize) -> Result<Vec<HistoryRecord>> {
        let records = self.records.lock();
        Ok(records
            .get(bed_id)
            .map(|ring| ring.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_ring_keeps_latest() {
        let sink = MemorySink::new(3);
        for hr in 60..66 {
            let mut r = Reading::with_defaults("BED-001", Utc::now());
            r.heart_rate = hr;
            sink.record_reading("BED-001", &r, 0, RiskBand::Stable).unwrap();
        }

        let history = sink.history("BED-001", 10).unwrap();
        let rates: Vec<u32> = history.iter().map(|h| h.hr).collect();
        assert_eq!(rates, vec![65, 64, 63]);
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.history("BED-001", 1).unwrap().len(), 1);
        assert!(sink.history("BED-002", 10).unwrap().is_empty());
    }
}
