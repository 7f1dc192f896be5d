// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Background writer so the engine never waits on storage
//!
//! Records go through a bounded queue to a dedicated thread. When the queue is
//! full the record is dropped and counted; the tick carries on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Result};
use crossbeam::channel::{self, Sender, TrySendError};
use tracing::{debug, warn};

use super::{HistoryRecord, ReadingSink};
use crate::scoring::RiskBand;
use crate::vitals::Reading;

struct SinkRecord {
    bed_id: String,
    reading: Reading,
    score: u32,
    band: RiskBand,
}

/// Write counters
#[derive(Debug, Default)]
pub struct WriterStats {
    written: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl WriterStats {
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Non-blocking front for another sink
pub struct SinkWriter {
    tx: Option<Sender<SinkRecord>>,
    inner: Arc<dyn ReadingSink>,
    stats: Arc<WriterStats>,
    handle: Option<JoinHandle<()>>,
}

impl SinkWriter {
    pub fn spawn(inner: Arc<dyn ReadingSink>, capacity: usize) -> Result<Self> {
        let (tx, rx) = channel::bounded::<SinkRecord>(capacity.max(1));
        let stats = Arc::new(WriterStats::default());

        let thread_inner = inner.clone();
        let thread_stats = stats.clone();
        let handle = thread::Builder::new()
            .name("sink-writer".to_string())
            .spawn(move || {
                for record in rx.iter() {
                    match thread_inner.record_reading(&record.bed_id, &record.reading, record.score, record.band) {
                        Ok(()) => {
                            thread_stats.written.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            thread_stats.failed.fetch_add(1, Ordering::Relaxed);
                            warn!("History write for {} failed: {}", record.bed_id, e);
                        }
                    }
                }
                debug!("Sink writer drained and stopped");
            })?;

        Ok(Self {
            tx: Some(tx),
            inner,
            stats,
            handle: Some(handle),
        })
    }

    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    /// Records waiting to be written
    pub fn pending(&self) -> usize {
        self.tx.as_ref().map(Sender::len).unwrap_or(0)
    }
}

impl ReadingSink for SinkWriter {
    fn record_reading(&self, bed_id: &str, reading: &Reading, score: u32, band: RiskBand) -> Result<()> {
        let tx = self.tx.as_ref().ok_or_else(|| anyhow!("sink writer stopped"))?;
        let record = SinkRecord {
            bed_id: bed_id.to_string(),
            reading: reading.clone(),
            score,
            band,
        };

        match tx.try_send(record) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                Err(anyhow!("history queue full, dropped record for {}", bed_id))
            }
            Err(TrySendError::Disconnected(_)) => Err(anyhow!("sink writer stopped")),
        }
    }

    fn history(&self, bed_id: &str, limit: usize) -> Result<Vec<HistoryRecord>> {
        self.inner.history(bed_id, limit)
    }
}

impl Drop for SinkWriter {
    fn drop(&mut self) {
        // closing the queue lets the thread finish what is already queued
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
